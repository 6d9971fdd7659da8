pub mod console;
pub mod engine;
pub mod hooks;
pub mod io;
pub mod symbols;
