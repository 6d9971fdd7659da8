use std::fs::File;
use std::io::Write;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::SmallRng;

use crate::engine::Engine;
use crate::symbols::SymbolTable;

/// The Troll Song, sung by Eduard Khil.
pub const TROLL_SONG: &str = "https://www.youtube.com/watch?v=o1eHKf-dMwo";

/// Side effect a session runs after each `execute` returns.
///
/// This is the extension point the troll interpreters hang off of. The
/// engine itself knows nothing about it; the owning session applies the
/// action strictly after `execute` has returned, never during a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostAction {
    /// Plain interpretation, no shenanigans.
    None,
    /// Zero the tape and cursor after every execution.
    ResetTape,
    /// Install a freshly scrambled alphabet after every execution.
    ScrambleSymbols,
    /// Write 1,000 lines of LOL to a fresh log file after every execution.
    LogToFile,
    /// Open the Troll Song in a browser tab after every execution.
    OpenLink,
}

impl PostAction {
    /// Apply the action to the session's engine. Call only between
    /// `execute` calls.
    pub fn run(self, engine: &mut Engine, rng: &mut SmallRng) {
        match self {
            PostAction::None => {}
            PostAction::ResetTape => engine.reset(),
            PostAction::ScrambleSymbols => engine.set_symbols(SymbolTable::scrambled(rng)),
            PostAction::LogToFile => {
                if let Err(err) = write_troll_log() {
                    eprintln!("Couldn't write the troll log: {err}");
                }
            }
            PostAction::OpenLink => open_in_browser(TROLL_SONG),
        }
    }
}

/// Write 1,000 LOL lines to `log_<unix-seconds>.txt` in the working
/// directory. A new file per execution.
fn write_troll_log() -> std::io::Result<()> {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let mut file = File::create(format!("log_{stamp}.txt"))?;
    for _ in 0..1000 {
        writeln!(file, "LOL")?;
    }
    file.flush()
}

/// Best-effort browser launch; trolling is not worth failing over.
fn open_in_browser(url: &str) {
    let opener = if cfg!(target_os = "macos") {
        "open"
    } else {
        "xdg-open"
    };
    let _ = Command::new(opener).arg(url).spawn();
}
