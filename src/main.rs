use clap::Parser;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use epicbf::console::{Session, run_console};
use epicbf::hooks::PostAction;

#[derive(Parser)]
#[command(name = "epicbf", version, about = "Epic Brainfuck: an interactive console with troll interpreters")]
struct Cli {
    /// Which interpreter to use (nice, reset, chars, file, browser, random).
    #[arg(long, short, default_value = "nice")]
    interpreter: String,

    /// Brainfuck code to run (optional).
    #[arg(long, short)]
    code: Option<String>,

    /// Brainfuck file to run (optional).
    #[arg(long, short)]
    file: Option<String>,

    /// Drop into the console after running --code/--file.
    #[arg(long, short)]
    launch: bool,

    /// RNG seed for reproducible troll behavior.
    #[arg(long)]
    seed: Option<u64>,
}

const TROLL_FAILURE: &str = "Your code is broken. It failed.";

fn main() {
    let cli = Cli::parse();

    let seed = cli.seed.unwrap_or_else(rand::random);
    let mut rng = SmallRng::seed_from_u64(seed);

    let kind = if cli.interpreter == "random" {
        const KINDS: [&str; 5] = ["nice", "reset", "chars", "file", "browser"];
        KINDS[rng.gen_range(0..KINDS.len())]
    } else {
        cli.interpreter.as_str()
    };

    let session_seed: u64 = rng.r#gen();
    let mut session = match kind {
        "nice" => Session::nice(session_seed),
        "reset" => Session::troll(PostAction::ResetTape, session_seed),
        "chars" => Session::troll(PostAction::ScrambleSymbols, session_seed),
        "file" => Session::troll(PostAction::LogToFile, session_seed),
        "browser" => Session::troll(PostAction::OpenLink, session_seed),
        other => {
            eprintln!(
                "Unknown interpreter: {other}. Available: nice, reset, chars, file, browser, random"
            );
            std::process::exit(1);
        }
    };

    // Run everything that was provided: if both --code and --file are set,
    // both run, code first.
    if let Some(code) = cli.code.as_deref() {
        session.run(code);
    }

    if let Some(path) = cli.file.as_deref() {
        // Too short to even be "x.b".
        if path.len() <= 3 {
            if session.is_troll() {
                println!("{TROLL_FAILURE}");
            } else {
                println!("Invalid Brainfuck File!");
            }
            std::process::exit(1);
        }
        match std::fs::read_to_string(path) {
            Ok(code) => {
                session.run(&code);
            }
            Err(_) => {
                if session.is_troll() {
                    // Troll interpreters provide useless debugging
                    // information.
                    println!("{TROLL_FAILURE}");
                } else {
                    println!(
                        "Could not find your file! Please double check \
                         that the path provided is accessible to me."
                    );
                }
                std::process::exit(1);
            }
        }
    }

    if (cli.code.is_some() || cli.file.is_some()) && !cli.launch {
        return;
    }

    run_console(&mut session);
}
