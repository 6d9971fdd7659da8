use std::io::{BufRead, Write};

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::engine::{Engine, TAPE_LEN};
use crate::hooks::PostAction;
use crate::io::{StdinSource, StdoutSink};
use crate::symbols::SymbolTable;

/// One interpreter session: the sole owner of an engine, plus the
/// post-execution action and RNG that give each interpreter flavor its
/// personality.
pub struct Session {
    engine: Engine,
    post: PostAction,
    rng: SmallRng,
    troll: bool,
}

impl Session {
    /// A traditional session: standard alphabet, helpful error messages,
    /// no post-execution shenanigans.
    pub fn nice(seed: u64) -> Self {
        Self {
            engine: Engine::new(SymbolTable::standard()),
            post: PostAction::None,
            rng: SmallRng::seed_from_u64(seed),
            troll: false,
        }
    }

    /// A troll session: scrambled alphabet from the start, useless error
    /// messages, and `post` applied after every execution.
    pub fn troll(post: PostAction, seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let engine = Engine::new(SymbolTable::scrambled(&mut rng));
        Self {
            engine,
            post,
            rng,
            troll: true,
        }
    }

    pub fn is_troll(&self) -> bool {
        self.troll
    }

    /// Run one piece of code through the engine with stdin/stdout attached,
    /// then apply the post-execution action. Returns the output flag.
    pub fn run(&mut self, code: &str) -> bool {
        let troll = self.troll;
        let produced = self
            .engine
            .execute(code, &mut StdinSource, &mut StdoutSink, |fault| {
                if troll {
                    println!("Your code is broken. It failed.");
                } else {
                    println!("{fault}");
                }
            });
        self.post.run(&mut self.engine, &mut self.rng);
        produced
    }

    /// Whether the session deigns to answer a meta-command right now.
    /// Nice sessions always do; troll sessions only 25% of the time.
    fn responds(&mut self) -> bool {
        !self.troll || self.rng.r#gen::<f64>() > 0.75
    }

    /// Print the alias cheat sheet for the current alphabet.
    fn print_directive(&self) {
        println!("\nLONG LIVE BRAINFUCK!\n");
        for (alias, standard) in self.engine.symbols().directive() {
            println!("       {alias} --> {standard}");
        }
        println!("\nLONG LIVE THE TROLL!\n");
    }

    /// Print the cells in `[start, end)`, clamped to the tape.
    fn print_cells(&self, start: usize, end: usize) {
        let start = start.min(TAPE_LEN);
        let end = end.min(TAPE_LEN);
        if end == start + 1 {
            println!("{}", self.engine.cell(start));
        } else {
            println!("{:?}", &self.engine.tape()[start..end.max(start)]);
        }
    }
}

/// Special console commands that bypass the interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MetaCommand {
    /// GMTFOH: leave the console.
    Quit,
    /// PTRPLZ: print the cursor position.
    ShowCursor,
    /// ARRPLZ[i] / ARRPLZ[a:b]: print a cell or a cell range
    /// (exclusive end).
    ShowCells { start: usize, end: usize },
    /// HELPPLZ!!!: print the alias cheat sheet.
    ShowDirective,
}

fn parse_meta(line: &str) -> Option<MetaCommand> {
    match line {
        "GMTFOH" => return Some(MetaCommand::Quit),
        "PTRPLZ" => return Some(MetaCommand::ShowCursor),
        "HELPPLZ!!!" => return Some(MetaCommand::ShowDirective),
        _ => {}
    }
    let inner = line.strip_prefix("ARRPLZ[")?.strip_suffix(']')?;
    if let Some((a, b)) = inner.split_once(':') {
        let start = if a.is_empty() { 0 } else { a.parse().ok()? };
        let end = if b.is_empty() {
            TAPE_LEN
        } else {
            b.parse().ok()?
        };
        Some(MetaCommand::ShowCells { start, end })
    } else {
        let index: usize = inner.parse().ok()?;
        Some(MetaCommand::ShowCells {
            start: index,
            end: index + 1,
        })
    }
}

/// Drive the interactive console over a session until GMTFOH gets through
/// or stdin closes.
pub fn run_console(session: &mut Session) {
    println!("Brainfuck Interactive Console");
    println!("-----------------------------");

    let stdin = std::io::stdin();
    let mut line = String::new();
    let mut produced = false;

    loop {
        // Give the prompt its own line when the last program printed
        // something.
        if produced {
            println!();
        }
        print!(">>> ");
        let _ = std::io::stdout().flush();

        line.clear();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let code = line.trim_end_matches(['\r', '\n']);

        match parse_meta(code) {
            Some(MetaCommand::Quit) => {
                if session.responds() {
                    break;
                }
                produced = false;
            }
            Some(MetaCommand::ShowCursor) => {
                if session.responds() {
                    println!("{}", session.engine.cursor());
                }
                produced = false;
            }
            Some(MetaCommand::ShowCells { start, end }) => {
                if session.responds() {
                    session.print_cells(start, end);
                }
                produced = false;
            }
            Some(MetaCommand::ShowDirective) => {
                if session.troll {
                    session.print_directive();
                    produced = false;
                } else {
                    // Nice sessions have nothing to hide; the line is just
                    // Brainfuck with no meaningful characters in it.
                    produced = session.run(code);
                }
            }
            None => produced = session.run(code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quit_and_cursor() {
        assert_eq!(parse_meta("GMTFOH"), Some(MetaCommand::Quit));
        assert_eq!(parse_meta("PTRPLZ"), Some(MetaCommand::ShowCursor));
        assert_eq!(parse_meta("HELPPLZ!!!"), Some(MetaCommand::ShowDirective));
    }

    #[test]
    fn test_parse_single_cell() {
        assert_eq!(
            parse_meta("ARRPLZ[7]"),
            Some(MetaCommand::ShowCells { start: 7, end: 8 })
        );
    }

    #[test]
    fn test_parse_cell_range() {
        assert_eq!(
            parse_meta("ARRPLZ[2:9]"),
            Some(MetaCommand::ShowCells { start: 2, end: 9 })
        );
    }

    #[test]
    fn test_parse_open_ended_ranges() {
        assert_eq!(
            parse_meta("ARRPLZ[:5]"),
            Some(MetaCommand::ShowCells { start: 0, end: 5 })
        );
        assert_eq!(
            parse_meta("ARRPLZ[3:]"),
            Some(MetaCommand::ShowCells {
                start: 3,
                end: TAPE_LEN
            })
        );
    }

    #[test]
    fn test_malformed_meta_commands_are_code() {
        assert_eq!(parse_meta("ARRPLZ[a]"), None);
        assert_eq!(parse_meta("ARRPLZ[1"), None);
        assert_eq!(parse_meta("ARRPLZ"), None);
        assert_eq!(parse_meta("gmtfoh"), None);
        assert_eq!(parse_meta("+++."), None);
    }

    #[test]
    fn test_nice_session_always_responds() {
        let mut session = Session::nice(42);
        for _ in 0..100 {
            assert!(session.responds());
        }
    }

    #[test]
    fn test_nice_session_runs_code() {
        let mut session = Session::nice(0);
        // No output instruction, so the prompt needs no extra newline.
        assert!(!session.run("+++"));
        assert_eq!(session.engine.cell(0), 3);
    }

    #[test]
    fn test_reset_troll_wipes_state_after_run() {
        let mut session = Session::troll(PostAction::ResetTape, 1);
        // Spell "+++" in whatever alphabet the session drew.
        let plus = session.engine.symbols().glyph(crate::symbols::Op::Increment);
        let code: String = std::iter::repeat(plus).take(3).collect();
        session.run(&code);
        assert_eq!(session.engine.cell(0), 0);
        assert_eq!(session.engine.cursor(), 0);
    }

    #[test]
    fn test_troll_session_starts_scrambled_consistently() {
        let session = Session::troll(PostAction::None, 9);
        let table = session.engine.symbols();
        let glyphs: Vec<char> = crate::symbols::OPS
            .iter()
            .map(|&op| table.glyph(op))
            .collect();
        for (i, a) in glyphs.iter().enumerate() {
            for b in &glyphs[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
