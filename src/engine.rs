use std::collections::HashMap;
use std::fmt;

use crate::io::{ByteSink, ByteSource};
use crate::symbols::{Op, SymbolTable};

/// Number of cells on the tape. Fixed for the engine's lifetime.
pub const TAPE_LEN: usize = 30_000;

/// A loop instruction whose partner is missing from the program.
///
/// The only fault the engine can raise. It is delivered through the
/// caller-supplied handler passed to [`Engine::execute`]; the engine stays
/// usable afterwards, with tape and cursor left exactly as they were when
/// the fault was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnmatchedBracket {
    /// A LoopOpen with no matching LoopClose in the rest of the program.
    Open,
    /// A LoopClose with no matching LoopOpen earlier in the program.
    Close,
}

impl fmt::Display for UnmatchedBracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnmatchedBracket::Open => write!(f, "Couldn't find matching right bracket"),
            UnmatchedBracket::Close => write!(f, "Couldn't find matching left bracket"),
        }
    }
}

/// The tape engine: a 30,000-cell byte tape, a cursor, and the dispatch
/// loop that interprets program text under an injected [`SymbolTable`].
///
/// Cursor moves wrap modulo the tape length and cell arithmetic wraps
/// modulo 256, so no operation can fault except an unmatched bracket.
/// The engine is single-threaded and non-reentrant; one session owns it
/// at a time.
pub struct Engine {
    tape: Vec<u8>,
    cursor: usize,
    symbols: SymbolTable,
}

impl Engine {
    /// Create an engine with a zeroed tape, the cursor on cell 0, and the
    /// given alphabet.
    pub fn new(symbols: SymbolTable) -> Self {
        Self {
            tape: vec![0u8; TAPE_LEN],
            cursor: 0,
            symbols,
        }
    }

    /// Zero every cell and move the cursor back to 0. Idempotent.
    pub fn reset(&mut self) {
        self.cursor = 0;
        self.tape.fill(0);
    }

    /// Current cursor position, always in `[0, TAPE_LEN)`.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Read-only view of the tape.
    pub fn tape(&self) -> &[u8] {
        &self.tape
    }

    /// The value of one cell.
    pub fn cell(&self, index: usize) -> u8 {
        self.tape[index]
    }

    /// The active alphabet.
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Install a new alphabet. Legitimate between `execute` calls only;
    /// an in-flight `execute` keeps using the table it started with.
    pub fn set_symbols(&mut self, symbols: SymbolTable) {
        self.symbols = symbols;
    }

    /// Interpret `program` left to right, reading Input bytes from `input`
    /// and writing Output bytes to `output`.
    ///
    /// Characters outside the active alphabet are no-ops, so programs may
    /// carry free-form comments. Loop pairings are resolved lazily and
    /// memoized in a jump table scoped to this call; the table is not kept
    /// across calls because tape state (and hence which branches run) can
    /// differ each time.
    ///
    /// An unmatched bracket is reported through `on_fault` and ends the
    /// call immediately, leaving tape and cursor as they were.
    ///
    /// Returns `true` iff at least one Output instruction ran.
    pub fn execute<R, W, F>(
        &mut self,
        program: &str,
        input: &mut R,
        output: &mut W,
        mut on_fault: F,
    ) -> bool
    where
        R: ByteSource,
        W: ByteSink,
        F: FnMut(UnmatchedBracket),
    {
        let code: Vec<char> = program.chars().collect();
        let mut jumps: HashMap<usize, usize> = HashMap::new();
        let mut produced_output = false;
        let mut i = 0usize;

        while i < code.len() {
            match self.symbols.lookup(code[i]) {
                Some(Op::MoveRight) => self.cursor = (self.cursor + 1) % TAPE_LEN,
                Some(Op::MoveLeft) => self.cursor = (self.cursor + TAPE_LEN - 1) % TAPE_LEN,
                Some(Op::Increment) => {
                    self.tape[self.cursor] = self.tape[self.cursor].wrapping_add(1)
                }
                Some(Op::Decrement) => {
                    self.tape[self.cursor] = self.tape[self.cursor].wrapping_sub(1)
                }
                Some(Op::Output) => {
                    output.write_byte(self.tape[self.cursor]);
                    produced_output = true;
                }
                Some(Op::Input) => self.tape[self.cursor] = input.read_byte(),
                Some(Op::LoopOpen) => {
                    if self.tape[self.cursor] == 0 {
                        let close = match jumps.get(&i) {
                            Some(&close) => close,
                            None => match find_close(&code, &self.symbols, i) {
                                Some(close) => {
                                    jumps.insert(i, close);
                                    jumps.insert(close, i);
                                    close
                                }
                                None => {
                                    on_fault(UnmatchedBracket::Open);
                                    return produced_output;
                                }
                            },
                        };
                        i = close;
                    }
                }
                Some(Op::LoopClose) => {
                    if self.tape[self.cursor] != 0 {
                        let open = match jumps.get(&i) {
                            Some(&open) => open,
                            None => match find_open(&code, &self.symbols, i) {
                                Some(open) => {
                                    jumps.insert(i, open);
                                    jumps.insert(open, i);
                                    open
                                }
                                None => {
                                    on_fault(UnmatchedBracket::Close);
                                    return produced_output;
                                }
                            },
                        };
                        i = open;
                    }
                }
                None => {} // comment character
            }
            i += 1;
        }

        produced_output
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(SymbolTable::standard())
    }
}

/// Scan forward from the LoopOpen at `open` for its partner.
///
/// Depth starts at 1, rises on each further LoopOpen and falls on each
/// LoopClose; the partner is the position where depth reaches 0. Returns
/// `None` if the scan runs off the end of the program.
fn find_close(code: &[char], symbols: &SymbolTable, open: usize) -> Option<usize> {
    let mut depth = 1i32;
    let mut j = open;
    while depth != 0 {
        j += 1;
        if j == code.len() {
            return None;
        }
        match symbols.lookup(code[j]) {
            Some(Op::LoopOpen) => depth += 1,
            Some(Op::LoopClose) => depth -= 1,
            _ => {}
        }
    }
    Some(j)
}

/// Scan backward from the LoopClose at `close` for its partner.
///
/// Mirror image of [`find_close`], kept separate so each direction's
/// termination condition stands on its own: depth starts at -1, rises on
/// each LoopOpen and falls on each LoopClose, and the partner is the
/// position where depth reaches 0. Returns `None` if the scan runs off the
/// front of the program.
fn find_open(code: &[char], symbols: &SymbolTable, close: usize) -> Option<usize> {
    let mut depth = -1i32;
    let mut j = close;
    while depth != 0 {
        if j == 0 {
            return None;
        }
        j -= 1;
        match symbols.lookup(code[j]) {
            Some(Op::LoopOpen) => depth += 1,
            Some(Op::LoopClose) => depth -= 1,
            _ => {}
        }
    }
    Some(j)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::io::SliceSource;
    use proptest::prelude::*;

    /// Turn a token stream into a balanced-bracket program: opens are only
    /// closed while depth allows, and leftover depth is closed at the end.
    fn balanced_program(tokens: &[u8]) -> String {
        let mut program = String::new();
        let mut depth = 0usize;
        for &t in tokens {
            match t % 6 {
                0 => {
                    program.push('[');
                    depth += 1;
                }
                1 => {
                    if depth > 0 {
                        program.push(']');
                        depth -= 1;
                    }
                }
                2 => program.push('+'),
                3 => program.push('-'),
                4 => program.push('>'),
                _ => program.push('z'),
            }
        }
        for _ in 0..depth {
            program.push(']');
        }
        program
    }

    proptest! {
        #[test]
        fn cursor_stays_in_range(moves in prop::collection::vec(any::<bool>(), 0..4096)) {
            let program: String = moves.iter().map(|&m| if m { '>' } else { '<' }).collect();
            let mut engine = Engine::new(SymbolTable::standard());
            engine.execute(&program, &mut SliceSource::new(b""), &mut Vec::new(), |_| {});
            prop_assert!(engine.cursor() < TAPE_LEN);
            let net: i64 = moves.iter().map(|&m| if m { 1i64 } else { -1 }).sum();
            prop_assert_eq!(engine.cursor() as i64, net.rem_euclid(TAPE_LEN as i64));
        }

        #[test]
        fn cell_arithmetic_wraps(steps in prop::collection::vec(any::<bool>(), 0..4096)) {
            let program: String = steps.iter().map(|&s| if s { '+' } else { '-' }).collect();
            let mut engine = Engine::new(SymbolTable::standard());
            engine.execute(&program, &mut SliceSource::new(b""), &mut Vec::new(), |_| {});
            let net: i64 = steps.iter().map(|&s| if s { 1i64 } else { -1 }).sum();
            prop_assert_eq!(engine.cell(0) as i64, net.rem_euclid(256));
        }

        #[test]
        fn loop_free_programs_never_fault(
            chars in prop::collection::vec(prop::sample::select(vec!['+', '-', '<', '>', '.', ',', 'x', ' ']), 0..512)
        ) {
            let program: String = chars.into_iter().collect();
            let mut engine = Engine::new(SymbolTable::standard());
            let mut faults = Vec::new();
            engine.execute(&program, &mut SliceSource::new(b""), &mut Vec::new(), |f| faults.push(f));
            prop_assert!(faults.is_empty());
        }

        #[test]
        fn balanced_brackets_always_pair_up(tokens in prop::collection::vec(any::<u8>(), 0..256)) {
            let program = balanced_program(&tokens);
            let code: Vec<char> = program.chars().collect();
            let symbols = SymbolTable::standard();
            for (i, &ch) in code.iter().enumerate() {
                if ch == '[' {
                    let close = find_close(&code, &symbols, i);
                    prop_assert!(close.is_some());
                    prop_assert_eq!(find_open(&code, &symbols, close.unwrap()), Some(i));
                } else if ch == ']' {
                    let open = find_open(&code, &symbols, i);
                    prop_assert!(open.is_some());
                    prop_assert_eq!(find_close(&code, &symbols, open.unwrap()), Some(i));
                }
            }
        }
    }
}
