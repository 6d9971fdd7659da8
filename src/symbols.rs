use rand::Rng;
use rand::rngs::SmallRng;

/// The eight abstract Brainfuck operations.
///
/// Program text never reaches the engine as operations directly; each
/// character is resolved through a [`SymbolTable`] first, so the same
/// engine can run programs written in any glyph alphabet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    MoveRight,
    MoveLeft,
    Increment,
    Decrement,
    Output,
    Input,
    LoopOpen,
    LoopClose,
}

/// All operations, in the order used to index a [`SymbolTable`].
pub const OPS: [Op; 8] = [
    Op::MoveRight,
    Op::MoveLeft,
    Op::Increment,
    Op::Decrement,
    Op::Output,
    Op::Input,
    Op::LoopOpen,
    Op::LoopClose,
];

/// Candidate glyphs per operation for scrambled alphabets, standard glyph
/// first. The pools are pairwise disjoint, so any draw of one glyph per
/// pool yields an unambiguous alphabet.
const ALIAS_POOLS: [[char; 5]; 8] = [
    ['>', 'a', 'b', 'c', '1'], // MoveRight
    ['<', 'd', 'e', 'f', '2'], // MoveLeft
    ['+', 'g', 'h', 'i', '3'], // Increment
    ['-', 'j', 'k', 'l', '4'], // Decrement
    ['.', 'm', 'n', 'o', '5'], // Output
    [',', 'p', 'q', 'r', '6'], // Input
    ['[', 's', 't', 'u', '7'], // LoopOpen
    [']', 'v', 'w', 'x', '8'], // LoopClose
];

/// A bijective mapping from the eight operations to the single-character
/// glyphs that spell them in program text.
///
/// The engine treats the table as injected configuration: it may be swapped
/// between `execute` calls, never during one. The engine does not check
/// that the eight glyphs are pairwise distinct; callers building custom
/// tables are responsible for that.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolTable {
    /// One glyph per operation, indexed in [`OPS`] order.
    glyphs: [char; 8],
}

impl SymbolTable {
    /// The classic `> < + - . , [ ]` alphabet.
    pub fn standard() -> Self {
        Self {
            glyphs: ['>', '<', '+', '-', '.', ',', '[', ']'],
        }
    }

    /// A custom alphabet. `glyphs` is indexed in [`OPS`] order and must
    /// contain eight pairwise distinct characters.
    pub fn custom(glyphs: [char; 8]) -> Self {
        Self { glyphs }
    }

    /// Draw a fresh troll alphabet: one glyph per operation, picked
    /// uniformly from that operation's alias pool.
    pub fn scrambled(rng: &mut SmallRng) -> Self {
        let mut glyphs = ['\0'; 8];
        for (glyph, pool) in glyphs.iter_mut().zip(&ALIAS_POOLS) {
            *glyph = pool[rng.gen_range(0..pool.len())];
        }
        Self { glyphs }
    }

    /// The glyph spelling `op` under this table.
    pub fn glyph(&self, op: Op) -> char {
        self.glyphs[op as usize]
    }

    /// Resolve a program character to an operation. Characters outside the
    /// alphabet resolve to `None` and are treated as comments by the engine.
    pub fn lookup(&self, ch: char) -> Option<Op> {
        self.glyphs.iter().position(|&g| g == ch).map(|i| OPS[i])
    }

    /// `(alias, standard glyph)` pairs, one per operation, for printing a
    /// cheat sheet of the current alphabet.
    pub fn directive(&self) -> [(char, char); 8] {
        let standard = SymbolTable::standard();
        let mut pairs = [('\0', '\0'); 8];
        for (pair, &op) in pairs.iter_mut().zip(&OPS) {
            *pair = (self.glyph(op), standard.glyph(op));
        }
        pairs
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::standard()
    }
}
