use std::io::{Read, Write};

/// Blocking one-byte reader feeding the Input instruction.
///
/// The engine leaves end-of-stream policy to the implementation; the
/// adapters in this module yield 0 once the underlying stream is exhausted.
pub trait ByteSource {
    fn read_byte(&mut self) -> u8;
}

/// One-byte writer fed by the Output instruction.
///
/// Implementations must make each byte visible promptly (unbuffered
/// semantics) so interactive output interleaves correctly with a prompt.
pub trait ByteSink {
    fn write_byte(&mut self, byte: u8);
}

/// Reads single bytes from stdin, blocking until one is available.
/// Yields 0 at end of stream.
pub struct StdinSource;

impl ByteSource for StdinSource {
    fn read_byte(&mut self) -> u8 {
        let mut buf = [0u8; 1];
        match std::io::stdin().read_exact(&mut buf) {
            Ok(()) => buf[0],
            Err(_) => 0,
        }
    }
}

/// Writes single bytes to stdout, flushing after every byte.
pub struct StdoutSink;

impl ByteSink for StdoutSink {
    fn write_byte(&mut self, byte: u8) {
        let mut out = std::io::stdout().lock();
        let _ = out.write_all(&[byte]);
        let _ = out.flush();
    }
}

/// In-memory `ByteSource` over a byte slice; yields 0 once exhausted.
/// Useful for embedding and for tests.
pub struct SliceSource<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> SliceSource<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }
}

impl ByteSource for SliceSource<'_> {
    fn read_byte(&mut self) -> u8 {
        match self.bytes.get(self.pos) {
            Some(&b) => {
                self.pos += 1;
                b
            }
            None => 0,
        }
    }
}

impl ByteSink for Vec<u8> {
    fn write_byte(&mut self, byte: u8) {
        self.push(byte);
    }
}
