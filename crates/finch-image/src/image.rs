//! The fixed-size code image.

use std::fmt;
use std::ops::{Index, IndexMut};

/// Size of every emitted image in bytes.
pub const IMAGE_SIZE: usize = 0x100;

/// Scratch byte used by emitted code for intermediate statement results.
/// Emitted statements restore it to `00`, so it can coincide with the
/// zero terminator of the topmost heap string.
pub const SCRATCH_ADDR: u8 = 0xFF;

/// A 256-byte machine-code image: code grows up from `0x00`, string heap
/// grows down from the top, static data sits between them.
///
/// `Display` renders the canonical dump: 256 uppercase two-digit hex bytes,
/// eight per line, space-separated.
#[derive(Clone, PartialEq, Eq)]
pub struct Image([u8; IMAGE_SIZE]);

impl Image {
    pub fn new() -> Self {
        Self([0; IMAGE_SIZE])
    }

    pub fn from_bytes(bytes: [u8; IMAGE_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; IMAGE_SIZE] {
        &self.0
    }

    /// Parses a dump produced by `Display` (whitespace-separated hex pairs).
    pub fn parse_dump(dump: &str) -> Option<Self> {
        let mut bytes = [0u8; IMAGE_SIZE];
        let mut count = 0;
        for word in dump.split_whitespace() {
            if count == IMAGE_SIZE {
                return None;
            }
            bytes[count] = u8::from_str_radix(word, 16).ok()?;
            count += 1;
        }
        (count == IMAGE_SIZE).then(|| Self(bytes))
    }
}

impl Default for Image {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<usize> for Image {
    type Output = u8;

    fn index(&self, index: usize) -> &u8 {
        &self.0[index]
    }
}

impl IndexMut<usize> for Image {
    fn index_mut(&mut self, index: usize) -> &mut u8 {
        &mut self.0[index]
    }
}

impl fmt::Display for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.0.iter().enumerate() {
            if i > 0 {
                if i % 8 == 0 {
                    writeln!(f)?;
                } else {
                    write!(f, " ")?;
                }
            }
            write!(f, "{:02X}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Image")?;
        fmt::Display::fmt(self, f)
    }
}
