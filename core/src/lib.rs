#![no_std]

extern crate alloc;

use core::fmt;
use serde::{Deserialize, Serialize};

pub use board::*;
pub use cell::*;
pub use error::*;
pub use generator::*;
pub use rules::*;
pub use types::*;

mod board;
mod cell;
mod error;
mod generator;
mod rules;
mod types;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub size: Coord2,
    pub mines: CellCount,
}

impl GameConfig {
    pub const fn new_unchecked(size: Coord2, mines: CellCount) -> Self {
        Self { size, mines }
    }

    pub fn new((size_x, size_y): Coord2, mines: CellCount) -> Self {
        let size_x = size_x.clamp(1, u8::MAX as Coord);
        let size_y = size_y.clamp(1, u8::MAX as Coord);
        let mines = mines.min(mult(size_x, size_y).saturating_sub(1));
        Self::new_unchecked((size_x, size_y), mines)
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }
}

/// 32 bytes that fully determine a mine layout for a given first step.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Seed([u8; 32]);

impl Seed {
    pub const ZERO: Self = Self([0; 32]);

    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// A seed whose first byte is `value`, the rest zero.
    pub const fn from_byte(value: u8) -> Self {
        let mut bytes = [0; 32];
        bytes[0] = value;
        Self(bytes)
    }

    /// Spreads a 64-bit value over the first eight bytes, little endian.
    pub fn from_u64(value: u64) -> Self {
        let mut bytes = [0; 32];
        bytes[..8].copy_from_slice(&value.to_le_bytes());
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Folds all 32 bytes into the 64-bit state the placement RNG is seeded with.
    pub fn to_u64(&self) -> u64 {
        self.0.chunks_exact(8).fold(0u64, |acc, chunk| {
            let mut word = [0u8; 8];
            word.copy_from_slice(chunk);
            (acc ^ u64::from_le_bytes(word))
                .wrapping_mul(0x9E37_79B9_7F4A_7C15)
                .rotate_left(29)
        })
    }

    /// Parses the 64 hex digit form written by `Display`.
    pub fn from_hex(text: &str) -> Result<Self> {
        let text = text.trim();
        if text.len() != 64 || !text.is_ascii() {
            return Err(GameError::InvalidSeed);
        }
        let mut bytes = [0u8; 32];
        for (byte, pair) in bytes.iter_mut().zip(text.as_bytes().chunks_exact(2)) {
            let hi = hex_value(pair[0]).ok_or(GameError::InvalidSeed)?;
            let lo = hex_value(pair[1]).ok_or(GameError::InvalidSeed)?;
            *byte = (hi << 4) | lo;
        }
        Ok(Self(bytes))
    }
}

const fn hex_value(digit: u8) -> Option<u8> {
    match digit {
        b'0'..=b'9' => Some(digit - b'0'),
        b'a'..=b'f' => Some(digit - b'a' + 10),
        b'A'..=b'F' => Some(digit - b'A' + 10),
        _ => None,
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn seed_hex_round_trips() {
        let seed = Seed::from_u64(0xdead_beef);
        let text = seed.to_string();
        assert_eq!(text.len(), 64);
        assert!(text.starts_with("efbeadde"));
        assert_eq!(Seed::from_hex(&text), Ok(seed));
    }

    #[test]
    fn malformed_seed_is_rejected() {
        assert_eq!(Seed::from_hex("abc"), Err(GameError::InvalidSeed));
        let mut text = Seed::ZERO.to_string();
        text.replace_range(0..1, "g");
        assert_eq!(Seed::from_hex(&text), Err(GameError::InvalidSeed));
    }

    #[test]
    fn seed_fold_mixes_repeated_words() {
        assert_ne!(Seed::from_bytes([1; 32]).to_u64(), Seed::ZERO.to_u64());
        assert_ne!(Seed::from_byte(1).to_u64(), Seed::from_byte(2).to_u64());
    }

    #[test]
    fn config_keeps_one_safe_cell() {
        let config = GameConfig::new((3, 3), 100);
        assert_eq!(config.mines, 8);
        assert_eq!(config.total_cells(), 9);

        let config = GameConfig::new((0, 500), 1);
        assert_eq!(config.size, (1, 255));
    }
}
