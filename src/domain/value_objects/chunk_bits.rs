use serde::{Deserialize, Serialize};

use crate::domain::errors::CodecError;

/// Number of bits carried by one alphabet symbol (1..=16)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct ChunkBits(u8);

impl ChunkBits {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 16;

    /// Widest symbol that still fits in one UTF-16 code unit
    pub const BMP_MAX: ChunkBits = ChunkBits(15);

    pub fn new(bits: u8) -> Result<Self, CodecError> {
        if !(Self::MIN..=Self::MAX).contains(&bits) {
            return Err(CodecError::InvalidChunkBits(bits));
        }
        Ok(Self(bits))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Number of distinct symbols: 2^bits
    pub fn alphabet_size(self) -> usize {
        1usize << self.0
    }

    /// Largest symbol value
    pub fn mask(self) -> u32 {
        (1u32 << self.0) - 1
    }

    /// True when a whole number of symbols always covers a whole number of
    /// bytes, i.e. encoding never introduces padding.
    pub fn divides_byte(self) -> bool {
        8 % self.0 == 0
    }

    /// Symbols needed to carry `byte_len` bytes: ceil(8 * n / bits)
    pub fn symbols_for(self, byte_len: usize) -> usize {
        let bits = byte_len as u128 * 8;
        bits.div_ceil(self.0 as u128) as usize
    }
}

impl Default for ChunkBits {
    fn default() -> Self {
        Self::BMP_MAX
    }
}

impl TryFrom<u8> for ChunkBits {
    type Error = CodecError;

    fn try_from(bits: u8) -> Result<Self, Self::Error> {
        Self::new(bits)
    }
}

impl From<ChunkBits> for u8 {
    fn from(bits: ChunkBits) -> Self {
        bits.0
    }
}

impl std::fmt::Display for ChunkBits {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ChunkBits {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bits = s
            .trim()
            .parse::<u8>()
            .map_err(|_| CodecError::UnparsableChunkBits(s.to_string()))?;
        Self::new(bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_bits_range() {
        assert!(ChunkBits::new(0).is_err());
        assert!(ChunkBits::new(17).is_err());
        for bits in 1..=16 {
            assert_eq!(ChunkBits::new(bits).unwrap().get(), bits);
        }
    }

    #[test]
    fn test_chunk_bits_alphabet_size_and_mask() {
        let bits = ChunkBits::new(8).unwrap();
        assert_eq!(bits.alphabet_size(), 256);
        assert_eq!(bits.mask(), 0xFF);

        let bits = ChunkBits::new(16).unwrap();
        assert_eq!(bits.alphabet_size(), 65536);
        assert_eq!(bits.mask(), 0xFFFF);
    }

    #[test]
    fn test_chunk_bits_divides_byte() {
        let dividing: Vec<u8> = (1..=16)
            .filter(|b| ChunkBits::new(*b).unwrap().divides_byte())
            .collect();
        assert_eq!(dividing, vec![1, 2, 4, 8]);
    }

    #[test]
    fn test_symbols_for() {
        let bits = ChunkBits::new(15).unwrap();
        assert_eq!(bits.symbols_for(0), 0);
        assert_eq!(bits.symbols_for(1), 1);
        assert_eq!(bits.symbols_for(2), 2);
        assert_eq!(bits.symbols_for(15), 8);
        assert_eq!(ChunkBits::new(8).unwrap().symbols_for(13), 13);
    }

    #[test]
    fn test_chunk_bits_from_str() {
        assert_eq!("12".parse::<ChunkBits>().unwrap().get(), 12);
        assert_eq!(
            "abc".parse::<ChunkBits>().unwrap_err(),
            CodecError::UnparsableChunkBits("abc".to_string())
        );
        assert_eq!(
            "0".parse::<ChunkBits>().unwrap_err(),
            CodecError::InvalidChunkBits(0)
        );
        assert!("abc"
            .parse::<ChunkBits>()
            .unwrap_err()
            .to_string()
            .contains("\"abc\""));
    }

    #[test]
    fn test_chunk_bits_default_is_bmp_max() {
        assert_eq!(ChunkBits::default().get(), 15);
    }
}
