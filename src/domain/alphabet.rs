//! Name-safe symbol alphabets
//!
//! An alphabet holds exactly `2^chunk_bits` characters, taken in codepoint
//! order from the Unicode scalar values that are legal in file and blob
//! names. The table is deterministic for a given width and is built once per
//! process, then shared.

use dashmap::DashMap;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::errors::CodecError;
use crate::domain::value_objects::ChunkBits;

static ALPHABETS: Lazy<DashMap<ChunkBits, Arc<Alphabet>>> = Lazy::new(DashMap::new);

/// Characters rejected by Windows, local filesystems or blob services
const RESERVED_PUNCTUATION: [char; 10] = ['.', '\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// Returns true when `symbol` may appear anywhere in an artifact name.
///
/// Excludes controls, space, period, reserved punctuation, the soft hyphen,
/// the C1/no-break-space block, variation selectors, the byte order mark,
/// Arabic presentation form and half-width tails rejected by blob services,
/// and every noncharacter.
pub fn is_name_safe(symbol: char) -> bool {
    let cp = symbol as u32;

    let excluded_range = matches!(
        cp,
        0x0000..=0x0020
            | 0x007F..=0x00A0
            | 0x00AD
            | 0xFD9E..=0xFDFA
            | 0xFE00..=0xFE0F
            | 0xFEFF
            | 0xFF9C..=0xFFFF
    );

    !excluded_range && !RESERVED_PUNCTUATION.contains(&symbol) && cp & 0xFFFE != 0xFFFE
}

/// Bidirectional symbol table for one chunk width
#[derive(Debug)]
pub struct Alphabet {
    chunk_bits: ChunkBits,
    symbols: Vec<char>,
    lookup: HashMap<char, u16>,
}

impl Alphabet {
    /// Get the shared alphabet for `chunk_bits`, building it on first use
    pub fn build(chunk_bits: ChunkBits) -> Arc<Alphabet> {
        if let Some(alphabet) = ALPHABETS.get(&chunk_bits) {
            return Arc::clone(alphabet.value());
        }

        let entry = ALPHABETS
            .entry(chunk_bits)
            .or_insert_with(|| Arc::new(Self::generate(chunk_bits)));
        Arc::clone(entry.value())
    }

    fn generate(chunk_bits: ChunkBits) -> Self {
        let size = chunk_bits.alphabet_size();
        let symbols: Vec<char> = (0..=char::MAX as u32)
            .filter_map(char::from_u32)
            .filter(|c| is_name_safe(*c))
            .take(size)
            .collect();

        let lookup = symbols
            .iter()
            .enumerate()
            .map(|(index, symbol)| (*symbol, index as u16))
            .collect();

        tracing::debug!(
            chunk_bits = chunk_bits.get(),
            size = symbols.len(),
            last = ?symbols.last(),
            "Built symbol alphabet"
        );

        Self {
            chunk_bits,
            symbols,
            lookup,
        }
    }

    pub fn chunk_bits(&self) -> ChunkBits {
        self.chunk_bits
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Symbol for a value, `None` when the value exceeds the alphabet
    pub fn symbol(&self, index: u32) -> Option<char> {
        self.symbols.get(index as usize).copied()
    }

    /// Value of a symbol
    pub fn index(&self, symbol: char) -> Result<u16, CodecError> {
        self.index_at(symbol, 0)
    }

    /// Value of a symbol found at `position` in some text, so that the
    /// error can point at it
    pub fn index_at(&self, symbol: char, position: usize) -> Result<u16, CodecError> {
        self.lookup
            .get(&symbol)
            .copied()
            .ok_or(CodecError::InvalidSymbol { symbol, position })
    }

    pub(crate) fn symbols(&self) -> &[char] {
        &self.symbols
    }
}
