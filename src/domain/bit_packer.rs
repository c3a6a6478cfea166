use std::io::{self, BufRead, Read};

use crate::domain::alphabet::Alphabet;
use crate::domain::errors::CodecError;
use crate::domain::value_objects::ChunkBits;

/// Symbols decoded per refill of a [`SymbolReader`] buffer
const READ_BLOCK_SYMBOLS: usize = 8 * 1024;

/// Stateless codec between bytes and fixed-width alphabet symbols.
///
/// Input bytes are read as one big-endian bitstream and cut into
/// `chunk_bits`-wide values, most significant bit first. A trailing partial
/// value is left-justified and zero-padded. Decoding reverses the process
/// and emits any trailing bits as one final left-justified byte, so the
/// output may carry up to `chunk_bits - 1` padding bits. Callers that know
/// the original length trim them.
pub struct BitPacker;

impl BitPacker {
    /// Encode bytes into alphabet symbols
    pub fn encode(bytes: &[u8], alphabet: &Alphabet) -> String {
        let chunk_bits = alphabet.chunk_bits();
        let width = chunk_bits.get() as u32;
        let mask = chunk_bits.mask();
        let symbols = alphabet.symbols();

        // Most symbols are two or three bytes in UTF-8
        let mut out = String::with_capacity(chunk_bits.symbols_for(bytes.len()) * 3);
        let mut acc: u32 = 0;
        let mut acc_bits: u32 = 0;

        for &byte in bytes {
            acc = (acc << 8) | byte as u32;
            acc_bits += 8;
            while acc_bits >= width {
                acc_bits -= width;
                out.push(symbols[((acc >> acc_bits) & mask) as usize]);
            }
            acc &= (1u32 << acc_bits) - 1;
        }

        if acc_bits > 0 {
            out.push(symbols[((acc << (width - acc_bits)) & mask) as usize]);
        }

        out
    }

    /// Decode alphabet symbols back into bytes, padding included
    pub fn decode(text: &str, alphabet: &Alphabet) -> Result<Vec<u8>, CodecError> {
        let width = alphabet.chunk_bits().get() as u32;
        let mut out = Vec::with_capacity(text.len());
        let mut acc: u32 = 0;
        let mut acc_bits: u32 = 0;

        for (position, symbol) in text.chars().enumerate() {
            let value = alphabet.index_at(symbol, position)?;
            acc = (acc << width) | value as u32;
            acc_bits += width;
            while acc_bits >= 8 {
                acc_bits -= 8;
                out.push((acc >> acc_bits) as u8);
            }
            acc &= (1u32 << acc_bits) - 1;
        }

        if acc_bits > 0 {
            out.push((acc << (8 - acc_bits)) as u8);
        }

        Ok(out)
    }

    /// Number of symbols `encode` produces for `byte_len` bytes
    pub fn encoded_len(byte_len: usize, chunk_bits: ChunkBits) -> usize {
        chunk_bits.symbols_for(byte_len)
    }

    /// Map text to symbol values without unpacking bits
    pub fn symbols(text: &str, alphabet: &Alphabet) -> Result<Vec<u16>, CodecError> {
        text.chars()
            .enumerate()
            .map(|(position, symbol)| alphabet.index_at(symbol, position))
            .collect()
    }

    /// Returns true when the bits that pad `byte_len` bytes out to a whole
    /// number of symbols are all zero. `symbols` must start at the first
    /// symbol of those bytes and hold at least `symbols_for(byte_len)` values.
    pub fn padding_is_clear(symbols: &[u16], byte_len: usize, chunk_bits: ChunkBits) -> bool {
        let used = chunk_bits.symbols_for(byte_len);
        if used == 0 {
            return true;
        }
        let Some(&last) = symbols.get(used - 1) else {
            return false;
        };

        let padding = (used as u128 * chunk_bits.get() as u128 - byte_len as u128 * 8) as u32;
        last as u32 & ((1u32 << padding) - 1) == 0
    }
}

/// Streaming decoder over pre-mapped symbol values.
///
/// Implements [`BufRead`] so a decompressor can pull exactly as many bytes as
/// it needs. [`SymbolReader::bytes_consumed`] then tells how far into the
/// symbol stream that decompressor went.
///
/// Unlike [`BitPacker::decode`] it only yields whole bytes. Trailing bits
/// short of a byte are always padding, so a truncated stream reads as a
/// clean prefix of the original bytes.
pub struct SymbolReader<'a> {
    symbols: &'a [u16],
    width: u32,
    next_symbol: usize,
    acc: u32,
    acc_bits: u32,
    buffer: Vec<u8>,
    buffer_pos: usize,
    consumed: u64,
}

impl<'a> SymbolReader<'a> {
    pub fn new(symbols: &'a [u16], chunk_bits: ChunkBits) -> Self {
        Self {
            symbols,
            width: chunk_bits.get() as u32,
            next_symbol: 0,
            acc: 0,
            acc_bits: 0,
            buffer: Vec::new(),
            buffer_pos: 0,
            consumed: 0,
        }
    }

    /// Bytes handed out through `consume`/`read` so far
    pub fn bytes_consumed(&self) -> u64 {
        self.consumed
    }

    fn refill(&mut self) {
        self.buffer.clear();
        self.buffer_pos = 0;

        let end = (self.next_symbol + READ_BLOCK_SYMBOLS).min(self.symbols.len());
        for &value in &self.symbols[self.next_symbol..end] {
            self.acc = (self.acc << self.width) | value as u32;
            self.acc_bits += self.width;
            while self.acc_bits >= 8 {
                self.acc_bits -= 8;
                self.buffer.push((self.acc >> self.acc_bits) as u8);
            }
            self.acc &= (1u32 << self.acc_bits) - 1;
        }
        self.next_symbol = end;
    }
}

impl BufRead for SymbolReader<'_> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        if self.buffer_pos >= self.buffer.len() {
            self.refill();
        }
        Ok(&self.buffer[self.buffer_pos..])
    }

    fn consume(&mut self, amt: usize) {
        let amt = amt.min(self.buffer.len() - self.buffer_pos);
        self.buffer_pos += amt;
        self.consumed += amt as u64;
    }
}

impl Read for SymbolReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let available = self.fill_buf()?;
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.consume(n);
        Ok(n)
    }
}
