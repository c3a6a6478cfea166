use tracing::debug;

use crate::application::errors::PipelineError;
use crate::application::ports::{CompressionError, Compressor};
use crate::domain::errors::CodecError;
use crate::domain::value_objects::ChunkBits;
use crate::domain::{BitPacker, SymbolReader};

/// One segment recovered from the symbol stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedSegment {
    pub ordinal: u64,
    pub compressed_len: u64,
    pub symbols: usize,
    pub data: Vec<u8>,
}

/// Walks a reassembled symbol stream one compressed member at a time.
///
/// Every segment starts on a symbol boundary. The compressor reports how
/// many bytes its member occupied, which fixes how many symbols the segment
/// used and where the next one starts.
pub struct SegmentDecoder<'a> {
    symbols: &'a [u16],
    chunk_bits: ChunkBits,
    compressor: &'a dyn Compressor,
    position: usize,
    ordinal: u64,
    finished: bool,
}

impl<'a> SegmentDecoder<'a> {
    pub fn new(symbols: &'a [u16], chunk_bits: ChunkBits, compressor: &'a dyn Compressor) -> Self {
        Self {
            symbols,
            chunk_bits,
            compressor,
            position: 0,
            ordinal: 0,
            finished: false,
        }
    }

    /// Symbols not yet claimed by a decoded segment
    pub fn remaining(&self) -> usize {
        self.symbols.len() - self.position
    }

    fn decode_next(&mut self) -> Result<DecodedSegment, PipelineError> {
        let rest = &self.symbols[self.position..];
        let mut reader = SymbolReader::new(rest, self.chunk_bits);
        let mut data = Vec::new();

        let consumed = match self.compressor.decompress_member(&mut reader, &mut data) {
            Ok(consumed) => consumed,
            Err(CompressionError::Truncated { consumed }) => {
                return Err(CodecError::TruncatedData(format!(
                    "segment {} ends after {consumed} bytes without a terminator",
                    self.ordinal
                ))
                .into());
            }
            Err(e) => return Err(e.into()),
        };

        let byte_len = usize::try_from(consumed).map_err(|_| {
            CodecError::TruncatedData(format!("segment {} is too large", self.ordinal))
        })?;
        let used = self.chunk_bits.symbols_for(byte_len);

        if used == 0 || used > rest.len() {
            return Err(CodecError::TruncatedData(format!(
                "segment {} needs {used} symbols but {} remain",
                self.ordinal,
                rest.len()
            ))
            .into());
        }

        if !BitPacker::padding_is_clear(rest, byte_len, self.chunk_bits) {
            return Err(CodecError::TruncatedData(format!(
                "segment {} has non-zero padding bits",
                self.ordinal
            ))
            .into());
        }

        debug!(
            ordinal = self.ordinal,
            compressed_len = consumed,
            symbols = used,
            output_len = data.len(),
            "Decoded segment"
        );

        let segment = DecodedSegment {
            ordinal: self.ordinal,
            compressed_len: consumed,
            symbols: used,
            data,
        };
        self.position += used;
        self.ordinal += 1;
        Ok(segment)
    }
}

impl Iterator for SegmentDecoder<'_> {
    type Item = Result<DecodedSegment, PipelineError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished || self.position >= self.symbols.len() {
            return None;
        }

        let result = self.decode_next();
        if result.is_err() {
            self.finished = true;
        }
        Some(result)
    }
}

impl std::iter::FusedIterator for SegmentDecoder<'_> {}
