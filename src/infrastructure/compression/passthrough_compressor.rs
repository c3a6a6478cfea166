use std::io::BufRead;

use crate::application::ports::{CompressionError, Compressor};

/// Identity compressor.
///
/// Not self-framing: a member is everything up to end of input.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughCompressor;

impl Compressor for PassthroughCompressor {
    fn name(&self) -> &'static str {
        "none"
    }

    fn is_self_framing(&self) -> bool {
        false
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, CompressionError> {
        Ok(data.to_vec())
    }

    fn decompress_member(
        &self,
        input: &mut dyn BufRead,
        out: &mut Vec<u8>,
    ) -> Result<u64, CompressionError> {
        let mut consumed = 0u64;
        loop {
            let available = input.fill_buf()?;
            if available.is_empty() {
                return Ok(consumed);
            }
            let n = available.len();
            out.extend_from_slice(available);
            input.consume(n);
            consumed += n as u64;
        }
    }
}
