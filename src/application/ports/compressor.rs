use std::io::BufRead;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompressionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt compressed data: {0}")]
    Corrupt(String),

    #[error("Compressed member truncated after {consumed} input bytes")]
    Truncated { consumed: u64 },
}

/// Port for deterministic compression.
///
/// Segments are compressed independently and their outputs end up back to
/// back in one stream with no length markers. A self-framing compressor can
/// find the end of each member on its own; one that is not consumes
/// everything it is given.
pub trait Compressor: Send + Sync {
    /// Short name used in logs and summaries
    fn name(&self) -> &'static str;

    /// Whether concatenated outputs can be split back into members
    fn is_self_framing(&self) -> bool;

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, CompressionError>;

    /// Decompress exactly one member from `input` into `out`.
    ///
    /// Returns the number of input bytes the member occupied. `input` is left
    /// positioned right after it.
    fn decompress_member(
        &self,
        input: &mut dyn BufRead,
        out: &mut Vec<u8>,
    ) -> Result<u64, CompressionError>;

    /// Decompress a concatenation of members
    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, CompressionError> {
        let mut out = Vec::with_capacity(data.len().saturating_mul(3).max(1024));
        let mut input = data;

        while !input.is_empty() {
            let consumed = self.decompress_member(&mut input, &mut out)?;
            if consumed == 0 {
                return Err(CompressionError::Corrupt(
                    "member occupied no input".to_string(),
                ));
            }
        }

        Ok(out)
    }
}
