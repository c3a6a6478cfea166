use std::io::{BufRead, Write};

use flate2::write::ZlibEncoder;
use flate2::{Compression, Decompress, FlushDecompress, Status};

use crate::application::ports::{CompressionError, Compressor};

/// Highest zlib compression level
pub const MAX_LEVEL: u32 = 9;

/// Spare output capacity kept available for each inflate call
const OUTPUT_RESERVE: usize = 32 * 1024;

/// zlib (RFC 1950) compressor.
///
/// Each member carries its own end marker and checksum, so members written
/// back to back can be split again without a length prefix.
#[derive(Debug, Clone, Copy)]
pub struct ZlibCompressor {
    level: u32,
}

impl ZlibCompressor {
    /// Create a compressor; levels above 9 are clamped
    pub fn new(level: u32) -> Self {
        Self {
            level: level.min(MAX_LEVEL),
        }
    }

    pub fn level(&self) -> u32 {
        self.level
    }
}

impl Default for ZlibCompressor {
    fn default() -> Self {
        Self::new(MAX_LEVEL)
    }
}

impl Compressor for ZlibCompressor {
    fn name(&self) -> &'static str {
        "zlib"
    }

    fn is_self_framing(&self) -> bool {
        true
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>, CompressionError> {
        let estimated_size = (data.len() / 2).max(64);
        let mut encoder = ZlibEncoder::new(
            Vec::with_capacity(estimated_size),
            Compression::new(self.level),
        );

        encoder.write_all(data)?;
        Ok(encoder.finish()?)
    }

    fn decompress_member(
        &self,
        input: &mut dyn BufRead,
        out: &mut Vec<u8>,
    ) -> Result<u64, CompressionError> {
        let mut inflater = Decompress::new(true);

        loop {
            let (status, read, wrote, eof) = {
                let available = input.fill_buf()?;
                let eof = available.is_empty();

                if out.capacity() - out.len() < OUTPUT_RESERVE {
                    out.reserve(OUTPUT_RESERVE);
                }

                let in_before = inflater.total_in();
                let out_before = inflater.total_out();
                let status = inflater
                    .decompress_vec(available, out, FlushDecompress::None)
                    .map_err(|e| CompressionError::Corrupt(e.to_string()))?;

                (
                    status,
                    (inflater.total_in() - in_before) as usize,
                    inflater.total_out() - out_before,
                    eof,
                )
            };
            input.consume(read);

            match status {
                Status::StreamEnd => return Ok(inflater.total_in()),
                Status::Ok | Status::BufError if read == 0 && wrote == 0 => {
                    if eof {
                        return Err(CompressionError::Truncated {
                            consumed: inflater.total_in(),
                        });
                    }
                    return Err(CompressionError::Corrupt(
                        "inflate made no progress".to_string(),
                    ));
                }
                Status::Ok | Status::BufError => {}
            }
        }
    }
}
