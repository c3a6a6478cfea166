use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{ChunkBits, DEFAULT_INDEX_WIDTH};

/// Codec parameters shared by encode and decode.
///
/// `chunk_bits` must be identical on both sides; nothing in the artifact
/// names records it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecSettings {
    pub chunk_bits: ChunkBits,
    /// Maximum symbols per artifact name payload
    pub chunk_size: usize,
    /// Maximum input bytes per independently compressed segment
    pub segment_size: usize,
    /// Zero-padding width of artifact indices
    pub index_width: usize,
}

impl Default for CodecSettings {
    fn default() -> Self {
        Self {
            chunk_bits: ChunkBits::default(),
            chunk_size: 80,
            segment_size: 300_000,
            index_width: DEFAULT_INDEX_WIDTH,
        }
    }
}

/// Outcome of encoding one file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodeSummary {
    pub prefix: String,
    pub compression: String,
    pub chunk_bits: u8,
    pub segments: u64,
    pub artifacts: u64,
    pub input_bytes: u64,
    pub compressed_bytes: u64,
    pub symbols: u64,
    /// SHA-256 of the original input, hex encoded
    pub content_sha256: String,
}

/// Outcome of decoding one artifact set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeSummary {
    pub prefix: String,
    pub compression: String,
    pub chunk_bits: u8,
    pub segments: u64,
    pub artifacts: u64,
    pub compressed_bytes: u64,
    pub output_bytes: u64,
    /// SHA-256 of the decoded output, hex encoded
    pub content_sha256: String,
}
