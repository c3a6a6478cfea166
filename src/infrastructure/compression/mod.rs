mod passthrough_compressor;
mod zlib_compressor;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::application::ports::Compressor;

pub use passthrough_compressor::PassthroughCompressor;
pub use zlib_compressor::{MAX_LEVEL, ZlibCompressor};

/// Compression applied to each segment before bit packing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionKind {
    #[default]
    Zlib,
    None,
}

impl CompressionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompressionKind::Zlib => "zlib",
            CompressionKind::None => "none",
        }
    }

    /// Build the compressor for this kind; `level` only applies to zlib
    pub fn build(self, level: u32) -> Arc<dyn Compressor> {
        match self {
            CompressionKind::Zlib => Arc::new(ZlibCompressor::new(level)),
            CompressionKind::None => Arc::new(PassthroughCompressor),
        }
    }
}

impl fmt::Display for CompressionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompressionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "zlib" => Ok(CompressionKind::Zlib),
            "none" | "identity" => Ok(CompressionKind::None),
            other => Err(format!("unknown compression '{other}' (expected zlib or none)")),
        }
    }
}
