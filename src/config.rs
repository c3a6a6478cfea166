use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::dto::CodecSettings;
use crate::domain::value_objects::ChunkBits;
use crate::infrastructure::compression::{CompressionKind, MAX_LEVEL};

/// Environment variable prefix for every setting
pub const ENV_PREFIX: &str = "INFILENAME_";

/// Upper bound for `segment_size`
pub const MAX_SEGMENT_SIZE: usize = 1 << 30;

/// Widest index padding accepted (u64::MAX has 20 digits)
pub const MAX_INDEX_WIDTH: usize = 20;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Config file not found: {0:?}")]
    FileNotFound(PathBuf),

    #[error("Config file {path:?} is malformed: {reason}")]
    FileFormat { path: PathBuf, reason: String },
}

impl ConfigError {
    fn invalid(key: &str, value: impl fmt::Display, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            key: key.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{other}' (expected text or json)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub chunk_bits: u8,
    pub chunk_size: usize,
    pub segment_size: usize,
    pub compression: CompressionKind,
    pub compression_level: u32,
    pub index_width: usize,
    pub max_concurrent_writes: usize,
    pub durable_writes: bool,
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        let codec = CodecSettings::default();
        Self {
            chunk_bits: codec.chunk_bits.get(),
            chunk_size: codec.chunk_size,
            segment_size: codec.segment_size,
            compression: CompressionKind::default(),
            compression_level: MAX_LEVEL,
            index_width: codec.index_width,
            max_concurrent_writes: 32,
            durable_writes: false,
            log_format: LogFormat::default(),
        }
    }
}

impl Config {
    /// Defaults, then the optional TOML file, then the environment
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Read a TOML file; missing keys keep their defaults
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound(path.to_path_buf())
            } else {
                ConfigError::FileFormat {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                }
            }
        })?;

        toml::from_str(&raw).map_err(|e| ConfigError::FileFormat {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Override fields from `INFILENAME_*` variables resolved by `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            let key = format!("{ENV_PREFIX}{name}");
            lookup(&key).map(|value| (key, value))
        };

        if let Some((key, value)) = var("CHUNK_BITS") {
            self.chunk_bits = parse_env(&key, &value)?;
        }
        if let Some((key, value)) = var("CHUNK_SIZE") {
            self.chunk_size = parse_env(&key, &value)?;
        }
        if let Some((key, value)) = var("SEGMENT_SIZE") {
            self.segment_size = parse_env(&key, &value)?;
        }
        if let Some((key, value)) = var("COMPRESSION") {
            self.compression = parse_env(&key, &value)?;
        }
        if let Some((key, value)) = var("COMPRESSION_LEVEL") {
            self.compression_level = parse_env(&key, &value)?;
        }
        if let Some((key, value)) = var("INDEX_WIDTH") {
            self.index_width = parse_env(&key, &value)?;
        }
        if let Some((key, value)) = var("MAX_CONCURRENT_WRITES") {
            self.max_concurrent_writes = parse_env(&key, &value)?;
        }
        if let Some((key, value)) = var("DURABLE_WRITES") {
            self.durable_writes = parse_bool(&key, &value)?;
        }
        if let Some((key, value)) = var("LOG_FORMAT") {
            self.log_format = parse_env(&key, &value)?;
        }

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let chunk_bits = ChunkBits::new(self.chunk_bits)
            .map_err(|e| ConfigError::invalid("chunk_bits", self.chunk_bits, e.to_string()))?;

        if self.chunk_size < 1 {
            return Err(ConfigError::invalid(
                "chunk_size",
                self.chunk_size,
                "must be at least 1",
            ));
        }

        if self.segment_size < 1 || self.segment_size > MAX_SEGMENT_SIZE {
            return Err(ConfigError::invalid(
                "segment_size",
                self.segment_size,
                format!("must be between 1 and {MAX_SEGMENT_SIZE}"),
            ));
        }

        if self.compression_level > MAX_LEVEL {
            return Err(ConfigError::invalid(
                "compression_level",
                self.compression_level,
                format!("must be between 0 and {MAX_LEVEL}"),
            ));
        }

        if self.index_width < 1 || self.index_width > MAX_INDEX_WIDTH {
            return Err(ConfigError::invalid(
                "index_width",
                self.index_width,
                format!("must be between 1 and {MAX_INDEX_WIDTH}"),
            ));
        }

        if self.max_concurrent_writes < 1 {
            return Err(ConfigError::invalid(
                "max_concurrent_writes",
                self.max_concurrent_writes,
                "must be at least 1",
            ));
        }

        if self.compression == CompressionKind::None && !chunk_bits.divides_byte() {
            return Err(ConfigError::invalid(
                "compression",
                self.compression,
                format!("needs chunk_bits 1, 2, 4 or 8 (got {chunk_bits})"),
            ));
        }

        Ok(())
    }

    /// Codec parameters; call after `validate`
    pub fn codec_settings(&self) -> Result<CodecSettings, ConfigError> {
        let chunk_bits = ChunkBits::new(self.chunk_bits)
            .map_err(|e| ConfigError::invalid("chunk_bits", self.chunk_bits, e.to_string()))?;

        Ok(CodecSettings {
            chunk_bits,
            chunk_size: self.chunk_size,
            segment_size: self.segment_size,
            index_width: self.index_width,
        })
    }
}

fn parse_env<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::invalid(key, value, e.to_string()))
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::invalid(key, value, "expected true or false")),
    }
}
