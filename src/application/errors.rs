//! Error type shared by the encode and decode pipelines

use thiserror::Error;

use crate::application::ports::{CompressionError, StorageError};
use crate::domain::errors::CodecError;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Compression error: {0}")]
    Compression(#[from] CompressionError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No artifacts found under {0:?}")]
    NoArtifacts(String),

    #[error("Unsupported combination: {0}")]
    UnsupportedCombination(String),

    #[error("Invalid artifact prefix {0:?}: must be a relative path without '..' or NUL")]
    InvalidPrefix(String),

    #[error("Operation cancelled")]
    Cancelled,
}

impl PipelineError {
    /// True when the artifact set itself is damaged or incomplete, as opposed
    /// to an environment failure
    pub fn is_corrupt_input(&self) -> bool {
        matches!(
            self,
            PipelineError::Codec(_)
                | PipelineError::Compression(_)
                | PipelineError::NoArtifacts(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_error_from_codec_error() {
        let err: PipelineError = CodecError::MissingIndex(3).into();
        assert!(matches!(err, PipelineError::Codec(_)));
        assert!(err.to_string().contains("Missing artifact index: 3"));
        assert!(err.is_corrupt_input());
    }

    #[test]
    fn test_pipeline_error_from_storage_error() {
        let err: PipelineError = StorageError::Backend("quota exceeded".to_string()).into();
        assert!(matches!(err, PipelineError::Storage(_)));
        assert!(err.to_string().contains("quota exceeded"));
        assert!(!err.is_corrupt_input());
    }

    #[test]
    fn test_pipeline_error_from_compression_error() {
        let err: PipelineError = CompressionError::Truncated { consumed: 12 }.into();
        assert!(err.to_string().contains("truncated after 12"));
        assert!(err.is_corrupt_input());
    }

    #[test]
    fn test_pipeline_error_display_names_the_problem() {
        let err = PipelineError::NoArtifacts("out/video_mp4".to_string());
        assert!(err.to_string().contains("No artifacts found"));
        assert_eq!(PipelineError::Cancelled.to_string(), "Operation cancelled");

        let err = PipelineError::InvalidPrefix("../up".to_string());
        assert!(err.to_string().contains("Invalid artifact prefix \"../up\""));
        assert!(!err.is_corrupt_input());
    }
}
