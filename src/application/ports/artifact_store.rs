use async_trait::async_trait;
use futures_util::Stream;
#[cfg(test)]
use mockall::automock;
use std::pin::Pin;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid artifact name: {0}")]
    InvalidName(String),

    #[error("Artifact location not found: {0}")]
    NotFound(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Type alias for a lazy, unordered listing of artifact names
pub type ArtifactStream = Pin<Box<dyn Stream<Item = Result<String, StorageError>> + Send>>;

/// Port for zero-length artifact storage.
///
/// `prefix` scopes a set of sibling artifacts: a directory relative to the
/// store root, or a blob name prefix. An empty prefix means the root.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Create an empty artifact. Creating an existing name again succeeds.
    async fn create_artifact(&self, prefix: &str, name: &str) -> Result<(), StorageError>;

    /// List artifact names under `prefix`, in no particular order
    async fn list_artifacts(&self, prefix: &str) -> Result<ArtifactStream, StorageError>;

    /// Make earlier creations under `prefix` durable
    async fn flush(&self, _prefix: &str) -> Result<(), StorageError> {
        Ok(())
    }
}
