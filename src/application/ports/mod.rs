mod artifact_store;
mod compressor;

pub use artifact_store::{ArtifactStore, ArtifactStream, StorageError};
pub use compressor::{CompressionError, Compressor};

#[cfg(test)]
pub use artifact_store::MockArtifactStore;
