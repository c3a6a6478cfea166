use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use crate::application::ports::{ArtifactStore, Compressor, StorageError};
use crate::application::use_cases::{DecodeFileUseCase, EncodeFileUseCase};
use crate::config::Config;
use crate::infrastructure::storage::{InMemoryArtifactStore, LocalFilesystemStore};

/// Type alias for the build result
type BuildResult = Result<Application, Box<dyn std::error::Error + Send + Sync>>;

/// Wired use cases sharing one store and compressor
pub struct Application {
    pub encode: Arc<EncodeFileUseCase>,
    pub decode: Arc<DecodeFileUseCase>,
    pub store: Arc<dyn ArtifactStore>,
    pub compressor: Arc<dyn Compressor>,
    pub config: Config,
}

/// Application builder for clean dependency injection and setup
pub struct ApplicationBuilder {
    config: Config,
    store: Option<Arc<dyn ArtifactStore>>,
}

impl ApplicationBuilder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            store: None,
        }
    }

    /// Use an already constructed store
    pub fn with_store(mut self, store: Arc<dyn ArtifactStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Store artifacts as empty files below `root`
    pub async fn with_local_store(mut self, root: PathBuf) -> Result<Self, StorageError> {
        let store = LocalFilesystemStore::with_durability(root, self.config.durable_writes);
        store.init().await?;
        info!(root = ?store.root(), durable = self.config.durable_writes, "Local store ready");
        self.store = Some(Arc::new(store));
        Ok(self)
    }

    /// Keep artifacts in process memory
    pub fn with_in_memory_store(mut self) -> Self {
        self.store = Some(Arc::new(InMemoryArtifactStore::new()));
        self
    }

    /// Validate configuration and build the use cases
    pub fn build(self) -> BuildResult {
        self.config.validate()?;
        let settings = self.config.codec_settings()?;
        let store = self.store.ok_or("Artifact store not initialized")?;
        let compressor = self
            .config
            .compression
            .build(self.config.compression_level);

        let encode = Arc::new(EncodeFileUseCase::new(
            Arc::clone(&store),
            Arc::clone(&compressor),
            settings,
            self.config.max_concurrent_writes,
        ));

        let decode = Arc::new(
            DecodeFileUseCase::new(Arc::clone(&store), Arc::clone(&compressor), settings)
                .with_durable_output(self.config.durable_writes),
        );

        info!(
            chunk_bits = self.config.chunk_bits,
            chunk_size = self.config.chunk_size,
            segment_size = self.config.segment_size,
            compression = %self.config.compression,
            "Application layer initialized"
        );

        Ok(Application {
            encode,
            decode,
            store,
            compressor,
            config: self.config,
        })
    }

    /// Get configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::compression::CompressionKind;

    #[test]
    fn test_build_requires_store() {
        let result = ApplicationBuilder::new(Config::default()).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_build_rejects_invalid_config() {
        let config = Config {
            compression: CompressionKind::None,
            ..Config::default()
        };
        let result = ApplicationBuilder::new(config).with_in_memory_store().build();
        assert!(result.is_err());
    }

    #[test]
    fn test_build_uses_configured_compressor() {
        let config = Config {
            chunk_bits: 8,
            compression: CompressionKind::None,
            ..Config::default()
        };
        let app = ApplicationBuilder::new(config)
            .with_in_memory_store()
            .build()
            .unwrap();
        assert_eq!(app.compressor.name(), "none");
    }
}
