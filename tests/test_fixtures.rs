//! Shared test fixtures and utilities for all test types
//!
//! This module provides common test setup patterns to reduce duplication
//! and make tests more maintainable.

#![allow(dead_code)]

use std::sync::Arc;

use futures_util::TryStreamExt;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tempfile::TempDir;

use infilename::application::builder::{Application, ApplicationBuilder};
use infilename::application::ports::ArtifactStore;
use infilename::config::Config;
use infilename::infrastructure::compression::CompressionKind;
use infilename::infrastructure::storage::{InMemoryArtifactStore, LocalFilesystemStore};

/// Test environment with a temporary artifact directory
pub struct TestEnvironment {
    pub dir: TempDir,
    pub store: Arc<LocalFilesystemStore>,
}

impl TestEnvironment {
    pub async fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp artifact dir");
        let store = LocalFilesystemStore::new(dir.path().join("artifacts"));
        store.init().await.expect("Failed to init storage");

        Self {
            dir,
            store: Arc::new(store),
        }
    }

    /// Use cases bound to this environment's store
    pub fn app(&self, config: Config) -> Application {
        let store: Arc<dyn ArtifactStore> = self.store.clone();
        ApplicationBuilder::new(config)
            .with_store(store)
            .build()
            .expect("Failed to build application")
    }

    /// Path for a decoded output file
    pub fn output_path(&self, name: &str) -> std::path::PathBuf {
        self.dir.path().join("decoded").join(name)
    }
}

/// Use cases over a fresh in-memory store
pub fn in_memory_app(config: Config) -> (Application, Arc<InMemoryArtifactStore>) {
    let store = Arc::new(InMemoryArtifactStore::new());
    let app = ApplicationBuilder::new(config)
        .with_store(store.clone())
        .build()
        .expect("Failed to build application");
    (app, store)
}

/// Configuration with the codec parameters that matter for a test
pub fn codec_config(
    chunk_bits: u8,
    chunk_size: usize,
    segment_size: usize,
    compression: CompressionKind,
) -> Config {
    Config {
        chunk_bits,
        chunk_size,
        segment_size,
        compression,
        ..Config::default()
    }
}

/// Deterministic pseudo-random bytes
pub fn random_bytes(len: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut data = vec![0u8; len];
    rng.fill_bytes(&mut data);
    data
}

/// Compressible bytes: repeated text with a counter mixed in
pub fn text_bytes(len: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(len + 64);
    let mut line = 0u64;
    while data.len() < len {
        data.extend_from_slice(format!("line {line}: the quick brown fox\n").as_bytes());
        line += 1;
    }
    data.truncate(len);
    data
}

/// Artifact names under `prefix`, sorted
pub async fn list_names(store: &dyn ArtifactStore, prefix: &str) -> Vec<String> {
    let mut names: Vec<String> = store
        .list_artifacts(prefix)
        .await
        .expect("Failed to list artifacts")
        .try_collect()
        .await
        .expect("Failed to read listing");
    names.sort();
    names
}
