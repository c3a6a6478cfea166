use async_trait::async_trait;
use dashmap::DashMap;
use futures_util::stream;
use std::collections::BTreeSet;

use crate::application::ports::{ArtifactStore, ArtifactStream, StorageError};
use crate::infrastructure::storage::path_builder::validate_name;

/// Process-local artifact store keyed by prefix
#[derive(Default)]
pub struct InMemoryArtifactStore {
    prefixes: DashMap<String, BTreeSet<String>>,
}

impl InMemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of artifacts under `prefix`
    pub fn len(&self, prefix: &str) -> usize {
        self.prefixes.get(prefix).map_or(0, |names| names.len())
    }

    pub fn is_empty(&self, prefix: &str) -> bool {
        self.len(prefix) == 0
    }

    /// Remove one artifact, returning whether it existed
    pub fn remove(&self, prefix: &str, name: &str) -> bool {
        self.prefixes
            .get_mut(prefix)
            .is_some_and(|mut names| names.remove(name))
    }

    /// Add an artifact without name validation
    pub fn insert_raw(&self, prefix: &str, name: impl Into<String>) {
        self.prefixes
            .entry(prefix.to_string())
            .or_default()
            .insert(name.into());
    }

    /// Snapshot of the names under `prefix`, in byte order
    pub fn names(&self, prefix: &str) -> Vec<String> {
        self.prefixes
            .get(prefix)
            .map(|names| names.iter().cloned().collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ArtifactStore for InMemoryArtifactStore {
    async fn create_artifact(&self, prefix: &str, name: &str) -> Result<(), StorageError> {
        validate_name(name)?;
        self.insert_raw(prefix, name);
        Ok(())
    }

    async fn list_artifacts(&self, prefix: &str) -> Result<ArtifactStream, StorageError> {
        let names = self.names(prefix);
        Ok(Box::pin(stream::iter(names.into_iter().map(Ok))))
    }
}
