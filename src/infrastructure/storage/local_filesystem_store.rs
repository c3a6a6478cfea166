use async_trait::async_trait;
use futures_util::stream;
use parking_lot::RwLock;
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File, OpenOptions};
use tracing::{debug, warn};

use crate::application::ports::{ArtifactStore, ArtifactStream, StorageError};
use crate::infrastructure::storage::PathBuilder;

/// Local filesystem artifact store.
///
/// Each prefix is a directory below the root and each artifact an empty
/// regular file in it.
pub struct LocalFilesystemStore {
    path_builder: PathBuilder,
    durable_writes: bool,
    // Directories known to exist, so creation skips the mkdir
    created_dirs: RwLock<HashSet<PathBuf>>,
}

impl LocalFilesystemStore {
    pub fn new(root: PathBuf) -> Self {
        Self::with_durability(root, false)
    }

    pub fn with_durability(root: PathBuf, durable_writes: bool) -> Self {
        Self {
            path_builder: PathBuilder::new(root),
            durable_writes,
            created_dirs: RwLock::new(HashSet::new()),
        }
    }

    pub fn root(&self) -> &Path {
        self.path_builder.root()
    }

    /// Create the root directory
    pub async fn init(&self) -> Result<(), StorageError> {
        fs::create_dir_all(self.path_builder.root()).await?;
        self.created_dirs
            .write()
            .insert(self.path_builder.root().to_path_buf());
        Ok(())
    }

    async fn ensure_dir(&self, dir: &Path) -> Result<(), StorageError> {
        if self.created_dirs.read().contains(dir) {
            return Ok(());
        }

        // Idempotent; racing creators are fine
        fs::create_dir_all(dir).await?;
        self.created_dirs.write().insert(dir.to_path_buf());
        Ok(())
    }

    async fn sync_dir(dir: &Path) {
        match File::open(dir).await {
            Ok(handle) => {
                if let Err(e) = handle.sync_all().await {
                    warn!("Failed to sync directory {:?}: {}", dir, e);
                }
            }
            Err(e) => warn!("Failed to open directory {:?} for sync: {}", dir, e),
        }
    }
}

#[async_trait]
impl ArtifactStore for LocalFilesystemStore {
    async fn create_artifact(&self, prefix: &str, name: &str) -> Result<(), StorageError> {
        let path = self.path_builder.artifact_path(prefix, name)?;
        self.ensure_dir(&self.path_builder.prefix_dir(prefix)).await?;

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .await?;

        if self.durable_writes {
            file.sync_all().await?;
        }

        debug!("Artifact created: {:?}", path);
        Ok(())
    }

    async fn list_artifacts(&self, prefix: &str) -> Result<ArtifactStream, StorageError> {
        let dir = self.path_builder.prefix_dir(prefix);

        let read_dir = fs::read_dir(&dir).await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                StorageError::NotFound(dir.display().to_string())
            } else {
                StorageError::Io(e)
            }
        })?;

        let entries = stream::unfold(Some(read_dir), |state| async move {
            let mut read_dir = state?;
            loop {
                let entry = match read_dir.next_entry().await {
                    Ok(Some(entry)) => entry,
                    Ok(None) => return None,
                    Err(e) => return Some((Err(StorageError::Io(e)), None)),
                };

                match entry.file_type().await {
                    Ok(file_type) if file_type.is_dir() => continue,
                    Ok(_) => {}
                    Err(e) => return Some((Err(StorageError::Io(e)), None)),
                }

                let name = entry.file_name().into_string().map_err(|raw| {
                    StorageError::InvalidName(format!("{raw:?} is not valid UTF-8"))
                });
                return Some((name, Some(read_dir)));
            }
        });

        Ok(Box::pin(entries))
    }

    async fn flush(&self, prefix: &str) -> Result<(), StorageError> {
        if self.durable_writes {
            Self::sync_dir(&self.path_builder.prefix_dir(prefix)).await;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::TryStreamExt;
    use tempfile::TempDir;

    async fn list_sorted(store: &LocalFilesystemStore, prefix: &str) -> Vec<String> {
        let mut names: Vec<String> = store
            .list_artifacts(prefix)
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_init_creates_root() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("nested").join("root");

        let store = LocalFilesystemStore::new(root.clone());
        store.init().await.unwrap();

        assert!(root.is_dir());
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let dir = TempDir::new().unwrap();
        let store = LocalFilesystemStore::new(dir.path().to_path_buf());

        store.create_artifact("movie", "00000001_b").await.unwrap();
        store.create_artifact("movie", "00000000_a").await.unwrap();

        assert_eq!(
            list_sorted(&store, "movie").await,
            vec!["00000000_a".to_string(), "00000001_b".to_string()]
        );

        let metadata = std::fs::metadata(dir.path().join("movie").join("00000000_a")).unwrap();
        assert_eq!(metadata.len(), 0);
    }

    #[tokio::test]
    async fn test_create_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = LocalFilesystemStore::with_durability(dir.path().to_path_buf(), true);

        store.create_artifact("", "00000000_x").await.unwrap();
        store.create_artifact("", "00000000_x").await.unwrap();
        store.flush("").await.unwrap();

        assert_eq!(list_sorted(&store, "").await, vec!["00000000_x".to_string()]);
    }

    #[tokio::test]
    async fn test_listing_skips_directories() {
        let dir = TempDir::new().unwrap();
        let store = LocalFilesystemStore::new(dir.path().to_path_buf());

        store.create_artifact("", "00000000_top").await.unwrap();
        store.create_artifact("sub", "00000000_inner").await.unwrap();

        assert_eq!(list_sorted(&store, "").await, vec!["00000000_top".to_string()]);
    }

    #[tokio::test]
    async fn test_missing_prefix_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = LocalFilesystemStore::new(dir.path().to_path_buf());

        let result = store.list_artifacts("absent").await;
        assert!(matches!(result.err(), Some(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_rejects_unrepresentable_name() {
        let dir = TempDir::new().unwrap();
        let store = LocalFilesystemStore::new(dir.path().to_path_buf());

        let err = store
            .create_artifact("", &format!("00000000_{}", "y".repeat(300)))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidName(_)));
    }
}
