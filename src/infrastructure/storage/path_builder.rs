use std::path::{Path, PathBuf};

use crate::application::ports::StorageError;

/// Longest file name most local filesystems accept, in bytes
pub const MAX_NAME_BYTES: usize = 255;

/// Utility for generating artifact paths under a store root
pub struct PathBuilder {
    root: PathBuf,
}

impl PathBuilder {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the artifacts of `prefix`: {root}/{prefix}
    pub fn prefix_dir(&self, prefix: &str) -> PathBuf {
        let prefix = prefix.trim_matches('/');
        if prefix.is_empty() {
            self.root.clone()
        } else {
            self.root.join(prefix)
        }
    }

    /// Path of one artifact: {root}/{prefix}/{name}
    pub fn artifact_path(&self, prefix: &str, name: &str) -> Result<PathBuf, StorageError> {
        validate_name(name)?;
        Ok(self.prefix_dir(prefix).join(name))
    }
}

/// Reject names a single directory entry cannot hold
pub fn validate_name(name: &str) -> Result<(), StorageError> {
    if name.is_empty() {
        return Err(StorageError::InvalidName("name is empty".to_string()));
    }
    if name.contains(['/', '\0']) {
        return Err(StorageError::InvalidName(format!(
            "{name:?} contains a path separator or NUL"
        )));
    }
    if name == "." || name == ".." {
        return Err(StorageError::InvalidName(format!("{name:?} is reserved")));
    }
    if name.len() > MAX_NAME_BYTES {
        return Err(StorageError::InvalidName(format!(
            "name is {} bytes, limit is {MAX_NAME_BYTES}",
            name.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_path() {
        let builder = PathBuilder::new(PathBuf::from("/store"));
        assert_eq!(
            builder.artifact_path("movie", "00000000_abc").unwrap(),
            PathBuf::from("/store/movie/00000000_abc")
        );
        assert_eq!(
            builder.artifact_path("", "00000000_abc").unwrap(),
            PathBuf::from("/store/00000000_abc")
        );
    }

    #[test]
    fn test_rejects_bad_names() {
        assert!(validate_name("").is_err());
        assert!(validate_name("a/b").is_err());
        assert!(validate_name("nul\0").is_err());
        assert!(validate_name("..").is_err());
        assert!(validate_name(&"x".repeat(MAX_NAME_BYTES + 1)).is_err());
        assert!(validate_name(&"x".repeat(MAX_NAME_BYTES)).is_ok());
        // Multi-byte symbols count in bytes, not characters
        assert!(validate_name(&"\u{4e00}".repeat(86)).is_err());
    }
}
