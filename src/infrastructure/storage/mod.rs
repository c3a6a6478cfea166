mod in_memory_store;
mod local_filesystem_store;
mod path_builder;

pub use in_memory_store::InMemoryArtifactStore;
pub use local_filesystem_store::LocalFilesystemStore;
pub use path_builder::{MAX_NAME_BYTES, PathBuilder, validate_name};
