mod artifact_name;
mod chunk_bits;

pub use artifact_name::{ArtifactName, DEFAULT_INDEX_WIDTH, SEPARATOR};
pub use chunk_bits::ChunkBits;
