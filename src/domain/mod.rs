pub mod alphabet;
pub mod bit_packer;
pub mod chunker;
pub mod errors;
pub mod segmenter;
pub mod value_objects;

pub use alphabet::Alphabet;
pub use bit_packer::{BitPacker, SymbolReader};
pub use chunker::{Chunk, ChunkIter, Chunker, Reassembler};
pub use segmenter::{Segment, Segmenter, Segments};
