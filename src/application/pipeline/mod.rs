//! Synchronous encode/decode pipelines shared by the use cases

mod decode;
mod encode;

pub use decode::{DecodedSegment, SegmentDecoder};
pub use encode::{EncodePipeline, EncodedSegment};
