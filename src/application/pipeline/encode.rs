use std::io::Read;
use std::sync::Arc;

use tracing::debug;

use crate::application::dto::CodecSettings;
use crate::application::errors::PipelineError;
use crate::application::ports::Compressor;
use crate::application::validation::validate_codec_settings;
use crate::domain::value_objects::ArtifactName;
use crate::domain::{Alphabet, BitPacker, Chunker, Segment, Segmenter, Segments};

/// Artifact names produced for one segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedSegment {
    pub ordinal: u64,
    pub input_len: usize,
    pub compressed_len: usize,
    pub symbols: usize,
    pub names: Vec<String>,
}

/// Pull-based encoder: segment, compress, pack, chunk.
///
/// Owns the running artifact index, so indices keep increasing across
/// segments. An empty input still produces one (empty) segment. Once the
/// iterator is exhausted, [`EncodePipeline::end_marker`] names the artifact
/// that closes the set.
pub struct EncodePipeline<R> {
    segments: Segments<R>,
    compressor: Arc<dyn Compressor>,
    alphabet: Arc<Alphabet>,
    chunk_size: usize,
    index_width: usize,
    next_index: u64,
    produced_any: bool,
    finished: bool,
}

impl<R: Read> EncodePipeline<R> {
    pub fn new(
        reader: R,
        settings: &CodecSettings,
        compressor: Arc<dyn Compressor>,
    ) -> Result<Self, PipelineError> {
        validate_codec_settings(settings, compressor.as_ref())?;

        Ok(Self {
            segments: Segmenter::split(reader, settings.segment_size)?,
            alphabet: Alphabet::build(settings.chunk_bits),
            compressor,
            chunk_size: settings.chunk_size,
            index_width: settings.index_width,
            next_index: 0,
            produced_any: false,
            finished: false,
        })
    }

    /// Index the next artifact will carry; equals the artifact count so far
    pub fn next_index(&self) -> u64 {
        self.next_index
    }

    /// End marker at the index after the last chunk. Create it only after
    /// every chunk artifact exists.
    pub fn end_marker(&self) -> String {
        ArtifactName::end_marker(self.next_index).format(self.index_width)
    }

    fn encode_segment(&mut self, segment: Segment) -> Result<EncodedSegment, PipelineError> {
        let compressed = self.compressor.compress(&segment.data)?;
        let text = BitPacker::encode(&compressed, &self.alphabet);

        let mut chunks = Chunker::split(&text, self.chunk_size, self.next_index)?;
        let names: Vec<String> = chunks
            .by_ref()
            .map(|chunk| chunk.to_artifact_name().format(self.index_width))
            .collect();
        self.next_index = chunks.next_index();

        debug!(
            ordinal = segment.ordinal,
            input_len = segment.len(),
            compressed_len = compressed.len(),
            artifacts = names.len(),
            "Encoded segment"
        );

        Ok(EncodedSegment {
            ordinal: segment.ordinal,
            input_len: segment.len(),
            compressed_len: compressed.len(),
            symbols: self.alphabet.chunk_bits().symbols_for(compressed.len()),
            names,
        })
    }
}

impl<R: Read> Iterator for EncodePipeline<R> {
    type Item = Result<EncodedSegment, PipelineError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let segment = match self.segments.next() {
            Some(Ok(segment)) => segment,
            Some(Err(e)) => {
                self.finished = true;
                return Some(Err(e.into()));
            }
            None if self.produced_any => {
                self.finished = true;
                return None;
            }
            None => Segment {
                ordinal: 0,
                data: Vec::new(),
            },
        };
        self.produced_any = true;

        let result = self.encode_segment(segment);
        if result.is_err() {
            self.finished = true;
        }
        Some(result)
    }
}
