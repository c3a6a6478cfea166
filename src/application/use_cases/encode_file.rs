use std::io::{self, Read};
use std::sync::Arc;

use futures_util::stream::{self, StreamExt, TryStreamExt};
use sha2::{Digest, Sha256};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::application::dto::{CodecSettings, EncodeSummary};
use crate::application::errors::PipelineError;
use crate::application::pipeline::{EncodePipeline, EncodedSegment};
use crate::application::ports::{ArtifactStore, Compressor, StorageError};
use crate::application::validation::{validate_codec_settings, validate_prefix};

/// Encoded segments buffered between the compressing thread and the writers
const SEGMENT_QUEUE_DEPTH: usize = 2;

/// Read adapter that hashes everything passing through it
struct HashingReader<R> {
    inner: R,
    hasher: Sha256,
    bytes: u64,
}

impl<R: Read> HashingReader<R> {
    fn new(inner: R) -> Self {
        Self {
            inner,
            hasher: Sha256::new(),
            bytes: 0,
        }
    }

    fn finish(self) -> (String, u64) {
        (hex::encode(self.hasher.finalize()), self.bytes)
    }
}

impl<R: Read> Read for HashingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.hasher.update(&buf[..n]);
        self.bytes += n as u64;
        Ok(n)
    }
}

/// What the compressing thread hands back once the input is exhausted
struct ProducerOutcome {
    end_marker: String,
    content_sha256: String,
    input_bytes: u64,
}

/// Use case: encode a byte stream into artifact names under a prefix
pub struct EncodeFileUseCase {
    store: Arc<dyn ArtifactStore>,
    compressor: Arc<dyn Compressor>,
    settings: CodecSettings,
    max_concurrent_writes: usize,
}

impl EncodeFileUseCase {
    pub fn new(
        store: Arc<dyn ArtifactStore>,
        compressor: Arc<dyn Compressor>,
        settings: CodecSettings,
        max_concurrent_writes: usize,
    ) -> Self {
        Self {
            store,
            compressor,
            settings,
            max_concurrent_writes: max_concurrent_writes.max(1),
        }
    }

    /// Encode `reader` and create one artifact per chunk under `prefix`.
    ///
    /// Compression runs on the blocking pool while artifacts of the previous
    /// segment are still being created.
    pub async fn execute<R>(
        &self,
        reader: R,
        prefix: &str,
        cancel: &CancellationToken,
    ) -> Result<EncodeSummary, PipelineError>
    where
        R: Read + Send + 'static,
    {
        // 1. Validate inputs before touching the store
        validate_prefix(prefix)?;
        validate_codec_settings(&self.settings, self.compressor.as_ref())?;

        // 2. Produce encoded segments off the async runtime
        let (tx, mut rx) = mpsc::channel::<EncodedSegment>(SEGMENT_QUEUE_DEPTH);
        let settings = self.settings;
        let compressor = Arc::clone(&self.compressor);
        let producer_cancel = cancel.clone();

        let producer = tokio::task::spawn_blocking(move || -> Result<ProducerOutcome, PipelineError> {
            let mut input = HashingReader::new(reader);
            let mut pipeline = EncodePipeline::new(&mut input, &settings, compressor)?;

            for segment in pipeline.by_ref() {
                if producer_cancel.is_cancelled() {
                    return Err(PipelineError::Cancelled);
                }
                if tx.blocking_send(segment?).is_err() {
                    // Consumer gave up; its error is reported instead
                    break;
                }
            }

            let end_marker = pipeline.end_marker();
            drop(pipeline);
            let (content_sha256, input_bytes) = input.finish();
            Ok(ProducerOutcome {
                end_marker,
                content_sha256,
                input_bytes,
            })
        });

        // 3. Create artifacts segment by segment
        let mut summary = EncodeSummary {
            prefix: prefix.to_string(),
            compression: self.compressor.name().to_string(),
            chunk_bits: self.settings.chunk_bits.get(),
            ..EncodeSummary::default()
        };

        while let Some(segment) = rx.recv().await {
            if cancel.is_cancelled() {
                return Err(PipelineError::Cancelled);
            }

            self.create_artifacts(prefix, &segment.names).await?;

            summary.segments += 1;
            summary.artifacts += segment.names.len() as u64;
            summary.compressed_bytes += segment.compressed_len as u64;
            summary.symbols += segment.symbols as u64;

            info!(
                prefix = %prefix,
                segment = segment.ordinal,
                input_len = segment.input_len,
                artifacts = segment.names.len(),
                "Segment stored"
            );
        }

        // 4. Collect the producer's outcome
        let outcome = producer
            .await
            .map_err(|e| PipelineError::Io(io::Error::other(e)))??;
        summary.content_sha256 = outcome.content_sha256;
        summary.input_bytes = outcome.input_bytes;

        // 5. Close the set; an interrupted encode never has a marker
        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }
        self.store.create_artifact(prefix, &outcome.end_marker).await?;
        summary.artifacts += 1;
        debug!(prefix = %prefix, name = %outcome.end_marker, "End marker created");

        // 6. Persist
        self.store.flush(prefix).await?;

        info!(
            prefix = %prefix,
            segments = summary.segments,
            artifacts = summary.artifacts,
            input_bytes = summary.input_bytes,
            "Encode complete"
        );

        Ok(summary)
    }

    async fn create_artifacts(&self, prefix: &str, names: &[String]) -> Result<(), StorageError> {
        stream::iter(names)
            .map(|name| async move {
                self.store.create_artifact(prefix, name).await?;
                debug!(prefix = %prefix, name = %name, "Artifact created");
                Ok::<_, StorageError>(())
            })
            .buffer_unordered(self.max_concurrent_writes)
            .try_collect::<Vec<()>>()
            .await?;
        Ok(())
    }
}
