use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures_util::TryStreamExt;
use sha2::{Digest, Sha256};
use tokio::fs::{self, File};
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::application::dto::{CodecSettings, DecodeSummary};
use crate::application::errors::PipelineError;
use crate::application::pipeline::{DecodedSegment, SegmentDecoder};
use crate::application::ports::{ArtifactStore, Compressor};
use crate::application::validation::{validate_framing, validate_prefix};
use crate::domain::{Alphabet, BitPacker, Reassembler};

/// Decoded segments buffered between the decoding thread and the writer
const SEGMENT_QUEUE_DEPTH: usize = 2;

/// Output buffer size
const WRITE_BUFFER_SIZE: usize = 256 * 1024;

/// Use case: rebuild a file from the artifacts under a prefix
pub struct DecodeFileUseCase {
    store: Arc<dyn ArtifactStore>,
    compressor: Arc<dyn Compressor>,
    settings: CodecSettings,
    durable_output: bool,
}

impl DecodeFileUseCase {
    pub fn new(
        store: Arc<dyn ArtifactStore>,
        compressor: Arc<dyn Compressor>,
        settings: CodecSettings,
    ) -> Self {
        Self {
            store,
            compressor,
            settings,
            durable_output: false,
        }
    }

    /// fsync the output file before it is renamed into place
    pub fn with_durable_output(mut self, durable: bool) -> Self {
        self.durable_output = durable;
        self
    }

    /// Decode the artifacts under `prefix` into `output`.
    ///
    /// The file only appears at `output` once every segment decoded; any
    /// failure leaves nothing behind.
    pub async fn execute(
        &self,
        prefix: &str,
        output: &Path,
        cancel: &CancellationToken,
    ) -> Result<DecodeSummary, PipelineError> {
        // 1. Validate inputs
        validate_prefix(prefix)?;
        validate_framing(&self.settings, self.compressor.as_ref())?;

        // 2. Discover the artifact set
        let names: Vec<String> = self
            .store
            .list_artifacts(prefix)
            .await?
            .try_collect()
            .await?;

        if names.is_empty() {
            return Err(PipelineError::NoArtifacts(prefix.to_string()));
        }
        debug!(prefix = %prefix, artifacts = names.len(), "Artifacts listed");

        let mut summary = DecodeSummary {
            prefix: prefix.to_string(),
            compression: self.compressor.name().to_string(),
            chunk_bits: self.settings.chunk_bits.get(),
            artifacts: names.len() as u64,
            ..DecodeSummary::default()
        };

        // 3. Reassemble and decode off the async runtime
        let (tx, rx) = mpsc::channel::<DecodedSegment>(SEGMENT_QUEUE_DEPTH);
        let chunk_bits = self.settings.chunk_bits;
        let compressor = Arc::clone(&self.compressor);
        let producer_cancel = cancel.clone();

        let producer = tokio::task::spawn_blocking(move || -> Result<(), PipelineError> {
            let text = Reassembler::combine_terminated(&names)?;
            let alphabet = Alphabet::build(chunk_bits);
            let symbols = BitPacker::symbols(&text, &alphabet)?;
            drop(text);

            for segment in SegmentDecoder::new(&symbols, chunk_bits, compressor.as_ref()) {
                if producer_cancel.is_cancelled() {
                    return Err(PipelineError::Cancelled);
                }
                if tx.blocking_send(segment?).is_err() {
                    break;
                }
            }
            Ok(())
        });

        // 4. Write to a temporary sibling, then move into place
        let temp_path = temp_sibling(output);
        let written = self
            .write_segments(rx, &temp_path, cancel, &mut summary)
            .await;
        let produced = producer
            .await
            .map_err(|e| PipelineError::Io(io::Error::other(e)));

        let outcome = match (written, produced) {
            (Ok(()), Ok(Ok(()))) => fs::rename(&temp_path, output)
                .await
                .map_err(PipelineError::from),
            (Err(e), _) | (_, Err(e)) | (_, Ok(Err(e))) => Err(e),
        };

        if let Err(e) = outcome {
            if let Err(cleanup) = fs::remove_file(&temp_path).await {
                if cleanup.kind() != io::ErrorKind::NotFound {
                    warn!(path = ?temp_path, error = %cleanup, "Failed to remove temporary output");
                }
            }
            return Err(e);
        }

        info!(
            prefix = %prefix,
            segments = summary.segments,
            output_bytes = summary.output_bytes,
            output = ?output,
            "Decode complete"
        );

        Ok(summary)
    }

    async fn write_segments(
        &self,
        mut rx: mpsc::Receiver<DecodedSegment>,
        temp_path: &Path,
        cancel: &CancellationToken,
        summary: &mut DecodeSummary,
    ) -> Result<(), PipelineError> {
        if let Some(parent) = temp_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let mut file = BufWriter::with_capacity(WRITE_BUFFER_SIZE, File::create(temp_path).await?);
        let mut hasher = Sha256::new();

        while let Some(segment) = rx.recv().await {
            if cancel.is_cancelled() {
                return Err(PipelineError::Cancelled);
            }

            hasher.update(&segment.data);
            file.write_all(&segment.data).await?;

            summary.segments += 1;
            summary.compressed_bytes += segment.compressed_len;
            summary.output_bytes += segment.data.len() as u64;

            info!(
                prefix = %summary.prefix,
                segment = segment.ordinal,
                output_len = segment.data.len(),
                "Segment decoded"
            );
        }

        file.flush().await?;
        if self.durable_output {
            file.get_mut().sync_all().await?;
        }

        summary.content_sha256 = hex::encode(hasher.finalize());
        Ok(())
    }
}

/// Hidden, uniquely named file next to `output`
fn temp_sibling(output: &Path) -> PathBuf {
    let file_name = output
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    output.with_file_name(format!(".{file_name}.{}.tmp", Uuid::new_v4()))
}
