//! Checks shared by the encode and decode use cases

use crate::application::dto::CodecSettings;
use crate::application::errors::PipelineError;
use crate::application::ports::Compressor;
use crate::domain::errors::CodecError;

/// Validate codec settings against the compressor that will frame segments
pub fn validate_codec_settings(
    settings: &CodecSettings,
    compressor: &dyn Compressor,
) -> Result<(), PipelineError> {
    if settings.chunk_size == 0 {
        return Err(CodecError::InvalidChunkSize(settings.chunk_size).into());
    }

    if settings.segment_size == 0 {
        return Err(CodecError::InvalidSegmentSize(settings.segment_size).into());
    }

    validate_framing(settings, compressor)
}

/// A compressor that cannot find member boundaries only works when symbols
/// never pad a segment, otherwise padding would land between segments.
pub fn validate_framing(
    settings: &CodecSettings,
    compressor: &dyn Compressor,
) -> Result<(), PipelineError> {
    if !compressor.is_self_framing() && !settings.chunk_bits.divides_byte() {
        return Err(PipelineError::UnsupportedCombination(format!(
            "compression '{}' is not self-framing and needs chunk bits 1, 2, 4 or 8 (got {})",
            compressor.name(),
            settings.chunk_bits
        )));
    }
    Ok(())
}

/// Validate an artifact prefix: relative, no parent traversal, no NUL
pub fn validate_prefix(prefix: &str) -> Result<(), PipelineError> {
    let invalid = prefix.contains('\0')
        || prefix.starts_with('/')
        || prefix.split(['/', '\\']).any(|part| part == "..");

    if invalid {
        return Err(PipelineError::InvalidPrefix(prefix.to_string()));
    }
    Ok(())
}
