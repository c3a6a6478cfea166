//! # infilename - Files Stored in Artifact Names
//!
//! Reversibly turns an arbitrary file into a set of zero-length artifacts
//! whose names alone carry the data, and rebuilds the file from the names.
//!
//! ## Architecture Layers
//!
//! - **Domain**: the codec (alphabet, bit packing, segmenting, chunking)
//! - **Application**: encode/decode pipelines, use cases and ports
//! - **Infrastructure**: compression and artifact storage adapters
//!
//! ## Pipeline
//!
//! Input is cut into segments, each segment is compressed on its own,
//! repacked into a name-safe alphabet of `2^chunk_bits` symbols and sliced
//! into globally indexed chunks. Every chunk becomes one artifact named
//! `{index}_{payload}`, and an empty-payload end marker closes the set.
//! Decoding sorts the names numerically, insists on the marker, concatenates
//! the payloads and decompresses segment after segment.
//!
//! ## Example Usage
//!
//! ```no_run
//! use infilename::{Config, builder::ApplicationBuilder};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//! let app = ApplicationBuilder::new(Config::default())
//!     .with_local_store("artifacts".into())
//!     .await?
//!     .build()?;
//!
//! let input = std::fs::File::open("video.mp4")?;
//! let cancel = CancellationToken::new();
//! app.encode.execute(input, "video_mp4", &cancel).await?;
//! app.decode
//!     .execute("video_mp4", "video.mp4.restored".as_ref(), &cancel)
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

// Re-export key types explicitly to avoid ambiguity
pub use application::{builder, dto, errors as pipeline_errors, pipeline, ports, use_cases};
pub use config::{Config, ConfigError};
pub use domain::errors as domain_errors;
pub use domain::value_objects;
