use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use infilename::application::builder::{Application, ApplicationBuilder};
use infilename::config::{Config, LogFormat};
use infilename::infrastructure::compression::CompressionKind;

/// Store a file in the names of empty artifacts, and get it back
#[derive(Debug, Parser)]
#[command(name = "infilename", version, about)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log output format: text or json
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,

    /// Print the run summary as JSON on stdout
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Encode a file into artifacts under a directory
    Encode {
        input_file: PathBuf,
        output_dir: PathBuf,
        /// Subdirectory of the output directory holding the artifacts
        #[arg(long, default_value = "")]
        prefix: String,
        #[command(flatten)]
        codec: CodecArgs,
    },
    /// Rebuild a file from the artifacts in a directory
    Decode {
        input_dir: PathBuf,
        output_file: PathBuf,
        #[arg(long, default_value = "")]
        prefix: String,
        #[command(flatten)]
        codec: CodecArgs,
    },
    /// Encode into memory, decode back and compare digests
    Roundtrip {
        input_file: PathBuf,
        output_file: PathBuf,
        #[command(flatten)]
        codec: CodecArgs,
    },
}

#[derive(Debug, Args)]
struct CodecArgs {
    /// Maximum symbols per artifact name
    #[arg(long, alias = "chunk_size")]
    chunk_size: Option<usize>,

    /// Maximum input bytes per compressed segment
    #[arg(long, alias = "segment_size")]
    segment_size: Option<usize>,

    /// Bits carried by each symbol (1-16)
    #[arg(long, alias = "chunk_bits")]
    chunk_bits: Option<u8>,

    /// Segment compression: zlib or none
    #[arg(long)]
    compression: Option<CompressionKind>,

    /// zlib compression level (0-9)
    #[arg(long)]
    level: Option<u32>,

    /// Zero-padded width of artifact indices
    #[arg(long, alias = "index_width")]
    index_width: Option<usize>,

    /// Maximum artifacts created at once
    #[arg(long)]
    max_concurrent_writes: Option<usize>,

    /// fsync artifacts, directories and output files
    #[arg(long)]
    durable: bool,
}

impl CodecArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(chunk_size) = self.chunk_size {
            config.chunk_size = chunk_size;
        }
        if let Some(segment_size) = self.segment_size {
            config.segment_size = segment_size;
        }
        if let Some(chunk_bits) = self.chunk_bits {
            config.chunk_bits = chunk_bits;
        }
        if let Some(compression) = self.compression {
            config.compression = compression;
        }
        if let Some(level) = self.level {
            config.compression_level = level;
        }
        if let Some(index_width) = self.index_width {
            config.index_width = index_width;
        }
        if let Some(max) = self.max_concurrent_writes {
            config.max_concurrent_writes = max;
        }
        if self.durable {
            config.durable_writes = true;
        }
    }
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

fn open_input(path: &Path) -> anyhow::Result<File> {
    File::open(path).with_context(|| format!("Failed to open input file {}", path.display()))
}

fn report<T: Serialize>(json: bool, summary: &T, line: String) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
    } else {
        println!("{line}");
    }
    Ok(())
}

/// Cancel the token on Ctrl-C
fn cancel_on_interrupt() -> CancellationToken {
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling");
            token.cancel();
        }
    });
    cancel
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Layering: defaults, file, environment, flags
    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    let codec = match &cli.command {
        Command::Encode { codec, .. }
        | Command::Decode { codec, .. }
        | Command::Roundtrip { codec, .. } => codec,
    };
    codec.apply(&mut config);
    config.validate().context("Invalid configuration")?;

    init_tracing(config.log_format);
    let cancel = cancel_on_interrupt();

    match cli.command {
        Command::Encode {
            input_file,
            output_dir,
            prefix,
            ..
        } => {
            let input = open_input(&input_file)?;
            let app = build_local(config, output_dir.clone()).await?;

            info!(input = ?input_file, output = ?output_dir, "Encoding");
            let summary = app
                .encode
                .execute(input, &prefix, &cancel)
                .await
                .with_context(|| format!("Failed to encode {}", input_file.display()))?;

            report(
                cli.json,
                &summary,
                format!(
                    "Encoded {} bytes into {} artifacts ({} segments) in {}",
                    summary.input_bytes,
                    summary.artifacts,
                    summary.segments,
                    output_dir.join(&prefix).display()
                ),
            )?;
        }
        Command::Decode {
            input_dir,
            output_file,
            prefix,
            ..
        } => {
            if !input_dir.is_dir() {
                bail!("Input directory {} does not exist", input_dir.display());
            }
            let app = build_local(config, input_dir.clone()).await?;

            info!(input = ?input_dir, output = ?output_file, "Decoding");
            let summary = match app.decode.execute(&prefix, &output_file, &cancel).await {
                Ok(summary) => summary,
                Err(e) => {
                    if e.is_corrupt_input() {
                        error!(prefix = %prefix, error = %e, "Artifact set is damaged or incomplete");
                    }
                    return Err(anyhow::Error::new(e)
                        .context(format!("Failed to decode {}", input_dir.join(&prefix).display())));
                }
            };

            report(
                cli.json,
                &summary,
                format!(
                    "Decoded {} artifacts into {} bytes at {}",
                    summary.artifacts,
                    summary.output_bytes,
                    output_file.display()
                ),
            )?;
        }
        Command::Roundtrip {
            input_file,
            output_file,
            ..
        } => {
            let input = open_input(&input_file)?;
            let app = ApplicationBuilder::new(config)
                .with_in_memory_store()
                .build()
                .map_err(|e| anyhow::anyhow!(e))
                .context("Failed to initialize application")?;

            let prefix = "roundtrip";
            let encoded = app
                .encode
                .execute(input, prefix, &cancel)
                .await
                .context("Encode step failed")?;
            let decoded = app
                .decode
                .execute(prefix, &output_file, &cancel)
                .await
                .context("Decode step failed")?;

            if encoded.content_sha256 != decoded.content_sha256 {
                bail!(
                    "Round trip mismatch: input sha256 {} but output sha256 {}",
                    encoded.content_sha256,
                    decoded.content_sha256
                );
            }

            report(
                cli.json,
                &serde_json::json!({ "encode": encoded, "decode": decoded }),
                format!(
                    "Round trip OK: {} bytes through {} artifacts, sha256 {}",
                    encoded.input_bytes, encoded.artifacts, encoded.content_sha256
                ),
            )?;
        }
    }

    Ok(())
}

async fn build_local(config: Config, root: PathBuf) -> anyhow::Result<Application> {
    ApplicationBuilder::new(config)
        .with_local_store(root)
        .await
        .context("Failed to initialize artifact store")?
        .build()
        .map_err(|e| anyhow::anyhow!(e))
        .context("Failed to initialize application")
}
