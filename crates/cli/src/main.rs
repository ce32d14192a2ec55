//! blobferry command-line entry point.

mod console;
mod scan;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use blobferry_engine::{AzCopyEngine, Direction, Location, METADATA_EXCLUDES};
use blobferry_transfer::{TransferError, TransferManager, UploadRequest};
use clap::{Args, Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use crate::console::{ConsoleLog, ConsoleNotifications, ConsolePrompt};

#[derive(Parser)]
#[command(
    name = "blobferry",
    version,
    about = "Bulk uploads to blob containers and file shares via the AzCopy engine"
)]
struct Cli {
    /// Path to the AzCopy engine binary.
    #[arg(long, env = "BLOBFERRY_ENGINE", default_value = "azcopy", global = true)]
    engine: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Upload a file or directory to a blob container.
    UploadBlob(UploadArgs),
    /// Upload a file or directory to a file share.
    UploadShare(UploadArgs),
}

#[derive(Args)]
struct UploadArgs {
    /// Local file or directory to upload.
    source: PathBuf,

    /// URI of the destination container or share.
    #[arg(long)]
    resource: String,

    /// Short-lived authorization token appended to requests.
    #[arg(long, env = "BLOBFERRY_TOKEN", hide_env_values = true)]
    token: String,

    /// Destination path inside the resource (defaults to the source name).
    #[arg(long)]
    dest_path: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::UploadBlob(args) => run_upload(cli.engine, args, Direction::LocalToBlob).await,
        Command::UploadShare(args) => {
            run_upload(cli.engine, args, Direction::LocalToFileShare).await
        }
    }
}

async fn run_upload(
    engine_path: PathBuf,
    args: UploadArgs,
    direction: Direction,
) -> anyhow::Result<()> {
    let metadata = std::fs::metadata(&args.source)
        .with_context(|| format!("cannot read source {}", args.source.display()))?;
    let source_abs = std::fs::canonicalize(&args.source)
        .with_context(|| format!("cannot resolve source {}", args.source.display()))?;

    // Inspection step: the progress total must be known before the job is
    // submitted. Directories are tracked by file count, single files by
    // byte size.
    let (source, total_units, unit_label) = if metadata.is_dir() {
        let files = scan::count_upload_files(&source_abs, METADATA_EXCLUDES)
            .with_context(|| format!("cannot scan {}", source_abs.display()))?;
        (
            Location::local_directory(source_abs.to_string_lossy()),
            files,
            "files",
        )
    } else {
        (
            Location::local(source_abs.to_string_lossy()),
            metadata.len(),
            "bytes",
        )
    };

    let dest_path = match args.dest_path {
        Some(path) => path,
        None => source_abs
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .context("source has no file name; pass --dest-path")?,
    };
    let destination = Location::remote(&args.resource, &args.token, &dest_path);

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("cancellation requested");
                cancel.cancel();
            }
        });
    }

    let manager = TransferManager::new(
        Arc::new(AzCopyEngine::new(engine_path)),
        Arc::new(ConsolePrompt),
        Arc::new(ConsoleLog),
    );
    let notify = ConsoleNotifications::new(total_units, unit_label);
    let request = UploadRequest {
        source,
        destination,
        total_units,
    };

    let result = match direction {
        Direction::LocalToBlob => manager.upload_to_blob(request, Some(&notify), cancel).await,
        Direction::LocalToFileShare => {
            manager
                .upload_to_file_share(request, Some(&notify), cancel)
                .await
        }
    };

    match result {
        Ok(()) => Ok(()),
        Err(TransferError::Cancelled) => {
            // An interruption, not an error outcome.
            eprintln!("upload cancelled");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
