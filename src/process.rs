//! One-shot entry points: submit a single job and wait for the document.
//!
//! These wire a [`ClientConfig`], an [`HttpTransport`] and an [`Orchestrator`]
//! together for callers that do not need to observe the lifecycle, such as the
//! CLI or a batch script. Interactive front ends should hold an
//! [`Orchestrator`] directly.

use crate::artifact::ResultArtifact;
use crate::config::ClientConfig;
use crate::error::ToolkitError;
use crate::operation::Operation;
use crate::orchestrator::{Orchestrator, SubmissionState};
use crate::progress::ProgressCallback;
use crate::request::SplitRange;
use crate::selection::FileHandle;
use crate::transport::HttpTransport;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Process `files` with `op` and return the resulting document.
///
/// `range` is only used by [`Operation::Split`].
///
/// # Errors
/// Returns [`ToolkitError::SubmissionFailed`] carrying the same message the
/// orchestrator would show in its `Failed` state: a validation problem, the
/// service's own error text, or a network failure.
///
/// # Example
/// ```rust,no_run
/// use pdf_toolkit::{process, ClientConfig, FileHandle, Operation, SplitRange};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let files = vec![
///     FileHandle::from_path("a.pdf").await?,
///     FileHandle::from_path("b.pdf").await?,
/// ];
/// let merged = process(Operation::Merge, files, SplitRange::default(), &ClientConfig::default()).await?;
/// merged.save_in(".").await?;
/// # Ok(())
/// # }
/// ```
pub async fn process(
    op: Operation,
    files: Vec<FileHandle>,
    range: SplitRange,
    config: &ClientConfig,
) -> Result<ResultArtifact, ToolkitError> {
    process_with_progress(op, files, range, config, None).await
}

/// [`process`] with an optional progress callback.
pub async fn process_with_progress(
    op: Operation,
    files: Vec<FileHandle>,
    range: SplitRange,
    config: &ClientConfig,
    progress: Option<ProgressCallback>,
) -> Result<ResultArtifact, ToolkitError> {
    let transport = Arc::new(HttpTransport::new(config)?);
    let mut orchestrator = Orchestrator::new(transport);
    if let Some(cb) = progress {
        orchestrator = orchestrator.with_progress(cb);
    }

    orchestrator.set_operation(op);
    orchestrator.set_files(files);
    orchestrator.set_split_range(range);
    orchestrator.submit().await;

    match orchestrator.state() {
        SubmissionState::Succeeded(_) => orchestrator
            .take_artifact()
            .ok_or(ToolkitError::NothingToSave),
        SubmissionState::Failed(message) => Err(ToolkitError::SubmissionFailed { message }),
        other => Err(ToolkitError::Internal(format!(
            "submission ended in unexpected state '{}'",
            other.label()
        ))),
    }
}

/// Process and write the document to `output`.
///
/// If `output` is an existing directory, the operation's suggested filename
/// is used inside it.
pub async fn process_to_file(
    op: Operation,
    files: Vec<FileHandle>,
    range: SplitRange,
    output: impl AsRef<Path>,
    config: &ClientConfig,
) -> Result<PathBuf, ToolkitError> {
    let artifact = process(op, files, range, config).await?;
    let written = save_artifact(&artifact, output.as_ref()).await?;
    info!("{} result written to {}", op, written.display());
    Ok(written)
}

/// Save `artifact` at `output`, or inside it when `output` is a directory.
pub async fn save_artifact(artifact: &ResultArtifact, output: &Path) -> Result<PathBuf, ToolkitError> {
    if tokio::fs::metadata(output)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false)
    {
        artifact.save_in(output).await
    } else {
        artifact.save_to(output).await
    }
}

/// Synchronous wrapper around [`process`].
///
/// Creates a temporary tokio runtime internally.
pub fn process_sync(
    op: Operation,
    files: Vec<FileHandle>,
    range: SplitRange,
    config: &ClientConfig,
) -> Result<ResultArtifact, ToolkitError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ToolkitError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(process(op, files, range, config))
}
