//! The processed document returned by a successful submission.

use crate::error::ToolkitError;
use crate::operation::Operation;
use crate::transport::BinaryArtifact;
use bytes::Bytes;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// A processed document plus the filename it should be saved under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultArtifact {
    pub operation: Operation,
    /// Suggested download name, derived from the operation.
    pub filename: String,
    pub bytes: Bytes,
    pub content_type: Option<String>,
}

impl ResultArtifact {
    pub fn from_binary(operation: Operation, binary: BinaryArtifact) -> Self {
        Self {
            operation,
            filename: operation.output_filename().to_string(),
            bytes: binary.bytes,
            content_type: binary.content_type,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Write the document to `path`.
    ///
    /// Uses atomic write (temp file in the same directory + rename) so a
    /// crash never leaves a truncated document behind.
    pub async fn save_to(&self, path: impl AsRef<Path>) -> Result<PathBuf, ToolkitError> {
        let path = path.as_ref().to_path_buf();
        let bytes = self.bytes.clone();

        let written = tokio::task::spawn_blocking(move || write_atomic(&path, &bytes).map(|_| path))
            .await
            .map_err(|e| ToolkitError::Internal(format!("write task failed: {e}")))??;

        info!("Saved {} ({} bytes)", written.display(), self.bytes.len());
        Ok(written)
    }

    /// Write the document into `dir` under its suggested filename.
    pub async fn save_in(&self, dir: impl AsRef<Path>) -> Result<PathBuf, ToolkitError> {
        self.save_to(dir.as_ref().join(&self.filename)).await
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), ToolkitError> {
    let write_err = |source: std::io::Error| ToolkitError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent).map_err(write_err)?;

    let mut tmp = tempfile::NamedTempFile::new_in(&parent).map_err(write_err)?;
    tmp.write_all(bytes).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}
