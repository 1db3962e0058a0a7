//! Input files chosen for the current operation.
//!
//! A [`FileSelection`] is an immutable, cheaply clonable snapshot. The
//! [`FileSelectionStore`] only ever swaps the whole snapshot, so a submission
//! that captured one keeps seeing exactly the files it was started with even
//! if the user picks new ones while it is in flight.

use crate::error::ToolkitError;
use bytes::Bytes;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

const PDF_MAGIC: &[u8; 4] = b"%PDF";

/// One input file: its name and full contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHandle {
    name: String,
    content: Bytes,
}

impl FileHandle {
    pub fn new(name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Read a file from disk.
    ///
    /// The service decides whether a document is valid; a missing `%PDF`
    /// header is logged, not rejected.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, ToolkitError> {
        let path = path.as_ref();
        let content = tokio::fs::read(path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ToolkitError::FileNotFound {
                path: path.to_path_buf(),
            },
            std::io::ErrorKind::PermissionDenied => ToolkitError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => ToolkitError::ReadFailed {
                path: path.to_path_buf(),
                source: e,
            },
        })?;

        if !content.starts_with(PDF_MAGIC) {
            warn!("{} does not start with a PDF header", path.display());
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document.pdf".to_string());
        debug!("Loaded {} ({} bytes)", name, content.len());

        Ok(Self::new(name, content))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Size in bytes.
    pub fn size(&self) -> usize {
        self.content.len()
    }

    pub fn content(&self) -> &Bytes {
        &self.content
    }

    /// MIME type sent with the multipart part.
    pub fn content_type(&self) -> &'static str {
        if self.name.to_ascii_lowercase().ends_with(".pdf") {
            "application/pdf"
        } else {
            "application/octet-stream"
        }
    }

    /// `"name (1.25 MB)"`
    pub fn display_label(&self) -> String {
        format!(
            "{} ({:.2} MB)",
            self.name,
            self.content.len() as f64 / 1024.0 / 1024.0
        )
    }
}

/// An ordered, immutable set of input files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSelection {
    files: Arc<[FileHandle]>,
}

impl FileSelection {
    pub fn new(files: Vec<FileHandle>) -> Self {
        Self {
            files: files.into(),
        }
    }

    pub fn files(&self) -> &[FileHandle] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn total_bytes(&self) -> usize {
        self.files.iter().map(FileHandle::size).sum()
    }

    /// One-line description for display next to the file picker.
    pub fn summary(&self) -> String {
        if self.files.is_empty() {
            return "No files selected".to_string();
        }
        self.files
            .iter()
            .map(FileHandle::display_label)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// `true` if both snapshots are the same allocation.
    pub fn ptr_eq(&self, other: &FileSelection) -> bool {
        Arc::ptr_eq(&self.files, &other.files)
    }
}

impl From<Vec<FileHandle>> for FileSelection {
    fn from(files: Vec<FileHandle>) -> Self {
        Self::new(files)
    }
}

/// Holder for the current selection with replace-on-write semantics.
#[derive(Debug, Default)]
pub struct FileSelectionStore {
    current: FileSelection,
}

impl FileSelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the selection wholesale.
    pub fn set_files(&mut self, files: Vec<FileHandle>) {
        self.current = FileSelection::new(files);
    }

    pub fn clear(&mut self) {
        self.current = FileSelection::default();
    }

    /// Snapshot of the current selection.
    pub fn current(&self) -> FileSelection {
        self.current.clone()
    }
}
