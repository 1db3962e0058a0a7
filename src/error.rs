//! Error types for the pdf-toolkit library.
//!
//! Failures split along the stages of a submission:
//!
//! * [`ValidationError`]: the selected files or page range do not satisfy
//!   the chosen operation. Detected before any network traffic.
//!
//! * [`TransportError`]: the request left the process but did not come back
//!   as a document. [`TransportError::ServerRejected`] means the service
//!   answered and refused; [`TransportError::NetworkFailure`] means it could
//!   not be reached or answered with something that is not a structured error.
//!
//! * [`SubmissionError`]: either of the above, as seen by the orchestrator.
//!   Its `Display` output is the message stored in
//!   [`crate::SubmissionState::Failed`].
//!
//! * [`ToolkitError`]: fatal errors from the one-shot API, configuration and
//!   file I/O.

use std::path::PathBuf;
use thiserror::Error;

/// The selection does not satisfy the operation's input rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Merge needs at least `required` files.
    #[error("Select at least two PDF files to merge (got {actual}).")]
    InsufficientFiles { required: usize, actual: usize },

    /// Split and OCR take exactly one file.
    #[error("Select a single PDF file (got {actual}).")]
    WrongFileCount { expected: usize, actual: usize },

    /// Split range is not `1 <= start <= end`.
    #[error("Invalid page range {start}-{end}: pages are 1-indexed and start must be <= end.")]
    InvalidRange { start: u32, end: u32 },
}

/// The outbound call did not produce a document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The service answered with a non-2xx status and a structured error.
    #[error("{message}")]
    ServerRejected { status: u16, message: String },

    /// The service was unreachable, timed out, reset the connection, or
    /// replied with an error body that is not the expected JSON shape.
    #[error("Could not reach the processing service: {detail}")]
    NetworkFailure { detail: String },
}

impl TransportError {
    /// `true` when the service itself refused the request.
    pub fn is_server_rejection(&self) -> bool {
        matches!(self, TransportError::ServerRejected { .. })
    }
}

/// Any failure that ends a submission in the `Failed` state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Fatal errors returned by configuration, file loading and the one-shot API.
#[derive(Debug, Error)]
pub enum ToolkitError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("File not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// Reading the file failed for another reason.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Submission errors ─────────────────────────────────────────────────
    /// The submission ended in the `Failed` state.
    #[error("{message}")]
    SubmissionFailed { message: String },

    /// A save was requested but no result is held.
    #[error("No result is available to save")]
    NothingToSave,

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output document.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_rejected_displays_message_verbatim() {
        let e = TransportError::ServerRejected {
            status: 500,
            message: "scan failed".into(),
        };
        assert_eq!(e.to_string(), "scan failed");
        assert!(e.is_server_rejection());
    }

    #[test]
    fn network_failure_is_not_a_rejection() {
        let e = TransportError::NetworkFailure {
            detail: "connection reset".into(),
        };
        assert!(!e.is_server_rejection());
        assert!(e.to_string().contains("connection reset"));
    }

    #[test]
    fn submission_error_is_transparent() {
        let e: SubmissionError = ValidationError::InvalidRange { start: 3, end: 2 }.into();
        assert!(e.to_string().contains("3-2"), "got: {e}");

        let e: SubmissionError = TransportError::ServerRejected {
            status: 400,
            message: "At least two PDF files are required.".into(),
        }
        .into();
        assert_eq!(e.to_string(), "At least two PDF files are required.");
    }

    #[test]
    fn insufficient_files_display() {
        let e = ValidationError::InsufficientFiles {
            required: 2,
            actual: 1,
        };
        assert!(e.to_string().contains("at least two"));
    }
}
