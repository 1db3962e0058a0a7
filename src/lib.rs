//! # pdf-toolkit
//!
//! Client for a PDF processing service that merges, splits and OCRs documents.
//!
//! The service does the document work. This crate owns everything on the
//! client side of the wire: which inputs each operation accepts, the exact
//! multipart shape each endpoint expects, telling a server refusal apart from
//! an unreachable server, and a lifecycle state machine that keeps one
//! interaction consistent while the user keeps clicking.
//!
//! ## Pipeline Overview
//!
//! ```text
//! operation + files
//!  │
//!  ├─ 1. Registry   min/max files, endpoint, field names   (operation)
//!  ├─ 2. Selection  immutable snapshot of chosen files     (selection)
//!  ├─ 3. Build      validate + shape multipart payload     (request)
//!  ├─ 4. Transport  one POST, no retries                   (transport)
//!  └─ 5. Resolve    Succeeded(artifact) | Failed(message)  (orchestrator)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf_toolkit::{process_to_file, ClientConfig, FileHandle, Operation, SplitRange};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::builder()
//!         .base_url("http://localhost:5000")
//!         .build()?;
//!     let file = FileHandle::from_path("report.pdf").await?;
//!     let range = SplitRange::new(3, 5)?;
//!     let path = process_to_file(Operation::Split, vec![file], range, "pages.pdf", &config).await?;
//!     eprintln!("wrote {}", path.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf-toolkit` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! ## Endpoints
//!
//! | Operation | Path | Fields | Result |
//! |-----------|------|--------|--------|
//! | Merge | `/api/pdf/merge` | `files` (≥ 2, repeated) | `merged.pdf` |
//! | Split | `/api/pdf/split` | `file`, `start`, `end` | `split.pdf` |
//! | OCR   | `/api/pdf/ocr`   | `file` | `ocr_output.pdf` |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod artifact;
pub mod config;
pub mod error;
pub mod operation;
pub mod orchestrator;
pub mod process;
pub mod progress;
pub mod request;
pub mod selection;
pub mod transport;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use artifact::ResultArtifact;
pub use config::{ClientConfig, ClientConfigBuilder, DEFAULT_BASE_URL};
pub use error::{SubmissionError, ToolkitError, TransportError, ValidationError};
pub use operation::{rules, ExtraParams, Operation, OperationRules};
pub use orchestrator::{Orchestrator, SubmissionState, SubmitOutcome};
pub use process::{
    process, process_sync, process_to_file, process_with_progress, save_artifact,
};
pub use progress::{NoopProgressCallback, ProgressCallback, SubmissionProgressCallback};
pub use request::{build, OutboundPayload, PartValue, PayloadPart, SplitRange};
pub use selection::{FileHandle, FileSelection, FileSelectionStore};
pub use transport::{BinaryArtifact, HttpTransport, Transport};
