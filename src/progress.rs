//! Progress-callback trait for submission lifecycle events.
//!
//! Inject an [`Arc<dyn SubmissionProgressCallback>`] via
//! [`crate::Orchestrator::with_progress`] to hear about each transition as it
//! happens. Callbacks run outside the orchestrator's lock, so an
//! implementation may call back into the orchestrator (e.g. to read
//! [`crate::Orchestrator::state`]).
//!
//! # Example
//!
//! ```rust
//! use pdf_toolkit::{Operation, SubmissionProgressCallback};
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! struct CountingCallback {
//!     sent: AtomicUsize,
//! }
//!
//! impl SubmissionProgressCallback for CountingCallback {
//!     fn on_request_sent(&self, id: u64, op: Operation, bytes: usize) {
//!         self.sent.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("#{id}: sending {op} ({bytes} bytes)");
//!     }
//! }
//! ```

use crate::operation::Operation;
use std::sync::Arc;

/// Called by the orchestrator as a submission moves through its states.
///
/// All methods default to no-ops. `id` is the submission identifier; it
/// increases monotonically across submissions of one orchestrator.
pub trait SubmissionProgressCallback: Send + Sync {
    /// A submission was accepted and validation is starting.
    fn on_submit_start(&self, id: u64, op: Operation, file_count: usize) {
        let _ = (id, op, file_count);
    }

    /// Validation failed; no request was sent.
    fn on_validation_failed(&self, id: u64, message: &str) {
        let _ = (id, message);
    }

    /// The payload was handed to the transport.
    ///
    /// `bytes` is the total size of the input files in the payload
    fn on_request_sent(&self, id: u64, op: Operation, bytes: usize) {
        let _ = (id, op, bytes);
    }

    /// The service returned a document.
    fn on_succeeded(&self, id: u64, filename: &str, bytes: usize) {
        let _ = (id, filename, bytes);
    }

    /// The transport reported an error.
    fn on_failed(&self, id: u64, message: &str) {
        let _ = (id, message);
    }

    /// A transport call finished after the interaction had moved on; its
    /// result was dropped.
    fn on_discarded(&self, id: u64) {
        let _ = id;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl SubmissionProgressCallback for NoopProgressCallback {}

/// Convenience alias for the type held by [`crate::Orchestrator`].
pub type ProgressCallback = Arc<dyn SubmissionProgressCallback>;
