//! Submission orchestrator: the lifecycle state machine for one user interaction.
//!
//! ```text
//!            submit()                 build ok
//!   Idle ───────────────▶ Validating ─────────▶ Submitting
//!    ▲                        │                   │     │
//!    │                        │ build err         │ ok  │ transport err
//!    │                        ▼                   ▼     ▼
//!    │                  Failed(message)   Succeeded(artifact)
//!    │                        │                   │
//!    └──── reset() / set_files() / set_operation() ┘
//! ```
//!
//! ## Single flight
//!
//! `submit()` while `Validating` or `Submitting` is a no-op: no second
//! transport call is made and the state is left alone.
//!
//! ## Stale results
//!
//! Every accepted submission gets the next value of a monotonically increasing
//! id. `reset()` and selection changes clear the in-flight id without
//! cancelling the request; when the transport call later completes, its result
//! is applied only if its id is still the in-flight one. Otherwise it is
//! dropped and [`SubmitOutcome::Superseded`] is returned.
//!
//! ## Locking
//!
//! State lives behind a `std::sync::Mutex` that is never held across an
//! `.await` or while a progress callback runs. The orchestrator is `Clone`
//! (all clones share state), so one task can await `submit()` while another
//! keeps changing the selection.

use crate::artifact::ResultArtifact;
use crate::error::SubmissionError;
use crate::operation::Operation;
use crate::progress::ProgressCallback;
use crate::request::{self, SplitRange};
use crate::selection::{FileHandle, FileSelection, FileSelectionStore};
use crate::transport::Transport;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// Lifecycle of the current interaction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    Validating,
    Submitting,
    Succeeded(ResultArtifact),
    /// Human-readable reason.
    Failed(String),
}

impl SubmissionState {
    /// `true` while a submission is validating or waiting on the transport.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, SubmissionState::Validating | SubmissionState::Submitting)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SubmissionState::Succeeded(_) | SubmissionState::Failed(_)
        )
    }

    pub fn artifact(&self) -> Option<&ResultArtifact> {
        match self {
            SubmissionState::Succeeded(a) => Some(a),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            SubmissionState::Failed(m) => Some(m),
            _ => None,
        }
    }

    /// Coarse progress for a progress bar: 0 until the document arrives, then 100.
    pub fn progress_percent(&self) -> u8 {
        match self {
            SubmissionState::Succeeded(_) => 100,
            _ => 0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SubmissionState::Idle => "idle",
            SubmissionState::Validating => "validating",
            SubmissionState::Submitting => "submitting",
            SubmissionState::Succeeded(_) => "succeeded",
            SubmissionState::Failed(_) => "failed",
        }
    }
}

/// What a call to [`Orchestrator::submit`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Another submission was already in flight; nothing happened.
    Ignored,
    /// The submission reached `Succeeded` or `Failed`.
    Resolved,
    /// The transport finished after a reset or selection change; its result was dropped.
    Superseded,
}

struct Inner {
    operation: Operation,
    store: FileSelectionStore,
    range: SplitRange,
    state: SubmissionState,
    next_id: u64,
    in_flight: Option<u64>,
}

impl Inner {
    /// Return to `Idle`, releasing any held artifact and orphaning any in-flight call.
    fn reset(&mut self) {
        if let Some(id) = self.in_flight.take() {
            debug!("Submission #{} orphaned by reset", id);
        }
        self.state = SubmissionState::Idle;
    }
}

/// Coordinates validation, building and transport for one interaction at a time.
#[derive(Clone)]
pub struct Orchestrator {
    inner: Arc<Mutex<Inner>>,
    transport: Arc<dyn Transport>,
    progress: Option<ProgressCallback>,
}

impl Orchestrator {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                operation: Operation::default(),
                store: FileSelectionStore::new(),
                range: SplitRange::default(),
                state: SubmissionState::Idle,
                next_id: 1,
                in_flight: None,
            })),
            transport,
            progress: None,
        }
    }

    /// Attach a progress callback.
    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Every update is a single assignment, so a poisoned `Inner` is still consistent.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    // ── Selection ────────────────────────────────────────────────────────

    /// Change the operation. Always resets the lifecycle to `Idle`.
    pub fn set_operation(&self, op: Operation) {
        let mut inner = self.lock();
        inner.operation = op;
        inner.reset();
    }

    /// Replace the selected files. Always resets the lifecycle to `Idle`.
    pub fn set_files(&self, files: Vec<FileHandle>) {
        let mut inner = self.lock();
        inner.store.set_files(files);
        inner.reset();
    }

    /// Change the split page range. Does not affect the lifecycle.
    pub fn set_split_range(&self, range: SplitRange) {
        self.lock().range = range;
    }

    pub fn operation(&self) -> Operation {
        self.lock().operation
    }

    pub fn files(&self) -> FileSelection {
        self.lock().store.current()
    }

    pub fn split_range(&self) -> SplitRange {
        self.lock().range
    }

    // ── Lifecycle ────────────────────────────────────────────────────────

    /// Snapshot of the current state.
    pub fn state(&self) -> SubmissionState {
        self.lock().state.clone()
    }

    /// Whether a `submit()` now would do anything useful.
    pub fn can_submit(&self) -> bool {
        let inner = self.lock();
        !inner.state.is_in_flight() && !inner.store.current().is_empty()
    }

    /// Return to `Idle`, discarding any artifact or error. An in-flight
    /// request keeps running; its result will be dropped.
    pub fn reset(&self) {
        self.lock().reset();
    }

    /// Hand the artifact to the caller and return to `Idle`.
    ///
    /// Returns `None` unless the state is `Succeeded`.
    pub fn take_artifact(&self) -> Option<ResultArtifact> {
        let mut inner = self.lock();
        match std::mem::take(&mut inner.state) {
            SubmissionState::Succeeded(artifact) => Some(artifact),
            other => {
                inner.state = other;
                None
            }
        }
    }

    /// Validate, build and send the current selection.
    ///
    /// Completes when the submission resolves (or is superseded). Errors are
    /// not returned; they end up in [`SubmissionState::Failed`].
    pub async fn submit(&self) -> SubmitOutcome {
        // ── Validating ───────────────────────────────────────────────────
        let (id, op, file_count, built) = {
            let mut inner = self.lock();
            if inner.state.is_in_flight() {
                debug!("submit() ignored: #{:?} already in flight", inner.in_flight);
                return SubmitOutcome::Ignored;
            }

            let id = inner.next_id;
            inner.next_id += 1;
            inner.in_flight = Some(id);
            inner.state = SubmissionState::Validating;

            let op = inner.operation;
            let files = inner.store.current();
            info!("Submission #{}: {} with {} file(s)", id, op, files.len());

            let built = request::build(op, &files, inner.range)
                .map_err(|e| SubmissionError::from(e).to_string());
            match &built {
                Ok(_) => inner.state = SubmissionState::Submitting,
                Err(message) => {
                    warn!("Submission #{} rejected: {}", id, message);
                    inner.state = SubmissionState::Failed(message.clone());
                    inner.in_flight = None;
                }
            }
            (id, op, files.len(), built)
        };

        if let Some(ref cb) = self.progress {
            cb.on_submit_start(id, op, file_count);
        }
        let payload = match built {
            Ok(payload) => payload,
            Err(message) => {
                if let Some(ref cb) = self.progress {
                    cb.on_validation_failed(id, &message);
                }
                return SubmitOutcome::Resolved;
            }
        };
        if let Some(ref cb) = self.progress {
            cb.on_request_sent(id, op, payload.content_bytes());
        }

        // ── Submitting ───────────────────────────────────────────────────
        let endpoint = payload.endpoint;
        let result = self.transport.submit(endpoint, payload).await;

        // ── Resolve ──────────────────────────────────────────────────────
        let resolved = {
            let mut inner = self.lock();
            if inner.in_flight != Some(id) {
                None
            } else {
                inner.in_flight = None;
                inner.state = match result {
                    Ok(binary) => SubmissionState::Succeeded(ResultArtifact::from_binary(op, binary)),
                    Err(e) => SubmissionState::Failed(SubmissionError::from(e).to_string()),
                };
                Some(inner.state.clone())
            }
        };

        match resolved {
            None => {
                debug!("Submission #{} finished after the interaction moved on; result discarded", id);
                if let Some(ref cb) = self.progress {
                    cb.on_discarded(id);
                }
                SubmitOutcome::Superseded
            }
            Some(state) => {
                match &state {
                    SubmissionState::Succeeded(artifact) => {
                        info!("Submission #{} succeeded: {} ({} bytes)", id, artifact.filename, artifact.len());
                        if let Some(ref cb) = self.progress {
                            cb.on_succeeded(id, &artifact.filename, artifact.len());
                        }
                    }
                    SubmissionState::Failed(message) => {
                        warn!("Submission #{} failed: {}", id, message);
                        if let Some(ref cb) = self.progress {
                            cb.on_failed(id, message);
                        }
                    }
                    _ => {}
                }
                SubmitOutcome::Resolved
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::progress::SubmissionProgressCallback;
    use crate::request::OutboundPayload;
    use crate::transport::BinaryArtifact;
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    /// In-memory transport. When `gated`, each call waits for `release` before answering.
    struct FakeTransport {
        calls: AtomicUsize,
        payloads: Mutex<Vec<OutboundPayload>>,
        response: Mutex<Result<BinaryArtifact, TransportError>>,
        gated: bool,
        entered: Notify,
        release: Notify,
    }

    impl FakeTransport {
        fn build(response: Result<BinaryArtifact, TransportError>, gated: bool) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                payloads: Mutex::new(Vec::new()),
                response: Mutex::new(response),
                gated,
                entered: Notify::new(),
                release: Notify::new(),
            })
        }

        fn answering(response: Result<BinaryArtifact, TransportError>) -> Arc<Self> {
            Self::build(response, false)
        }

        fn gated(response: Result<BinaryArtifact, TransportError>) -> Arc<Self> {
            Self::build(response, true)
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Transport for FakeTransport {
        async fn submit(
            &self,
            endpoint: &str,
            payload: OutboundPayload,
        ) -> Result<BinaryArtifact, TransportError> {
            assert_eq!(endpoint, payload.endpoint);
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.payloads.lock().unwrap().push(payload);
            if self.gated {
                self.entered.notify_one();
                self.release.notified().await;
            }
            self.response.lock().unwrap().clone()
        }
    }

    fn pdf_body(len: usize) -> Result<BinaryArtifact, TransportError> {
        Ok(BinaryArtifact {
            bytes: Bytes::from(vec![b'P'; len]),
            content_type: Some("application/pdf".into()),
        })
    }

    fn files(sizes: &[usize]) -> Vec<FileHandle> {
        sizes
            .iter()
            .enumerate()
            .map(|(i, &n)| FileHandle::new(format!("f{i}.pdf"), vec![0u8; n]))
            .collect()
    }

    #[tokio::test]
    async fn merge_scenario_succeeds() {
        let transport = FakeTransport::answering(pdf_body(25 * 1024));
        let orch = Orchestrator::new(transport.clone());
        orch.set_operation(Operation::Merge);
        orch.set_files(files(&[10 * 1024, 20 * 1024]));

        assert_eq!(orch.submit().await, SubmitOutcome::Resolved);

        let state = orch.state();
        let artifact = state.artifact().expect("succeeded");
        assert_eq!(artifact.filename, "merged.pdf");
        assert_eq!(artifact.len(), 25 * 1024);
        assert_eq!(state.progress_percent(), 100);

        let payloads = transport.payloads.lock().unwrap();
        assert_eq!(payloads[0].parts_named("files").count(), 2);
    }

    #[tokio::test]
    async fn validation_failure_makes_no_transport_call() {
        let transport = FakeTransport::answering(pdf_body(1));
        let orch = Orchestrator::new(transport.clone());
        orch.set_operation(Operation::Merge);
        orch.set_files(files(&[100]));

        orch.submit().await;

        assert_eq!(transport.calls(), 0);
        let msg = orch.state().error_message().map(str::to_string);
        assert!(msg.unwrap().contains("at least two"));
    }

    #[tokio::test]
    async fn invalid_split_range_fails_before_network() {
        let transport = FakeTransport::answering(pdf_body(1));
        let orch = Orchestrator::new(transport.clone());
        orch.set_operation(Operation::Split);
        orch.set_files(files(&[100]));
        orch.set_split_range(SplitRange { start: 3, end: 2 });

        orch.submit().await;

        assert_eq!(transport.calls(), 0);
        assert!(matches!(orch.state(), SubmissionState::Failed(_)));
    }

    #[tokio::test]
    async fn server_rejection_message_surfaces() {
        let transport = FakeTransport::answering(Err(TransportError::ServerRejected {
            status: 500,
            message: "scan failed".into(),
        }));
        let orch = Orchestrator::new(transport);
        orch.set_operation(Operation::Ocr);
        orch.set_files(files(&[100]));

        orch.submit().await;

        assert_eq!(orch.state(), SubmissionState::Failed("scan failed".into()));
    }

    #[tokio::test]
    async fn submit_while_in_flight_is_ignored() {
        let transport = FakeTransport::gated(pdf_body(8));
        let orch = Orchestrator::new(transport.clone());
        orch.set_operation(Operation::Ocr);
        orch.set_files(files(&[100]));

        let first = {
            let orch = orch.clone();
            tokio::spawn(async move { orch.submit().await })
        };
        transport.entered.notified().await;
        assert_eq!(orch.state(), SubmissionState::Submitting);
        assert!(!orch.can_submit());

        assert_eq!(orch.submit().await, SubmitOutcome::Ignored);
        assert_eq!(orch.state(), SubmissionState::Submitting);
        assert_eq!(transport.calls(), 1);

        transport.release.notify_one();
        assert_eq!(first.await.unwrap(), SubmitOutcome::Resolved);
        assert!(orch.state().artifact().is_some());
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn reset_during_flight_discards_late_result() {
        let transport = FakeTransport::gated(pdf_body(8));
        let orch = Orchestrator::new(transport.clone());
        orch.set_operation(Operation::Ocr);
        orch.set_files(files(&[100]));

        let first = {
            let orch = orch.clone();
            tokio::spawn(async move { orch.submit().await })
        };
        transport.entered.notified().await;

        orch.reset();
        assert_eq!(orch.state(), SubmissionState::Idle);

        transport.release.notify_one();
        assert_eq!(first.await.unwrap(), SubmitOutcome::Superseded);
        assert_eq!(orch.state(), SubmissionState::Idle);
    }

    #[tokio::test]
    async fn newer_submission_wins_over_stale_one() {
        let transport = FakeTransport::gated(pdf_body(8));
        let orch = Orchestrator::new(transport.clone());
        orch.set_operation(Operation::Ocr);
        orch.set_files(files(&[100]));

        let stale = {
            let orch = orch.clone();
            tokio::spawn(async move { orch.submit().await })
        };
        transport.entered.notified().await;

        // Picking new files moves the interaction on; a fresh submit is allowed.
        orch.set_files(files(&[200]));
        let fresh = {
            let orch = orch.clone();
            tokio::spawn(async move { orch.submit().await })
        };
        transport.entered.notified().await;
        assert_eq!(transport.calls(), 2);

        transport.release.notify_one();
        transport.release.notify_one();
        assert_eq!(stale.await.unwrap(), SubmitOutcome::Superseded);
        assert_eq!(fresh.await.unwrap(), SubmitOutcome::Resolved);
        assert!(orch.state().artifact().is_some());
    }

    #[tokio::test]
    async fn selection_changes_reset_terminal_states() {
        let transport = FakeTransport::answering(pdf_body(4));
        let orch = Orchestrator::new(transport);
        orch.set_operation(Operation::Ocr);
        orch.set_files(files(&[10]));
        orch.submit().await;
        assert!(orch.state().is_terminal());

        orch.set_files(files(&[10]));
        assert_eq!(orch.state(), SubmissionState::Idle);

        orch.submit().await;
        assert!(orch.state().artifact().is_some());
        orch.set_operation(Operation::Split);
        assert_eq!(orch.state(), SubmissionState::Idle);

        orch.set_operation(Operation::Merge);
        orch.submit().await;
        assert!(matches!(orch.state(), SubmissionState::Failed(_)));
        orch.set_operation(Operation::Ocr);
        assert_eq!(orch.state(), SubmissionState::Idle);
    }

    #[tokio::test]
    async fn range_change_keeps_state() {
        let transport = FakeTransport::answering(pdf_body(4));
        let orch = Orchestrator::new(transport);
        orch.set_operation(Operation::Split);
        orch.set_files(files(&[10]));
        orch.submit().await;

        orch.set_split_range(SplitRange { start: 2, end: 3 });
        assert!(orch.state().artifact().is_some());
    }

    #[tokio::test]
    async fn take_artifact_releases_it() {
        let transport = FakeTransport::answering(pdf_body(4));
        let orch = Orchestrator::new(transport);
        orch.set_operation(Operation::Split);
        orch.set_files(files(&[10]));

        assert!(orch.take_artifact().is_none());
        orch.submit().await;

        let artifact = orch.take_artifact().expect("artifact");
        assert_eq!(artifact.filename, "split.pdf");
        assert_eq!(orch.state(), SubmissionState::Idle);
        assert!(orch.take_artifact().is_none());
    }

    #[tokio::test]
    async fn can_submit_requires_files() {
        let orch = Orchestrator::new(FakeTransport::answering(pdf_body(1)));
        assert!(!orch.can_submit());
        orch.set_files(files(&[1]));
        assert!(orch.can_submit());
    }

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl SubmissionProgressCallback for Recorder {
        fn on_submit_start(&self, id: u64, op: Operation, file_count: usize) {
            self.events.lock().unwrap().push(format!("start #{id} {op} {file_count}"));
        }
        fn on_validation_failed(&self, id: u64, _message: &str) {
            self.events.lock().unwrap().push(format!("invalid #{id}"));
        }
        fn on_request_sent(&self, id: u64, _op: Operation, bytes: usize) {
            self.events.lock().unwrap().push(format!("sent #{id} {bytes}"));
        }
        fn on_succeeded(&self, id: u64, filename: &str, _bytes: usize) {
            self.events.lock().unwrap().push(format!("ok #{id} {filename}"));
        }
    }

    #[tokio::test]
    async fn progress_events_and_monotonic_ids() {
        let recorder = Arc::new(Recorder::default());
        let orch = Orchestrator::new(FakeTransport::answering(pdf_body(3)))
            .with_progress(recorder.clone());
        orch.set_operation(Operation::Merge);
        orch.set_files(files(&[5]));
        orch.submit().await;

        orch.set_files(files(&[5, 6]));
        orch.submit().await;

        let events = recorder.events.lock().unwrap().clone();
        assert_eq!(
            events,
            vec![
                "start #1 merge 1",
                "invalid #1",
                "start #2 merge 2",
                "sent #2 11",
                "ok #2 merged.pdf",
            ]
        );
    }
}
