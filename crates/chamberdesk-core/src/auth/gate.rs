//! Session gate guarding the protected part of the application.
//!
//! Policy: a locally stored token is necessary but not sufficient. The
//! backend's verification endpoint is authoritative, and every failure mode
//! (no token, refusal, network error, timeout) resolves to [`GateState::Rejected`].

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::token_store::TokenStore;
use super::verifier::{Refusal, Verdict, Verifier};

/// Verification results waiting to be drained by `poll`.
/// One check is in flight per mount, so a handful of slots is plenty.
const CHANNEL_BUFFER_SIZE: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Unknown,
    Accepted,
    Rejected,
}

/// What the view layer should show for the current gate state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateView {
    /// Interim placeholder while verification is pending.
    Placeholder,
    /// The protected views themselves.
    Protected,
    /// Send the user to the login view.
    RedirectToLogin,
}

impl GateState {
    pub fn view(self) -> GateView {
        match self {
            GateState::Unknown => GateView::Placeholder,
            GateState::Accepted => GateView::Protected,
            GateState::Rejected => GateView::RedirectToLogin,
        }
    }
}

/// Run one verification, bounded by `timeout`.
pub async fn verify_with_timeout(verifier: &dyn Verifier, token: &str, timeout: Duration) -> Verdict {
    match tokio::time::timeout(timeout, verifier.verify(token)).await {
        Ok(verdict) => verdict,
        Err(_) => Verdict::Refused(Refusal::Timeout),
    }
}

struct CheckResult {
    generation: u64,
    verdict: Verdict,
}

pub struct SessionGate {
    verifier: Arc<dyn Verifier>,
    timeout: Duration,
    state: GateState,
    /// Bumped on every mount and unmount; results from older mounts are dropped.
    generation: u64,
    /// Token as it was when the gate was mounted.
    snapshot: Option<String>,
    task: Option<JoinHandle<()>>,
    tx: mpsc::Sender<CheckResult>,
    rx: mpsc::Receiver<CheckResult>,
}

impl SessionGate {
    pub fn new(verifier: Arc<dyn Verifier>, timeout: Duration) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        Self {
            verifier,
            timeout,
            state: GateState::Unknown,
            generation: 0,
            snapshot: None,
            task: None,
            tx,
            rx,
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn view(&self) -> GateView {
        self.state.view()
    }

    /// The token this mount is verifying (or verified).
    pub fn snapshot(&self) -> Option<&str> {
        self.snapshot.as_deref()
    }

    /// Start a fresh check against the store's current token.
    ///
    /// An empty store rejects immediately without contacting the backend.
    /// Otherwise a single verification task is spawned and the gate stays
    /// `Unknown` until [`poll`](Self::poll) or [`settle`](Self::settle) sees
    /// its result. Must be called from within a tokio runtime.
    pub fn mount(&mut self, store: &TokenStore) -> GateState {
        self.unmount();
        self.snapshot = store.get().map(str::to_string);

        let Some(token) = self.snapshot.clone() else {
            debug!("No stored token, rejecting without verification");
            self.state = GateState::Rejected;
            return self.state;
        };

        let verifier = Arc::clone(&self.verifier);
        let tx = self.tx.clone();
        let generation = self.generation;
        let timeout = self.timeout;

        self.task = Some(tokio::spawn(async move {
            let verdict = verify_with_timeout(verifier.as_ref(), &token, timeout).await;
            // Receiver lives as long as the gate; a send error means it is gone.
            let _ = tx.send(CheckResult { generation, verdict }).await;
        }));

        debug!(generation, "Session verification started");
        self.state
    }

    /// Tear down the current mount. A pending check is aborted, and should
    /// its result still arrive it is discarded.
    pub fn unmount(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.generation = self.generation.wrapping_add(1);
        self.state = GateState::Unknown;
        self.snapshot = None;
    }

    /// Apply any finished check without blocking.
    ///
    /// Returns the new state when this call moved the gate out of `Unknown`.
    /// A task that ended without reporting (panicked or was cancelled) counts
    /// as a refusal.
    pub fn poll(&mut self) -> Option<GateState> {
        // Read before draining: a finished task has already sent its result.
        let finished = self.task.as_ref().is_some_and(JoinHandle::is_finished);

        let mut changed = None;
        while let Ok(result) = self.rx.try_recv() {
            if self.accept_result(result) {
                changed = Some(self.state);
            }
        }

        if finished && self.state == GateState::Unknown {
            warn!(generation = self.generation, "Session verification ended without a verdict");
            self.task = None;
            self.state = GateState::Rejected;
            changed = Some(self.state);
        }
        changed
    }

    /// Wait for the current mount's outcome.
    ///
    /// Returns `Unknown` only if nothing is mounted.
    pub async fn settle(&mut self) -> GateState {
        while self.state == GateState::Unknown {
            let Some(task) = self.task.as_mut() else {
                break;
            };
            if let Err(e) = task.await {
                warn!(error = %e, "Session verification task failed");
            }
            self.poll();
        }
        self.state
    }

    fn accept_result(&mut self, result: CheckResult) -> bool {
        if result.generation != self.generation || self.state != GateState::Unknown {
            debug!(
                generation = result.generation,
                current = self.generation,
                "Discarding verification result from a previous mount"
            );
            return false;
        }

        self.task = None;
        self.state = match result.verdict {
            Verdict::Accepted => {
                debug!("Session accepted");
                GateState::Accepted
            }
            Verdict::Refused(Refusal::Rejected) => {
                info!("Session rejected by server");
                GateState::Rejected
            }
            Verdict::Refused(reason) => {
                warn!(%reason, "Session could not be verified");
                GateState::Rejected
            }
        };
        true
    }
}

impl Drop for SessionGate {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
