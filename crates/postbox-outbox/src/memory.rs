//! In-memory implementation of `Transport`.
//!
//! `InMemoryOutbox` is the reference implementation of the `Transport`
//! trait. Delivered submissions are kept in a `Vec` behind a `Mutex`; the
//! outbox is `Clone`, and clones share the same store, so a test or host
//! can keep a handle while the controller owns a boxed copy.
//!
//! Sends are idempotent on `AttemptId`: a repeated attempt is acknowledged
//! but stored once. Failures can be queued with `fail_next()` to drive the
//! controller's error path deterministically.

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::{debug, info, warn};

use postbox_contracts::{
    error::{PostboxError, PostboxResult},
    submission::{AttemptId, Submission},
};
use postbox_core::traits::Transport;

// ── Internal mutable state ────────────────────────────────────────────────────

#[derive(Default)]
pub(crate) struct OutboxState {
    /// Delivered submissions, in delivery order.
    pub(crate) delivered: Vec<Submission>,

    /// Attempts already delivered, for duplicate suppression.
    pub(crate) seen: HashSet<AttemptId>,

    /// Failure reasons to return, one per upcoming send.
    pub(crate) pending_failures: VecDeque<String>,

    /// Every call to `send`, including failures and duplicates.
    pub(crate) send_calls: u64,
}

// ── Public outbox ─────────────────────────────────────────────────────────────

/// An in-memory, idempotent submission sink.
#[derive(Clone, Default)]
pub struct InMemoryOutbox {
    pub(crate) state: Arc<Mutex<OutboxState>>,
}

impl InMemoryOutbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next send fail with `reason`. Calls queue up: three calls
    /// fail the next three sends.
    pub fn fail_next(&self, reason: impl Into<String>) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.pending_failures.push_back(reason.into());
    }

    /// All delivered submissions, oldest first.
    pub fn delivered(&self) -> Vec<Submission> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.delivered.clone()
    }

    /// Number of `send` calls received, successful or not.
    pub fn send_calls(&self) -> u64 {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.send_calls
    }
}

// ── Transport impl ────────────────────────────────────────────────────────────

#[async_trait]
impl Transport for InMemoryOutbox {
    async fn send(&self, submission: &Submission) -> PostboxResult<()> {
        let mut state = self.state.lock().map_err(|e| PostboxError::TransportFailed {
            reason: format!("outbox lock poisoned: {}", e),
        })?;
        state.send_calls += 1;

        if let Some(reason) = state.pending_failures.pop_front() {
            warn!(attempt_id = %submission.attempt_id, %reason, "injected send failure");
            return Err(PostboxError::TransportFailed { reason });
        }

        if !state.seen.insert(submission.attempt_id) {
            debug!(attempt_id = %submission.attempt_id, "duplicate attempt acknowledged, not stored");
            return Ok(());
        }

        state.delivered.push(submission.clone());
        info!(
            attempt_id = %submission.attempt_id,
            delivered = state.delivered.len(),
            "submission delivered to outbox"
        );
        Ok(())
    }
}
