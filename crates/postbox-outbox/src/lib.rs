//! # postbox-outbox
//!
//! Submission transports for the Postbox controller.
//!
//! ## Overview
//!
//! - [`InMemoryOutbox`] — idempotent in-memory sink with failure injection,
//!   the transport to use in tests.
//! - [`SimulatedTransport`] — latency plus random failures drawn from an
//!   injected RNG, delivering into an `InMemoryOutbox` on success.
//!
//! Neither talks to a network.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use postbox_outbox::InMemoryOutbox;
//!
//! let outbox = InMemoryOutbox::new();
//! let handle = outbox.clone();
//! // Box `outbox` into the controller, inspect `handle.delivered()` later.
//! outbox.fail_next("network error");
//! ```

pub mod memory;
pub mod simulated;

pub use memory::InMemoryOutbox;
pub use simulated::{SimulatedTransport, DEFAULT_FAILURE_RATE, DEFAULT_LATENCY};

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::Utc;

    use postbox_contracts::{
        error::PostboxError,
        form::FormSnapshot,
        submission::{AttemptId, Submission},
    };
    use postbox_core::traits::Transport;

    use super::{InMemoryOutbox, SimulatedTransport};

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn make_submission(email: &str) -> Submission {
        Submission {
            attempt_id: AttemptId::new(),
            fields: FormSnapshot::new().with("email", email),
            submitted_at: Utc::now(),
        }
    }

    // ── InMemoryOutbox ────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_outbox_delivers_in_order() {
        let outbox = InMemoryOutbox::new();
        outbox.send(&make_submission("a@x.io")).await.unwrap();
        outbox.send(&make_submission("b@x.io")).await.unwrap();

        let delivered = outbox.delivered();
        assert_eq!(delivered.len(), 2);
        assert_eq!(delivered[0].fields.text("email"), "a@x.io");
        assert_eq!(delivered[1].fields.text("email"), "b@x.io");
    }

    /// Re-sending the same attempt is acknowledged but stored once.
    #[tokio::test]
    async fn test_outbox_is_idempotent_per_attempt() {
        let outbox = InMemoryOutbox::new();
        let submission = make_submission("a@x.io");

        outbox.send(&submission).await.unwrap();
        outbox.send(&submission).await.unwrap();

        assert_eq!(outbox.delivered().len(), 1);
        assert_eq!(outbox.send_calls(), 2);
    }

    #[tokio::test]
    async fn test_injected_failures_are_consumed_in_order() {
        let outbox = InMemoryOutbox::new();
        outbox.fail_next("timeout");
        outbox.fail_next("connection reset");

        let first = outbox.send(&make_submission("a@x.io")).await;
        let second = outbox.send(&make_submission("a@x.io")).await;
        let third = outbox.send(&make_submission("a@x.io")).await;

        match first {
            Err(PostboxError::TransportFailed { reason }) => assert_eq!(reason, "timeout"),
            other => panic!("expected TransportFailed, got {:?}", other),
        }
        match second {
            Err(PostboxError::TransportFailed { reason }) => assert_eq!(reason, "connection reset"),
            other => panic!("expected TransportFailed, got {:?}", other),
        }
        assert!(third.is_ok());
        assert_eq!(outbox.delivered().len(), 1);
        assert_eq!(outbox.send_calls(), 3);
    }

    /// A failed attempt is not remembered, so it can still be delivered later.
    #[tokio::test]
    async fn test_failed_attempt_is_not_marked_seen() {
        let outbox = InMemoryOutbox::new();
        let submission = make_submission("a@x.io");
        outbox.fail_next("timeout");

        assert!(outbox.send(&submission).await.is_err());
        assert!(outbox.send(&submission).await.is_ok());
        assert_eq!(outbox.delivered().len(), 1);
    }

    #[tokio::test]
    async fn test_clones_share_one_store() {
        let outbox = InMemoryOutbox::new();
        let handle = outbox.clone();
        outbox.send(&make_submission("a@x.io")).await.unwrap();
        assert_eq!(handle.delivered().len(), 1);
    }

    // ── SimulatedTransport ────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_simulated_zero_failure_rate_always_delivers() {
        let transport = SimulatedTransport::seeded(Duration::ZERO, 0.0, 7);
        for _ in 0..20 {
            transport.send(&make_submission("a@x.io")).await.unwrap();
        }
        assert_eq!(transport.outbox().delivered().len(), 20);
    }

    #[tokio::test]
    async fn test_simulated_full_failure_rate_never_delivers() {
        let transport = SimulatedTransport::seeded(Duration::ZERO, 1.0, 7);
        for _ in 0..5 {
            let result = transport.send(&make_submission("a@x.io")).await;
            assert!(matches!(result, Err(PostboxError::TransportFailed { .. })));
        }
        assert!(transport.outbox().delivered().is_empty());
    }

    #[tokio::test]
    async fn test_simulated_failures_reproduce_for_a_seed() {
        let outcomes = |seed| async move {
            let transport = SimulatedTransport::seeded(Duration::ZERO, 0.5, seed);
            let mut results = vec![];
            for _ in 0..32 {
                results.push(transport.send(&make_submission("a@x.io")).await.is_ok());
            }
            results
        };

        let first = outcomes(99).await;
        assert_eq!(first, outcomes(99).await);
        assert!(first.contains(&true) && first.contains(&false), "{first:?}");
    }

    #[tokio::test]
    async fn test_failure_rate_is_clamped() {
        let transport = SimulatedTransport::seeded(Duration::ZERO, 3.5, 1);
        assert!(transport.send(&make_submission("a@x.io")).await.is_err());

        let transport = SimulatedTransport::seeded(Duration::ZERO, -1.0, 1);
        assert!(transport.send(&make_submission("a@x.io")).await.is_ok());
    }

    /// NaN would make `gen_bool` panic; it is treated as a reliable network.
    #[tokio::test]
    async fn test_nan_failure_rate_never_fails() {
        let transport = SimulatedTransport::seeded(Duration::ZERO, f64::NAN, 1);
        for _ in 0..10 {
            assert!(transport.send(&make_submission("a@x.io")).await.is_ok());
        }
        assert_eq!(transport.outbox().delivered().len(), 10);

        let transport = SimulatedTransport::seeded(Duration::ZERO, f64::INFINITY, 1);
        assert!(transport.send(&make_submission("a@x.io")).await.is_err());
    }
}
