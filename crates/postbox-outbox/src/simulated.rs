//! A stand-in for a real network: fixed latency and random failures.
//!
//! The failure draw uses an injected RNG, so a seeded generator gives a
//! reproducible run. Successful sends are handed to an `InMemoryOutbox`.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use rand::{rngs::StdRng, Rng, RngCore, SeedableRng};
use tracing::{debug, warn};

use postbox_contracts::{
    error::{PostboxError, PostboxResult},
    submission::Submission,
};
use postbox_core::traits::Transport;

use crate::memory::InMemoryOutbox;

/// Default simulated latency.
pub const DEFAULT_LATENCY: Duration = Duration::from_millis(2000);

/// Default probability that a send fails.
pub const DEFAULT_FAILURE_RATE: f64 = 0.1;

pub struct SimulatedTransport<R: RngCore + Send> {
    latency: Duration,
    failure_rate: f64,
    rng: Mutex<R>,
    outbox: InMemoryOutbox,
}

impl SimulatedTransport<StdRng> {
    /// Reproducible failures for a given seed.
    pub fn seeded(latency: Duration, failure_rate: f64, seed: u64) -> Self {
        Self::new(latency, failure_rate, StdRng::seed_from_u64(seed))
    }
}

impl<R: RngCore + Send> SimulatedTransport<R> {
    /// `failure_rate` is clamped to `0.0..=1.0`; NaN means never fail.
    pub fn new(latency: Duration, failure_rate: f64, rng: R) -> Self {
        let failure_rate = if failure_rate.is_nan() {
            0.0
        } else {
            failure_rate.clamp(0.0, 1.0)
        };
        Self {
            latency,
            failure_rate,
            rng: Mutex::new(rng),
            outbox: InMemoryOutbox::new(),
        }
    }

    /// Where successful sends end up.
    pub fn outbox(&self) -> InMemoryOutbox {
        self.outbox.clone()
    }
}

#[async_trait]
impl<R: RngCore + Send> Transport for SimulatedTransport<R> {
    async fn send(&self, submission: &Submission) -> PostboxResult<()> {
        let fail = {
            let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
            rng.gen_bool(self.failure_rate)
        };

        debug!(
            attempt_id = %submission.attempt_id,
            latency_ms = self.latency.as_millis() as u64,
            "simulating network latency"
        );
        tokio::time::sleep(self.latency).await;

        if fail {
            warn!(attempt_id = %submission.attempt_id, "simulated network error");
            return Err(PostboxError::TransportFailed {
                reason: "network error".to_string(),
            });
        }
        self.outbox.send(submission).await
    }
}
