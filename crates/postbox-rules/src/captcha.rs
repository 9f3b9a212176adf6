//! Random arithmetic captcha challenges.
//!
//! Each challenge draws two operands in `1..=10` and one of `+`, `-`, `×`.
//! Subtraction always puts the larger operand first so answers stay
//! non-negative.

use std::sync::Mutex;

use rand::{rngs::StdRng, Rng, RngCore, SeedableRng};
use tracing::debug;

use postbox_contracts::captcha::CaptchaChallenge;
use postbox_core::traits::ChallengeSource;

/// A `ChallengeSource` backed by an injected random number generator.
///
/// Pass a seeded RNG for reproducible challenge sequences.
pub struct ArithmeticChallenges<R: RngCore + Send> {
    rng: Mutex<R>,
}

impl ArithmeticChallenges<StdRng> {
    /// Challenges seeded from the operating system's entropy source.
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// Reproducible challenges for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: RngCore + Send> ArithmeticChallenges<R> {
    pub fn new(rng: R) -> Self {
        Self { rng: Mutex::new(rng) }
    }
}

/// Build the challenge for two operands and an operator index (0 `+`, 1 `-`, 2 `×`).
pub fn arithmetic_challenge(a: i64, b: i64, op: u8) -> CaptchaChallenge {
    let (expr, answer) = match op % 3 {
        0 => (format!("{a} + {b}"), a + b),
        1 => {
            let (hi, lo) = (a.max(b), a.min(b));
            (format!("{hi} - {lo}"), hi - lo)
        }
        _ => (format!("{a} × {b}"), a * b),
    };
    CaptchaChallenge::new(format!("What is {expr}?"), answer)
}

impl<R: RngCore + Send> ChallengeSource for ArithmeticChallenges<R> {
    fn next_challenge(&self) -> CaptchaChallenge {
        // A poisoned RNG is still a usable RNG.
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        let a = rng.gen_range(1..=10);
        let b = rng.gen_range(1..=10);
        let op = rng.gen_range(0..3u8);
        drop(rng);

        let challenge = arithmetic_challenge(a, b, op);
        debug!(question = %challenge.question, "captcha challenge generated");
        challenge
    }
}
