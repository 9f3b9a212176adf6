//! Captcha challenge type.

use serde::{Deserialize, Serialize};

/// The live captcha question and its expected answer.
///
/// Exactly one challenge is live per controller. Generating a new one
/// invalidates the previous answer immediately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptchaChallenge {
    /// Human-readable question, e.g. "What is 3 + 4?".
    pub question: String,
    pub answer: i64,
}

impl CaptchaChallenge {
    pub fn new(question: impl Into<String>, answer: i64) -> Self {
        Self {
            question: question.into(),
            answer,
        }
    }
}
