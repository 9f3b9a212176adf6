//! Error types for the Postbox controller.
//!
//! Field validation failures are NOT errors: they are `ValidationVerdict`
//! values returned to the caller. `PostboxError` covers configuration
//! problems, API misuse, and transport failures caught at the controller.

use thiserror::Error;

/// The unified error type for the Postbox crates.
#[derive(Debug, Error)]
pub enum PostboxError {
    /// A rule set or settings document is missing, malformed, or inconsistent.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// A field rule declared a pattern that does not compile.
    #[error("invalid pattern for field '{field}': {reason}")]
    InvalidPattern { field: String, reason: String },

    /// An operation was requested from a state that does not allow it.
    #[error("cannot {action} while {state}")]
    IllegalTransition { action: String, state: String },

    /// The submission transport reported a failure.
    #[error("submission transport failed: {reason}")]
    TransportFailed { reason: String },

    /// The controller's state lock was poisoned by a panicking collaborator.
    #[error("controller state lock poisoned: {reason}")]
    StateLockPoisoned { reason: String },
}

/// Convenience alias used throughout the Postbox crates.
pub type PostboxResult<T> = Result<T, PostboxError>;
