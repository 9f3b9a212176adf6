//! Submission lifecycle types and the payloads emitted to the surface.
//!
//! `SubmissionState` is the controller's state machine position.
//! `Submission` is what the transport receives. `PreviewPayload` and
//! `SuccessPayload` are handed to the rendering surface for display.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{form::FormSnapshot, validation::FormReport};

/// Where the controller currently sits.
///
/// `Submitting` is exclusive: while it holds, further confirms are ignored.
/// Success and failure both return to `Idle`; the form is reusable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmissionState {
    #[default]
    Idle,
    Previewing,
    Submitting,
}

impl fmt::Display for SubmissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SubmissionState::Idle => "idle",
            SubmissionState::Previewing => "previewing",
            SubmissionState::Submitting => "submitting",
        };
        f.write_str(name)
    }
}

/// Identifier for one confirmed send.
///
/// Doubles as the idempotency key: a transport that sees the same attempt
/// twice must deliver it once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttemptId(pub uuid::Uuid);

impl AttemptId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for AttemptId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Time-based message identifier shown to the user after a send,
/// e.g. `MSG-1718000000000`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl MessageId {
    pub fn from_millis(millis: i64) -> Self {
        Self(format!("MSG-{millis}"))
    }

    /// The millisecond stamp encoded in the id, if it is well-formed.
    pub fn millis(&self) -> Option<i64> {
        self.0.strip_prefix("MSG-")?.parse().ok()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The payload handed to the transport for one confirmed submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub attempt_id: AttemptId,
    /// The snapshot the user confirmed in the preview.
    pub fields: FormSnapshot,
    pub submitted_at: DateTime<Utc>,
}

/// Personal-information block of the preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalInfo {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
}

/// Message block of the preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDetails {
    pub subject: String,
    /// Display label for the selected priority, if one was chosen.
    pub priority: Option<String>,
    pub body: String,
    pub newsletter: bool,
    pub privacy_accepted: bool,
}

/// Everything the surface needs to render the confirmation preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewPayload {
    pub personal: PersonalInfo,
    pub message: MessageDetails,
}

/// Confirmation details shown after a successful send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessPayload {
    pub recipient_email: String,
    pub subject: String,
    pub sent_at: DateTime<Utc>,
    pub message_id: MessageId,
}

/// What `request_preview` / `handle_submit` did.
#[derive(Debug, Clone, PartialEq)]
pub enum PreviewOutcome {
    /// The form was valid; the controller is now `Previewing`.
    Shown(PreviewPayload),
    /// Validation failed; the controller is `Idle`.
    Rejected {
        report: FormReport,
        /// First invalid field in form order, the one the surface scrolled to.
        first_error: Option<String>,
    },
    /// A submission is in flight; nothing happened.
    Ignored,
}

/// What `confirm_submit` did.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The transport accepted the submission and the form was reset.
    Sent {
        receipt: SuccessPayload,
        snapshot: FormSnapshot,
    },
    /// The transport failed. Field values are untouched so the user can retry.
    Failed { reason: String },
    /// Another submission was already in flight; no send happened.
    Ignored,
    /// The form was reset while the send was pending; the result was dropped.
    Superseded,
}
