//! Collaborator traits for the submission controller.
//!
//! These four traits are the complete boundary between the headless
//! controller and the outside world:
//!
//! - `Validator`        — field rules and the captcha check
//! - `RenderingSurface` — every visible side effect (errors, panels, notices)
//! - `Transport`        — the asynchronous send
//! - `ChallengeSource`  — fresh captcha challenges
//!
//! The controller owns one boxed implementation of each. Tests substitute
//! recording mocks; the demo wires a console surface and a simulated network.

use async_trait::async_trait;

use postbox_contracts::{
    captcha::CaptchaChallenge,
    error::PostboxResult,
    form::{FieldValue, FormSnapshot},
    notify::{CharCountLevel, FieldMark, Notification},
    submission::{PreviewPayload, SubmissionState, Submission, SuccessPayload},
    validation::{FormReport, ValidationVerdict},
};

/// How the captcha answer in a snapshot is checked during full-form validation.
#[derive(Debug, Clone, Copy)]
pub struct CaptchaCheck<'a> {
    /// Snapshot field holding the user's answer. Excluded from rule evaluation.
    pub field: &'a str,
    /// The live challenge.
    pub challenge: &'a CaptchaChallenge,
    /// Message reported when the answer is missing or wrong.
    pub mismatch_message: &'a str,
}

/// The field validation engine.
///
/// Implementations must be pure: same rules, same input, same verdict.
/// Validation problems are returned as verdicts and never as errors.
pub trait Validator: Send + Sync {
    /// Check one raw value against the rule for `field`.
    ///
    /// Fields without a rule are always valid.
    fn validate_field(&self, field: &str, raw: &str) -> ValidationVerdict;

    /// Whether any rule applies to `field`. Unconstrained fields pass every
    /// check and the controller leaves their markers alone.
    fn constrains(&self, _field: &str) -> bool {
        true
    }

    /// Check a typed value; checkboxes read as `"on"` or `""`.
    fn validate_value(&self, field: &str, value: &FieldValue) -> ValidationVerdict {
        self.validate_field(field, value.as_text())
    }

    /// Check a captcha answer against the live challenge.
    fn check_captcha(&self, answer: &str, captcha: &CaptchaCheck<'_>) -> ValidationVerdict;

    /// Validate every field in `snapshot` plus the captcha answer.
    fn validate_form(&self, snapshot: &FormSnapshot, captcha: &CaptchaCheck<'_>) -> FormReport;
}

/// The display layer the controller drives.
///
/// Every method is a fire-and-forget side effect except the two readers.
/// Implementations use interior mutability; the controller only holds `&self`.
///
/// Callbacks run while the controller holds its state lock. Apart from
/// `SubmissionController::state()`, a callback must not call back into the
/// controller synchronously; queue such calls on the host's event loop.
pub trait RenderingSurface: Send + Sync {
    /// All form fields with their current values, in form order.
    fn read_fields(&self) -> FormSnapshot;

    /// Current value of one field, `None` if the form has no such field.
    fn read_field(&self, field: &str) -> Option<FieldValue>;

    fn show_field_error(&self, field: &str, message: &str);

    fn clear_field_error(&self, field: &str);

    fn mark_field(&self, field: &str, mark: FieldMark);

    /// Blank every field value, as a native form reset does.
    fn clear_fields(&self);

    fn clear_field(&self, field: &str);

    fn scroll_to_field(&self, field: &str);

    /// Disable the submit control and show the loading indicator (or undo both).
    fn set_submit_busy(&self, busy: bool);

    fn show_preview(&self, preview: &PreviewPayload);

    fn hide_preview(&self);

    fn show_success(&self, receipt: &SuccessPayload);

    fn hide_success(&self);

    fn show_captcha(&self, question: &str);

    /// Show `notification`, replacing whatever notification is visible.
    ///
    /// The surface should arrange for `SubmissionController::dismiss_notification`
    /// to be called with the notification's token after `display_for`.
    fn show_notification(&self, notification: &Notification);

    fn hide_notification(&self);

    fn set_char_count(&self, count: usize, level: CharCountLevel);

    /// Called after every controller transition. Default: ignore.
    fn state_changed(&self, _state: SubmissionState) {}
}

/// The submission channel.
///
/// Called at most once per confirmed preview. The controller never retries;
/// a failed send requires the user to confirm again, which produces a new
/// `AttemptId`. Implementations should treat a repeated `attempt_id` as a
/// duplicate and deliver it once.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, submission: &Submission) -> PostboxResult<()>;
}

/// Produces captcha challenges.
pub trait ChallengeSource: Send + Sync {
    fn next_challenge(&self) -> CaptchaChallenge;
}
