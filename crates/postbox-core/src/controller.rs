//! The submission controller: the single-flight form state machine.
//!
//! ```text
//!   Idle ──request_preview (valid)──▶ Previewing ──confirm_submit──▶ Submitting
//!    ▲  ◀──cancel_preview / reset───────┘                                │
//!    └──────────────── send succeeded (form reset) / send failed ────────┘
//! ```
//!
//! The state lives behind a `Mutex` that is never held across the one
//! suspension point, `Transport::send().await`. While that send is pending
//! the phase is pinned at `Submitting`, so a second `confirm_submit()` sees
//! it and returns `SubmitOutcome::Ignored` without touching the transport.
//!
//! Every visible effect goes through the `RenderingSurface`; the controller
//! itself never formats markup or starts timers.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};

use postbox_contracts::{
    captcha::CaptchaChallenge,
    error::{PostboxError, PostboxResult},
    form::{names, FieldValue, FormSnapshot},
    notify::{FieldMark, Notification, NotificationToken, Severity},
    settings::FormSettings,
    submission::{
        AttemptId, PreviewOutcome, SubmissionState, Submission, SubmitOutcome, SuccessPayload,
    },
    validation::{FormReport, ValidationVerdict},
};

use crate::{
    payload::{preview_from_snapshot, MessageIdSequence},
    traits::{CaptchaCheck, ChallengeSource, RenderingSurface, Transport, Validator},
};

// ── Internal state ───────────────────────────────────────────────────────────

/// Phase plus whatever data only exists in that phase.
#[derive(Debug)]
enum Phase {
    Idle,
    Previewing { snapshot: FormSnapshot },
    Submitting { attempt: AttemptId },
}

impl Phase {
    fn state(&self) -> SubmissionState {
        match self {
            Phase::Idle => SubmissionState::Idle,
            Phase::Previewing { .. } => SubmissionState::Previewing,
            Phase::Submitting { .. } => SubmissionState::Submitting,
        }
    }
}

struct ControllerState {
    phase: Phase,
    challenge: CaptchaChallenge,
    message_ids: MessageIdSequence,
    notification_seq: u64,
    visible_notification: Option<NotificationToken>,
}

// ── Controller ───────────────────────────────────────────────────────────────

/// Drives one contact form from first keystroke to sent message.
///
/// Construct one controller per form. Methods take `&self`, so the
/// controller can be shared (e.g. behind an `Arc`) between the event loop
/// and the task awaiting the transport.
pub struct SubmissionController {
    validator: Box<dyn Validator>,
    surface: Box<dyn RenderingSurface>,
    transport: Box<dyn Transport>,
    challenges: Box<dyn ChallengeSource>,
    settings: FormSettings,
    inner: Mutex<ControllerState>,
    /// Copy of `inner.phase.state()`, readable while `inner` is held.
    current_state: Mutex<SubmissionState>,
}

impl SubmissionController {
    /// Wire the collaborators and perform the initial load: the first
    /// challenge is generated and shown, and the character counter is drawn.
    pub fn new(
        validator: Box<dyn Validator>,
        surface: Box<dyn RenderingSurface>,
        transport: Box<dyn Transport>,
        challenges: Box<dyn ChallengeSource>,
        settings: FormSettings,
    ) -> Self {
        let challenge = challenges.next_challenge();
        surface.show_captcha(&challenge.question);

        let controller = Self {
            validator,
            surface,
            transport,
            challenges,
            settings,
            inner: Mutex::new(ControllerState {
                phase: Phase::Idle,
                challenge,
                message_ids: MessageIdSequence::default(),
                notification_seq: 0,
                visible_notification: None,
            }),
            current_state: Mutex::new(SubmissionState::Idle),
        };
        controller.refresh_char_count();
        controller
    }

    fn lock(&self) -> PostboxResult<MutexGuard<'_, ControllerState>> {
        self.inner.lock().map_err(|e| PostboxError::StateLockPoisoned {
            reason: e.to_string(),
        })
    }

    // ── Accessors ────────────────────────────────────────────────────────────

    /// Does not take the main state lock, so it is safe to call from any
    /// `RenderingSurface` callback.
    pub fn state(&self) -> PostboxResult<SubmissionState> {
        let state = self
            .current_state
            .lock()
            .map_err(|e| PostboxError::StateLockPoisoned {
                reason: e.to_string(),
            })?;
        Ok(*state)
    }

    /// The live challenge. Hosts that render the question themselves read it here.
    pub fn current_challenge(&self) -> PostboxResult<CaptchaChallenge> {
        Ok(self.lock()?.challenge.clone())
    }

    /// The snapshot awaiting confirmation, if the controller is `Previewing`.
    pub fn preview_snapshot(&self) -> PostboxResult<Option<FormSnapshot>> {
        Ok(match &self.lock()?.phase {
            Phase::Previewing { snapshot } => Some(snapshot.clone()),
            _ => None,
        })
    }

    pub fn settings(&self) -> &FormSettings {
        &self.settings
    }

    // ── Field events ─────────────────────────────────────────────────────────

    /// A field lost focus: validate it and update its error text and marker.
    ///
    /// The captcha field is checked against the live challenge once the
    /// user has typed something; a blank answer is left unmarked.
    pub fn on_field_blur(&self, field: &str) -> PostboxResult<ValidationVerdict> {
        let value = self
            .surface
            .read_field(field)
            .unwrap_or_else(|| FieldValue::text(""));

        let verdict = if field == self.settings.captcha_field {
            if value.is_blank() {
                ValidationVerdict::pass()
            } else {
                let inner = self.lock()?;
                self.validator
                    .check_captcha(value.as_text(), &self.captcha_check(&inner.challenge))
            }
        } else if self.validator.constrains(field) {
            self.validator.validate_value(field, &value)
        } else {
            return Ok(ValidationVerdict::pass());
        };

        debug!(field, valid = verdict.valid, "field validated on blur");
        self.render_verdict(field, value.is_blank(), &verdict);
        Ok(verdict)
    }

    /// The user typed into a field: hide its stale error message.
    pub fn on_field_input(&self, field: &str) {
        self.surface.clear_field_error(field);
        if field == self.settings.message_field {
            self.refresh_char_count();
        }
    }

    /// Redraw the message character counter from the current message value.
    pub fn refresh_char_count(&self) {
        let count = self
            .surface
            .read_field(&self.settings.message_field)
            .map(|v| v.as_text().chars().count())
            .unwrap_or(0);
        self.surface
            .set_char_count(count, self.settings.char_level(count));
    }

    // ── Preview ──────────────────────────────────────────────────────────────

    /// The preview button: validate everything and, if clean, show the preview.
    pub fn request_preview(&self) -> PostboxResult<PreviewOutcome> {
        self.preview_with(&self.settings.preview_invalid_message)
    }

    /// The form's own submit event. Same as `request_preview` but with the
    /// submit-specific warning text.
    pub fn handle_submit(&self) -> PostboxResult<PreviewOutcome> {
        self.preview_with(&self.settings.submit_invalid_message)
    }

    fn preview_with(&self, invalid_message: &str) -> PostboxResult<PreviewOutcome> {
        let mut inner = self.lock()?;

        if let Phase::Submitting { attempt } = &inner.phase {
            debug!(attempt_id = %attempt, "preview ignored: submission in flight");
            return Ok(PreviewOutcome::Ignored);
        }

        let snapshot = self.surface.read_fields();
        let report = self
            .validator
            .validate_form(&snapshot, &self.captcha_check(&inner.challenge));
        self.render_report(&snapshot, &report);

        if !report.valid {
            let first_error = self.first_invalid_field(&snapshot, &report);
            let failure_count = report.failures().count() + usize::from(!report.captcha.valid);
            warn!(
                failures = failure_count,
                first_error = first_error.as_deref().unwrap_or("-"),
                "preview rejected: form has validation errors"
            );

            if matches!(inner.phase, Phase::Previewing { .. }) {
                self.surface.hide_preview();
            }
            self.set_phase(&mut inner, Phase::Idle);
            self.notify_locked(&mut inner, invalid_message, Severity::Warning);
            if let Some(field) = &first_error {
                self.surface.scroll_to_field(field);
            }
            return Ok(PreviewOutcome::Rejected {
                report,
                first_error,
            });
        }

        let preview = preview_from_snapshot(&snapshot);
        info!(fields = snapshot.len(), "form valid, showing preview");
        self.set_phase(&mut inner, Phase::Previewing { snapshot });
        self.surface.show_preview(&preview);
        Ok(PreviewOutcome::Shown(preview))
    }

    /// Close the preview and go back to editing. Fields are left as they are.
    ///
    /// A no-op when idle. Not allowed while a submission is in flight.
    pub fn cancel_preview(&self) -> PostboxResult<()> {
        let mut inner = self.lock()?;
        match inner.phase.state() {
            SubmissionState::Idle => Ok(()),
            SubmissionState::Previewing => {
                self.surface.hide_preview();
                self.set_phase(&mut inner, Phase::Idle);
                debug!("preview cancelled");
                Ok(())
            }
            state @ SubmissionState::Submitting => Err(PostboxError::IllegalTransition {
                action: "cancel the preview".to_string(),
                state: state.to_string(),
            }),
        }
    }

    // ── Submission ───────────────────────────────────────────────────────────

    /// Send the previewed snapshot.
    ///
    /// Exactly one `Transport::send` happens per confirmed preview. A call
    /// made while another send is pending returns `SubmitOutcome::Ignored`.
    /// Transport failures are converted into an error notification and
    /// `SubmitOutcome::Failed`; they never escape as `Err`.
    ///
    /// # Errors
    ///
    /// `IllegalTransition` when there is no preview to confirm, and
    /// `StateLockPoisoned` if a collaborator panicked mid-transition.
    pub async fn confirm_submit(&self) -> PostboxResult<SubmitOutcome> {
        let submission = {
            let mut inner = self.lock()?;
            let snapshot = match &inner.phase {
                Phase::Submitting { attempt } => {
                    debug!(attempt_id = %attempt, "confirm ignored: submission already in flight");
                    return Ok(SubmitOutcome::Ignored);
                }
                Phase::Idle => {
                    return Err(PostboxError::IllegalTransition {
                        action: "confirm a submission".to_string(),
                        state: SubmissionState::Idle.to_string(),
                    });
                }
                Phase::Previewing { snapshot } => snapshot.clone(),
            };

            let attempt = AttemptId::new();
            self.surface.hide_preview();
            self.surface.set_submit_busy(true);
            self.set_phase(&mut inner, Phase::Submitting { attempt });
            info!(attempt_id = %attempt, "submission started");

            Submission {
                attempt_id: attempt,
                fields: snapshot,
                submitted_at: Utc::now(),
            }
        };

        let result = self.transport.send(&submission).await;

        let mut inner = self.lock()?;
        let still_current = matches!(
            inner.phase,
            Phase::Submitting { attempt } if attempt == submission.attempt_id
        );
        if !still_current {
            warn!(
                attempt_id = %submission.attempt_id,
                succeeded = result.is_ok(),
                "submission completed after the form was reset; result discarded"
            );
            return Ok(SubmitOutcome::Superseded);
        }

        self.surface.set_submit_busy(false);
        self.set_phase(&mut inner, Phase::Idle);

        match result {
            Ok(()) => {
                let now = Utc::now();
                let receipt = SuccessPayload {
                    recipient_email: submission.fields.text(names::EMAIL).to_string(),
                    subject: submission.fields.text(names::SUBJECT).to_string(),
                    sent_at: now,
                    message_id: inner.message_ids.next(now.timestamp_millis()),
                };
                info!(
                    attempt_id = %submission.attempt_id,
                    message_id = %receipt.message_id,
                    "submission sent"
                );
                self.surface.show_success(&receipt);
                self.reset_locked(&mut inner);
                Ok(SubmitOutcome::Sent {
                    receipt,
                    snapshot: submission.fields,
                })
            }
            Err(e) => {
                warn!(
                    attempt_id = %submission.attempt_id,
                    error = %e,
                    "submission failed; form left intact for retry"
                );
                self.notify_locked(&mut inner, &self.settings.send_failed_message, Severity::Error);
                Ok(SubmitOutcome::Failed {
                    reason: e.to_string(),
                })
            }
        }
    }

    // ── Reset & captcha ──────────────────────────────────────────────────────

    /// Return to a blank form: `Idle`, no snapshot, no markers, new challenge.
    ///
    /// Allowed from any state. A send that is still pending keeps running;
    /// its result is discarded when it arrives.
    pub fn reset(&self) -> PostboxResult<()> {
        let mut inner = self.lock()?;
        self.reset_locked(&mut inner);
        Ok(())
    }

    /// Close the success panel and start over ("send another").
    pub fn acknowledge_success(&self) -> PostboxResult<()> {
        self.surface.hide_success();
        self.reset()
    }

    /// Replace the challenge. The previous answer stops being accepted.
    pub fn refresh_captcha(&self) -> PostboxResult<()> {
        let mut inner = self.lock()?;
        self.regenerate_challenge(&mut inner);
        Ok(())
    }

    fn reset_locked(&self, inner: &mut ControllerState) {
        let fields = self.surface.read_fields();
        self.surface.clear_fields();
        for field in fields.iter() {
            self.surface.clear_field_error(&field.name);
            self.surface.mark_field(&field.name, FieldMark::Neutral);
        }
        self.surface.hide_preview();
        self.surface.set_submit_busy(false);
        self.set_phase(inner, Phase::Idle);
        self.regenerate_challenge(inner);
        self.refresh_char_count();
        info!("form reset");
    }

    fn regenerate_challenge(&self, inner: &mut ControllerState) {
        inner.challenge = self.challenges.next_challenge();
        let field = &self.settings.captcha_field;
        self.surface.show_captcha(&inner.challenge.question);
        self.surface.clear_field(field);
        self.surface.clear_field_error(field);
        self.surface.mark_field(field, FieldMark::Neutral);
        debug!("captcha challenge regenerated");
    }

    // ── Notifications ────────────────────────────────────────────────────────

    /// Show a form-wide notification, replacing any visible one.
    pub fn notify(&self, text: &str, severity: Severity) -> PostboxResult<NotificationToken> {
        let mut inner = self.lock()?;
        Ok(self.notify_locked(&mut inner, text, severity))
    }

    /// Auto-dismiss hook. Hides the notification only if `token` is still the
    /// one on screen; returns whether anything was hidden.
    pub fn dismiss_notification(&self, token: NotificationToken) -> PostboxResult<bool> {
        let mut inner = self.lock()?;
        if inner.visible_notification != Some(token) {
            debug!(token = token.0, "stale notification timer ignored");
            return Ok(false);
        }
        inner.visible_notification = None;
        self.surface.hide_notification();
        Ok(true)
    }

    fn notify_locked(
        &self,
        inner: &mut ControllerState,
        text: &str,
        severity: Severity,
    ) -> NotificationToken {
        inner.notification_seq += 1;
        let token = NotificationToken(inner.notification_seq);
        inner.visible_notification = Some(token);
        self.surface.show_notification(&Notification {
            token,
            text: text.to_string(),
            severity,
            display_for: Duration::from_secs(self.settings.notification_secs),
        });
        token
    }

    // ── Rendering helpers ────────────────────────────────────────────────────

    fn captcha_check<'a>(&'a self, challenge: &'a CaptchaChallenge) -> CaptchaCheck<'a> {
        CaptchaCheck {
            field: &self.settings.captcha_field,
            challenge,
            mismatch_message: &self.settings.captcha_mismatch_message,
        }
    }

    fn set_phase(&self, inner: &mut ControllerState, phase: Phase) {
        let state = phase.state();
        inner.phase = phase;
        *self.current_state.lock().unwrap_or_else(|e| e.into_inner()) = state;
        self.surface.state_changed(state);
    }

    fn render_verdict(&self, field: &str, blank: bool, verdict: &ValidationVerdict) {
        if verdict.valid {
            self.surface.clear_field_error(field);
        } else {
            self.surface.show_field_error(field, &verdict.message);
        }
        let mark = match (blank, verdict.valid) {
            (true, _) => FieldMark::Neutral,
            (false, true) => FieldMark::Valid,
            (false, false) => FieldMark::Invalid,
        };
        self.surface.mark_field(field, mark);
    }

    fn render_report(&self, snapshot: &FormSnapshot, report: &FormReport) {
        for entry in &report.fields {
            if !self.validator.constrains(&entry.field) {
                continue;
            }
            let blank = snapshot.get(&entry.field).map_or(true, FieldValue::is_blank);
            self.render_verdict(&entry.field, blank, &entry.verdict);
        }
        let captcha_field = &self.settings.captcha_field;
        let blank = snapshot.get(captcha_field).map_or(true, FieldValue::is_blank);
        self.render_verdict(captcha_field, blank, &report.captcha);
    }

    /// First invalid field in form order. The captcha counts at its position
    /// in the snapshot, or last when the form has no captcha control.
    fn first_invalid_field(&self, snapshot: &FormSnapshot, report: &FormReport) -> Option<String> {
        let captcha_field = &self.settings.captcha_field;
        snapshot
            .iter()
            .map(|f| f.name.as_str())
            .find(|name| {
                if *name == captcha_field.as_str() {
                    !report.captcha.valid
                } else {
                    report.verdict(name).is_some_and(|v| !v.valid)
                }
            })
            .map(str::to_string)
            .or_else(|| (!report.captcha.valid).then(|| captcha_field.clone()))
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
