//! A `RenderingSurface` that prints to stdout.
//!
//! Field values live in a shared `FormSnapshot`; scenarios "type" into the
//! form through a cloned handle while the controller owns a boxed copy.

use std::sync::{Arc, Mutex, MutexGuard};

use postbox_contracts::{
    form::{FieldValue, FormSnapshot},
    notify::{CharCountLevel, FieldMark, Notification},
    submission::{PreviewPayload, SubmissionState, SuccessPayload},
};
use postbox_core::traits::RenderingSurface;

#[derive(Clone, Default)]
pub struct ConsoleSurface {
    fields: Arc<Mutex<FormSnapshot>>,
    /// Suppresses marker and counter chatter; errors and panels still print.
    quiet: bool,
}

impl ConsoleSurface {
    pub fn new(quiet: bool) -> Self {
        Self {
            fields: Arc::default(),
            quiet,
        }
    }

    /// Replace every field value, as if the user filled the whole form.
    pub fn fill(&self, snapshot: FormSnapshot) {
        *self.fields() = snapshot;
    }

    pub fn type_into(&self, field: &str, value: impl Into<FieldValue>) {
        self.fields().set(field, value);
    }

    pub fn snapshot(&self) -> FormSnapshot {
        self.fields().clone()
    }

    fn fields(&self) -> MutexGuard<'_, FormSnapshot> {
        self.fields.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl RenderingSurface for ConsoleSurface {
    fn read_fields(&self) -> FormSnapshot {
        self.snapshot()
    }

    fn read_field(&self, field: &str) -> Option<FieldValue> {
        self.fields().get(field).cloned()
    }

    fn show_field_error(&self, field: &str, message: &str) {
        println!("    ✗ {:<14} {}", field, message);
    }

    fn clear_field_error(&self, _field: &str) {}

    fn mark_field(&self, field: &str, mark: FieldMark) {
        if !self.quiet && mark == FieldMark::Valid {
            println!("    ✓ {}", field);
        }
    }

    fn clear_fields(&self) {
        let mut fields = self.fields();
        *fields = fields.cleared();
    }

    fn clear_field(&self, field: &str) {
        let mut fields = self.fields();
        let blank = match fields.get(field) {
            Some(FieldValue::Checked(_)) => FieldValue::Checked(false),
            _ => FieldValue::Text(String::new()),
        };
        fields.set(field, blank);
    }

    fn scroll_to_field(&self, field: &str) {
        println!("    → focus {}", field);
    }

    fn set_submit_busy(&self, busy: bool) {
        if busy {
            println!("  [Sending...]");
        }
    }

    fn show_preview(&self, preview: &PreviewPayload) {
        let personal = &preview.personal;
        let message = &preview.message;
        println!("  ┌─ Preview ─────────────────────────────────────");
        println!("  │ Name:       {}", personal.full_name);
        println!("  │ Email:      {}", personal.email);
        if let Some(phone) = &personal.phone {
            println!("  │ Phone:      {}", phone);
        }
        if let Some(company) = &personal.company {
            println!("  │ Company:    {}", company);
        }
        println!("  │ Subject:    {}", message.subject);
        if let Some(priority) = &message.priority {
            println!("  │ Priority:   {}", priority);
        }
        println!("  │ Newsletter: {}", if message.newsletter { "yes" } else { "no" });
        println!("  │ Message:    {}", message.body);
        println!("  └───────────────────────────────────────────────");
    }

    fn hide_preview(&self) {}

    fn show_success(&self, receipt: &SuccessPayload) {
        println!("  ┌─ Message sent ────────────────────────────────");
        println!("  │ To:         {}", receipt.recipient_email);
        println!("  │ Subject:    {}", receipt.subject);
        println!("  │ Sent at:    {}", receipt.sent_at.to_rfc3339());
        println!("  │ Message ID: {}", receipt.message_id);
        println!("  └───────────────────────────────────────────────");
    }

    fn hide_success(&self) {}

    fn show_captcha(&self, question: &str) {
        if !self.quiet {
            println!("  Captcha: {}", question);
        }
    }

    fn show_notification(&self, notification: &Notification) {
        println!(
            "  [{:?}] {} (dismiss in {}s)",
            notification.severity,
            notification.text,
            notification.display_for.as_secs()
        );
    }

    fn hide_notification(&self) {}

    fn set_char_count(&self, count: usize, level: CharCountLevel) {
        if !self.quiet && count > 0 {
            println!("  Characters: {} ({:?})", count, level);
        }
    }

    fn state_changed(&self, state: SubmissionState) {
        if !self.quiet {
            println!("  state → {}", state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_field_keeps_checkbox_type() {
        let surface = ConsoleSurface::new(true);
        surface.fill(
            FormSnapshot::new()
                .with("privacy", true)
                .with("captchaAnswer", "7"),
        );

        surface.clear_field("privacy");
        surface.clear_field("captchaAnswer");

        assert_eq!(surface.read_field("privacy"), Some(FieldValue::Checked(false)));
        assert_eq!(surface.read_field("captchaAnswer"), Some(FieldValue::Text(String::new())));
    }

    #[test]
    fn clones_share_field_values() {
        let surface = ConsoleSurface::new(true);
        let handle = surface.clone();
        handle.type_into("email", "m@c.fr");
        assert_eq!(surface.snapshot().text("email"), "m@c.fr");
    }
}
