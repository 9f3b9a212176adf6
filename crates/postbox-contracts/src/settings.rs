//! Controller settings.
//!
//! Loaded from the `[form]` table of a Postbox TOML document, or taken from
//! `FormSettings::default()` when absent. Every field has a default so a
//! partial table is enough.

use serde::{Deserialize, Serialize};

use crate::{form::names, notify::CharCountLevel};

/// Tunables and fixed message strings for the submission controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormSettings {
    /// Name of the field holding the captcha answer. Never rule-validated.
    pub captcha_field: String,

    /// Name of the textarea whose length drives the character counter.
    pub message_field: String,

    /// Seconds a notification stays visible.
    pub notification_secs: u64,

    /// Counter turns `Warning` above this many characters.
    pub char_warning_above: usize,

    /// Counter turns `Critical` above this many characters.
    pub char_critical_above: usize,

    pub captcha_mismatch_message: String,
    pub submit_invalid_message: String,
    pub preview_invalid_message: String,
    pub send_failed_message: String,
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            captcha_field: names::CAPTCHA_ANSWER.to_string(),
            message_field: names::MESSAGE.to_string(),
            notification_secs: 5,
            char_warning_above: 800,
            char_critical_above: 900,
            captcha_mismatch_message: "The captcha answer is incorrect".to_string(),
            submit_invalid_message: "Please correct the errors in the form".to_string(),
            preview_invalid_message: "Please correct the errors before previewing".to_string(),
            send_failed_message: "The message could not be sent. Please try again.".to_string(),
        }
    }
}

impl FormSettings {
    /// Counter band for a message of `count` characters.
    pub fn char_level(&self, count: usize) -> CharCountLevel {
        if count > self.char_critical_above {
            CharCountLevel::Critical
        } else if count > self.char_warning_above {
            CharCountLevel::Warning
        } else {
            CharCountLevel::Normal
        }
    }
}
