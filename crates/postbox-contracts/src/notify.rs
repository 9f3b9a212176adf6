//! Notification and field-marker types passed to the rendering surface.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Notification severity, mapped by the surface to icon and colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Warning,
    Error,
    Info,
}

/// Identifies one showing of a notification.
///
/// Tokens increase monotonically per controller. Only the most recent token
/// may dismiss the notification; older timers expiring do nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NotificationToken(pub u64);

/// A form-wide, auto-dismissing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub token: NotificationToken,
    pub text: String,
    pub severity: Severity,
    /// How long the surface should keep it visible before dismissing.
    pub display_for: Duration,
}

/// Validity marker on a field control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldMark {
    Valid,
    Invalid,
    /// Empty fields carry no marker.
    Neutral,
}

/// Colour band of the message character counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CharCountLevel {
    Normal,
    Warning,
    Critical,
}
