//! Fictional form contents used by the demo scenarios.

use postbox_contracts::form::{names, FormSnapshot};

/// A complete, valid submission. The captcha answer is left blank.
pub fn valid_contact() -> FormSnapshot {
    FormSnapshot::new()
        .with(names::FIRST_NAME, "Marie")
        .with(names::LAST_NAME, "Curie")
        .with(names::EMAIL, "marie.curie@example.org")
        .with(names::PHONE, "+33 1 23 45 67 89")
        .with(names::COMPANY, "Institut du Radium")
        .with(names::SUBJECT, "Laboratory equipment")
        .with(names::PRIORITY, "high")
        .with(
            names::MESSAGE,
            "Could you send a quote for two electrometers and a piezoelectric quartz balance?",
        )
        .with(names::NEWSLETTER, false)
        .with(names::PRIVACY, true)
        .with(names::CAPTCHA_ANSWER, "")
}

/// Three field failures: name too short, malformed email, message too short.
pub fn invalid_contact() -> FormSnapshot {
    FormSnapshot::new()
        .with(names::FIRST_NAME, "A")
        .with(names::EMAIL, "not-an-email")
        .with(names::MESSAGE, "short")
}
