//! Builders for the payloads the controller hands to the rendering surface.

use postbox_contracts::{
    form::{names, FormSnapshot},
    submission::{MessageDetails, MessageId, PersonalInfo, PreviewPayload},
};

/// Display label for a priority radio value. Unknown values pass through.
pub fn priority_label(value: &str) -> String {
    match value {
        "low" => "Low".to_string(),
        "medium" => "Medium".to_string(),
        "high" => "High".to_string(),
        "urgent" => "Urgent".to_string(),
        other => other.to_string(),
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Derive the preview from a validated snapshot.
///
/// Only derived display fields; the consumer does not re-run validation.
pub fn preview_from_snapshot(snapshot: &FormSnapshot) -> PreviewPayload {
    let first = snapshot.text(names::FIRST_NAME);
    let last = snapshot.text(names::LAST_NAME);
    let full_name = [first, last]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ");

    PreviewPayload {
        personal: PersonalInfo {
            full_name,
            email: snapshot.text(names::EMAIL).to_string(),
            phone: non_empty(snapshot.text(names::PHONE)),
            company: non_empty(snapshot.text(names::COMPANY)),
        },
        message: MessageDetails {
            subject: snapshot.text(names::SUBJECT).to_string(),
            priority: non_empty(snapshot.text(names::PRIORITY)).map(|p| priority_label(&p)),
            body: snapshot
                .get(names::MESSAGE)
                .map(|v| v.as_text().to_string())
                .unwrap_or_default(),
            newsletter: !snapshot.text(names::NEWSLETTER).is_empty(),
            privacy_accepted: !snapshot.text(names::PRIVACY).is_empty(),
        },
    }
}

/// Issues `MSG-<millis>` ids that strictly increase even when the clock
/// does not advance between two sends.
#[derive(Debug, Default)]
pub struct MessageIdSequence {
    last_millis: i64,
}

impl MessageIdSequence {
    pub fn next(&mut self, now_millis: i64) -> MessageId {
        let millis = now_millis.max(self.last_millis + 1);
        self.last_millis = millis;
        MessageId::from_millis(millis)
    }
}
