//! Form field values and snapshots.
//!
//! A `FormSnapshot` is what the rendering surface hands back when asked for
//! the current contents of the form. Values are never cached by the engine;
//! every validation pass reads a fresh snapshot.

use serde::{Deserialize, Serialize};

/// The current value of one form control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Free text, select options, and radio groups.
    Text(String),
    /// A checkbox.
    Checked(bool),
}

impl FieldValue {
    /// Build a text value from any string-like input.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// The value as the form would submit it.
    ///
    /// A checked box reads as `"on"`, an unchecked one as the empty string.
    pub fn as_text(&self) -> &str {
        match self {
            FieldValue::Text(s) => s.as_str(),
            FieldValue::Checked(true) => "on",
            FieldValue::Checked(false) => "",
        }
    }

    /// True when the value is empty after trimming.
    pub fn is_blank(&self) -> bool {
        self.as_text().trim().is_empty()
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Checked(value)
    }
}

/// One named field and its value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
    pub name: String,
    pub value: FieldValue,
}

/// All form fields in form (document) order.
///
/// Order matters: "scroll to the first error" walks the snapshot front to
/// back. Setting an existing name replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormSnapshot {
    fields: Vec<FormField>,
}

impl FormSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style `set`.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Insert or replace the value for `name`.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|f| f.name == name) {
            Some(existing) => existing.value = value,
            None => self.fields.push(FormField { name, value }),
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.value)
    }

    /// The submitted text for `name`, trimmed. Missing fields read as "".
    pub fn text(&self, name: &str) -> &str {
        self.get(name).map(|v| v.as_text().trim()).unwrap_or("")
    }

    pub fn iter(&self) -> impl Iterator<Item = &FormField> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Blank every value while keeping the field list, as a form reset does.
    pub fn cleared(&self) -> Self {
        let fields = self
            .fields
            .iter()
            .map(|f| FormField {
                name: f.name.clone(),
                value: match f.value {
                    FieldValue::Text(_) => FieldValue::Text(String::new()),
                    FieldValue::Checked(_) => FieldValue::Checked(false),
                },
            })
            .collect();
        Self { fields }
    }
}

impl<N, V> FromIterator<(N, V)> for FormSnapshot
where
    N: Into<String>,
    V: Into<FieldValue>,
{
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut snapshot = FormSnapshot::new();
        for (name, value) in iter {
            snapshot.set(name, value);
        }
        snapshot
    }
}

/// Field names of the standard contact form.
pub mod names {
    pub const FIRST_NAME: &str = "firstName";
    pub const LAST_NAME: &str = "lastName";
    pub const EMAIL: &str = "email";
    pub const PHONE: &str = "phone";
    pub const COMPANY: &str = "company";
    pub const SUBJECT: &str = "subject";
    pub const PRIORITY: &str = "priority";
    pub const MESSAGE: &str = "message";
    pub const NEWSLETTER: &str = "newsletter";
    pub const PRIVACY: &str = "privacy";
    pub const CAPTCHA_ANSWER: &str = "captchaAnswer";
}
