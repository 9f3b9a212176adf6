//! Field rule definitions and validation verdicts.
//!
//! A `FieldRule` is the declarative constraint set for one named input.
//! The engine evaluates it in a fixed order and reports at most one
//! violation per field.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which constraint a value broke.
///
/// Declaration order is evaluation order: the first violated kind wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    Required,
    Pattern,
    MinLength,
    MaxLength,
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ViolationKind::Required => "required",
            ViolationKind::Pattern => "pattern",
            ViolationKind::MinLength => "min_length",
            ViolationKind::MaxLength => "max_length",
        };
        f.write_str(name)
    }
}

/// User-facing messages for each violation kind of one field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleMessages {
    pub required: Option<String>,
    pub pattern: Option<String>,
    pub min_length: Option<String>,
    pub max_length: Option<String>,
}

impl RuleMessages {
    /// The configured message for `kind`, if any.
    pub fn for_kind(&self, kind: ViolationKind) -> Option<&str> {
        match kind {
            ViolationKind::Required => self.required.as_deref(),
            ViolationKind::Pattern => self.pattern.as_deref(),
            ViolationKind::MinLength => self.min_length.as_deref(),
            ViolationKind::MaxLength => self.max_length.as_deref(),
        }
    }
}

/// Constraints for a single named field, as declared in configuration.
///
/// `pattern` is kept as source text here; the rule engine compiles it once
/// at load time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRule {
    /// The form field this rule applies to. Unique within a rule set.
    pub name: String,

    #[serde(default)]
    pub required: bool,

    pub min_length: Option<usize>,

    pub max_length: Option<usize>,

    /// Regular expression the whole trimmed value must match.
    pub pattern: Option<String>,

    #[serde(default)]
    pub messages: RuleMessages,
}

/// The outcome of checking one value against one rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationVerdict {
    pub valid: bool,
    pub violation: Option<ViolationKind>,
    /// Empty when `valid`.
    pub message: String,
}

impl ValidationVerdict {
    pub fn pass() -> Self {
        Self {
            valid: true,
            violation: None,
            message: String::new(),
        }
    }

    pub fn fail(kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            valid: false,
            violation: Some(kind),
            message: message.into(),
        }
    }
}

/// A verdict tagged with the field it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldVerdict {
    pub field: String,
    pub verdict: ValidationVerdict,
}

/// The result of validating a whole form snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormReport {
    /// True only if every field verdict and the captcha verdict are valid.
    pub valid: bool,
    /// Verdicts for every snapshot field, in snapshot order.
    pub fields: Vec<FieldVerdict>,
    /// The captcha answer is checked against the live challenge, not a rule.
    pub captcha: ValidationVerdict,
}

impl FormReport {
    pub fn verdict(&self, field: &str) -> Option<&ValidationVerdict> {
        self.fields
            .iter()
            .find(|f| f.field == field)
            .map(|f| &f.verdict)
    }

    /// Field verdicts that failed, in snapshot order. Does not include the captcha.
    pub fn failures(&self) -> impl Iterator<Item = &FieldVerdict> {
        self.fields.iter().filter(|f| !f.verdict.valid)
    }
}
