//! TOML-driven field validation engine.
//!
//! `RuleEngine` loads a `RuleSetConfig`, compiles every pattern once, and
//! implements the `Validator` trait from postbox-core.
//!
//! Evaluation algorithm for one field:
//!
//! 1. Trim the raw value. Whitespace-only input is empty.
//! 2. No rule for the field → valid.
//! 3. Empty value → `Required` violation if the rule is required, otherwise valid.
//! 4. Non-empty value → `Pattern`, then `MinLength`, then `MaxLength`.
//!    The first violated check wins and supplies the message.

use std::collections::HashMap;
use std::path::Path;

use regex::Regex;
use tracing::{debug, warn};

use postbox_contracts::{
    error::{PostboxError, PostboxResult},
    form::FormSnapshot,
    settings::FormSettings,
    validation::{FieldRule, FieldVerdict, FormReport, ValidationVerdict, ViolationKind},
};
use postbox_core::traits::{CaptchaCheck, Validator};

use crate::rule::RuleSetConfig;

/// The built-in contact form rule set.
pub const CONTACT_FORM_RULES: &str = include_str!("../rules/contact-form.toml");

#[derive(Debug)]
struct CompiledRule {
    rule: FieldRule,
    pattern: Option<Regex>,
}

impl CompiledRule {
    fn compile(rule: FieldRule) -> PostboxResult<Self> {
        let pattern = match &rule.pattern {
            Some(source) => Some(Regex::new(source).map_err(|e| PostboxError::InvalidPattern {
                field: rule.name.clone(),
                reason: e.to_string(),
            })?),
            None => None,
        };

        if let (Some(min), Some(max)) = (rule.min_length, rule.max_length) {
            if min > max {
                return Err(PostboxError::ConfigError {
                    reason: format!(
                        "field '{}' has min_length {} greater than max_length {}",
                        rule.name, min, max
                    ),
                });
            }
        }

        Ok(Self { rule, pattern })
    }

    /// The configured message for `kind`, or a generic one naming the field.
    fn message(&self, kind: ViolationKind) -> String {
        if let Some(message) = self.rule.messages.for_kind(kind) {
            return message.to_string();
        }
        let name = &self.rule.name;
        match kind {
            ViolationKind::Required => format!("{name} is required"),
            ViolationKind::Pattern => format!("{name} has an invalid format"),
            ViolationKind::MinLength => format!(
                "{name} must be at least {} characters",
                self.rule.min_length.unwrap_or_default()
            ),
            ViolationKind::MaxLength => format!(
                "{name} cannot exceed {} characters",
                self.rule.max_length.unwrap_or_default()
            ),
        }
    }

    fn first_violation(&self, value: &str) -> Option<ViolationKind> {
        if value.is_empty() {
            return self.rule.required.then_some(ViolationKind::Required);
        }
        if let Some(pattern) = &self.pattern {
            if !pattern.is_match(value) {
                return Some(ViolationKind::Pattern);
            }
        }
        let len = value.chars().count();
        if self.rule.min_length.is_some_and(|min| len < min) {
            return Some(ViolationKind::MinLength);
        }
        if self.rule.max_length.is_some_and(|max| len > max) {
            return Some(ViolationKind::MaxLength);
        }
        None
    }
}

/// A `Validator` whose rules come from a TOML document.
///
/// ```rust,ignore
/// use postbox_rules::RuleEngine;
///
/// let engine = RuleEngine::contact_form()?;
/// let verdict = engine.validate_field("email", "not-an-email");
/// ```
#[derive(Debug)]
pub struct RuleEngine {
    rules: Vec<CompiledRule>,
    index: HashMap<String, usize>,
    settings: FormSettings,
}

impl RuleEngine {
    /// Compile a parsed configuration.
    ///
    /// Returns `ConfigError` for duplicate field names or inverted length
    /// bounds, and `InvalidPattern` for patterns that do not compile.
    pub fn from_config(config: RuleSetConfig) -> PostboxResult<Self> {
        let mut rules = Vec::with_capacity(config.fields.len());
        let mut index = HashMap::with_capacity(config.fields.len());

        for rule in config.fields {
            if index.contains_key(&rule.name) {
                return Err(PostboxError::ConfigError {
                    reason: format!("duplicate rule for field '{}'", rule.name),
                });
            }
            index.insert(rule.name.clone(), rules.len());
            rules.push(CompiledRule::compile(rule)?);
        }

        debug!(rule_count = rules.len(), "rule engine compiled");
        Ok(Self {
            rules,
            index,
            settings: config.form,
        })
    }

    /// Parse `s` as TOML and build a `RuleEngine`.
    pub fn from_toml_str(s: &str) -> PostboxResult<Self> {
        let config: RuleSetConfig = toml::from_str(s).map_err(|e| PostboxError::ConfigError {
            reason: format!("failed to parse rules TOML: {}", e),
        })?;
        Self::from_config(config)
    }

    /// Read the file at `path` and parse it as a rules document.
    pub fn from_file(path: &Path) -> PostboxResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| PostboxError::ConfigError {
            reason: format!("failed to read rules file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// The built-in contact form rules.
    pub fn contact_form() -> PostboxResult<Self> {
        Self::from_toml_str(CONTACT_FORM_RULES)
    }

    /// Controller settings from the document's `[form]` table.
    pub fn settings(&self) -> &FormSettings {
        &self.settings
    }

    pub fn rule(&self, field: &str) -> Option<&FieldRule> {
        self.lookup(field).map(|c| &c.rule)
    }

    /// Names of every constrained field, in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|c| c.rule.name.as_str())
    }

    fn lookup(&self, field: &str) -> Option<&CompiledRule> {
        self.index.get(field).map(|&i| &self.rules[i])
    }
}

impl Validator for RuleEngine {
    fn validate_field(&self, field: &str, raw: &str) -> ValidationVerdict {
        let Some(compiled) = self.lookup(field) else {
            return ValidationVerdict::pass();
        };

        match compiled.first_violation(raw.trim()) {
            None => ValidationVerdict::pass(),
            Some(kind) => {
                debug!(field, violation = %kind, "field rule violated");
                ValidationVerdict::fail(kind, compiled.message(kind))
            }
        }
    }

    fn constrains(&self, field: &str) -> bool {
        self.lookup(field).is_some()
    }

    /// Strict integer comparison: the trimmed answer must parse as `i64` in
    /// full, so `"7abc"` never equals 7. This differs from lenient prefix
    /// parsing (`parseInt`-style), which would accept `"7abc"` as 7.
    fn check_captcha(&self, answer: &str, captcha: &CaptchaCheck<'_>) -> ValidationVerdict {
        let answer = answer.trim();
        if answer.is_empty() {
            return ValidationVerdict::fail(ViolationKind::Required, captcha.mismatch_message);
        }
        match answer.parse::<i64>() {
            Ok(n) if n == captcha.challenge.answer => ValidationVerdict::pass(),
            _ => ValidationVerdict::fail(ViolationKind::Pattern, captcha.mismatch_message),
        }
    }

    /// Validate every snapshot field independently, then the captcha.
    ///
    /// All verdicts are collected so the caller can mark every field in one
    /// pass. The captcha field is never rule-checked.
    fn validate_form(&self, snapshot: &FormSnapshot, captcha: &CaptchaCheck<'_>) -> FormReport {
        let fields: Vec<FieldVerdict> = snapshot
            .iter()
            .filter(|f| f.name != captcha.field)
            .map(|f| FieldVerdict {
                field: f.name.clone(),
                verdict: self.validate_value(&f.name, &f.value),
            })
            .collect();

        let captcha_verdict = self.check_captcha(snapshot.text(captcha.field), captcha);
        let failed = fields.iter().filter(|f| !f.verdict.valid).count();
        let valid = failed == 0 && captcha_verdict.valid;

        if valid {
            debug!(fields = fields.len(), "form valid");
        } else {
            warn!(
                failed_fields = failed,
                captcha_valid = captcha_verdict.valid,
                "form invalid"
            );
        }

        FormReport {
            valid,
            fields,
            captcha: captcha_verdict,
        }
    }
}
