//! # postbox-rules
//!
//! Declarative field validation for the Postbox contact-form controller.
//!
//! ## Overview
//!
//! This crate provides [`RuleEngine`], which implements the
//! [`Validator`](postbox_core::traits::Validator) trait. Rules are declared
//! in TOML, one `[[fields]]` entry per field, and compiled once at load time.
//! It also provides [`ArithmeticChallenges`], the random
//! [`ChallengeSource`](postbox_core::traits::ChallengeSource).
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use postbox_rules::{ArithmeticChallenges, RuleEngine};
//!
//! let engine = RuleEngine::contact_form()?;
//! let settings = engine.settings().clone();
//! // Pass `engine` and `ArithmeticChallenges::from_entropy()` to
//! // `postbox_core::SubmissionController::new(...)`.
//! ```
//!
//! ## Precedence
//!
//! Exactly one violation is reported per field, checked in the order
//! required → pattern → min_length → max_length.

pub mod captcha;
pub mod engine;
pub mod rule;

pub use captcha::{arithmetic_challenge, ArithmeticChallenges};
pub use engine::{RuleEngine, CONTACT_FORM_RULES};
pub use rule::RuleSetConfig;

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use postbox_contracts::{
        captcha::CaptchaChallenge,
        error::PostboxError,
        form::{FieldValue, FormSnapshot},
        validation::ViolationKind,
    };
    use postbox_core::traits::{CaptchaCheck, ChallengeSource, Validator};

    use crate::{arithmetic_challenge, ArithmeticChallenges, RuleEngine};

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn engine() -> RuleEngine {
        RuleEngine::contact_form().unwrap()
    }

    const MISMATCH: &str = "The captcha answer is incorrect";

    fn check(challenge: &CaptchaChallenge) -> CaptchaCheck<'_> {
        CaptchaCheck {
            field: "captchaAnswer",
            challenge,
            mismatch_message: MISMATCH,
        }
    }

    fn marie_curie(captcha_answer: &str) -> FormSnapshot {
        FormSnapshot::new()
            .with("firstName", "Marie")
            .with("lastName", "Curie")
            .with("email", "m@c.fr")
            .with("phone", "")
            .with("company", "")
            .with("subject", "General")
            .with("priority", "medium")
            .with("message", "This is a sufficiently long message.")
            .with("newsletter", false)
            .with("privacy", true)
            .with("captchaAnswer", captcha_answer)
    }

    // ── 1. required ───────────────────────────────────────────────────────────

    /// Every required field rejects empty and whitespace-only input with its
    /// own required message.
    #[test]
    fn test_required_fields_reject_blank_input() {
        let engine = engine();
        let expected = [
            ("firstName", "First name is required"),
            ("lastName", "Last name is required"),
            ("email", "Email is required"),
            ("subject", "Please select a subject"),
            ("message", "Message is required"),
            ("privacy", "You must accept the privacy policy"),
        ];

        for (field, message) in expected {
            for raw in ["", "   ", "\t\n"] {
                let verdict = engine.validate_field(field, raw);
                assert!(!verdict.valid, "{field} must reject {raw:?}");
                assert_eq!(verdict.violation, Some(ViolationKind::Required));
                assert_eq!(verdict.message, message);
            }
        }
    }

    #[test]
    fn test_privacy_checkbox_must_be_checked() {
        let engine = engine();
        assert!(!engine.validate_value("privacy", &FieldValue::Checked(false)).valid);
        assert!(engine.validate_value("privacy", &FieldValue::Checked(true)).valid);
    }

    // ── 2. optional fields ────────────────────────────────────────────────────

    #[test]
    fn test_empty_optional_fields_pass() {
        let engine = engine();
        assert!(engine.validate_field("phone", "").valid);
        assert!(engine.validate_field("phone", "   ").valid);
        assert!(engine.validate_field("company", "").valid);
    }

    #[test]
    fn test_unknown_fields_are_unconstrained() {
        let engine = engine();
        assert!(engine.validate_field("priority", "").valid);
        assert!(engine.validate_field("newsletter", "anything at all").valid);
        assert!(engine.rule("priority").is_none());
        assert!(!engine.constrains("priority"));
        assert!(!engine.constrains("newsletter"));
        assert!(engine.constrains("phone"));
        assert!(engine.constrains("privacy"));
    }

    // ── 3. patterns ───────────────────────────────────────────────────────────

    /// Names with digits or symbols fail on pattern regardless of length.
    #[test]
    fn test_names_reject_digits_and_symbols() {
        let engine = engine();
        let long_digits = "7".repeat(60);
        for raw in ["R2", "Marie2", "Jean_Paul", "Anne!", long_digits.as_str()] {
            for field in ["firstName", "lastName"] {
                let verdict = engine.validate_field(field, raw);
                assert_eq!(
                    verdict.violation,
                    Some(ViolationKind::Pattern),
                    "{field}={raw:?} should be a pattern violation"
                );
            }
        }
    }

    #[test]
    fn test_names_accept_diacritics_spaces_hyphens_apostrophes() {
        let engine = engine();
        for raw in ["Élise", "Jean-Luc", "O'Brien", "Anne Marie", "Zoë", "  Françoise  "] {
            assert!(engine.validate_field("firstName", raw).valid, "{raw:?} should pass");
        }
    }

    #[test]
    fn test_email_pattern() {
        let engine = engine();
        assert!(engine.validate_field("email", "m@c.fr").valid);
        assert!(engine.validate_field("email", " first.last@example.co.uk ").valid);
        for raw in ["not-an-email", "a@b", "a b@c.fr", "@c.fr", "m@.fr."] {
            let verdict = engine.validate_field("email", raw);
            assert_eq!(verdict.violation, Some(ViolationKind::Pattern), "{raw:?}");
            assert_eq!(verdict.message, "Please enter a valid email address");
        }
    }

    #[test]
    fn test_phone_pattern() {
        let engine = engine();
        for raw in ["+33 1 23 45 67 89", "(555) 123-4567", "0123456789"] {
            assert!(engine.validate_field("phone", raw).valid, "{raw:?} should pass");
        }
        for raw in ["12345", "call me maybe", "++33123456789", "0123456789 ext"] {
            let verdict = engine.validate_field("phone", raw);
            assert_eq!(verdict.violation, Some(ViolationKind::Pattern), "{raw:?}");
        }
    }

    // ── 4. lengths & precedence ───────────────────────────────────────────────

    #[test]
    fn test_length_bounds() {
        let engine = engine();

        let verdict = engine.validate_field("message", "too short");
        assert_eq!(verdict.violation, Some(ViolationKind::MinLength));
        assert_eq!(verdict.message, "Message must be at least 10 characters");

        assert!(engine.validate_field("message", &"m".repeat(10)).valid);
        assert!(engine.validate_field("message", &"m".repeat(1000)).valid);

        let verdict = engine.validate_field("message", &"m".repeat(1001));
        assert_eq!(verdict.violation, Some(ViolationKind::MaxLength));

        let verdict = engine.validate_field("company", &"c".repeat(101));
        assert_eq!(verdict.violation, Some(ViolationKind::MaxLength));
        assert_eq!(verdict.message, "Company name cannot exceed 100 characters");
    }

    #[test]
    fn test_lengths_count_characters_not_bytes() {
        let engine = engine();
        // 50 two-byte characters: within bounds.
        assert!(engine.validate_field("lastName", &"é".repeat(50)).valid);
        assert_eq!(
            engine.validate_field("lastName", &"é".repeat(51)).violation,
            Some(ViolationKind::MaxLength)
        );
    }

    /// Pattern is checked before length: a one-character digit name reports
    /// the pattern, not the minimum length.
    #[test]
    fn test_pattern_wins_over_length() {
        let engine = engine();
        assert_eq!(
            engine.validate_field("firstName", "7").violation,
            Some(ViolationKind::Pattern)
        );
        assert_eq!(
            engine.validate_field("firstName", "A").violation,
            Some(ViolationKind::MinLength)
        );
    }

    // ── 5. whole form ─────────────────────────────────────────────────────────

    #[test]
    fn test_form_reports_one_failure_per_bad_field() {
        let engine = engine();
        let challenge = CaptchaChallenge::new("What is 2 + 3?", 5);
        let snapshot = FormSnapshot::new()
            .with("firstName", "A")
            .with("email", "not-an-email")
            .with("message", "short");

        let report = engine.validate_form(&snapshot, &check(&challenge));

        assert!(!report.valid);
        let failures: Vec<(&str, Option<ViolationKind>)> = report
            .failures()
            .map(|f| (f.field.as_str(), f.verdict.violation))
            .collect();
        assert_eq!(
            failures,
            vec![
                ("firstName", Some(ViolationKind::MinLength)),
                ("email", Some(ViolationKind::Pattern)),
                ("message", Some(ViolationKind::MinLength)),
            ]
        );
        assert!(!report.captcha.valid, "no answer given");
    }

    #[test]
    fn test_complete_form_with_correct_captcha_is_valid() {
        let engine = engine();
        let challenge = CaptchaChallenge::new("What is 4 + 3?", 7);

        let report = engine.validate_form(&marie_curie("7"), &check(&challenge));

        assert!(report.valid, "unexpected failures: {:?}", report.failures().collect::<Vec<_>>());
        assert!(report.captcha.valid);
        assert!(report.verdict("captchaAnswer").is_none(), "captcha is not rule-checked");
        assert_eq!(report.fields.len(), 10);
    }

    #[test]
    fn test_form_is_invalid_when_only_the_captcha_is_wrong() {
        let engine = engine();
        let challenge = CaptchaChallenge::new("What is 4 + 3?", 7);

        let report = engine.validate_form(&marie_curie("8"), &check(&challenge));

        assert!(!report.valid);
        assert_eq!(report.failures().count(), 0);
        assert_eq!(report.captcha.message, MISMATCH);
    }

    // ── 6. captcha ────────────────────────────────────────────────────────────

    #[test]
    fn test_captcha_parsing_is_strict() {
        let engine = engine();
        let challenge = CaptchaChallenge::new("What is 3 × 4?", 12);

        assert!(engine.check_captcha(" 12 ", &check(&challenge)).valid);
        assert!(!engine.check_captcha("12abc", &check(&challenge)).valid);
        assert!(!engine.check_captcha("12.0", &check(&challenge)).valid);
        assert!(!engine.check_captcha("13", &check(&challenge)).valid);

        let blank = engine.check_captcha("  ", &check(&challenge));
        assert_eq!(blank.violation, Some(ViolationKind::Required));
        assert_eq!(blank.message, MISMATCH);
    }

    #[test]
    fn test_new_challenge_invalidates_old_answer() {
        let engine = engine();
        let old = CaptchaChallenge::new("What is 1 + 1?", 2);
        let new = CaptchaChallenge::new("What is 5 - 2?", 3);

        assert!(engine.check_captcha("2", &check(&old)).valid);
        assert!(!engine.check_captcha("2", &check(&new)).valid);
    }

    #[test]
    fn test_arithmetic_challenges() {
        assert_eq!(arithmetic_challenge(3, 4, 0), CaptchaChallenge::new("What is 3 + 4?", 7));
        assert_eq!(arithmetic_challenge(3, 9, 1), CaptchaChallenge::new("What is 9 - 3?", 6));
        assert_eq!(arithmetic_challenge(3, 4, 2), CaptchaChallenge::new("What is 3 × 4?", 12));
    }

    #[test]
    fn test_random_challenges_stay_in_range_and_are_reproducible() {
        let a = ArithmeticChallenges::seeded(42);
        let b = ArithmeticChallenges::seeded(42);

        for _ in 0..200 {
            let challenge = a.next_challenge();
            assert_eq!(challenge, b.next_challenge(), "same seed, same sequence");
            assert!((0..=100).contains(&challenge.answer), "{challenge:?}");
            assert!(challenge.question.starts_with("What is "));
        }
    }

    // ── 7. configuration ──────────────────────────────────────────────────────

    #[test]
    fn test_builtin_rules_and_settings_load() {
        let engine = engine();
        let names: Vec<&str> = engine.field_names().collect();
        assert_eq!(
            names,
            vec!["firstName", "lastName", "email", "phone", "company", "subject", "message", "privacy"]
        );
        assert_eq!(engine.settings().notification_secs, 5);
        assert_eq!(engine.settings().captcha_field, "captchaAnswer");
        assert_eq!(engine.rule("message").unwrap().max_length, Some(1000));
    }

    #[test]
    fn test_custom_rules_with_fallback_messages() {
        let toml = r#"
            [[fields]]
            name = "nickname"
            required = true
            min_length = 3
            pattern = '^[a-z]+$'
        "#;

        let engine = RuleEngine::from_toml_str(toml).unwrap();

        assert_eq!(engine.validate_field("nickname", "").message, "nickname is required");
        assert_eq!(
            engine.validate_field("nickname", "AB").message,
            "nickname has an invalid format"
        );
        assert_eq!(
            engine.validate_field("nickname", "ab").message,
            "nickname must be at least 3 characters"
        );
        assert_eq!(engine.settings().notification_secs, 5, "missing [form] uses defaults");
    }

    #[test]
    fn test_duplicate_field_rule_is_rejected() {
        let toml = r#"
            [[fields]]
            name = "email"
            required = true

            [[fields]]
            name = "email"
        "#;

        match RuleEngine::from_toml_str(toml) {
            Err(PostboxError::ConfigError { reason }) => {
                assert!(reason.contains("duplicate"), "{reason}");
                assert!(reason.contains("email"), "{reason}");
            }
            other => panic!("expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let toml = r#"
            [[fields]]
            name = "zip"
            pattern = '^[0-9'
        "#;

        match RuleEngine::from_toml_str(toml) {
            Err(PostboxError::InvalidPattern { field, .. }) => assert_eq!(field, "zip"),
            other => panic!("expected InvalidPattern, got {:?}", other),
        }
    }

    #[test]
    fn test_inverted_length_bounds_are_rejected() {
        let toml = r#"
            [[fields]]
            name = "code"
            min_length = 8
            max_length = 4
        "#;

        assert!(matches!(
            RuleEngine::from_toml_str(toml),
            Err(PostboxError::ConfigError { .. })
        ));
    }

    #[test]
    fn test_malformed_toml_is_a_config_error() {
        match RuleEngine::from_toml_str("[[fields]\nname = ") {
            Err(PostboxError::ConfigError { reason }) => {
                assert!(reason.contains("failed to parse rules TOML"), "{reason}");
            }
            other => panic!("expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_rules_file_is_a_config_error() {
        let result = RuleEngine::from_file(std::path::Path::new("/nonexistent/postbox-rules.toml"));
        assert!(matches!(result, Err(PostboxError::ConfigError { .. })));
    }
}
