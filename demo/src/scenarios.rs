//! The demo scenarios.
//!
//! `validate` runs the rule engine once over a snapshot and prints the
//! report as JSON. `simulate` drives a full controller through inline
//! validation, a rejected submit, preview, a double-clicked confirm and
//! retries against a flaky simulated network.

use std::path::Path;
use std::time::Duration;

use tracing::info;

use postbox_contracts::{
    error::{PostboxError, PostboxResult},
    form::{names, FormSnapshot},
    notify::Severity,
    submission::{PreviewOutcome, SubmissionState, SubmitOutcome},
    validation::FormReport,
};
use postbox_core::{
    traits::{CaptchaCheck, Validator},
    SubmissionController,
};
use postbox_outbox::SimulatedTransport;
use postbox_rules::{arithmetic_challenge, ArithmeticChallenges, RuleEngine};

use crate::{sample, surface::ConsoleSurface};

/// The built-in rules, or the TOML document at `rules`.
pub fn load_engine(rules: Option<&Path>) -> PostboxResult<RuleEngine> {
    match rules {
        Some(path) => {
            info!(path = %path.display(), "loading rules file");
            RuleEngine::from_file(path)
        }
        None => RuleEngine::contact_form(),
    }
}

fn print_json(value: &impl serde::Serialize) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("  could not serialize output: {}", e),
    }
}

// ── validate ──────────────────────────────────────────────────────────────────

/// Validate one snapshot against a fixed challenge ("What is 3 + 4?").
///
/// `input` is a JSON array of `{"name": ..., "value": ...}` objects, where
/// a value is a string or, for checkboxes, a boolean. Without it the sample
/// contact is used with the correct captcha answer filled in.
pub fn run_validate(
    rules: Option<&Path>,
    input: Option<&Path>,
    captcha_answer: Option<&str>,
) -> PostboxResult<FormReport> {
    println!("=== Validate ===");
    println!();

    let engine = load_engine(rules)?;
    let settings = engine.settings().clone();
    let challenge = arithmetic_challenge(3, 4, 0);

    let mut snapshot = match input {
        Some(path) => read_snapshot(path)?,
        None => sample::valid_contact().with(&settings.captcha_field, "7"),
    };
    if let Some(answer) = captcha_answer {
        snapshot.set(&settings.captcha_field, answer);
    }

    println!("  Captcha: {} (answer {})", challenge.question, challenge.answer);
    println!("  Fields:  {}", snapshot.len());
    println!();

    let report = engine.validate_form(
        &snapshot,
        &CaptchaCheck {
            field: &settings.captcha_field,
            challenge: &challenge,
            mismatch_message: &settings.captcha_mismatch_message,
        },
    );

    print_json(&report);
    println!();
    println!(
        "  RESULT: {} ({} field failure(s), captcha {})",
        if report.valid { "VALID" } else { "INVALID" },
        report.failures().count(),
        if report.captcha.valid { "ok" } else { "rejected" }
    );
    println!();
    Ok(report)
}

fn read_snapshot(path: &Path) -> PostboxResult<FormSnapshot> {
    let contents = std::fs::read_to_string(path).map_err(|e| PostboxError::ConfigError {
        reason: format!("failed to read input '{}': {}", path.display(), e),
    })?;
    serde_json::from_str(&contents).map_err(|e| PostboxError::ConfigError {
        reason: format!("input '{}' is not a form snapshot: {}", path.display(), e),
    })
}

// ── simulate ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SimulateOptions {
    pub latency: Duration,
    pub failure_rate: f64,
    /// Seeds both the captcha generator and the network failures.
    pub seed: u64,
    pub max_attempts: u32,
    pub quiet: bool,
}

impl Default for SimulateOptions {
    fn default() -> Self {
        Self {
            latency: Duration::from_millis(500),
            failure_rate: 0.3,
            seed: 42,
            max_attempts: 3,
            quiet: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationSummary {
    pub attempts: u32,
    pub delivered: usize,
    pub ignored_confirms: u32,
    pub final_state: SubmissionState,
    /// Field values left on the form when the run ended.
    pub form: FormSnapshot,
}

pub async fn run_simulate(
    rules: Option<&Path>,
    options: &SimulateOptions,
) -> PostboxResult<SimulationSummary> {
    println!("=== Simulate ===");
    println!(
        "  latency {}ms, failure rate {:.0}%, seed {}",
        options.latency.as_millis(),
        options.failure_rate * 100.0,
        options.seed
    );
    println!();

    let engine = load_engine(rules)?;
    let settings = engine.settings().clone();
    let surface = ConsoleSurface::new(options.quiet);
    let transport =
        SimulatedTransport::seeded(options.latency, options.failure_rate, options.seed);
    let outbox = transport.outbox();

    let controller = SubmissionController::new(
        Box::new(engine),
        Box::new(surface.clone()),
        Box::new(transport),
        Box::new(ArithmeticChallenges::seeded(options.seed)),
        settings.clone(),
    );

    // Step 1: inline validation on blur.
    println!("  Step 1: user types a malformed email and leaves the field");
    surface.type_into(names::EMAIL, "not-an-email");
    controller.on_field_blur(names::EMAIL)?;
    println!();

    // Step 2: submit with three bad fields.
    println!("  Step 2: submit with a short name, a bad email and a short message");
    let draft = controller.notify("Draft restored", Severity::Info)?;
    surface.fill(sample::invalid_contact());
    match controller.handle_submit()? {
        PreviewOutcome::Rejected { report, first_error } => {
            println!(
                "  Rejected: {} field failure(s), first error on {}",
                report.failures().count(),
                first_error.as_deref().unwrap_or("captcha")
            );
        }
        other => println!("  Unexpected outcome: {:?}", other),
    }
    let hidden = controller.dismiss_notification(draft)?;
    println!("  Stale draft timer hid the newer notification: {}", hidden);
    println!();

    // Step 3: fill correctly, answer the captcha, preview.
    println!("  Step 3: complete form, correct captcha, preview");
    let challenge = controller.current_challenge()?;
    surface.fill(
        sample::valid_contact().with(&settings.captcha_field, challenge.answer.to_string()),
    );
    controller.on_field_input(&settings.message_field);
    println!();

    let mut summary = SimulationSummary {
        attempts: 0,
        delivered: 0,
        ignored_confirms: 0,
        final_state: SubmissionState::Idle,
        form: FormSnapshot::new(),
    };

    // Step 4: confirm (double-clicked), retrying failed sends.
    while summary.attempts < options.max_attempts {
        match controller.request_preview()? {
            PreviewOutcome::Shown(_) => {}
            other => {
                println!("  Preview not shown: {:?}", other);
                break;
            }
        }

        summary.attempts += 1;
        println!(
            "  Step 4.{}: confirm clicked twice while the send is pending",
            summary.attempts
        );
        let (first, second) = tokio::join!(controller.confirm_submit(), controller.confirm_submit());

        match second {
            Ok(SubmitOutcome::Ignored) => {
                summary.ignored_confirms += 1;
                println!("  Second click ignored: a submission is already in flight");
            }
            Ok(other) => println!("  Second click: {:?}", other),
            Err(e) => println!("  Second click arrived after the send finished: {}", e),
        }

        match first? {
            SubmitOutcome::Sent { receipt, .. } => {
                println!("  RESULT: sent as {}", receipt.message_id);
                break;
            }
            SubmitOutcome::Failed { reason } => {
                println!("  RESULT: send failed ({}); form kept for retry", reason);
            }
            other => {
                println!("  RESULT: {:?}", other);
                break;
            }
        }
        println!();
    }

    summary.delivered = outbox.delivered().len();
    summary.final_state = controller.state()?;
    summary.form = surface.snapshot();

    println!();
    println!(
        "  Attempts: {}, delivered: {}, ignored confirms: {}, final state: {}",
        summary.attempts, summary.delivered, summary.ignored_confirms, summary.final_state
    );
    println!();
    info!(
        attempts = summary.attempts,
        delivered = summary.delivered,
        "simulation finished"
    );
    Ok(summary)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
