//! Postbox — Contact Form Controller Demo CLI
//!
//! Drives the submission controller headlessly against a console rendering
//! surface, the built-in contact-form rules and a simulated network.
//!
//! Usage:
//!   cargo run -p demo -- run-all
//!   cargo run -p demo -- validate --input form.json
//!   cargo run -p demo -- simulate --fail-rate 0.5 --seed 7
//!   cargo run -p demo -- --rules my-rules.toml simulate

mod sample;
mod scenarios;
mod surface;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use postbox_contracts::error::PostboxResult;

use scenarios::SimulateOptions;

// ── CLI definition ────────────────────────────────────────────────────────────

/// Postbox — headless contact-form controller demo.
#[derive(Parser)]
#[command(
    name = "demo",
    about = "Postbox contact-form controller demo",
    long_about = "Runs Postbox demo scenarios showing field validation, preview,\n\
                  single-flight submission and retry against a flaky network."
)]
struct Cli {
    /// Rules TOML to use instead of the built-in contact form rules.
    #[arg(long, global = true)]
    rules: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run `validate` and `simulate` with their defaults.
    RunAll,
    /// Validate one form snapshot and print the report as JSON.
    Validate {
        /// JSON array of {"name", "value"} objects. Defaults to a sample contact.
        #[arg(long)]
        input: Option<PathBuf>,
        /// Answer to "What is 3 + 4?".
        #[arg(long)]
        captcha_answer: Option<String>,
    },
    /// Drive the full controller against a simulated network.
    Simulate {
        /// Probability that a send fails, 0.0 to 1.0.
        #[arg(long, default_value_t = 0.3)]
        fail_rate: f64,
        #[arg(long, default_value_t = 42)]
        seed: u64,
        #[arg(long, default_value_t = 500)]
        latency_ms: u64,
        #[arg(long, default_value_t = 3)]
        max_attempts: u32,
        /// Only print errors, panels and results.
        #[arg(long)]
        quiet: bool,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    // Set RUST_LOG=debug for controller and engine logs.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    print_banner();

    let rules = cli.rules.as_deref();
    let result: PostboxResult<()> = match cli.command {
        Command::RunAll => run_all(rules).await,
        Command::Validate {
            input,
            captcha_answer,
        } => scenarios::run_validate(rules, input.as_deref(), captcha_answer.as_deref()).map(|_| ()),
        Command::Simulate {
            fail_rate,
            seed,
            latency_ms,
            max_attempts,
            quiet,
        } => {
            let options = SimulateOptions {
                latency: Duration::from_millis(latency_ms),
                failure_rate: fail_rate,
                seed,
                max_attempts,
                quiet,
            };
            scenarios::run_simulate(rules, &options).await.map(|_| ())
        }
    };

    match result {
        Ok(()) => {
            println!("All selected scenarios completed successfully.");
        }
        Err(e) => {
            eprintln!("Demo error: {}", e);
            std::process::exit(1);
        }
    }
}

async fn run_all(rules: Option<&std::path::Path>) -> PostboxResult<()> {
    scenarios::run_validate(rules, None, None)?;
    scenarios::run_simulate(rules, &SimulateOptions::default()).await?;
    Ok(())
}

// ── Banner ────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("Postbox — Contact Form Controller");
    println!("=================================");
    println!();
    println!("Per submission:");
    println!("  [1] Every field is checked: required → pattern → min length → max length");
    println!("  [2] The captcha answer must equal the live challenge");
    println!("  [3] A valid form is previewed; nothing is sent until confirmed");
    println!("  [4] One send at a time; extra confirms are ignored");
    println!("  [5] Success clears the form; failure keeps it for a retry");
    println!();
}
