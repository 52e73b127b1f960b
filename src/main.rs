// SPDX-License-Identifier: Apache-2.0

//! CLI front-end: parse arguments, run one command, print one envelope.
//!
//! Diagnostics go to stderr via `tracing` (`RUST_LOG` controls the level);
//! stdout carries nothing but the JSON envelope.

use clap::Parser;
use clap::error::ErrorKind;
use std::panic::{self, AssertUnwindSafe};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use treewright::commands::{self, Cmd};
use treewright::envelope::Envelope;
use treewright::error::EngineError;
use treewright::lang::SupportedLanguage;

#[derive(Parser, Debug)]
#[command(name = "treewright", version, about)]
struct Cli {
    /// Host language of the project, e.g. `java`
    language: String,

    #[command(subcommand)]
    command: Cmd,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // Help and version are human-facing; everything else, including a
    // missing or malformed flag, still answers with an envelope.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err)
            if matches!(
                err.kind(),
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
            ) =>
        {
            let _ = err.print();
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            let detail = err.to_string();
            let first_line = detail.lines().next().unwrap_or("malformed arguments");
            let (json, code) =
                error_line(EngineError::InvalidInput(first_line.to_string()).to_string());
            println!("{json}");
            return ExitCode::from(code);
        }
    };

    let (json, code) = match SupportedLanguage::from_name(&cli.language) {
        Some(language) => run_guarded(language, &cli.command),
        None => error_line(EngineError::Unsupported(cli.language.clone()).to_string()),
    };

    println!("{json}");
    ExitCode::from(code)
}

/// Dispatch with a panic guard: an internal invariant violation still
/// answers with an error envelope and exit code 1.
fn run_guarded(language: SupportedLanguage, command: &Cmd) -> (String, u8) {
    match panic::catch_unwind(AssertUnwindSafe(|| commands::dispatch(language, command))) {
        Ok(result) => result,
        Err(payload) => {
            let reason = if let Some(message) = payload.downcast_ref::<&str>() {
                message.to_string()
            } else if let Some(message) = payload.downcast_ref::<String>() {
                message.clone()
            } else {
                "unknown panic".to_string()
            };
            error_line(EngineError::Io(format!("internal error: {reason}")).to_string())
        }
    }
}

fn error_line(reason: String) -> (String, u8) {
    let envelope = Envelope::<()>::error(reason);
    let json = serde_json::to_string(&envelope)
        .unwrap_or_else(|_| r#"{"succeed":false,"errorReason":"unreportable error"}"#.to_string());
    (json, 1)
}
