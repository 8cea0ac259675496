//! diagq - collect diagnostic artifacts for the targets owning a source file.
//!
//! Resolves a file to its owning build-graph targets, builds one diagnostic
//! sub-target per target of a diagnosable kind, and prints the resulting
//! artifact paths as a JSON array. Partial results are normal: targets whose
//! builds fail or produce ambiguous output are dropped, and only an
//! unreachable or broken engine makes the run itself fail.

use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod client;
mod config;
mod output;

use client::EngineClient;
use config::{DiagqConfig, DEFAULT_ENDPOINT};
use diagq_core::{DiagnosticMode, FailureMode, Pipeline, PlatformSpec};
use output::OutputFormat;

/// Collect diagnostic artifacts for the targets owning a source file.
#[derive(Parser)]
#[command(name = "diagq")]
#[command(author, version)]
#[command(about = "Collect diagnostic artifacts for the targets owning a source file")]
#[command(
    long_about = "Resolves a source file to the build-graph targets that own it, builds one\ndiagnostic sub-target per target, and prints the artifact paths as a JSON\narray. Targets that fail to build or produce ambiguous output are skipped."
)]
#[command(after_help = "Examples:
  diagq src/lib.rs               Compiler diagnostics for lib.rs owners
  diagq src/lib.rs --lint        Linter findings instead
  diagq src/main.rs --platform linux-x86_64 --mode opt")]
struct Cli {
    /// Source file to resolve
    file: String,

    /// Build lint sub-targets instead of compiler diagnostics
    #[arg(long)]
    lint: bool,

    /// Canonical platform name to resolve targets for
    #[arg(long)]
    platform: Option<String>,

    /// Build-mode suffix applied to the platform name
    #[arg(long = "mode", requires = "platform")]
    build_mode: Option<String>,

    /// Engine endpoint (overrides .diagq.toml)
    #[arg(long)]
    endpoint: Option<String>,

    /// Fail the whole run on the first target build failure
    #[arg(long)]
    fail_fast: bool,

    /// Output format (overrides config default)
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Enable verbose output (debug logging)
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn setup_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    let config = DiagqConfig::load(std::path::Path::new("."));

    // Resolve output format: CLI flag > config default > Json
    let format = cli.format.unwrap_or_else(|| {
        config
            .default_format()
            .and_then(|f| f.parse().ok())
            .unwrap_or(OutputFormat::Json)
    });

    let endpoint = cli
        .endpoint
        .or_else(|| config.endpoint().map(str::to_string))
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

    let platform = PlatformSpec::new(
        cli.platform.or(config.build.platform.clone()),
        cli.build_mode.or(config.build.build_mode.clone()),
    )
    .with_constraints(config.build.constraints.iter().cloned());

    let client = Arc::new(
        EngineClient::new(endpoint.as_str(), &platform, config.timeout())
            .context("failed to set up engine client")?,
    );

    let failure_mode = if cli.fail_fast {
        FailureMode::FailFast
    } else {
        FailureMode::Isolate
    };
    let pipeline = Pipeline::new(client.clone(), client).with_failure_mode(failure_mode);

    let mode = if cli.lint {
        DiagnosticMode::Lint
    } else {
        DiagnosticMode::Compiler
    };

    let artifacts = pipeline
        .run(&cli.file, mode)
        .await
        .with_context(|| format!("diagnostic build for {} failed", cli.file))?;

    output::emit(&artifacts, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_declaration_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_mode_flag_requires_platform() {
        let result = Cli::try_parse_from(["diagq", "src/lib.rs", "--mode", "opt"]);
        assert!(result.is_err());

        let result =
            Cli::try_parse_from(["diagq", "src/lib.rs", "--platform", "linux-x86_64", "--mode", "opt"]);
        assert!(result.is_ok());
    }

    #[test]
    fn test_lint_flag_defaults_off() {
        let cli = Cli::try_parse_from(["diagq", "src/lib.rs"]).unwrap();
        assert!(!cli.lint);
        assert!(!cli.fail_fast);

        let cli = Cli::try_parse_from(["diagq", "src/lib.rs", "--lint"]).unwrap();
        assert!(cli.lint);
    }
}
