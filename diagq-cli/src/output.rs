//! Output rendering for diagq results.
//!
//! JSON is the default and the machine contract: a single array of artifact
//! path strings on stdout, nothing else. The table format exists for humans
//! poking at results interactively. Logging goes to stderr, so stdout stays
//! a clean JSON channel either way.

use clap::ValueEnum;
use colored::Colorize;
use std::str::FromStr;

use diagq_core::ArtifactPath;

/// Output format for CLI results.
#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON array of artifact paths (default)
    #[default]
    Json,
    /// Human-readable listing
    Table,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "table" => Ok(OutputFormat::Table),
            _ => Err(format!("Unknown output format: '{}'", s)),
        }
    }
}

/// Render the artifact list in the requested format.
pub fn render(artifacts: &[ArtifactPath], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(artifacts)?),
        OutputFormat::Table => Ok(render_table(artifacts)),
    }
}

/// Render and print to stdout.
pub fn emit(artifacts: &[ArtifactPath], format: OutputFormat) -> anyhow::Result<()> {
    println!("{}", render(artifacts, format)?);
    Ok(())
}

fn render_table(artifacts: &[ArtifactPath]) -> String {
    if artifacts.is_empty() {
        return format!("{}", "No diagnostic artifacts.".dimmed());
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{} ({})\n",
        "Diagnostic artifacts".bold(),
        artifacts.len()
    ));
    for artifact in artifacts {
        output.push_str(&format!("  {}\n", artifact));
    }
    output.pop();
    output
}
