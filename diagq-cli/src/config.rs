//! diagq configuration loading from `.diagq.toml`.
//!
//! Configuration is optional - diagq falls back to defaults when no file
//! exists, and a malformed file is logged and ignored rather than failing
//! the run.
//!
//! # Example Configuration
//!
//! ```toml
//! [engine]
//! endpoint = "http://127.0.0.1:7911"
//! timeout_secs = 30
//!
//! [build]
//! platform = "linux-x86_64"
//! build_mode = "dev"
//! constraints = ["asan"]
//!
//! [output]
//! format = "json"
//! ```

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::warn;

/// Engine endpoint used when neither the CLI flag nor the config file names
/// one.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:7911";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Root configuration structure loaded from `.diagq.toml`.
///
/// All sections are optional and default when not specified.
#[derive(Debug, Deserialize, Default)]
pub struct DiagqConfig {
    /// Graph/build engine connection settings.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Default platform and build-mode selection.
    #[serde(default)]
    pub build: BuildConfig,

    /// Output formatting preferences.
    #[serde(default)]
    pub output: OutputSettings,
}

/// Engine connection settings.
#[derive(Debug, Deserialize, Default)]
pub struct EngineConfig {
    /// Base URL of the engine daemon.
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Per-request timeout in seconds.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// Default build scoping applied when the CLI flags are absent.
#[derive(Debug, Deserialize, Default)]
pub struct BuildConfig {
    /// Canonical platform name forwarded to the engine.
    #[serde(default)]
    pub platform: Option<String>,

    /// Build-mode suffix applied to the platform name.
    #[serde(default)]
    pub build_mode: Option<String>,

    /// Constraint names forwarded with every build request.
    #[serde(default)]
    pub constraints: Vec<String>,
}

/// Output formatting preferences.
#[derive(Debug, Deserialize, Default)]
pub struct OutputSettings {
    /// Default output format (`json` or `table`).
    #[serde(default)]
    pub format: Option<String>,
}

impl DiagqConfig {
    /// Load configuration from `.diagq.toml` in `dir`.
    ///
    /// A missing file yields defaults. A file that fails to parse is logged
    /// at warn level and also yields defaults.
    pub fn load(dir: &Path) -> Self {
        let path = dir.join(".diagq.toml");
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(_) => return Self::default(),
        };

        match toml::from_str(&contents) {
            Ok(config) => config,
            Err(err) => {
                warn!(path = %path.display(), %err, "ignoring malformed config");
                Self::default()
            }
        }
    }

    /// Configured endpoint, if any.
    pub fn endpoint(&self) -> Option<&str> {
        self.engine.endpoint.as_deref()
    }

    /// Per-request timeout, defaulting when unset.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.engine.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    /// Configured default output format string, if any.
    pub fn default_format(&self) -> Option<&str> {
        self.output.format.as_deref()
    }
}
