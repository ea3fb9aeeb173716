//! Verifier configuration stored under `.github/readme-verifier/config.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::badges::{BadgeMarkers, DEFAULT_END_MARKER, DEFAULT_START_MARKER};

pub const DEFAULT_CONFIG_PATH: &str = ".github/readme-verifier/config.toml";
pub const DEFAULT_RESULTS_PATH: &str = ".github/readme-verifier/results.json";

/// Verifier configuration (TOML).
///
/// Every field is optional in the file; missing fields take the defaults below.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct VerifierConfig {
    /// Where the run record is written. Overwritten on every run.
    pub results_path: PathBuf,

    /// Timeout for steps whose metadata has no `timeout`.
    pub default_timeout_ms: u64,

    /// Truncate captured stdout/stderr beyond this many bytes per stream.
    pub output_limit_bytes: usize,

    /// Program and leading args; the step code is appended as the last arg.
    pub shell: Vec<String>,

    /// Write badges back into the document after a run.
    pub update_document: bool,

    pub badge_start_marker: String,
    pub badge_end_marker: String,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            results_path: PathBuf::from(DEFAULT_RESULTS_PATH),
            default_timeout_ms: 60_000,
            output_limit_bytes: 100_000,
            shell: default_shell(),
            update_document: true,
            badge_start_marker: DEFAULT_START_MARKER.to_string(),
            badge_end_marker: DEFAULT_END_MARKER.to_string(),
        }
    }
}

fn default_shell() -> Vec<String> {
    if cfg!(windows) {
        vec!["cmd".to_string(), "/C".to_string()]
    } else {
        vec!["sh".to_string(), "-c".to_string()]
    }
}

impl VerifierConfig {
    pub fn validate(&self) -> Result<()> {
        if self.default_timeout_ms == 0 {
            return Err(anyhow!("default_timeout_ms must be > 0"));
        }
        if self.output_limit_bytes == 0 {
            return Err(anyhow!("output_limit_bytes must be > 0"));
        }
        if self.shell.is_empty() || self.shell[0].trim().is_empty() {
            return Err(anyhow!("shell must be a non-empty array"));
        }
        if self.results_path.as_os_str().is_empty() {
            return Err(anyhow!("results_path must not be empty"));
        }
        let (start, end) = (&self.badge_start_marker, &self.badge_end_marker);
        if start.trim().is_empty() || end.trim().is_empty() {
            return Err(anyhow!("badge markers must not be empty"));
        }
        if start.contains(end.as_str()) || end.contains(start.as_str()) {
            return Err(anyhow!(
                "badge markers must not contain each other ('{start}' / '{end}')"
            ));
        }
        Ok(())
    }

    pub fn markers(&self) -> BadgeMarkers {
        BadgeMarkers {
            start: self.badge_start_marker.clone(),
            end: self.badge_end_marker.clone(),
        }
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `VerifierConfig::default()`.
pub fn load_config(path: &Path) -> Result<VerifierConfig> {
    if !path.exists() {
        let cfg = VerifierConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: VerifierConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}
