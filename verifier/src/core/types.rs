//! Shared types for extracted steps and their results.
//!
//! Descriptors are immutable once extracted; results are created once by the
//! executor and appended to the run record without further mutation.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default per-step timeout when metadata omits `timeout`.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(60_000);

/// Language tag recorded when a fence carries no info string.
pub const DEFAULT_LANGUAGE: &str = "bash";

/// One executable step extracted from the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepDescriptor {
    pub name: String,
    pub description: Option<String>,
    /// Fence info string. Recorded only; code always runs through the shell.
    pub language: String,
    pub code: String,
    /// A failing required step halts the run.
    pub required: bool,
    pub timeout: Duration,
    pub working_dir: PathBuf,
}

/// Outcome classification for a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Success,
    Failed,
    /// A non-required step failed; the run continued.
    Warning,
    Pending,
}

impl StepStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            StepStatus::Success => "success",
            StepStatus::Failed => "failed",
            StepStatus::Warning => "warning",
            StepStatus::Pending => "pending",
        }
    }
}

/// Recorded result of executing one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepResult {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: StepStatus,
    #[serde(default)]
    pub output: String,
    #[serde(default)]
    pub error: String,
    pub duration_ms: u64,
    /// RFC 3339 time at which the step started.
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    #[serde(default)]
    pub timed_out: bool,
}

/// Host facts captured once per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    /// Display name, e.g. `macOS` or `Linux`.
    pub os: String,
    /// `unix` or `windows`.
    pub family: String,
    pub arch: String,
    /// Version of this tool that produced the record.
    pub runtime_version: String,
}

/// Everything one run produced, persisted as the result file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRecord {
    pub timestamp: String,
    pub environment: Environment,
    pub steps: Vec<StepResult>,
}

impl RunRecord {
    pub fn new(timestamp: String, environment: Environment) -> Self {
        Self {
            timestamp,
            environment,
            steps: Vec::new(),
        }
    }
}
