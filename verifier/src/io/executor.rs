//! Step execution.
//!
//! The [`StepExecutor`] trait decouples orchestration from process spawning.
//! Tests use scripted executors that return predetermined results without
//! running anything.

use std::process::Command;
use std::time::Instant;

use anyhow::anyhow;
use chrono::Utc;
use tracing::{info, instrument, warn};

use crate::core::types::{StepDescriptor, StepResult, StepStatus};
use crate::io::config::VerifierConfig;
use crate::io::process::run_command_with_timeout;

/// Runs one step and reports exactly one result.
///
/// Failures are never errors here: a failing required step comes back as
/// [`StepStatus::Failed`], a failing optional step as [`StepStatus::Warning`].
pub trait StepExecutor {
    fn execute(&self, step: &StepDescriptor) -> StepResult;
}

/// Executor that runs step code through a shell (`sh -c <code>` by default).
#[derive(Debug, Clone)]
pub struct ShellExecutor {
    /// Program and leading args; the code is passed as the final argument.
    pub shell: Vec<String>,
    pub output_limit_bytes: usize,
}

impl ShellExecutor {
    pub fn from_config(cfg: &VerifierConfig) -> Self {
        Self {
            shell: cfg.shell.clone(),
            output_limit_bytes: cfg.output_limit_bytes,
        }
    }
}

impl StepExecutor for ShellExecutor {
    #[instrument(skip_all, fields(step = %step.name, required = step.required))]
    fn execute(&self, step: &StepDescriptor) -> StepResult {
        let timestamp = Utc::now().to_rfc3339();
        let started = Instant::now();

        let mut result = StepResult {
            name: step.name.clone(),
            description: step.description.clone(),
            status: StepStatus::Pending,
            output: String::new(),
            error: String::new(),
            duration_ms: 0,
            timestamp,
            exit_code: None,
            timed_out: false,
        };

        let outcome = match self.shell.split_first() {
            Some((program, args)) => {
                let mut cmd = Command::new(program);
                cmd.args(args).arg(&step.code).current_dir(&step.working_dir);
                run_command_with_timeout(cmd, step.timeout, self.output_limit_bytes)
            }
            None => Err(anyhow!("no shell configured")),
        };

        match outcome {
            Ok(output) => {
                result.output = output.stdout_text();
                result.exit_code = output.status.code();
                result.timed_out = output.timed_out;
                if output.timed_out {
                    result.status = StepStatus::Failed;
                    result.exit_code = None;
                    result.error = format!("timed out after {} ms", step.timeout.as_millis());
                } else if output.status.success() {
                    result.status = StepStatus::Success;
                } else {
                    result.status = StepStatus::Failed;
                    let stderr = output.stderr_text();
                    result.error = if stderr.trim().is_empty() {
                        exit_description(output.status.code())
                    } else {
                        stderr
                    };
                }
            }
            Err(err) => {
                result.status = StepStatus::Failed;
                result.error = format!("failed to run: {err:#}");
            }
        }
        result.duration_ms = started.elapsed().as_millis() as u64;

        if result.status == StepStatus::Failed {
            if step.required {
                warn!(error = %result.error, "required step failed");
            } else {
                warn!(error = %result.error, "optional step failed, downgrading to warning");
                result.status = StepStatus::Warning;
            }
        } else {
            info!(duration_ms = result.duration_ms, "step succeeded");
        }
        result
    }
}

fn exit_description(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exited with status {code}"),
        None => "terminated by signal".to_string(),
    }
}
