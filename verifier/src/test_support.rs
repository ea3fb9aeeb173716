//! Test-only helpers: scripted executors and deterministic descriptors.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::PathBuf;

use crate::core::types::{DEFAULT_TIMEOUT, Environment, StepDescriptor, StepResult, StepStatus};
use crate::io::executor::StepExecutor;

/// Executor that returns queued statuses in order without spawning anything.
///
/// Once the queue is exhausted every further step succeeds.
#[derive(Debug, Default)]
pub struct ScriptedExecutor {
    statuses: RefCell<VecDeque<StepStatus>>,
    executed: RefCell<Vec<String>>,
}

impl ScriptedExecutor {
    pub fn new(statuses: Vec<StepStatus>) -> Self {
        Self {
            statuses: RefCell::new(statuses.into()),
            executed: RefCell::new(Vec::new()),
        }
    }

    /// Names of the steps executed so far, in order.
    pub fn executed(&self) -> Vec<String> {
        self.executed.borrow().clone()
    }
}

impl StepExecutor for ScriptedExecutor {
    fn execute(&self, step: &StepDescriptor) -> StepResult {
        self.executed.borrow_mut().push(step.name.clone());
        let status = self
            .statuses
            .borrow_mut()
            .pop_front()
            .unwrap_or(StepStatus::Success);
        let failed = matches!(status, StepStatus::Failed | StepStatus::Warning);
        StepResult {
            name: step.name.clone(),
            description: step.description.clone(),
            status,
            output: format!("ran {}", step.name),
            error: if failed {
                "scripted failure".to_string()
            } else {
                String::new()
            },
            duration_ms: 1,
            timestamp: "2026-01-01T00:00:00+00:00".to_string(),
            exit_code: Some(if failed { 1 } else { 0 }),
            timed_out: false,
        }
    }
}

/// A step descriptor with deterministic defaults.
pub fn descriptor(name: &str, required: bool) -> StepDescriptor {
    StepDescriptor {
        name: name.to_string(),
        description: Some(format!("{name} description")),
        language: "bash".to_string(),
        code: format!("echo {name}"),
        required,
        timeout: DEFAULT_TIMEOUT,
        working_dir: PathBuf::from("."),
    }
}

pub fn test_environment() -> Environment {
    Environment {
        os: "Linux".to_string(),
        family: "unix".to_string(),
        arch: "x86_64".to_string(),
        runtime_version: "0.0.0-test".to_string(),
    }
}

/// A temporary directory holding a `README.md` with the given contents.
pub fn temp_document(contents: &str) -> std::io::Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("README.md");
    std::fs::write(&path, contents)?;
    Ok((dir, path))
}
