//! Run orchestration: execute extracted steps in order, halting on the first
//! failed required step.
//!
//! ```text
//! NotStarted ──▶ Running ──▶ Completed
//!                   │
//!                   └──────▶ HaltedOnFailure
//! ```
//!
//! An empty step list goes straight to `Completed`; [`RunOutcome::no_steps_found`]
//! tells that case apart from a run whose steps all passed.

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

use crate::core::types::{Environment, RunRecord, StepDescriptor, StepResult, StepStatus};
use crate::io::executor::StepExecutor;

/// Lifecycle of a single run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunPhase {
    NotStarted,
    Running,
    Completed,
    /// A required step failed; later steps never ran.
    HaltedOnFailure { step: String },
}

impl RunPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunPhase::Completed | RunPhase::HaltedOnFailure { .. })
    }
}

/// Progress notifications emitted while a run advances.
#[derive(Debug)]
pub enum Progress<'a> {
    NoSteps,
    Found { total: usize },
    Starting {
        index: usize,
        total: usize,
        step: &'a StepDescriptor,
    },
    Finished {
        result: &'a StepResult,
        required: bool,
    },
}

/// Terminal state of a run together with everything it recorded.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub phase: RunPhase,
    pub record: RunRecord,
    pub steps_found: usize,
    pub started_at: DateTime<Utc>,
}

impl RunOutcome {
    pub fn no_steps_found(&self) -> bool {
        self.steps_found == 0
    }

    pub fn halted(&self) -> bool {
        matches!(self.phase, RunPhase::HaltedOnFailure { .. })
    }
}

/// Sequential step runner owning the in-progress record.
pub struct Orchestrator<'a, E: StepExecutor> {
    executor: &'a E,
    phase: RunPhase,
    record: RunRecord,
    started_at: DateTime<Utc>,
}

impl<'a, E: StepExecutor> Orchestrator<'a, E> {
    pub fn new(executor: &'a E, environment: Environment) -> Self {
        let started_at = Utc::now();
        Self {
            executor,
            phase: RunPhase::NotStarted,
            record: RunRecord::new(started_at.to_rfc3339(), environment),
            started_at,
        }
    }

    pub fn phase(&self) -> &RunPhase {
        &self.phase
    }

    /// Execute `steps` in order and return the terminal outcome.
    #[instrument(skip_all, fields(steps = steps.len()))]
    pub fn run(
        mut self,
        steps: &[StepDescriptor],
        mut progress: impl FnMut(Progress<'_>),
    ) -> RunOutcome {
        debug_assert_eq!(self.phase, RunPhase::NotStarted);

        if steps.is_empty() {
            info!("no verification steps found");
            progress(Progress::NoSteps);
            self.phase = RunPhase::Completed;
            return self.finish(0);
        }

        self.phase = RunPhase::Running;
        progress(Progress::Found { total: steps.len() });

        for (index, step) in steps.iter().enumerate() {
            progress(Progress::Starting {
                index,
                total: steps.len(),
                step,
            });
            let mut result = self.executor.execute(step);
            if result.status == StepStatus::Failed && !step.required {
                result.status = StepStatus::Warning;
            }
            debug!(step = %result.name, status = result.status.as_str(), "step finished");
            progress(Progress::Finished {
                result: &result,
                required: step.required,
            });

            let halt = result.status == StepStatus::Failed;
            self.record.steps.push(result);
            if halt {
                let skipped = steps.len() - index - 1;
                warn!(step = %step.name, skipped, "required step failed, halting run");
                self.phase = RunPhase::HaltedOnFailure {
                    step: step.name.clone(),
                };
                return self.finish(steps.len());
            }
        }

        self.phase = RunPhase::Completed;
        self.finish(steps.len())
    }

    fn finish(self, steps_found: usize) -> RunOutcome {
        info!(
            phase = ?self.phase,
            attempted = self.record.steps.len(),
            steps_found,
            "run finished"
        );
        RunOutcome {
            phase: self.phase,
            record: self.record,
            steps_found,
            started_at: self.started_at,
        }
    }
}

/// Convenience wrapper: run `steps` with `executor` and no progress reporting.
pub fn run_steps<E: StepExecutor>(
    executor: &E,
    environment: Environment,
    steps: &[StepDescriptor],
) -> RunOutcome {
    Orchestrator::new(executor, environment).run(steps, |_| {})
}
