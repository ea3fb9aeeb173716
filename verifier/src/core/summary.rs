//! Aggregate counts derived from a finished run.

use serde::{Deserialize, Serialize};

use crate::core::types::{RunRecord, StepResult, StepStatus};

/// Derived totals for a run. Computed on demand, never stored with the record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total: usize,
    pub success: usize,
    pub failed: usize,
    pub warnings: usize,
    /// Whole percent, rounded half up. Zero when there are no steps.
    pub success_rate: u32,
}

impl Summary {
    pub fn from_counts(total: usize, success: usize, failed: usize, warnings: usize) -> Self {
        Self {
            total,
            success,
            failed,
            warnings,
            success_rate: success_rate(success, total),
        }
    }

    pub fn of_steps(steps: &[StepResult]) -> Self {
        let count = |status: StepStatus| steps.iter().filter(|s| s.status == status).count();
        Self::from_counts(
            steps.len(),
            count(StepStatus::Success),
            count(StepStatus::Failed),
            count(StepStatus::Warning),
        )
    }

    pub fn status(&self) -> BadgeStatus {
        BadgeStatus::classify(self.failed, self.warnings)
    }
}

/// Summarize a finished run record.
pub fn summarize(record: &RunRecord) -> Summary {
    Summary::of_steps(&record.steps)
}

fn success_rate(success: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((success * 200 + total) / (2 * total)) as u32
}

/// Three-tier overall status used by the badges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeStatus {
    Passing,
    Partial,
    Failing,
}

impl BadgeStatus {
    pub fn classify(failed: usize, warnings: usize) -> Self {
        match (failed, warnings) {
            (0, 0) => BadgeStatus::Passing,
            (0, _) => BadgeStatus::Partial,
            _ => BadgeStatus::Failing,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BadgeStatus::Passing => "passing",
            BadgeStatus::Partial => "partial",
            BadgeStatus::Failing => "failing",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            BadgeStatus::Passing => "brightgreen",
            BadgeStatus::Partial => "yellow",
            BadgeStatus::Failing => "red",
        }
    }
}
