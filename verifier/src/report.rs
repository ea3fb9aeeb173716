//! Human-readable console output: per-step progress lines and the final report.

use std::fmt::Write as _;

use crate::core::summary::Summary;
use crate::core::types::{Environment, RunRecord, StepDescriptor, StepResult, StepStatus};
use crate::run::Progress;

const RULE_WIDTH: usize = 60;

pub fn render_header(env: &Environment, document: &str) -> String {
    format!(
        "verify: document={} os={} arch={} version={}",
        document, env.os, env.arch, env.runtime_version
    )
}

/// One line (or a few) per progress event.
pub fn render_progress(event: &Progress<'_>) -> String {
    match event {
        Progress::NoSteps => "verify: no verification steps found".to_string(),
        Progress::Found { total } => format!("verify: found {total} step(s)"),
        Progress::Starting { index, total, step } => render_starting(*index, *total, step),
        Progress::Finished { result, required } => render_finished(result, *required),
    }
}

fn render_starting(index: usize, total: usize, step: &StepDescriptor) -> String {
    let mut line = format!("[{}/{}] {}", index + 1, total, step.name);
    if let Some(description) = &step.description {
        let _ = write!(line, " - {description}");
    }
    line
}

fn render_finished(result: &StepResult, required: bool) -> String {
    let mut line = format!(
        "      {} ({} ms)",
        result.status.as_str(),
        result.duration_ms
    );
    if !result.error.trim().is_empty() {
        let _ = write!(line, "\n      error: {}", first_line(&result.error));
    }
    if result.status == StepStatus::Warning && !required {
        line.push_str("\n      optional step, continuing");
    }
    line
}

/// Tabular summary of a finished run.
pub fn render_report(record: &RunRecord, summary: &Summary) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut out = String::new();
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "VERIFICATION REPORT");
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "total:        {}", summary.total);
    let _ = writeln!(out, "success:      {}", summary.success);
    let _ = writeln!(out, "failed:       {}", summary.failed);
    let _ = writeln!(out, "warnings:     {}", summary.warnings);
    let _ = writeln!(out, "success rate: {}%", summary.success_rate);
    let _ = writeln!(out, "{rule}");

    if record.steps.is_empty() {
        let _ = writeln!(out, "no steps were executed");
        return out;
    }

    let name_width = record
        .steps
        .iter()
        .map(|s| s.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("step".len());
    let _ = writeln!(
        out,
        "{:>3}  {:<name_width$}  {:<8}  {:>10}",
        "#", "step", "status", "duration"
    );
    for (idx, step) in record.steps.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3}  {:<name_width$}  {:<8}  {:>7} ms",
            idx + 1,
            step.name,
            step.status.as_str(),
            step.duration_ms
        );
        if !step.error.trim().is_empty() {
            let _ = writeln!(out, "     error: {}", first_line(&step.error));
        }
    }
    out
}

fn first_line(text: &str) -> &str {
    text.trim().lines().next().unwrap_or_default()
}
