//! CLI command implementations.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::core::badges::render_badges;
use crate::core::combined::{combine, render_multi_os_badges};
use crate::core::extract::{ExtractDefaults, extract_steps};
use crate::core::summary::summarize;
use crate::core::types::StepDescriptor;
use crate::exit_codes;
use crate::io::config::{VerifierConfig, load_config};
use crate::io::document::{read_document, write_badges};
use crate::io::environment;
use crate::io::executor::ShellExecutor;
use crate::io::results::{load_combined, load_results, write_combined, write_results};
use crate::report::{render_header, render_progress, render_report};
use crate::run::Orchestrator;

/// Inputs for `verifier run`.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub document: PathBuf,
    pub config: PathBuf,
    /// Overrides `results_path` from the config.
    pub results: Option<PathBuf>,
    /// Skip writing badges even if the config enables it.
    pub no_update: bool,
}

/// Extract, execute, report, persist, and update badges. Returns the exit code.
pub fn run_document(opts: &RunOptions) -> Result<i32> {
    let cfg = load_config(&opts.config)?;
    let contents = read_document(&opts.document)?;
    let steps = extract(&contents, &cfg)?;
    debug!(steps = steps.len(), "steps extracted");

    let env = environment::detect();
    println!("{}", render_header(&env, &opts.document.display().to_string()));

    let executor = ShellExecutor::from_config(&cfg);
    let outcome = Orchestrator::new(&executor, env)
        .run(&steps, |event| println!("{}", render_progress(&event)));

    let summary = summarize(&outcome.record);
    println!();
    print!("{}", render_report(&outcome.record, &summary));

    let results_path = opts.results.as_ref().unwrap_or(&cfg.results_path);
    write_results(results_path, &outcome.record)?;
    println!("verify: results saved to {}", results_path.display());

    if cfg.update_document && !opts.no_update {
        let badges = render_badges(&summary, &outcome.record.environment, outcome.started_at);
        write_badges(&opts.document, &cfg.markers(), &badges)?;
        println!("verify: badges updated in {}", opts.document.display());
    }

    info!(
        phase = ?outcome.phase,
        failed = summary.failed,
        warnings = summary.warnings,
        "verification finished"
    );
    Ok(if summary.failed > 0 {
        exit_codes::FAILED
    } else {
        exit_codes::OK
    })
}

/// Print the steps that `run` would execute without running them.
pub fn list_steps(document: &Path, config: &Path) -> Result<()> {
    let cfg = load_config(config)?;
    let contents = read_document(document)?;
    let steps = extract(&contents, &cfg)?;
    if steps.is_empty() {
        println!("list: no verification steps found in {}", document.display());
        return Ok(());
    }
    for (idx, step) in steps.iter().enumerate() {
        println!(
            "{}. {} language={} required={} timeout_ms={} dir={}",
            idx + 1,
            step.name,
            step.language,
            step.required,
            step.timeout.as_millis(),
            step.working_dir.display()
        );
    }
    Ok(())
}

/// Merge per-OS result files into one combined record.
pub fn combine_results(inputs: &[PathBuf], output: &Path) -> Result<()> {
    if inputs.is_empty() {
        bail!("combine needs at least one results file");
    }
    let records = inputs
        .iter()
        .map(|path| load_results(path))
        .collect::<Result<Vec<_>>>()?;
    let combined = combine(&records, Utc::now().to_rfc3339());
    write_combined(output, &combined)?;
    println!(
        "combine: files={} os={} steps={} failed={} output={}",
        inputs.len(),
        combined.results_by_os.len(),
        combined.total_steps,
        combined.total_failed,
        output.display()
    );
    Ok(())
}

/// Render multi-OS badges from a combined record and splice them into the document.
pub fn update_multi_os_badges(document: &Path, combined: &Path, config: &Path) -> Result<()> {
    let cfg = load_config(config)?;
    let combined = load_combined(combined)?;
    let verified_at = DateTime::parse_from_rfc3339(&combined.timestamp)
        .with_context(|| format!("parse combined timestamp '{}'", combined.timestamp))?
        .with_timezone(&Utc);
    let badges = render_multi_os_badges(&combined, verified_at);
    write_badges(document, &cfg.markers(), &badges)?;
    println!(
        "badges: platforms={} document={}",
        combined.ordered_os().join(","),
        document.display()
    );
    Ok(())
}

fn extract(contents: &str, cfg: &VerifierConfig) -> Result<Vec<StepDescriptor>> {
    let cwd = std::env::current_dir().context("resolve current directory")?;
    let defaults = ExtractDefaults {
        timeout: Duration::from_millis(cfg.default_timeout_ms),
        working_dir: cwd,
    };
    Ok(extract_steps(contents, &defaults))
}
