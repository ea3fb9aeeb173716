//! Persisting run records and combined multi-OS results.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::core::combined::CombinedResults;
use crate::core::types::RunRecord;
use crate::io::files::write_json;

/// Write the run record to `path`, replacing any previous file.
#[instrument(skip_all, fields(path = %path.display(), steps = record.steps.len()))]
pub fn write_results(path: &Path, record: &RunRecord) -> Result<()> {
    write_json(path, record).with_context(|| format!("write results {}", path.display()))?;
    debug!("results written");
    Ok(())
}

pub fn load_results(path: &Path) -> Result<RunRecord> {
    load_json(path)
}

pub fn write_combined(path: &Path, combined: &CombinedResults) -> Result<()> {
    write_json(path, combined)
        .with_context(|| format!("write combined results {}", path.display()))
}

pub fn load_combined(path: &Path) -> Result<CombinedResults> {
    load_json(path)
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parse {}", path.display()))
}
