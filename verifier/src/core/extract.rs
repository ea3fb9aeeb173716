//! Step extraction from annotated markdown.
//!
//! A step is a YAML metadata block delimited by `---` lines, immediately
//! followed by a fenced code block:
//!
//! ````markdown
//! ---
//! verify: true
//! step: "install"
//! ---
//! ```bash
//! npm install
//! ```
//! ````
//!
//! Only blocks whose metadata carries a truthy `verify` are extracted. A
//! candidate whose metadata fails to parse is skipped; scanning continues.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use regex::Regex;
use serde::Deserialize;
use serde_yaml::Value;
use tracing::{debug, warn};

use crate::core::types::{DEFAULT_LANGUAGE, DEFAULT_TIMEOUT, StepDescriptor};

/// Values applied when a metadata block omits a field.
#[derive(Debug, Clone)]
pub struct ExtractDefaults {
    pub timeout: Duration,
    /// Base for relative `workingDir` values and the default working dir.
    pub working_dir: PathBuf,
}

impl ExtractDefaults {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            working_dir: working_dir.into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StepMetadata {
    verify: Option<Value>,
    step: Option<Value>,
    description: Option<Value>,
    required: Option<Value>,
    /// Milliseconds, as a number or a numeric string.
    timeout: Option<Value>,
    #[serde(rename = "workingDir", alias = "working_dir")]
    working_dir: Option<PathBuf>,
}

/// A metadata block followed by a fenced code block, not yet interpreted.
#[derive(Debug)]
struct Candidate<'a> {
    line: usize,
    metadata: String,
    language: Option<&'a str>,
    code: String,
    next_line: usize,
}

/// Scan `document` and return the verifiable steps in document order.
pub fn extract_steps(document: &str, defaults: &ExtractDefaults) -> Vec<StepDescriptor> {
    let normalized = document.replace("\r\n", "\n");
    let lines: Vec<&str> = normalized.lines().collect();
    let mut steps = Vec::new();

    let mut idx = 0;
    while idx < lines.len() {
        let Some(candidate) = candidate_at(&lines, idx) else {
            idx += 1;
            continue;
        };
        idx = candidate.next_line;

        match interpret(&candidate, steps.len() + 1, defaults) {
            Ok(Some(step)) => {
                debug!(line = candidate.line + 1, name = %step.name, "extracted step");
                steps.push(step);
            }
            Ok(None) => {
                debug!(line = candidate.line + 1, "metadata block not marked verify");
            }
            Err(err) => {
                let detail = format!("{err:#}");
                if candidate.metadata.to_lowercase().contains("verify") {
                    warn!(line = candidate.line + 1, err = %detail, "skipping block with invalid metadata");
                } else {
                    debug!(line = candidate.line + 1, err = %detail, "ignoring unparsable frontmatter-like block");
                }
            }
        }
    }

    steps
}

fn candidate_at<'a>(lines: &[&'a str], start: usize) -> Option<Candidate<'a>> {
    if !is_rule(lines[start]) {
        return None;
    }
    let close = (start + 1..lines.len()).find(|&i| is_rule(lines[i]))?;
    let fence_line: &'a str = lines.get(close + 1).copied()?;
    let language = fence_open(fence_line)?;
    let fence_close = (close + 2..lines.len()).find(|&i| lines[i].trim() == "```")?;

    Some(Candidate {
        line: start,
        metadata: dedent(&lines[start + 1..close], indent_of(lines[start])),
        language,
        code: lines[close + 2..fence_close].join("\n").trim().to_string(),
        next_line: fence_close + 1,
    })
}

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start_matches([' ', '\t']).len()
}

/// Strip up to `indent` leading whitespace bytes from each line (metadata nested in a list item).
fn dedent(lines: &[&str], indent: usize) -> String {
    lines
        .iter()
        .map(|line| &line[indent.min(indent_of(line))..])
        .collect::<Vec<_>>()
        .join("\n")
}

fn is_rule(line: &str) -> bool {
    line.trim() == "---"
}

/// Returns `Some(info)` when `line` opens a fence; `info` is the language tag if any.
fn fence_open(line: &str) -> Option<Option<&str>> {
    static FENCE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^\s*```\s*([\w+#.-]*)").expect("fence regex"));
    let caps = FENCE_RE.captures(line)?;
    let info = caps.get(1).map(|m| m.as_str()).filter(|s| !s.is_empty());
    Some(info)
}

fn interpret(
    candidate: &Candidate<'_>,
    position: usize,
    defaults: &ExtractDefaults,
) -> Result<Option<StepDescriptor>> {
    if candidate.metadata.trim().is_empty() {
        return Ok(None);
    }
    let meta: StepMetadata =
        serde_yaml::from_str(&candidate.metadata).context("parse step metadata")?;

    if !meta.verify.as_ref().is_some_and(is_truthy) {
        return Ok(None);
    }

    let name = match &meta.step {
        Some(value) => scalar_to_string(value).context("step name")?,
        None => format!("step-{position}"),
    };

    let description = match &meta.description {
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(value) => Some(scalar_to_string(value).context("description")?),
        None => None,
    };
    let required = match &meta.required {
        Some(value) => parse_flag(value).context("required")?,
        None => true,
    };
    let timeout = match &meta.timeout {
        Some(value) => Duration::from_millis(parse_millis(value).context("timeout")?),
        None => defaults.timeout,
    };

    Ok(Some(StepDescriptor {
        name,
        description,
        language: candidate
            .language
            .unwrap_or(DEFAULT_LANGUAGE)
            .to_string(),
        code: candidate.code.clone(),
        required,
        timeout,
        working_dir: resolve_dir(&defaults.working_dir, meta.working_dir.as_deref()),
    }))
}

fn resolve_dir(base: &Path, dir: Option<&Path>) -> PathBuf {
    match dir {
        Some(dir) if dir.is_absolute() => dir.to_path_buf(),
        Some(dir) => base.join(dir),
        None => base.to_path_buf(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "yes" | "on" | "1"
        ),
        _ => false,
    }
}

/// Booleans, numbers, and the usual YAML 1.1 words (`yes`/`no`, `on`/`off`) in strings.
fn parse_flag(value: &Value) -> Result<bool> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Number(n) => Ok(n.as_f64().is_some_and(|f| f != 0.0)),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(true),
            "false" | "no" | "off" | "0" => Ok(false),
            other => bail!("expected a boolean, got {other:?}"),
        },
        _ => bail!("expected a boolean, got {value:?}"),
    }
}

fn parse_millis(value: &Value) -> Result<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .with_context(|| format!("expected whole milliseconds, got {n}")),
        Value::String(s) => s
            .trim()
            .parse()
            .with_context(|| format!("expected whole milliseconds, got {s:?}")),
        _ => bail!("expected milliseconds, got {value:?}"),
    }
}

fn scalar_to_string(value: &Value) -> Result<String> {
    let name = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => bail!("expected a scalar, got {value:?}"),
    };
    if name.trim().is_empty() {
        bail!("must not be empty");
    }
    Ok(name)
}
