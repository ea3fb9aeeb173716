//! Reading the annotated document and writing badges back into it.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, instrument};

use crate::core::badges::{BadgeMarkers, badge_block, splice_badges};
use crate::io::files::write_atomic;

pub fn read_document(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("read document {}", path.display()))
}

/// Splice `badges` into the document at `path` and overwrite it.
///
/// A symlinked document is followed and its target rewritten. Returns whether
/// the content changed.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn write_badges(path: &Path, markers: &BadgeMarkers, badges: &str) -> Result<bool> {
    let current = read_document(path)?;
    let updated = splice_badges(&current, markers, &badge_block(markers, badges));
    let changed = updated != current;
    let target =
        fs::canonicalize(path).with_context(|| format!("resolve document {}", path.display()))?;
    write_atomic(&target, &updated)
        .with_context(|| format!("update document {}", path.display()))?;
    debug!(changed, "document badges written");
    Ok(changed)
}
