//! Merging per-OS run records into one cross-platform view.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::badges::{Badge, join_badges, last_verified_badge};
use crate::core::summary::{BadgeStatus, Summary};
use crate::core::types::RunRecord;

/// Display order for well-known platforms; anything else follows alphabetically.
const PREFERRED_OS_ORDER: [&str; 3] = ["macOS", "Linux", "Windows"];

/// Per-OS step counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OsCounts {
    pub total: usize,
    pub success: usize,
    pub failed: usize,
    pub warnings: usize,
}

impl OsCounts {
    fn add(&mut self, summary: &Summary) {
        self.total += summary.total;
        self.success += summary.success;
        self.failed += summary.failed;
        self.warnings += summary.warnings;
    }
}

/// Combined results across several hosts, persisted as `combined-results.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinedResults {
    pub timestamp: String,
    pub total_steps: usize,
    pub total_success: usize,
    pub total_failed: usize,
    pub total_warnings: usize,
    pub results_by_os: BTreeMap<String, OsCounts>,
}

impl CombinedResults {
    pub fn summary(&self) -> Summary {
        Summary::from_counts(
            self.total_steps,
            self.total_success,
            self.total_failed,
            self.total_warnings,
        )
    }

    /// OS names in display order.
    pub fn ordered_os(&self) -> Vec<&str> {
        let mut names: Vec<&str> = PREFERRED_OS_ORDER
            .iter()
            .copied()
            .filter(|os| self.results_by_os.contains_key(*os))
            .collect();
        names.extend(
            self.results_by_os
                .keys()
                .map(String::as_str)
                .filter(|os| !PREFERRED_OS_ORDER.contains(os)),
        );
        names
    }
}

/// Fold run records into combined totals. Records from the same OS are summed.
pub fn combine(records: &[RunRecord], timestamp: String) -> CombinedResults {
    let mut by_os: BTreeMap<String, OsCounts> = BTreeMap::new();
    let mut totals = OsCounts::default();
    for record in records {
        let summary = Summary::of_steps(&record.steps);
        by_os
            .entry(record.environment.os.clone())
            .or_default()
            .add(&summary);
        totals.add(&summary);
    }
    CombinedResults {
        timestamp,
        total_steps: totals.total,
        total_success: totals.success,
        total_failed: totals.failed,
        total_warnings: totals.warnings,
        results_by_os: by_os,
    }
}

/// Render the multi-OS badge set: overall status, platforms, last verified, success rate.
pub fn render_multi_os_badges(combined: &CombinedResults, verified_at: DateTime<Utc>) -> String {
    let summary = combined.summary();
    let status = summary.status();

    let platforms = combined
        .ordered_os()
        .iter()
        .map(|os| {
            let verdict = if combined.results_by_os[*os].failed == 0 {
                "OK"
            } else {
                "FAIL"
            };
            format!("{os} {verdict}")
        })
        .collect::<Vec<_>>()
        .join(" | ");
    let platforms_color = if combined.total_failed == 0 {
        BadgeStatus::Passing.color()
    } else {
        "blue"
    };

    let badges = [
        Badge::new("Multi-OS Status", "multi-os", status.label(), status.color()),
        Badge::new("Platforms", "platforms", &platforms, platforms_color),
        last_verified_badge(verified_at),
        Badge::new(
            "Success Rate",
            "success rate",
            &format!("{}%", summary.success_rate),
            status.color(),
        ),
    ];
    join_badges(&badges)
}
