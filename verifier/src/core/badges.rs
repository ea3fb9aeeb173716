//! Badge rendering and badge-block splicing.
//!
//! Everything here is a pure text transform; reading and writing the
//! document lives in `io::document`.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};

use crate::core::summary::Summary;
use crate::core::types::Environment;

pub const DEFAULT_START_MARKER: &str = "<!-- VERIFICATION-BADGES -->";
pub const DEFAULT_END_MARKER: &str = "<!-- END-VERIFICATION-BADGES -->";

const SHIELDS_BASE: &str = "https://img.shields.io/badge";

/// Comment tokens delimiting the badge region in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadgeMarkers {
    pub start: String,
    pub end: String,
}

impl Default for BadgeMarkers {
    fn default() -> Self {
        Self {
            start: DEFAULT_START_MARKER.to_string(),
            end: DEFAULT_END_MARKER.to_string(),
        }
    }
}

/// A static shields.io badge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    pub alt: String,
    pub label: String,
    pub message: String,
    pub color: String,
}

impl Badge {
    pub fn new(alt: &str, label: &str, message: &str, color: &str) -> Self {
        Self {
            alt: alt.to_string(),
            label: label.to_string(),
            message: message.to_string(),
            color: color.to_string(),
        }
    }

    pub fn url(&self) -> String {
        format!(
            "{SHIELDS_BASE}/{}-{}-{}",
            escape_component(&self.label),
            escape_component(&self.message),
            escape_component(&self.color)
        )
    }

    pub fn to_markdown(&self) -> String {
        format!("![{}]({})", self.alt, self.url())
    }
}

/// Render the single-host badge set: setup status, OS, last verified date, success rate.
pub fn render_badges(summary: &Summary, env: &Environment, verified_at: DateTime<Utc>) -> String {
    let status = summary.status();
    let badges = [
        Badge::new("Setup Status", "setup", status.label(), status.color()),
        Badge::new("Verified On", "verified on", &env.os, "blue"),
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

pub(crate) fn last_verified_badge(verified_at: DateTime<Utc>) -> Badge {
    let date = verified_at.format("%m/%d/%Y").to_string();
    Badge::new("Last Verified", "last verified", &date, "lightgrey")
}

pub(crate) fn join_badges(badges: &[Badge]) -> String {
    badges
        .iter()
        .map(Badge::to_markdown)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Wrap rendered badges in the marker pair.
pub fn badge_block(markers: &BadgeMarkers, badges: &str) -> String {
    format!("{}\n{}\n{}", markers.start, badges, markers.end)
}

/// Return `document` with the badge region replaced by `block`.
///
/// The first well-formed marker pair (an end marker preceded by a start
/// marker, with no other end marker in between) is replaced inclusively.
/// Without such a pair the block goes after the first `# ` heading, or at the
/// top when the document has no heading.
pub fn splice_badges(document: &str, markers: &BadgeMarkers, block: &str) -> String {
    if let Some((start, end)) = find_marker_span(document, markers) {
        let mut out = String::with_capacity(document.len() + block.len());
        out.push_str(&document[..start]);
        out.push_str(block);
        out.push_str(&document[end..]);
        return out;
    }

    let mut lines: Vec<&str> = document.split('\n').collect();
    match lines.iter().position(|line| line.starts_with("# ")) {
        Some(idx) => {
            for (offset, line) in ["", block, ""].into_iter().enumerate() {
                lines.insert(idx + 1 + offset, line);
            }
            lines.join("\n")
        }
        None => format!("{block}\n\n{document}"),
    }
}

fn find_marker_span(document: &str, markers: &BadgeMarkers) -> Option<(usize, usize)> {
    let mut from = 0;
    while let Some(rel) = document[from..].find(&markers.end) {
        let end_at = from + rel;
        if let Some(start_rel) = document[from..end_at].rfind(&markers.start) {
            return Some((from + start_rel, end_at + markers.end.len()));
        }
        from = end_at + markers.end.len();
    }
    None
}

/// Escape text for a shields.io static badge path segment.
fn escape_component(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '-' => out.push_str("--"),
            '_' => out.push_str("__"),
            c if c.is_ascii_alphanumeric() || c == '.' || c == '~' => out.push(c),
            c => {
                let mut buf = [0u8; 4];
                for byte in c.encode_utf8(&mut buf).bytes() {
                    let _ = write!(out, "%{byte:02X}");
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn env() -> Environment {
        Environment {
            os: "macOS".to_string(),
            family: "unix".to_string(),
            arch: "aarch64".to_string(),
            runtime_version: "0.1.0".to_string(),
        }
    }

    fn verified_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 7, 12, 0, 0).unwrap()
    }

    #[test]
    fn renders_passing_badges() {
        let summary = Summary::from_counts(2, 2, 0, 0);
        let rendered = render_badges(&summary, &env(), verified_at());
        assert_eq!(
            rendered,
            "![Setup Status](https://img.shields.io/badge/setup-passing-brightgreen) \
             ![Verified On](https://img.shields.io/badge/verified%20on-macOS-blue) \
             ![Last Verified](https://img.shields.io/badge/last%20verified-03%2F07%2F2026-lightgrey) \
             ![Success Rate](https://img.shields.io/badge/success%20rate-100%25-brightgreen)"
        );
    }

    #[test]
    fn partial_and_failing_colors() {
        let partial = render_badges(&Summary::from_counts(2, 1, 0, 1), &env(), verified_at());
        assert!(partial.contains("setup-partial-yellow"));
        assert!(partial.contains("success%20rate-50%25-yellow"));

        let failing = render_badges(&Summary::from_counts(3, 2, 1, 0), &env(), verified_at());
        assert!(failing.contains("setup-failing-red"));
        assert!(failing.contains("success%20rate-67%25-red"));
    }

    #[test]
    fn escapes_dashes_and_underscores() {
        assert_eq!(escape_component("multi-os_x"), "multi--os__x");
        assert_eq!(escape_component("a | b"), "a%20%7C%20b");
    }

    #[test]
    fn inserts_after_first_heading_when_markers_absent() {
        let markers = BadgeMarkers::default();
        let block = badge_block(&markers, "BADGES");
        let doc = "intro\n# Title\n\nBody\n# Second\n";
        let updated = splice_badges(doc, &markers, &block);
        assert_eq!(
            updated,
            format!("intro\n# Title\n\n{block}\n\n\nBody\n# Second\n")
        );
    }

    #[test]
    fn inserts_at_top_without_heading() {
        let markers = BadgeMarkers::default();
        let block = badge_block(&markers, "BADGES");
        let updated = splice_badges("just text\n", &markers, &block);
        assert_eq!(updated, format!("{block}\n\njust text\n"));
    }

    #[test]
    fn subheadings_are_not_top_level() {
        let markers = BadgeMarkers::default();
        let block = badge_block(&markers, "B");
        let updated = splice_badges("## Sub\ntext\n", &markers, &block);
        assert!(updated.starts_with(&block));
    }

    #[test]
    fn replacing_twice_keeps_one_block() {
        let markers = BadgeMarkers::default();
        let doc = "# Title\n\nBody\n";
        let once = splice_badges(doc, &markers, &badge_block(&markers, "first"));
        let twice = splice_badges(&once, &markers, &badge_block(&markers, "second"));
        assert_eq!(twice.matches(&markers.start).count(), 1);
        assert_eq!(twice.matches(&markers.end).count(), 1);
        assert!(twice.contains("second"));
        assert!(!twice.contains("first"));
        assert_eq!(
            twice,
            splice_badges(&twice, &markers, &badge_block(&markers, "second"))
        );
    }

    #[test]
    fn replaces_existing_span_inclusively() {
        let markers = BadgeMarkers::default();
        let doc = format!(
            "# T\n{}\nold badges\nmore\n{}\ntail\n",
            markers.start, markers.end
        );
        let block = badge_block(&markers, "new");
        let updated = splice_badges(&doc, &markers, &block);
        assert_eq!(updated, format!("# T\n{block}\ntail\n"));
    }

    #[test]
    fn end_before_start_is_treated_as_absent() {
        let markers = BadgeMarkers::default();
        let doc = format!("# T\n{}\nmiddle\n{}\n", markers.end, markers.start);
        let block = badge_block(&markers, "new");
        let updated = splice_badges(&doc, &markers, &block);
        assert!(updated.starts_with(&format!("# T\n\n{block}\n\n")));
        assert!(updated.contains("middle"));
    }

    #[test]
    fn stray_end_marker_before_valid_pair_is_skipped() {
        let markers = BadgeMarkers::default();
        let doc = format!(
            "{end}\n# T\n{start}\nold\n{end}\n",
            start = markers.start,
            end = markers.end
        );
        let block = badge_block(&markers, "new");
        let updated = splice_badges(&doc, &markers, &block);
        assert_eq!(updated, format!("{}\n# T\n{block}\n", markers.end));
    }
}
