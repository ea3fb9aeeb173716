//! Host environment snapshot recorded with each run.

use crate::core::types::Environment;

/// Capture the current host's OS, family, architecture and tool version.
pub fn detect() -> Environment {
    Environment {
        os: os_display_name(std::env::consts::OS),
        family: std::env::consts::FAMILY.to_string(),
        arch: std::env::consts::ARCH.to_string(),
        runtime_version: env!("CARGO_PKG_VERSION").to_string(),
    }
}

/// Human-facing OS name used in badges and combined results.
pub fn os_display_name(os: &str) -> String {
    match os {
        "macos" => "macOS".to_string(),
        "linux" => "Linux".to_string(),
        "windows" => "Windows".to_string(),
        other => other.to_string(),
    }
}
