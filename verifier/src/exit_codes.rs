//! Stable exit codes for verifier CLI commands.

/// Command succeeded and no step reported `failed`.
pub const OK: i32 = 0;
/// A step failed, or the command hit an error (unreadable document, bad config, I/O).
pub const FAILED: i32 = 1;
