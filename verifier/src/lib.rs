//! Living documentation verifier.
//!
//! Extracts annotated code blocks from a markdown document, runs them in
//! order, records the outcome, and writes status badges back into the
//! document.
//!
//! - **[`core`]**: Pure logic (step extraction, summaries, badge rendering,
//!   document splicing). No I/O.
//! - **[`io`]**: Side effects (config, subprocesses, result files, the document).
//!
//! [`run`] drives the step sequence; [`cli`] wires everything into commands.

pub mod cli;
pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod report;
pub mod run;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
