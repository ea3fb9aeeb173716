//! Side-effecting operations: filesystem, process execution, host probing.

pub mod config;
pub mod document;
pub mod environment;
pub mod executor;
pub mod files;
pub mod process;
pub mod results;
