//! Trace utilities

/// Trace category for completion generation.
pub const COMPLETION: &str = "completion";
/// Trace category for graph execution.
pub const EXECUTION: &str = "execution";
/// Trace category for flag processing.
pub const FLAGS: &str = "flags";
/// Trace category for input tokenization and consumption.
pub const INPUT: &str = "input";
/// Trace category for shell commands run by the graph.
pub const SHELL_COMMAND: &str = "shell_command";
/// Trace category for usage generation.
pub const USAGE: &str = "usage";
