//! Binary-host layer for trellis command graphs.
//!
//! A tool author registers their graphs as [`Cli`] implementations and
//! calls [`run`] from `main`; the generated shell integration (printed by
//! the `source` subcommand) wires each CLI into the interactive shell for
//! both execution and tab-completion.

pub mod args;
pub mod entry;

pub use entry::{Cli, GraphCli, run, run_with_args};
