//! Command-line grammar of a generated host binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

const ABOUT: &str = "Hosts trellis command graphs behind one binary; the sourceable shell \
integration dispatches here for execution, completion, and usage.";

/// Parsed command-line arguments for a host binary.
#[derive(Clone, Debug, Parser)]
#[command(name = "trellis-host", about = ABOUT)]
pub struct CommandLineArgs {
    /// The requested operation.
    #[command(subcommand)]
    pub command: HostCommand,
}

/// The subcommands every generated binary exposes.
#[derive(Clone, Debug, Subcommand)]
pub enum HostCommand {
    /// Run a hosted CLI and write its shell-evaluated lines to a file.
    Execute {
        /// Name of the hosted CLI to run.
        cli: String,
        /// File the executable lines are written to; the shell wrapper
        /// sources it after this process exits.
        output_file: PathBuf,
        /// Arguments forwarded to the CLI's graph.
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Produce completion candidates for the shell's completion hook.
    Autocomplete {
        /// Name of the hosted CLI being completed.
        cli: String,
        /// The shell's `COMP_TYPE` value.
        comp_type: i32,
        /// The shell's `COMP_POINT` cursor byte offset.
        comp_point: usize,
        /// The shell's `COMP_LINE` completion line.
        comp_line: String,
        /// Tokens prepended ahead of the typed arguments; alias wrappers
        /// use these to freeze leading arguments.
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        passthrough: Vec<String>,
    },

    /// Print a hosted CLI's usage document.
    Usage {
        /// Name of the hosted CLI.
        cli: String,
        /// Tokens pre-consumed to produce contextual usage.
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Print the name of every hosted CLI, one per line.
    #[command(name = "listCLIs")]
    ListClis,

    /// Print the host-shell integration script for this binary.
    Source {
        /// Suffix used to name the captured runner binary and the wrapper
        /// functions.
        suffix: String,
    },
}
