//! Core engine of the trellis command-graph framework.
//!
//! A tool's grammar, execution, tab-completion, and usage text are all
//! expressed as one traversable graph of processors. At runtime a single
//! pass — execute, autocomplete, or usage — walks that graph against the
//! tokenized input line.

pub mod args;
pub mod branch;
pub mod completion;
pub mod data;
pub mod error;
pub mod flags;
pub mod input;
pub mod interp;
pub mod nodes;
pub mod operators;
pub mod output;
pub mod processor;
pub mod shellcmd;
pub mod sys;
pub mod trace_categories;
pub mod usage;
pub mod validate;

pub use args::{ArgCount, Argument, file_argument};
pub use branch::BranchNode;
pub use completion::{Completion, DeferredCompletion, FileCompleter};
pub use data::{Data, Value};
pub use error::{Error, ErrorKind};
pub use flags::{BoolFlag, Flag, FlagSet, bool_flag, flag};
pub use input::{Input, InputBreaker, Snapshot};
pub use nodes::{
    description, executable, executable_lines, executor, if_provided, set_env_var, unset_env_var,
};
pub use output::{CapturedOutput, Output};
pub use processor::{ExecuteData, Node, Processor, serial, serial_with};
pub use shellcmd::ShellCommand;
pub use sys::{CompType, Os};
pub use usage::{Usage, UsageSymbol};
