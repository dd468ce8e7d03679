//! Error facilities

/// Unified error type for this crate. Wraps an [`ErrorKind`] so that
/// callers can match on the kind while the crate keeps room for
/// additional context later.
#[derive(thiserror::Error, Debug)]
#[error(transparent)]
pub struct Error {
    /// The kind of error.
    kind: ErrorKind,
}

/// Monolithic error type for the command-graph engine.
#[derive(thiserror::Error, Debug)]
pub enum ErrorKind {
    /// A positional argument was given fewer tokens than its minimum arity.
    #[error("Argument {name:?} requires at least {min} argument{}, got {got}", if *.min == 1 { "" } else { "s" })]
    NotEnoughArgs {
        /// Name of the under-filled argument.
        name: String,
        /// Minimum number of tokens the argument requires.
        min: usize,
        /// Number of tokens that were actually available.
        got: usize,
    },

    /// Tokens remained on the input after the graph was fully traversed.
    #[error("Unprocessed extra args: [{}]", .args.join(" "))]
    ExtraArgs {
        /// The leftover tokens, in input order.
        args: Vec<String>,
    },

    /// A branch token matched no branch and the branch node has no default.
    #[error("Branching argument must be one of [{}]", .choices.join(" "))]
    Branching {
        /// The valid branch names, sorted ascending.
        choices: Vec<String>,
    },

    /// A validator rejected an argument's value.
    #[error("validation for {name:?} failed: [{tag}] {detail}")]
    Validation {
        /// Name of the argument whose value failed validation.
        name: String,
        /// Fixed tag of the validator that rejected the value.
        tag: &'static str,
        /// Validator-specific detail message.
        detail: String,
    },

    /// A token could not be converted to the argument's type.
    #[error("failed to parse {value:?} as {type_name}")]
    Parse {
        /// The offending token.
        value: String,
        /// Name of the target type.
        type_name: &'static str,
    },

    /// The command line was structurally invalid for the requested pass.
    #[error("{0}")]
    Usage(String),

    /// A processor requested immediate termination of the pass; the carried
    /// error becomes the pass result.
    #[error(transparent)]
    Termination(Box<Error>),

    /// A shell command run by the graph exited unsuccessfully.
    #[error("shell command {command:?} failed: {message}")]
    ShellCommand {
        /// The command that was run.
        command: String,
        /// The child's exit code, when one was available.
        code: Option<i32>,
        /// Description of the failure.
        message: String,
    },

    /// A deferred-completion sub-graph failed to execute.
    #[error("failed to execute DeferredCompletion graph: {0}")]
    DeferredCompletion(#[source] Box<Error>),

    /// An error annotated with additional caller context.
    #[error("{context}: {source}")]
    Annotated {
        /// The annotation text.
        context: String,
        /// The underlying error.
        source: Box<Error>,
    },

    /// An I/O error occurred.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Any other error, described by a message.
    #[error("{0}")]
    Custom(String),
}

impl Error {
    /// Returns the kind of this error.
    pub const fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Consumes the error, returning its kind.
    pub fn into_kind(self) -> ErrorKind {
        self.kind
    }

    /// Returns a new error from a plain message.
    pub fn custom(message: impl Into<String>) -> Self {
        ErrorKind::Custom(message.into()).into()
    }

    /// Returns a `NOT_ENOUGH_ARGS` error for the named argument.
    pub fn not_enough_args(name: impl Into<String>, min: usize, got: usize) -> Self {
        ErrorKind::NotEnoughArgs {
            name: name.into(),
            min,
            got,
        }
        .into()
    }

    /// Returns an `EXTRA_ARGS` error carrying the leftover tokens.
    pub fn extra_args(args: Vec<String>) -> Self {
        ErrorKind::ExtraArgs { args }.into()
    }

    /// Returns a `BRANCHING` error listing the valid (sorted) branch names.
    pub fn branching(choices: Vec<String>) -> Self {
        ErrorKind::Branching { choices }.into()
    }

    /// Returns a `VALIDATION` error for the named argument.
    pub fn validation(name: impl Into<String>, tag: &'static str, detail: impl Into<String>) -> Self {
        ErrorKind::Validation {
            name: name.into(),
            tag,
            detail: detail.into(),
        }
        .into()
    }

    /// Returns a `USAGE` error.
    pub fn usage(message: impl Into<String>) -> Self {
        ErrorKind::Usage(message.into()).into()
    }

    /// Wraps the given error into a termination request. The graph driver
    /// stops the pass immediately and reports the carried error as the pass
    /// result.
    pub fn termination(err: Self) -> Self {
        ErrorKind::Termination(Box::new(err)).into()
    }

    /// Returns whether this error is a termination request.
    pub const fn is_termination(&self) -> bool {
        matches!(self.kind, ErrorKind::Termination(_))
    }

    /// Unwraps a termination request into its carried error; any other error
    /// is returned unchanged.
    pub fn unwrap_termination(self) -> Self {
        match self.kind {
            ErrorKind::Termination(inner) => *inner,
            kind => kind.into(),
        }
    }

    /// Wraps this error with additional context.
    pub fn annotate(self, context: impl Into<String>) -> Self {
        ErrorKind::Annotated {
            context: context.into(),
            source: Box::new(self),
        }
        .into()
    }

    /// Returns the well-known process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match &self.kind {
            ErrorKind::Usage(_) => 2,
            ErrorKind::ExtraArgs { .. } => 3,
            ErrorKind::NotEnoughArgs { .. } => 4,
            ErrorKind::Branching { .. } => 5,
            ErrorKind::Validation { .. } | ErrorKind::Parse { .. } => 6,
            ErrorKind::Termination(_) => 10,
            ErrorKind::ShellCommand { code, .. } => match code {
                Some(c) if *c > 0 => u8::try_from(*c).unwrap_or(11),
                _ => 11,
            },
            ErrorKind::Io(_) => 12,
            ErrorKind::Annotated { source, .. } => source.exit_code(),
            ErrorKind::DeferredCompletion(_) | ErrorKind::Custom(_) => 1,
        }
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self { kind }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self {
            kind: ErrorKind::Io(err),
        }
    }
}
