//! Output sinks written to during a pass.

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use crate::error::Error;

/// A single output stream. Captured sinks share their buffer with the
/// [`CapturedOutput`] handle returned at construction time; the sink
/// variant discards all writes (used for deferred-completion sub-graphs).
enum OutputSink {
    Stdout,
    Stderr,
    Captured(Rc<RefCell<Vec<u8>>>),
    Sink,
}

impl OutputSink {
    fn write(&mut self, text: &str) {
        match self {
            Self::Stdout => {
                let _ = std::io::stdout().write_all(text.as_bytes());
            }
            Self::Stderr => {
                let _ = std::io::stderr().write_all(text.as_bytes());
            }
            Self::Captured(buffer) => {
                buffer.borrow_mut().extend_from_slice(text.as_bytes());
            }
            Self::Sink => {}
        }
    }
}

/// The pair of streams a pass writes to.
pub struct Output {
    stdout: OutputSink,
    stderr: OutputSink,
}

impl Output {
    /// Returns an output writing to the process's standard streams.
    pub fn stdio() -> Self {
        Self {
            stdout: OutputSink::Stdout,
            stderr: OutputSink::Stderr,
        }
    }

    /// Returns an output that discards everything written to it.
    pub fn sink() -> Self {
        Self {
            stdout: OutputSink::Sink,
            stderr: OutputSink::Sink,
        }
    }

    /// Returns an output capturing both streams in memory, along with the
    /// handle used to read the captured text back.
    pub fn captured() -> (Self, CapturedOutput) {
        let stdout = Rc::new(RefCell::new(Vec::new()));
        let stderr = Rc::new(RefCell::new(Vec::new()));
        let output = Self {
            stdout: OutputSink::Captured(stdout.clone()),
            stderr: OutputSink::Captured(stderr.clone()),
        };
        (output, CapturedOutput { stdout, stderr })
    }

    /// Writes text to standard output.
    pub fn stdout(&mut self, text: impl AsRef<str>) {
        self.stdout.write(text.as_ref());
    }

    /// Writes a line to standard output.
    pub fn stdoutln(&mut self, text: impl AsRef<str>) {
        self.stdout.write(text.as_ref());
        self.stdout.write("\n");
    }

    /// Writes text to standard error.
    pub fn stderr(&mut self, text: impl AsRef<str>) {
        self.stderr.write(text.as_ref());
    }

    /// Writes a line to standard error.
    pub fn stderrln(&mut self, text: impl AsRef<str>) {
        self.stderr.write(text.as_ref());
        self.stderr.write("\n");
    }

    /// Writes `context: err` to standard error and returns the annotated
    /// error so callers can propagate it in one step.
    pub fn annotate(&mut self, err: Error, context: impl Into<String>) -> Error {
        let context = context.into();
        self.stderrln(format!("{context}: {err}"));
        err.annotate(context)
    }

    /// Formats-and-annotates variant of [`Self::annotate`]; mirrors it but
    /// takes the already-formatted context produced by `format!`.
    pub fn annotatef(&mut self, err: Error, context: String) -> Error {
        self.annotate(err, context)
    }
}

/// Read-back handle for an [`Output`] created with [`Output::captured`].
pub struct CapturedOutput {
    stdout: Rc<RefCell<Vec<u8>>>,
    stderr: Rc<RefCell<Vec<u8>>>,
}

impl CapturedOutput {
    /// Returns everything written to standard output so far.
    pub fn stdout(&self) -> String {
        String::from_utf8_lossy(&self.stdout.borrow()).into_owned()
    }

    /// Returns everything written to standard error so far.
    pub fn stderr(&self) -> String {
        String::from_utf8_lossy(&self.stderr.borrow()).into_owned()
    }
}
