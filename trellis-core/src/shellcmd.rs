//! Running sub-processes from within a graph.

use std::path::PathBuf;
use std::process::Command;

use crate::data::Data;
use crate::error::{Error, ErrorKind};
use crate::input::Input;
use crate::output::Output;
use crate::processor::{ExecuteData, Processor};
use crate::trace_categories;

/// A processor that runs a sub-process during the execute pass, captures
/// its stdout as a list of lines into [`Data`], and surfaces the child's
/// failure verbatim to the caller.
///
/// Sub-processes are awaited synchronously; the engine never runs more
/// than one at a time.
pub struct ShellCommand {
    arg_name: String,
    command: String,
    args: Vec<String>,
    dir: Option<PathBuf>,
    forward_stdout: bool,
    hide_stderr: bool,
}

impl ShellCommand {
    /// Returns a shell command storing its captured stdout lines under
    /// `arg_name`.
    pub fn new(arg_name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            arg_name: arg_name.into(),
            command: command.into(),
            args: Vec::new(),
            dir: None,
            forward_stdout: false,
            hide_stderr: false,
        }
    }

    /// Appends arguments passed to the command.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Runs the command in the given directory.
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    /// Also forwards the captured stdout to the caller's output.
    pub fn forward_stdout(mut self) -> Self {
        self.forward_stdout = true;
        self
    }

    /// Suppresses the child's stderr instead of forwarding it.
    pub fn hide_stderr(mut self) -> Self {
        self.hide_stderr = true;
        self
    }
}

impl Processor for ShellCommand {
    fn execute(
        &self,
        _input: &mut Input,
        output: &mut Output,
        data: &mut Data,
        _exec_data: &mut ExecuteData,
    ) -> Result<(), Error> {
        tracing::debug!(
            target: trace_categories::SHELL_COMMAND,
            "running {:?} with args {:?}",
            self.command,
            self.args
        );

        let mut command = Command::new(&self.command);
        command.args(&self.args);
        if let Some(dir) = &self.dir {
            command.current_dir(dir);
        }

        let captured = command.output().map_err(|err| {
            Error::from(ErrorKind::ShellCommand {
                command: self.command.clone(),
                code: None,
                message: err.to_string(),
            })
        })?;

        let stdout = String::from_utf8_lossy(&captured.stdout);
        if self.forward_stdout {
            output.stdout(stdout.as_ref());
        }
        if !self.hide_stderr && !captured.stderr.is_empty() {
            output.stderr(String::from_utf8_lossy(&captured.stderr));
        }

        let lines: Vec<String> = stdout.lines().map(str::to_owned).collect();
        data.set(self.arg_name.clone(), lines);

        if !captured.status.success() {
            return Err(ErrorKind::ShellCommand {
                command: self.command.clone(),
                code: captured.status.code(),
                message: captured.status.to_string(),
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
#[cfg(unix)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn run(command: &ShellCommand) -> (Result<(), Error>, Data, crate::output::CapturedOutput) {
        let mut input = Input::default();
        let (mut output, captured) = Output::captured();
        let mut data = Data::new();
        let mut exec_data = ExecuteData::new();
        let result = command.execute(&mut input, &mut output, &mut data, &mut exec_data);
        (result, data, captured)
    }

    #[test]
    fn test_captures_stdout_lines() {
        let command = ShellCommand::new("LINES", "sh").args(["-c", "printf 'a\\nb\\nc\\n'"]);
        let (result, data, captured) = run(&command);

        result.unwrap();
        assert_eq!(
            data.string_list("LINES"),
            Some(["a".to_string(), "b".to_string(), "c".to_string()].as_slice())
        );
        assert_eq!(captured.stdout(), "");
    }

    #[test]
    fn test_forward_stdout() {
        let command = ShellCommand::new("OUT", "sh")
            .args(["-c", "echo visible"])
            .forward_stdout();
        let (result, _, captured) = run(&command);

        result.unwrap();
        assert_eq!(captured.stdout(), "visible\n");
    }

    #[test]
    fn test_nonzero_exit_is_an_error() {
        let command = ShellCommand::new("OUT", "sh").args(["-c", "exit 3"]);
        let (result, _, _) = run(&command);

        let err = result.unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::ShellCommand { code: Some(3), .. }
        ));
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_hide_stderr() {
        let command = ShellCommand::new("OUT", "sh")
            .args(["-c", "echo noise >&2"])
            .hide_stderr();
        let (result, _, captured) = run(&command);

        result.unwrap();
        assert_eq!(captured.stderr(), "");
    }

    #[test]
    fn test_missing_binary_reports_spawn_failure() {
        let command = ShellCommand::new("OUT", "definitely-not-a-real-binary");
        let (result, _, _) = run(&command);

        assert!(matches!(
            result.unwrap_err().kind(),
            ErrorKind::ShellCommand { code: None, .. }
        ));
    }
}
