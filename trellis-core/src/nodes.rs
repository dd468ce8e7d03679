//! Small single-purpose processors composed into graphs.

use std::rc::Rc;
use std::sync::Arc;

use crate::data::Data;
use crate::error::Error;
use crate::input::Input;
use crate::output::Output;
use crate::processor::{ExecuteData, Node, Processor};
use crate::usage::Usage;

struct Description(String);

impl Processor for Description {
    fn usage(&self, _input: &mut Input, _data: &mut Data, usage: &mut Usage) -> Result<(), Error> {
        usage.set_description(self.0.clone());
        Ok(())
    }
}

/// Returns a processor attaching a one-line description to the usage.
pub fn description(text: impl Into<String>) -> Arc<dyn Processor> {
    Arc::new(Description(text.into()))
}

struct Executable {
    produce: Rc<dyn Fn(&mut Output, &mut Data) -> Result<Vec<String>, Error>>,
}

impl Processor for Executable {
    fn execute(
        &self,
        _input: &mut Input,
        output: &mut Output,
        data: &mut Data,
        exec_data: &mut ExecuteData,
    ) -> Result<(), Error> {
        let mut lines = (self.produce)(output, data)?;
        exec_data.executable.append(&mut lines);
        Ok(())
    }
}

/// Returns a processor that appends the produced lines to
/// `ExecuteData.executable`: the mechanism by which a CLI instructs its
/// host shell to run code outside the process.
pub fn executable(
    produce: impl Fn(&mut Output, &mut Data) -> Result<Vec<String>, Error> + 'static,
) -> Arc<dyn Processor> {
    Arc::new(Executable {
        produce: Rc::new(produce),
    })
}

/// Returns a processor that appends the given fixed lines to
/// `ExecuteData.executable`.
pub fn executable_lines<I, S>(lines: I) -> Arc<dyn Processor>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let lines: Vec<String> = lines.into_iter().map(Into::into).collect();
    executable(move |_, _| Ok(lines.clone()))
}

struct ExecutorProcessor {
    callback: Rc<dyn Fn(&mut Output, &mut Data) -> Result<(), Error>>,
}

impl Processor for ExecutorProcessor {
    fn execute(
        &self,
        _input: &mut Input,
        _output: &mut Output,
        _data: &mut Data,
        exec_data: &mut ExecuteData,
    ) -> Result<(), Error> {
        let callback = self.callback.clone();
        exec_data
            .executors
            .push(Box::new(move |output, data| callback(output, data)));
        Ok(())
    }
}

/// Returns a processor registering a callback run after the graph has been
/// fully traversed. Callbacks run in insertion order, stopping at the
/// first error.
pub fn executor(
    callback: impl Fn(&mut Output, &mut Data) -> Result<(), Error> + 'static,
) -> Arc<dyn Processor> {
    Arc::new(ExecutorProcessor {
        callback: Rc::new(callback),
    })
}

/// Returns a processor that emits the host shell line exporting the given
/// environment variable.
pub fn set_env_var(name: impl Into<String>, value: impl Into<String>) -> Arc<dyn Processor> {
    let name = name.into();
    let value = value.into();
    executable(move |_, data| Ok(vec![data.os().set_env_var(&name, &value)]))
}

/// Returns a processor that emits the host shell line unsetting the given
/// environment variable.
pub fn unset_env_var(name: impl Into<String>) -> Arc<dyn Processor> {
    let name = name.into();
    executable(move |_, data| Ok(vec![data.os().unset_env_var(&name)]))
}

struct IfProvided {
    key: String,
    then: Arc<dyn Node>,
    otherwise: Option<Arc<dyn Node>>,
}

impl Processor for IfProvided {}

impl Node for IfProvided {
    fn next(&self, _input: &mut Input, data: &mut Data) -> Result<Option<Arc<dyn Node>>, Error> {
        if data.provided(&self.key) {
            Ok(Some(self.then.clone()))
        } else {
            Ok(self.otherwise.clone())
        }
    }

    fn usage_next(
        &self,
        _input: &mut Input,
        _data: &mut Data,
    ) -> Result<Option<Arc<dyn Node>>, Error> {
        Ok(Some(self.then.clone()))
    }
}

/// Returns a node that continues through `then` when the key is set in
/// [`Data`], and through `otherwise` (when given) if not.
pub fn if_provided(
    key: impl Into<String>,
    then: Arc<dyn Node>,
    otherwise: Option<Arc<dyn Node>>,
) -> Arc<dyn Node> {
    Arc::new(IfProvided {
        key: key.into(),
        then,
        otherwise,
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::processor::serial;

    fn run(processor: &Arc<dyn Processor>) -> (Data, ExecuteData, Output) {
        let mut input = Input::default();
        let mut output = Output::sink();
        let mut data = Data::new();
        let mut exec_data = ExecuteData::new();
        processor
            .execute(&mut input, &mut output, &mut data, &mut exec_data)
            .unwrap();
        (data, exec_data, output)
    }

    #[test]
    fn test_executable_lines() {
        let processor = executable_lines(["export X=1", "cd /tmp"]);
        let (_, exec_data, _) = run(&processor);
        assert_eq!(exec_data.executable, vec!["export X=1", "cd /tmp"]);
    }

    #[test]
    fn test_executor_defers_callback() {
        let processor = executor(|output, _| {
            output.stdoutln("ran");
            Ok(())
        });
        let (mut data, exec_data, _) = run(&processor);
        assert_eq!(exec_data.executors.len(), 1);

        let (mut output, captured) = Output::captured();
        exec_data.executors[0](&mut output, &mut data).unwrap();
        assert_eq!(captured.stdout(), "ran\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_env_var_processors_emit_shell_lines() {
        let (_, exec_data, _) = run(&set_env_var("X", "1"));
        assert_eq!(exec_data.executable, vec!["export X=1"]);

        let (_, exec_data, _) = run(&unset_env_var("X"));
        assert_eq!(exec_data.executable, vec!["unset X"]);
    }

    #[test]
    fn test_if_provided_picks_edge() {
        let node = if_provided("key", serial(vec![]), None);
        let mut input = Input::default();
        let mut data = Data::new();

        assert!(node.next(&mut input, &mut data).unwrap().is_none());

        data.set("key", "value");
        assert!(node.next(&mut input, &mut data).unwrap().is_some());
    }

    #[test]
    fn test_description_sets_usage() {
        let processor = description("Does a thing.");
        let mut input = Input::default();
        let mut data = Data::new();
        let mut usage = Usage::default();
        processor.usage(&mut input, &mut data, &mut usage).unwrap();
        assert_eq!(usage.description, "Does a thing.");
    }
}
