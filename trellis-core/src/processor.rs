//! The processor contract every graph element implements.

use std::sync::Arc;

use crate::completion::Completion;
use crate::data::Data;
use crate::error::Error;
use crate::input::Input;
use crate::output::Output;
use crate::usage::Usage;

/// A post-graph callback run after a successful execute pass.
pub type Executor = Box<dyn Fn(&mut Output, &mut Data) -> Result<(), Error>>;

/// Accumulated results of an execute pass: the lines the host shell will
/// evaluate after the process exits, and callbacks run once the graph has
/// been fully traversed.
#[derive(Default)]
pub struct ExecuteData {
    /// Lines for the host shell to evaluate, in emission order.
    pub executable: Vec<String>,
    /// Post-graph callbacks, in insertion order.
    pub executors: Vec<Executor>,
}

impl ExecuteData {
    /// Returns an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }
}

/// An element of a command graph. One processor participates in all three
/// passes; each method covers one of them.
pub trait Processor {
    /// Runs the execute pass: consume tokens, mutate [`Data`], emit output.
    fn execute(
        &self,
        input: &mut Input,
        output: &mut Output,
        data: &mut Data,
        exec_data: &mut ExecuteData,
    ) -> Result<(), Error> {
        let _ = (input, output, data, exec_data);
        Ok(())
    }

    /// Runs the autocomplete pass. The first processor to return a
    /// completion owns the token under the cursor; traversal stops there.
    fn complete(&self, input: &mut Input, data: &mut Data) -> Result<Option<Completion>, Error> {
        let _ = (input, data);
        Ok(None)
    }

    /// Runs the usage pass, contributing to the shared [`Usage`].
    fn usage(&self, input: &mut Input, data: &mut Data, usage: &mut Usage) -> Result<(), Error> {
        let _ = (input, data, usage);
        Ok(())
    }
}

/// A graph node: a processor plus outgoing edges for the execute/complete
/// and usage traversals.
pub trait Node: Processor {
    /// Returns the next node for the execute and autocomplete passes.
    fn next(&self, input: &mut Input, data: &mut Data) -> Result<Option<Arc<dyn Node>>, Error>;

    /// Returns the next node for the usage pass. May differ from
    /// [`Self::next`]; branch nodes document all children instead of one.
    fn usage_next(
        &self,
        input: &mut Input,
        data: &mut Data,
    ) -> Result<Option<Arc<dyn Node>>, Error>;
}

/// A node wrapping one processor in a linked list.
struct SerialNode {
    processor: Arc<dyn Processor>,
    next: Option<Arc<dyn Node>>,
}

impl Processor for SerialNode {
    fn execute(
        &self,
        input: &mut Input,
        output: &mut Output,
        data: &mut Data,
        exec_data: &mut ExecuteData,
    ) -> Result<(), Error> {
        self.processor.execute(input, output, data, exec_data)
    }

    fn complete(&self, input: &mut Input, data: &mut Data) -> Result<Option<Completion>, Error> {
        self.processor.complete(input, data)
    }

    fn usage(&self, input: &mut Input, data: &mut Data, usage: &mut Usage) -> Result<(), Error> {
        self.processor.usage(input, data, usage)
    }
}

impl Node for SerialNode {
    fn next(&self, _input: &mut Input, _data: &mut Data) -> Result<Option<Arc<dyn Node>>, Error> {
        Ok(self.next.clone())
    }

    fn usage_next(
        &self,
        _input: &mut Input,
        _data: &mut Data,
    ) -> Result<Option<Arc<dyn Node>>, Error> {
        Ok(self.next.clone())
    }
}

/// A processor with no behaviour in any pass; anchors empty graphs.
struct NoopProcessor;

impl Processor for NoopProcessor {}

/// Wires the given processors into a serial chain.
pub fn serial(processors: Vec<Arc<dyn Processor>>) -> Arc<dyn Node> {
    chain(processors, None)
}

/// Wires the given processors into a serial chain ending at an explicit
/// tail node (typically a branch).
pub fn serial_with(processors: Vec<Arc<dyn Processor>>, tail: Arc<dyn Node>) -> Arc<dyn Node> {
    chain(processors, Some(tail))
}

fn chain(processors: Vec<Arc<dyn Processor>>, tail: Option<Arc<dyn Node>>) -> Arc<dyn Node> {
    let mut next = tail;
    for processor in processors.into_iter().rev() {
        next = Some(Arc::new(SerialNode { processor, next }));
    }
    next.unwrap_or_else(|| {
        Arc::new(SerialNode {
            processor: Arc::new(NoopProcessor),
            next: None,
        })
    })
}
