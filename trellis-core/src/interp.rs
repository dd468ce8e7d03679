//! The three passes over a command graph.

use std::sync::Arc;

use crate::completion::{self, Completion};
use crate::data::Data;
use crate::error::Error;
use crate::input::Input;
use crate::output::Output;
use crate::processor::{ExecuteData, Node};
use crate::trace_categories;
use crate::usage::Usage;

/// Separator line printed before the usage banner on an extra-args error.
pub const USAGE_BANNER_SEPARATOR: &str = "======= Command Usage =======";

/// Runs the execute pass over the graph.
///
/// Walks the graph in pre-order; on return from the root, any unconsumed
/// token is an extra-args error (reported to stderr together with a
/// best-effort usage banner). On success the deferred executor callbacks
/// run in insertion order, stopping at the first error.
///
/// A termination request bypasses all of that: its carried error becomes
/// the pass result and nothing accumulated is emitted.
pub fn execute(
    root: &Arc<dyn Node>,
    input: &mut Input,
    output: &mut Output,
    data: &mut Data,
) -> Result<ExecuteData, Error> {
    let mut exec_data = ExecuteData::new();
    tracing::debug!(
        target: trace_categories::EXECUTION,
        "executing graph against {} token(s)",
        input.num_remaining()
    );

    if let Err(err) = walk_execute(root.clone(), input, output, data, &mut exec_data) {
        if err.is_termination() {
            return Err(err.unwrap_termination());
        }
        return Err(err);
    }

    if !input.fully_processed() {
        let err = Error::extra_args(input.remaining_values());
        output.stderrln(err.to_string());
        output.stderrln(USAGE_BANNER_SEPARATOR);
        // Best effort: a graph that can't produce usage still reports the
        // extra-args error itself.
        if let Ok(usage) = walk_usage(root.clone(), &mut Input::default(), data) {
            output.stderr(usage.to_string());
        }
        return Err(err);
    }

    for executor in &exec_data.executors {
        executor(output, data)?;
    }

    Ok(exec_data)
}

fn walk_execute(
    root: Arc<dyn Node>,
    input: &mut Input,
    output: &mut Output,
    data: &mut Data,
    exec_data: &mut ExecuteData,
) -> Result<(), Error> {
    let mut current = Some(root);
    while let Some(node) = current {
        node.execute(input, output, data, exec_data)?;
        current = node.next(input, data)?;
    }
    Ok(())
}

/// Runs the autocomplete pass over the graph and returns the processed
/// suggestions, one entry per shell completion candidate.
pub fn autocomplete(
    root: &Arc<dyn Node>,
    input: &mut Input,
    data: &mut Data,
) -> Result<Vec<String>, Error> {
    let partial = input.final_arg().unwrap_or_default().to_owned();
    let delimiter = input.delimiter();

    let Some(completion) = walk_complete(root.clone(), input, data)? else {
        tracing::debug!(target: trace_categories::COMPLETION, "no processor owned the cursor");
        return Ok(Vec::new());
    };

    let completion = resolve_deferred(completion, data)?;
    Ok(completion::process(completion, &partial, delimiter))
}

/// Walks the graph until the first processor returns a completion. Later
/// processors are not visited.
pub(crate) fn walk_complete(
    root: Arc<dyn Node>,
    input: &mut Input,
    data: &mut Data,
) -> Result<Option<Completion>, Error> {
    let mut current = Some(root);
    while let Some(node) = current {
        if let Some(completion) = node.complete(input, data)? {
            return Ok(Some(completion));
        }
        current = node.next(input, data)?;
    }
    Ok(None)
}

/// Resolves deferred completions: executes the carried sub-graph with a
/// black-holed output, then applies the finalizer. A finalizer may itself
/// defer again; resolution loops until the completion is concrete.
fn resolve_deferred(mut completion: Completion, data: &mut Data) -> Result<Completion, Error> {
    while let Some(deferred) = completion.deferred.take() {
        if let Some(graph) = deferred.graph {
            let mut output = Output::sink();
            let mut input = Input::default();
            execute(&graph, &mut input, &mut output, data)
                .map_err(|err| crate::error::ErrorKind::DeferredCompletion(Box::new(err)))?;
        }
        if let Some(finalizer) = deferred.finalizer {
            completion = finalizer(completion, data)?;
        }
    }
    Ok(completion)
}

/// Runs the usage pass over the graph. Tokens already on the input steer
/// branch nodes, producing contextual usage.
pub fn usage(root: &Arc<dyn Node>, input: &mut Input, data: &mut Data) -> Result<Usage, Error> {
    tracing::debug!(
        target: trace_categories::USAGE,
        "building usage with {} contextual token(s)",
        input.num_remaining()
    );
    walk_usage(root.clone(), input, data)
}

pub(crate) fn walk_usage(
    root: Arc<dyn Node>,
    input: &mut Input,
    data: &mut Data,
) -> Result<Usage, Error> {
    let mut usage = Usage::default();
    let mut current = Some(root);
    while let Some(node) = current {
        node.usage(input, data, &mut usage)?;
        current = node.usage_next(input, data)?;
    }
    Ok(usage)
}
