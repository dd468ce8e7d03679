//! Branch nodes: subcommand selection by token match.

use std::sync::Arc;

use itertools::Itertools;

use crate::completion::Completion;
use crate::data::Data;
use crate::error::Error;
use crate::input::Input;
use crate::interp;
use crate::processor::{Node, Processor};
use crate::usage::{Usage, UsageSymbol};

/// A node that reads the next token and dispatches to the matching child.
/// With no match, the configured default child runs instead (without
/// consuming the token); with no default either, the pass fails listing
/// the valid branch names.
pub struct BranchNode {
    branches: Vec<(String, Arc<dyn Node>)>,
    default: Option<Arc<dyn Node>>,
    default_completion: bool,
}

impl BranchNode {
    /// Returns a branch node over the given selection table.
    pub fn new<S: Into<String>>(branches: Vec<(S, Arc<dyn Node>)>) -> Self {
        Self {
            branches: branches
                .into_iter()
                .map(|(name, node)| (name.into(), node))
                .collect(),
            default: None,
            default_completion: false,
        }
    }

    /// Sets the child run when no branch name matches.
    pub fn with_default(mut self, node: Arc<dyn Node>) -> Self {
        self.default = Some(node);
        self
    }

    /// Also offers the default child's completions alongside the branch
    /// names when the cursor is on the branch token.
    pub fn with_default_completion(mut self) -> Self {
        self.default_completion = true;
        self
    }

    fn lookup(&self, token: &str) -> Option<Arc<dyn Node>> {
        self.branches
            .iter()
            .find(|(name, _)| name == token)
            .map(|(_, node)| node.clone())
    }

    fn sorted_names(&self) -> Vec<String> {
        self.branches
            .iter()
            .map(|(name, _)| name.clone())
            .sorted()
            .collect()
    }
}

impl Processor for BranchNode {
    fn complete(&self, input: &mut Input, data: &mut Data) -> Result<Option<Completion>, Error> {
        if input.num_remaining() > 1 {
            // The cursor is beyond the branch token; selection happens in
            // `next` and a descendant will own the completion.
            return Ok(None);
        }

        let mut completion = Completion::new(self.sorted_names());
        if self.default_completion {
            if let Some(default) = &self.default {
                let mut forked = input.clone();
                if let Some(inner) = interp::walk_complete(default.clone(), &mut forked, data)? {
                    completion.suggestions.extend(inner.suggestions);
                }
            }
        }
        Ok(Some(completion))
    }

    fn usage(&self, input: &mut Input, data: &mut Data, usage: &mut Usage) -> Result<(), Error> {
        if input.peek().is_some_and(|token| self.lookup(token).is_some()) {
            // Contextual usage: `usage_next` follows the selected branch.
            return Ok(());
        }

        usage.add_symbol(UsageSymbol::Branch);
        usage.push_usage(UsageSymbol::Branch.glyph().to_string());

        for (name, node) in self
            .branches
            .iter()
            .sorted_by(|(a, _), (b, _)| a.cmp(b))
        {
            let child = interp::walk_usage(node.clone(), &mut Input::default(), data)?;
            usage.absorb_branch(name, child);
        }
        Ok(())
    }
}

impl Node for BranchNode {
    fn next(&self, input: &mut Input, data: &mut Data) -> Result<Option<Arc<dyn Node>>, Error> {
        let _ = data;
        match input.peek() {
            Some(token) => {
                if let Some(child) = self.lookup(token) {
                    input.pop();
                    Ok(Some(child))
                } else if let Some(default) = &self.default {
                    Ok(Some(default.clone()))
                } else {
                    Err(Error::branching(self.sorted_names()))
                }
            }
            None => match &self.default {
                Some(default) => Ok(Some(default.clone())),
                None => Err(Error::branching(self.sorted_names())),
            },
        }
    }

    fn usage_next(
        &self,
        input: &mut Input,
        _data: &mut Data,
    ) -> Result<Option<Arc<dyn Node>>, Error> {
        if let Some(token) = input.peek() {
            if let Some(child) = self.lookup(token) {
                input.pop();
                return Ok(Some(child));
            }
        }
        Ok(self.default.clone())
    }
}
