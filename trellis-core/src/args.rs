//! Positional arguments of fixed type with configurable arity.

use normalize_path::NormalizePath;

use crate::completion::{Completion, FileCompleter};
use crate::data::Data;
use crate::error::Error;
use crate::input::{Input, InputBreaker};
use crate::operators::ArgValue;
use crate::output::Output;
use crate::processor::{ExecuteData, Processor};
use crate::trace_categories;
use crate::usage::Usage;
use crate::validate::Validator;

/// Number of optional tokens an argument may consume beyond its minimum.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ArgCount {
    /// Exactly this many optional tokens.
    Fixed(usize),
    /// As many tokens as remain, honouring breakers.
    Unbounded,
}

/// An ordered value rewrite applied after parsing and before validation.
pub type Transformer<T> = Box<dyn Fn(T, &Data) -> Result<T, Error>>;

/// Generates completions for an argument: receives the partial token, the
/// tokens consumed so far for this argument (the partial last), and the
/// traversal data.
pub type CompleterFn = Box<dyn Fn(&str, &[String], &Data) -> Result<Completion, Error>>;

/// A positional argument of type `T`.
///
/// Consumes between `min` and `min + optional` tokens, converts them via
/// `T`'s operator, applies transformers then validators in order, and
/// stores the result in [`Data`] under the argument's name.
pub struct Argument<T: ArgValue> {
    name: String,
    description: String,
    min: usize,
    optional: ArgCount,
    default: Option<T>,
    validators: Vec<Validator<T>>,
    transformers: Vec<Transformer<T>>,
    completer: Option<CompleterFn>,
    breakers: Vec<InputBreaker>,
    distinct: bool,
    accumulate: bool,
}

impl<T: ArgValue> Argument<T> {
    /// Returns a required single-token argument.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::with_arity(name, description, 1, ArgCount::Fixed(0))
    }

    /// Returns an optional single-token argument.
    pub fn optional(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::with_arity(name, description, 0, ArgCount::Fixed(1))
    }

    /// Returns a list argument consuming at least `min` tokens plus the
    /// given number of optional ones.
    pub fn list(
        name: impl Into<String>,
        description: impl Into<String>,
        min: usize,
        optional: ArgCount,
    ) -> Self {
        Self::with_arity(name, description, min, optional)
    }

    fn with_arity(
        name: impl Into<String>,
        description: impl Into<String>,
        min: usize,
        optional: ArgCount,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            min,
            optional,
            default: None,
            validators: Vec::new(),
            transformers: Vec::new(),
            completer: None,
            breakers: Vec::new(),
            distinct: false,
            accumulate: false,
        }
    }

    /// Returns this argument's name (its key in [`Data`]).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns this argument's description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Appends a validator, applied in configuration order.
    pub fn validate(mut self, validator: Validator<T>) -> Self {
        self.validators.push(validator);
        self
    }

    /// Appends a transformer, applied in configuration order before any
    /// validator runs.
    pub fn transform(mut self, transformer: impl Fn(T, &Data) -> Result<T, Error> + 'static) -> Self {
        self.transformers.push(Box::new(transformer));
        self
    }

    /// Sets the value stored when the argument consumes zero tokens.
    pub fn default_value(mut self, default: T) -> Self {
        self.default = Some(default);
        self
    }

    /// Sets the completer invoked when the cursor falls on this argument.
    pub fn complete_with(
        mut self,
        completer: impl Fn(&str, &[String], &Data) -> Result<Completion, Error> + 'static,
    ) -> Self {
        self.completer = Some(Box::new(completer));
        self
    }

    /// Completes from a fixed list of values.
    pub fn complete_with_values<I, S>(self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        self.complete_with(move |_, _, _| Ok(Completion::new(values.clone())))
    }

    /// Completes with file paths via the given completer; distinctness is
    /// taken from this argument.
    pub fn complete_files(self, completer: FileCompleter) -> Self {
        self.complete_with(move |partial, sofar, _| {
            let prior = &sofar[..sofar.len().saturating_sub(1)];
            completer.complete(partial, prior)
        })
    }

    /// Appends a breaker limiting how far multi-token consumption reaches.
    pub fn breaker(mut self, breaker: InputBreaker) -> Self {
        self.breakers.push(breaker);
        self
    }

    /// Marks completion suggestions as distinct from already-typed values.
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Makes repeated processing append to the stored list instead of
    /// replacing it. Used by accumulating list flags.
    pub(crate) fn accumulate(mut self) -> Self {
        self.accumulate = true;
        self
    }

    fn pop_span(&self, input: &mut Input) -> (Vec<String>, bool) {
        let optional = match self.optional {
            ArgCount::Fixed(n) => Some(n),
            ArgCount::Unbounded => None,
        };
        input.pop_n(self.min, optional, &self.breakers)
    }

    fn parse_and_check(&self, tokens: &[String], data: &Data) -> Result<T, Error> {
        let mut value = T::from_args(tokens)?;
        for transformer in &self.transformers {
            value = transformer(value, data)?;
        }
        for validator in &self.validators {
            validator.validate(&self.name, &value)?;
        }
        Ok(value)
    }

    /// Best-effort parse used while the cursor sits on this argument:
    /// conversion or transformer failures are ignored rather than fatal.
    fn parse_quietly(&self, tokens: &[String], data: &Data) -> Option<T> {
        let mut value = T::from_args(tokens).ok()?;
        for transformer in &self.transformers {
            match transformer(value.clone(), data) {
                Ok(transformed) => value = transformed,
                Err(_) => break,
            }
        }
        Some(value)
    }

    fn store(&self, value: T, data: &mut Data) {
        if self.accumulate {
            data.append_to_list(self.name.clone(), value.into_value());
        } else {
            data.set(self.name.clone(), value.into_value());
        }
    }

    pub(crate) fn store_default(&self, data: &mut Data) {
        if let Some(default) = &self.default {
            data.set(self.name.clone(), default.clone().into_value());
        }
    }
}

impl<T: ArgValue> Processor for Argument<T> {
    fn execute(
        &self,
        input: &mut Input,
        _output: &mut Output,
        data: &mut Data,
        _exec_data: &mut ExecuteData,
    ) -> Result<(), Error> {
        let (tokens, enough) = self.pop_span(input);
        if !enough {
            return Err(Error::not_enough_args(&self.name, self.min, tokens.len()));
        }
        if tokens.is_empty() {
            self.store_default(data);
            return Ok(());
        }

        let value = self.parse_and_check(&tokens, data)?;
        self.store(value, data);
        Ok(())
    }

    fn complete(&self, input: &mut Input, data: &mut Data) -> Result<Option<Completion>, Error> {
        let (tokens, enough) = self.pop_span(input);
        let owns_cursor = input.num_remaining() == 0;

        if !owns_cursor {
            // The cursor is beyond this argument's span; behave as execute.
            if !enough {
                return Err(Error::not_enough_args(&self.name, self.min, tokens.len()));
            }
            if tokens.is_empty() {
                self.store_default(data);
                return Ok(None);
            }
            let value = self.parse_and_check(&tokens, data)?;
            self.store(value, data);
            return Ok(None);
        }

        let partial = tokens.last().cloned().unwrap_or_default();
        tracing::debug!(
            target: trace_categories::COMPLETION,
            "argument {:?} owns the cursor; partial {partial:?}",
            self.name
        );

        // Store what parses so far; deferred completions may read it.
        if !tokens.is_empty() {
            if let Some(value) = self.parse_quietly(&tokens, data) {
                self.store(value, data);
            }
        }

        let Some(completer) = &self.completer else {
            return Ok(None);
        };
        let mut completion = completer(&partial, &tokens, data)?;

        if self.distinct && !tokens.is_empty() {
            let prior = &tokens[..tokens.len() - 1];
            completion.suggestions.retain(|s| !prior.contains(s));
        }

        Ok(Some(completion))
    }

    fn usage(&self, _input: &mut Input, _data: &mut Data, usage: &mut Usage) -> Result<(), Error> {
        usage.add_arg(&self.name, &self.description);

        for _ in 0..self.min {
            usage.push_usage(&self.name);
        }
        match self.optional {
            ArgCount::Fixed(0) => {}
            ArgCount::Fixed(n) => {
                usage.push_usage("[");
                for _ in 0..n {
                    usage.push_usage(&self.name);
                }
                usage.push_usage("]");
            }
            ArgCount::Unbounded => {
                usage.push_usage("[");
                usage.push_usage(&self.name);
                usage.push_usage("...");
                usage.push_usage("]");
            }
        }
        Ok(())
    }
}

/// Transformer turning a relative path value into an absolute, lexically
/// normalized one.
pub fn to_absolute_path() -> impl Fn(String, &Data) -> Result<String, Error> {
    |value: String, _data: &Data| {
        let absolute = std::path::absolute(&value)?;
        Ok(absolute.normalize().to_string_lossy().into_owned())
    }
}

/// Returns a string argument completed with file paths and transformed to
/// an absolute path.
pub fn file_argument(name: impl Into<String>, description: impl Into<String>) -> Argument<String> {
    Argument::new(name, description)
        .complete_files(FileCompleter::new())
        .transform(to_absolute_path())
}
