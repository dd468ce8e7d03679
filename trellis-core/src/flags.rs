//! Named flags with optional typed values.

use std::sync::Arc;

use crate::args::{ArgCount, Argument};
use crate::completion::{Completion, FileCompleter};
use crate::data::Data;
use crate::error::Error;
use crate::input::Input;
use crate::operators::ArgValue;
use crate::output::Output;
use crate::processor::{ExecuteData, Processor};
use crate::trace_categories;
use crate::usage::Usage;
use crate::validate::Validator;

/// A named flag handled by a [`FlagSet`]. Matched as `--name` (or
/// `-short`); value-carrying flags then consume their detached value
/// tokens through the shared argument machinery.
pub trait NamedFlag {
    /// The flag's long name, without dashes; also its key in [`Data`].
    fn name(&self) -> &str;

    /// The flag's optional one-character short form.
    fn short(&self) -> Option<char>;

    /// The flag's description, used in the usage flag block.
    fn description(&self) -> &str;

    /// Whether the flag is boolean (present/absent, no value tokens).
    fn is_bool(&self) -> bool {
        false
    }

    /// Processes the flag's value tokens. The matched flag token itself has
    /// already been detached from the input.
    fn process(
        &self,
        input: &mut Input,
        output: &mut Output,
        data: &mut Data,
        exec_data: &mut ExecuteData,
    ) -> Result<(), Error>;

    /// Completes the flag's value tokens when the cursor falls within them.
    fn complete_value(
        &self,
        input: &mut Input,
        data: &mut Data,
    ) -> Result<Option<Completion>, Error>;

    /// Stores the flag's default when it was not provided.
    fn apply_default(&self, data: &mut Data);

    /// The value placeholder shown in usage, if any.
    fn value_hint(&self) -> Option<String>;
}

/// A flag carrying a value of type `T`.
pub struct Flag<T: ArgValue> {
    arg: Argument<T>,
    short: Option<char>,
}

impl<T: ArgValue> Flag<T> {
    /// Returns a flag taking a single value token.
    pub fn new(
        name: impl Into<String>,
        short: Option<char>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            arg: Argument::new(name, description),
            short,
        }
    }

    /// Returns an accumulating list flag consuming at least `min` value
    /// tokens plus the given number of optional ones per occurrence.
    pub fn list(
        name: impl Into<String>,
        short: Option<char>,
        description: impl Into<String>,
        min: usize,
        optional: ArgCount,
    ) -> Self {
        Self {
            arg: Argument::list(name, description, min, optional).accumulate(),
            short,
        }
    }

    /// Appends a validator for the flag's value.
    pub fn validate(mut self, validator: Validator<T>) -> Self {
        self.arg = self.arg.validate(validator);
        self
    }

    /// Appends a transformer for the flag's value.
    pub fn transform(mut self, transformer: impl Fn(T, &Data) -> Result<T, Error> + 'static) -> Self {
        self.arg = self.arg.transform(transformer);
        self
    }

    /// Sets the value stored when the flag is absent.
    pub fn default_value(mut self, default: T) -> Self {
        self.arg = self.arg.default_value(default);
        self
    }

    /// Sets the completer for the flag's value.
    pub fn complete_with(
        mut self,
        completer: impl Fn(&str, &[String], &Data) -> Result<Completion, Error> + 'static,
    ) -> Self {
        self.arg = self.arg.complete_with(completer);
        self
    }

    /// Completes the flag's value from a fixed list.
    pub fn complete_with_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arg = self.arg.complete_with_values(values);
        self
    }

    /// Completes the flag's value with file paths.
    pub fn complete_files(mut self, completer: FileCompleter) -> Self {
        self.arg = self.arg.complete_files(completer);
        self
    }
}

impl<T: ArgValue> NamedFlag for Flag<T> {
    fn name(&self) -> &str {
        self.arg.name()
    }

    fn short(&self) -> Option<char> {
        self.short
    }

    fn description(&self) -> &str {
        self.arg.description()
    }

    fn process(
        &self,
        input: &mut Input,
        output: &mut Output,
        data: &mut Data,
        exec_data: &mut ExecuteData,
    ) -> Result<(), Error> {
        self.arg.execute(input, output, data, exec_data)
    }

    fn complete_value(
        &self,
        input: &mut Input,
        data: &mut Data,
    ) -> Result<Option<Completion>, Error> {
        self.arg.complete(input, data)
    }

    fn apply_default(&self, data: &mut Data) {
        self.arg.store_default(data);
    }

    fn value_hint(&self) -> Option<String> {
        Some(self.arg.name().to_uppercase())
    }
}

/// A boolean flag: presence stores `true`, no value tokens are consumed.
/// Short forms may be grouped (`-ab` sets both `a` and `b` flags).
pub struct BoolFlag {
    name: String,
    short: Option<char>,
    description: String,
}

impl BoolFlag {
    /// Returns a boolean flag.
    pub fn new(
        name: impl Into<String>,
        short: Option<char>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            short,
            description: description.into(),
        }
    }
}

impl NamedFlag for BoolFlag {
    fn name(&self) -> &str {
        &self.name
    }

    fn short(&self) -> Option<char> {
        self.short
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn is_bool(&self) -> bool {
        true
    }

    fn process(
        &self,
        _input: &mut Input,
        _output: &mut Output,
        data: &mut Data,
        _exec_data: &mut ExecuteData,
    ) -> Result<(), Error> {
        data.set(self.name.clone(), true);
        Ok(())
    }

    fn complete_value(
        &self,
        _input: &mut Input,
        _data: &mut Data,
    ) -> Result<Option<Completion>, Error> {
        Ok(None)
    }

    fn apply_default(&self, _data: &mut Data) {}

    fn value_hint(&self) -> Option<String> {
        None
    }
}

/// Returns a flag taking a single value token of type `T`.
pub fn flag<T: ArgValue>(
    name: impl Into<String>,
    short: Option<char>,
    description: impl Into<String>,
) -> Flag<T> {
    Flag::new(name, short, description)
}

/// Returns a boolean flag: presence stores `true`.
pub fn bool_flag(
    name: impl Into<String>,
    short: Option<char>,
    description: impl Into<String>,
) -> BoolFlag {
    BoolFlag::new(name, short, description)
}

enum FlagMatch {
    Single(Arc<dyn NamedFlag>),
    BoolGroup(Vec<Arc<dyn NamedFlag>>),
    None,
}

/// Scans the remaining tokens for registered flags, detaching each match
/// (and its value tokens) as it is found. Runs to completion before the
/// next node sees the input; unknown flag-looking tokens are left in place.
pub struct FlagSet {
    flags: Vec<Arc<dyn NamedFlag>>,
}

impl FlagSet {
    /// Returns a flag set over the given flags.
    pub fn new(flags: Vec<Arc<dyn NamedFlag>>) -> Self {
        Self { flags }
    }

    fn lookup(&self, token: &str) -> FlagMatch {
        if let Some(name) = token.strip_prefix("--") {
            if let Some(flag) = self.flags.iter().find(|f| f.name() == name) {
                return FlagMatch::Single(flag.clone());
            }
            return FlagMatch::None;
        }

        let Some(shorts) = token.strip_prefix('-') else {
            return FlagMatch::None;
        };
        if shorts.is_empty() {
            return FlagMatch::None;
        }

        let mut chars = shorts.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if let Some(flag) = self.flags.iter().find(|f| f.short() == Some(c)) {
                return FlagMatch::Single(flag.clone());
            }
            return FlagMatch::None;
        }

        // Grouped short form: every char must name a boolean flag.
        let mut group = Vec::new();
        for c in shorts.chars() {
            match self
                .flags
                .iter()
                .find(|f| f.short() == Some(c) && f.is_bool())
            {
                Some(flag) => group.push(flag.clone()),
                None => return FlagMatch::None,
            }
        }
        FlagMatch::BoolGroup(group)
    }

    fn apply_defaults(&self, data: &mut Data) {
        for flag in &self.flags {
            if !data.provided(flag.name()) {
                flag.apply_default(data);
            }
        }
    }

    fn name_suggestions(&self) -> Vec<String> {
        let mut suggestions = Vec::new();
        for flag in &self.flags {
            suggestions.push(format!("--{}", flag.name()));
            if let Some(short) = flag.short() {
                suggestions.push(format!("-{short}"));
            }
        }
        suggestions
    }
}

impl Processor for FlagSet {
    fn execute(
        &self,
        input: &mut Input,
        output: &mut Output,
        data: &mut Data,
        exec_data: &mut ExecuteData,
    ) -> Result<(), Error> {
        let mut i = 0;
        while i < input.num_remaining() {
            let Some(token) = input.peek_at(i).map(str::to_owned) else {
                break;
            };
            match self.lookup(&token) {
                FlagMatch::Single(flag) => {
                    tracing::debug!(target: trace_categories::FLAGS, "processing flag {token:?}");
                    input.extract(i);
                    input.with_offset(i, |inner| flag.process(inner, output, data, exec_data))?;
                }
                FlagMatch::BoolGroup(group) => {
                    input.extract(i);
                    for flag in group {
                        flag.process(input, output, data, exec_data)?;
                    }
                }
                FlagMatch::None => i += 1,
            }
        }

        self.apply_defaults(data);
        Ok(())
    }

    fn complete(&self, input: &mut Input, data: &mut Data) -> Result<Option<Completion>, Error> {
        let mut i = 0;
        while i < input.num_remaining() {
            let Some(token) = input.peek_at(i).map(str::to_owned) else {
                break;
            };

            // The partial itself looks like a flag: complete flag names.
            if i + 1 == input.num_remaining() && token.starts_with('-') {
                return Ok(Some(Completion::new(self.name_suggestions())));
            }

            match self.lookup(&token) {
                FlagMatch::Single(flag) => {
                    input.extract(i);
                    let completion =
                        input.with_offset(i, |inner| flag.complete_value(inner, data))?;
                    if completion.is_some() {
                        return Ok(completion);
                    }
                }
                FlagMatch::BoolGroup(group) => {
                    input.extract(i);
                    for flag in group {
                        data.set(flag.name().to_owned(), true);
                    }
                }
                FlagMatch::None => i += 1,
            }
        }

        Ok(None)
    }

    fn usage(&self, _input: &mut Input, _data: &mut Data, usage: &mut Usage) -> Result<(), Error> {
        for flag in &self.flags {
            let mut forms = format!("--{}", flag.name());
            if let Some(short) = flag.short() {
                forms.push_str(&format!("|-{short}"));
            }
            let line = match flag.value_hint() {
                Some(hint) => format!("{forms} {hint}: {}", flag.description()),
                None => format!("{forms}: {}", flag.description()),
            };
            usage.add_flag(line);
        }
        Ok(())
    }
}
