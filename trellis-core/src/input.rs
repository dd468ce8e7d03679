//! The consumable token cursor walked by every pass.

use std::collections::HashSet;
use std::rc::Rc;

use crate::trace_categories;

/// Identifier of a moment in the traversal at which the set of remaining
/// tokens was recorded. Strictly increasing within one [`Input`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct Snapshot(u32);

/// A single tokenized argument plus the snapshots under which it was still
/// remaining.
#[derive(Clone, Debug)]
struct InputArg {
    value: String,
    snapshots: HashSet<Snapshot>,
}

impl InputArg {
    fn new(value: String) -> Self {
        Self {
            value,
            snapshots: HashSet::new(),
        }
    }
}

/// A predicate that stops multi-token consumption before its arity is
/// exhausted (e.g. "stop at the next flag token").
#[derive(Clone)]
pub struct InputBreaker {
    matcher: Rc<dyn Fn(&str) -> bool>,
    discard: bool,
}

impl InputBreaker {
    /// Returns a breaker that stops consumption at the first matching token,
    /// leaving the token on the input.
    pub fn new(matcher: impl Fn(&str) -> bool + 'static) -> Self {
        Self {
            matcher: Rc::new(matcher),
            discard: false,
        }
    }

    /// Returns a breaker that stops consumption at the first matching token
    /// and discards that token.
    pub fn discarding(matcher: impl Fn(&str) -> bool + 'static) -> Self {
        Self {
            matcher: Rc::new(matcher),
            discard: true,
        }
    }

    /// Returns a breaker that stops (and discards) at the `--` sentinel.
    pub fn list_terminator() -> Self {
        Self::discarding(|token| token == "--")
    }

    fn matches(&self, token: &str) -> bool {
        (self.matcher)(token)
    }
}

/// The ordered, consumable sequence of argument tokens for one pass.
///
/// Tokens are consumed front-to-back. An `offset` window is applied while a
/// flag's detached value tokens are being processed; all other consumption
/// happens at offset zero.
#[derive(Clone, Default)]
pub struct Input {
    args: Vec<InputArg>,
    remaining: Vec<usize>,
    offset: usize,
    delimiter: Option<char>,
    snapshot_count: u32,
}

impl Input {
    /// Returns an input over the given execute-mode tokens.
    pub fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<InputArg> = args
            .into_iter()
            .map(|arg| InputArg::new(arg.into()))
            .collect();
        let remaining = (0..args.len()).collect();
        Self {
            args,
            remaining,
            ..Self::default()
        }
    }

    /// Returns an input built from a completion line truncated at the cursor.
    ///
    /// The line is tokenized with shell-style quoting; the command word is
    /// dropped; `passthrough` tokens (from alias wrappers) are prepended. The
    /// final token is the partial being completed and is always present, even
    /// when empty.
    pub fn from_comp_line(line: &str, point: usize, passthrough: &[String]) -> Self {
        let mut point = point.min(line.len());
        while point > 0 && !line.is_char_boundary(point) {
            point -= 1;
        }
        let (mut tokens, delimiter) = tokenize_comp_line(&line[..point]);
        tracing::debug!(target: trace_categories::INPUT, "tokenized completion line into {tokens:?}");

        // Token 0 is the command word itself, not a graph argument.
        if !tokens.is_empty() {
            tokens.remove(0);
        }

        let mut args: Vec<String> = passthrough.to_vec();
        args.append(&mut tokens);
        if args.is_empty() {
            args.push(String::new());
        }

        let mut input = Self::from_args(args);
        input.delimiter = delimiter;
        input
    }

    /// Returns the quote character the cursor sits inside, if any.
    pub const fn delimiter(&self) -> Option<char> {
        self.delimiter
    }

    /// Returns the next unconsumed token without advancing.
    pub fn peek(&self) -> Option<&str> {
        self.peek_at(0)
    }

    /// Returns the unconsumed token at the given position in the visible
    /// window without advancing.
    pub(crate) fn peek_at(&self, position: usize) -> Option<&str> {
        self.remaining
            .get(self.offset + position)
            .map(|idx| self.args[*idx].value.as_str())
    }

    /// Returns the number of tokens visible from the current offset.
    pub fn num_remaining(&self) -> usize {
        self.remaining.len().saturating_sub(self.offset)
    }

    /// Returns whether every token has been consumed.
    pub fn fully_processed(&self) -> bool {
        self.remaining.is_empty()
    }

    /// Returns the values of all tokens that are still unconsumed, in order.
    pub fn remaining_values(&self) -> Vec<String> {
        self.remaining
            .iter()
            .map(|idx| self.args[*idx].value.clone())
            .collect()
    }

    /// Returns the value of the final token of the line, consumed or not.
    /// During autocomplete this is the partial under the cursor.
    pub fn final_arg(&self) -> Option<&str> {
        self.args.last().map(|arg| arg.value.as_str())
    }

    /// Consumes and returns the next token.
    pub fn pop(&mut self) -> Option<String> {
        if self.offset >= self.remaining.len() {
            return None;
        }
        let idx = self.remaining.remove(self.offset);
        Some(self.args[idx].value.clone())
    }

    /// Consumes up to `min + optional` tokens (`optional = None` meaning
    /// unbounded), honouring the given breakers. Returns the consumed tokens
    /// and whether at least `min` were available.
    pub fn pop_n(
        &mut self,
        min: usize,
        optional: Option<usize>,
        breakers: &[InputBreaker],
    ) -> (Vec<String>, bool) {
        let limit = optional.map(|opt| min + opt);
        let mut popped = Vec::new();

        'consume: while limit.is_none_or(|l| popped.len() < l) {
            let Some(token) = self.peek() else {
                break;
            };
            for breaker in breakers {
                if breaker.matches(token) {
                    if breaker.discard {
                        self.pop();
                    }
                    break 'consume;
                }
            }
            if let Some(token) = self.pop() {
                popped.push(token);
            }
        }

        let enough = popped.len() >= min;
        (popped, enough)
    }

    /// Consumes and returns every token up to the first breaker match.
    pub fn pop_all(&mut self, breakers: &[InputBreaker]) -> Vec<String> {
        self.pop_n(0, None, breakers).0
    }

    /// Removes and returns the token at the given position in the visible
    /// window, leaving everything else in place.
    pub(crate) fn extract(&mut self, position: usize) -> Option<String> {
        let at = self.offset + position;
        if at >= self.remaining.len() {
            return None;
        }
        let idx = self.remaining.remove(at);
        Some(self.args[idx].value.clone())
    }

    /// Runs `f` with the visible window shifted forward by `position`
    /// tokens, restoring the previous window afterwards. Used while a flag's
    /// detached value tokens are consumed mid-line.
    pub(crate) fn with_offset<R>(&mut self, position: usize, f: impl FnOnce(&mut Self) -> R) -> R {
        let saved = self.offset;
        self.offset = saved + position;
        let result = f(self);
        self.offset = saved;
        result
    }

    /// Records a snapshot of the tokens still remaining and returns its
    /// identifier.
    pub fn snapshot(&mut self) -> Snapshot {
        self.snapshot_count += 1;
        let snapshot = Snapshot(self.snapshot_count);
        for idx in &self.remaining {
            self.args[*idx].snapshots.insert(snapshot);
        }
        snapshot
    }

    /// Returns the values of tokens that were remaining when the snapshot
    /// was taken but have since been consumed, in input order.
    pub fn used_since(&self, snapshot: Snapshot) -> Vec<String> {
        self.args
            .iter()
            .enumerate()
            .filter(|(idx, arg)| {
                arg.snapshots.contains(&snapshot) && !self.remaining.contains(idx)
            })
            .map(|(_, arg)| arg.value.clone())
            .collect()
    }
}

impl std::fmt::Debug for Input {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Input")
            .field("remaining", &self.remaining_values())
            .field("offset", &self.offset)
            .field("delimiter", &self.delimiter)
            .finish()
    }
}

#[derive(Clone, Copy)]
enum QuoteMode {
    None,
    Single,
    Double,
}

/// Splits a completion line into tokens, honouring single and double quotes
/// and backslash-escaped characters outside quotes. Returns the tokens plus
/// the active quote character if the line ends inside a quoted region.
///
/// A line ending in unquoted whitespace yields a trailing empty token: the
/// user just typed a space and is completing a fresh argument.
fn tokenize_comp_line(line: &str) -> (Vec<String>, Option<char>) {
    let mut tokens: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut has_current = false;
    let mut mode = QuoteMode::None;

    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        match mode {
            QuoteMode::None => match c {
                c if c.is_whitespace() => {
                    if has_current {
                        tokens.push(std::mem::take(&mut current));
                        has_current = false;
                    }
                }
                '\'' => {
                    mode = QuoteMode::Single;
                    has_current = true;
                }
                '"' => {
                    mode = QuoteMode::Double;
                    has_current = true;
                }
                '\\' => {
                    has_current = true;
                    if let Some(escaped) = chars.next() {
                        current.push(escaped);
                    }
                }
                c => {
                    has_current = true;
                    current.push(c);
                }
            },
            QuoteMode::Single => match c {
                '\'' => mode = QuoteMode::None,
                c => current.push(c),
            },
            QuoteMode::Double => match c {
                '"' => mode = QuoteMode::None,
                '\\' => {
                    if let Some(escaped) = chars.next() {
                        if !matches!(escaped, '"' | '\\') {
                            current.push('\\');
                        }
                        current.push(escaped);
                    }
                }
                c => current.push(c),
            },
        }
    }

    let delimiter = match mode {
        QuoteMode::None => None,
        QuoteMode::Single => Some('\''),
        QuoteMode::Double => Some('"'),
    };

    if has_current {
        tokens.push(current);
    } else {
        // Trailing whitespace (or an empty line): the partial is empty.
        tokens.push(String::new());
    }

    (tokens, delimiter)
}
