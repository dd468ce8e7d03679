//! Composable value validators with fixed tags.

use std::fmt::Display;
use std::path::Path;

use crate::error::Error;

/// A predicate applied to a parsed argument value. The tag is a fixed
/// string surfaced in validation error messages.
pub struct Validator<T> {
    tag: &'static str,
    check: Box<dyn Fn(&T) -> Result<(), String>>,
}

impl<T> Validator<T> {
    /// Returns a validator from a tag and a predicate returning a detail
    /// message on failure.
    pub fn new(tag: &'static str, check: impl Fn(&T) -> Result<(), String> + 'static) -> Self {
        Self {
            tag,
            check: Box::new(check),
        }
    }

    /// Returns this validator's tag.
    pub const fn tag(&self) -> &'static str {
        self.tag
    }

    /// Applies the validator to a value belonging to the named argument.
    pub(crate) fn validate(&self, name: &str, value: &T) -> Result<(), Error> {
        (self.check)(value).map_err(|detail| Error::validation(name, self.tag, detail))
    }
}

/// Requires the value to match the given regular expression.
///
/// Panics if the pattern is invalid; validators are constructed while the
/// graph is being built, before any pass runs.
pub fn matches_regex(pattern: &str) -> Validator<String> {
    let regex = fancy_regex::Regex::new(pattern).expect("invalid validator regex");
    let pattern = pattern.to_owned();
    Validator::new("MatchesRegex", move |value: &String| {
        if regex.is_match(value).unwrap_or(false) {
            Ok(())
        } else {
            Err(format!("value {value:?} doesn't match regex {pattern:?}"))
        }
    })
}

/// Requires the value to be at least `min` characters long.
pub fn min_length(min: usize) -> Validator<String> {
    Validator::new("MinLength", move |value: &String| {
        if value.chars().count() >= min {
            Ok(())
        } else {
            Err(format!("value {value:?} must be at least {min} characters long"))
        }
    })
}

/// Requires the value to be at most `max` characters long.
pub fn max_length(max: usize) -> Validator<String> {
    Validator::new("MaxLength", move |value: &String| {
        if value.chars().count() <= max {
            Ok(())
        } else {
            Err(format!("value {value:?} must be at most {max} characters long"))
        }
    })
}

/// Requires the value to contain the given substring.
pub fn contains(substring: impl Into<String>) -> Validator<String> {
    let substring = substring.into();
    Validator::new("Contains", move |value: &String| {
        if value.contains(&substring) {
            Ok(())
        } else {
            Err(format!("value {value:?} doesn't contain {substring:?}"))
        }
    })
}

/// Requires the value to be one of the given choices.
pub fn in_list<I, S>(choices: I) -> Validator<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let choices: Vec<String> = choices.into_iter().map(Into::into).collect();
    Validator::new("InList", move |value: &String| {
        if choices.contains(value) {
            Ok(())
        } else {
            Err(format!(
                "value {value:?} isn't one of [{}]",
                choices.join(" ")
            ))
        }
    })
}

/// Requires a numeric value to be strictly positive.
pub fn positive<T>() -> Validator<T>
where
    T: PartialOrd + Default + Display,
{
    Validator::new("Positive", |value: &T| {
        if *value > T::default() {
            Ok(())
        } else {
            Err(format!("value {value} isn't positive"))
        }
    })
}

/// Requires a numeric value to be zero or greater.
pub fn non_negative<T>() -> Validator<T>
where
    T: PartialOrd + Default + Display,
{
    Validator::new("NonNegative", |value: &T| {
        if *value >= T::default() {
            Ok(())
        } else {
            Err(format!("value {value} isn't non-negative"))
        }
    })
}

/// Requires a value to fall within the inclusive range `[lo, hi]`.
pub fn between<T>(lo: T, hi: T) -> Validator<T>
where
    T: PartialOrd + Display + Clone + 'static,
{
    Validator::new("Between", move |value: &T| {
        if *value >= lo && *value <= hi {
            Ok(())
        } else {
            Err(format!("value {value} isn't between {lo} and {hi}"))
        }
    })
}

/// Requires the value to name an existing file or directory.
pub fn file_exists() -> Validator<String> {
    Validator::new("FileExists", |value: &String| {
        if Path::new(value).exists() {
            Ok(())
        } else {
            Err(format!("file {value:?} does not exist"))
        }
    })
}

/// Requires the value to name an existing directory.
pub fn is_dir() -> Validator<String> {
    Validator::new("IsDir", |value: &String| {
        if Path::new(value).is_dir() {
            Ok(())
        } else {
            Err(format!("{value:?} is not a directory"))
        }
    })
}

/// Lifts a scalar validator over every element of a list value.
pub fn each<T: 'static>(inner: Validator<T>) -> Validator<Vec<T>> {
    let tag = inner.tag;
    Validator::new(tag, move |values: &Vec<T>| {
        for value in values {
            (inner.check)(value)?;
        }
        Ok(())
    })
}
