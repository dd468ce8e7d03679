//! Typed conversion between string tokens and argument values.

use crate::data::Value;
use crate::error::{Error, ErrorKind};

/// A type that can be read from and written back to argument tokens.
///
/// Each base type carries its own conversion vtable; the argument machinery
/// stays generic over `T` and reaches conversions through this trait.
pub trait ArgValue: Clone + Sized + 'static {
    /// The name of this type, used in conversion errors.
    const TYPE_NAME: &'static str;

    /// Parses the value from the given tokens.
    fn from_args(args: &[String]) -> Result<Self, Error>;

    /// Renders the value back into tokens.
    fn to_args(&self) -> Vec<String>;

    /// Converts the value into a [`Value`] slot.
    fn into_value(self) -> Value;

    /// Reads the value back out of a [`Value`] slot, if the types line up.
    fn from_value(value: &Value) -> Option<Self>;

    /// Returns whether this type holds multiple tokens.
    fn is_list() -> bool {
        false
    }
}

fn single<'a>(args: &'a [String], type_name: &'static str) -> Result<&'a String, Error> {
    args.first().ok_or_else(|| {
        ErrorKind::Parse {
            value: String::new(),
            type_name,
        }
        .into()
    })
}

impl ArgValue for String {
    const TYPE_NAME: &'static str = "string";

    fn from_args(args: &[String]) -> Result<Self, Error> {
        Ok(single(args, Self::TYPE_NAME)?.clone())
    }

    fn to_args(&self) -> Vec<String> {
        vec![self.clone()]
    }

    fn into_value(self) -> Value {
        Value::String(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl ArgValue for i64 {
    const TYPE_NAME: &'static str = "int";

    fn from_args(args: &[String]) -> Result<Self, Error> {
        parse_int(single(args, Self::TYPE_NAME)?)
    }

    fn to_args(&self) -> Vec<String> {
        vec![self.to_string()]
    }

    fn into_value(self) -> Value {
        Value::Int(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl ArgValue for f64 {
    const TYPE_NAME: &'static str = "float";

    fn from_args(args: &[String]) -> Result<Self, Error> {
        parse_float(single(args, Self::TYPE_NAME)?)
    }

    fn to_args(&self) -> Vec<String> {
        vec![self.to_string()]
    }

    fn into_value(self) -> Value {
        Value::Float(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }
}

impl ArgValue for bool {
    const TYPE_NAME: &'static str = "bool";

    fn from_args(args: &[String]) -> Result<Self, Error> {
        parse_bool(single(args, Self::TYPE_NAME)?)
    }

    fn to_args(&self) -> Vec<String> {
        vec![self.to_string()]
    }

    fn into_value(self) -> Value {
        Value::Bool(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

macro_rules! impl_list_arg_value {
    ($elem:ty, $variant:ident, $type_name:literal) => {
        impl ArgValue for Vec<$elem> {
            const TYPE_NAME: &'static str = $type_name;

            fn from_args(args: &[String]) -> Result<Self, Error> {
                args.iter()
                    .map(|arg| <$elem>::from_args(std::slice::from_ref(arg)))
                    .collect()
            }

            fn to_args(&self) -> Vec<String> {
                self.iter().flat_map(|elem| elem.to_args()).collect()
            }

            fn into_value(self) -> Value {
                Value::$variant(self)
            }

            fn from_value(value: &Value) -> Option<Self> {
                match value {
                    Value::$variant(list) => Some(list.clone()),
                    _ => None,
                }
            }

            fn is_list() -> bool {
                true
            }
        }
    };
}

impl_list_arg_value!(String, StringList, "string list");
impl_list_arg_value!(i64, IntList, "int list");
impl_list_arg_value!(f64, FloatList, "float list");

/// Removes underscore digit separators from a numeric literal, failing when
/// an underscore is not strictly between two digits.
fn strip_numeric_underscores(s: &str, type_name: &'static str) -> Result<String, Error> {
    let chars: Vec<char> = s.chars().collect();
    for (i, c) in chars.iter().enumerate() {
        if *c != '_' {
            continue;
        }
        let before = i.checked_sub(1).and_then(|j| chars.get(j));
        let after = chars.get(i + 1);
        let between_digits = matches!(before, Some(b) if b.is_ascii_digit())
            && matches!(after, Some(a) if a.is_ascii_digit());
        if !between_digits {
            return Err(ErrorKind::Parse {
                value: s.to_owned(),
                type_name,
            }
            .into());
        }
    }
    Ok(chars.into_iter().filter(|c| *c != '_').collect())
}

/// Parses an integer literal, allowing underscore separators between digits.
pub fn parse_int(s: &str) -> Result<i64, Error> {
    strip_numeric_underscores(s, i64::TYPE_NAME)?
        .parse()
        .map_err(|_| {
            ErrorKind::Parse {
                value: s.to_owned(),
                type_name: i64::TYPE_NAME,
            }
            .into()
        })
}

/// Parses a float literal, allowing underscore separators between digits.
pub fn parse_float(s: &str) -> Result<f64, Error> {
    strip_numeric_underscores(s, f64::TYPE_NAME)?
        .parse()
        .map_err(|_| {
            ErrorKind::Parse {
                value: s.to_owned(),
                type_name: f64::TYPE_NAME,
            }
            .into()
        })
}

/// Parses a boolean literal from the fixed accepted set.
pub fn parse_bool(s: &str) -> Result<bool, Error> {
    match s {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
        _ => Err(ErrorKind::Parse {
            value: s.to_owned(),
            type_name: bool::TYPE_NAME,
        }
        .into()),
    }
}
