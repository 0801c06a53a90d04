// Value — The typed value held by every node
//
// A Value is one of three variants. Its tag may change when an edge writes
// a new value into a node (an Integer target becomes Double after a mixed
// arithmetic edge, or Text after a string-producing edge).
//
// TEXT FORMATTING: numbers are rendered the way C's printf renders them
// for `%d` and `%f`: integers in decimal, doubles in fixed-point with a
// configurable number of fractional digits (6 by default).

use crate::error::ValueError;
use crate::token::{Token, TokenKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default fractional digits when a Double is rendered as text.
pub const DEFAULT_FLOAT_PRECISION: u16 = 6;

/// Fractional digits in the exact decimal expansion of the smallest
/// subnormal f64. Every finite double is exact at this precision, so any
/// further digits are zeros.
const EXACT_FRACTION_DIGITS: u16 = 1074;

/// Declared node type, as written after `type:`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Int,
    Double,
    String,
}

impl ValueType {
    /// Map a type keyword (`int`, `double`, `string`) to its ValueType.
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s {
            "int" => Some(ValueType::Int),
            "double" => Some(ValueType::Double),
            "string" => Some(ValueType::String),
            _ => None,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Int => write!(f, "int"),
            ValueType::Double => write!(f, "double"),
            ValueType::String => write!(f, "string"),
        }
    }
}

/// A node value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    Integer(i64),
    Double(f64),
    Text(String),
}

impl Value {
    /// The zero value a node of the given type starts with.
    pub fn zero(ty: ValueType) -> Self {
        match ty {
            ValueType::Int => Value::Integer(0),
            ValueType::Double => Value::Double(0.0),
            ValueType::String => Value::Text(String::new()),
        }
    }

    /// Convert a literal lexeme according to a declared type.
    ///
    /// Numeric types only take number lexemes (`-?[0-9][0-9.]*`), so words
    /// like `inf` or `NaN` are rejected. `int` accepts integer lexemes and
    /// truncates decimal ones toward zero. `double` takes whatever of those
    /// Rust's `f64` parser accepts. `string` takes the text as is.
    pub fn parse_literal(ty: ValueType, text: &str) -> Result<Self, ValueError> {
        match ty {
            ValueType::Int => parse_int(text)
                .map(Value::Integer)
                .ok_or_else(|| ValueError::InvalidInt(text.to_string())),
            ValueType::Double => parse_double(text)
                .map(Value::Double)
                .ok_or_else(|| ValueError::InvalidDouble(text.to_string())),
            ValueType::String => Ok(Value::Text(text.to_string())),
        }
    }

    /// Convert the token written after `value:`. Numeric types only take
    /// Number tokens, so `value: '7'` is not an int.
    pub fn from_token(ty: ValueType, token: &Token) -> Result<Self, ValueError> {
        let number = token.kind == TokenKind::Number;
        match ty {
            ValueType::Int => number
                .then(|| parse_int(&token.text))
                .flatten()
                .map(Value::Integer)
                .ok_or_else(|| ValueError::InvalidInt(token.text.clone())),
            ValueType::Double => number
                .then(|| parse_double(&token.text))
                .flatten()
                .map(Value::Double)
                .ok_or_else(|| ValueError::InvalidDouble(token.text.clone())),
            ValueType::String => Ok(Value::Text(token.text.clone())),
        }
    }

    /// The type this value currently has.
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Integer(_) => ValueType::Int,
            Value::Double(_) => ValueType::Double,
            Value::Text(_) => ValueType::String,
        }
    }

    /// Render as text: `%d` for integers, fixed-point with `precision`
    /// fractional digits for doubles, raw contents for text.
    pub fn to_text(&self, precision: u16) -> String {
        match self {
            Value::Integer(n) => n.to_string(),
            Value::Double(d) => {
                let precision = usize::from(precision);
                format!("{d:.precision$}")
            }
            Value::Text(s) => s.clone(),
        }
    }

    /// Byte length of `to_text(precision)`, without rendering the zeros
    /// past the exact expansion of a double.
    pub fn text_len(&self, precision: u16) -> usize {
        match self {
            Value::Integer(n) => n.to_string().len(),
            Value::Double(d) if !d.is_finite() => d.to_string().len(),
            Value::Double(d) => {
                let shown = precision.min(EXACT_FRACTION_DIGITS);
                let rendered = usize::from(shown);
                format!("{d:.rendered$}").len() + usize::from(precision - shown)
            }
            Value::Text(s) => s.len(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{n}"),
            Value::Double(d) => {
                let precision = f
                    .precision()
                    .unwrap_or(usize::from(DEFAULT_FLOAT_PRECISION));
                write!(f, "{d:.precision$}")
            }
            Value::Text(s) => f.write_str(s),
        }
    }
}

/// A lexer Number lexeme: optional `-`, a digit, then digits and dots.
fn is_number_lexeme(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    digits.starts_with(|c: char| c.is_ascii_digit())
        && digits.chars().all(|c| c.is_ascii_digit() || c == '.')
}

fn parse_int(text: &str) -> Option<i64> {
    if !is_number_lexeme(text) {
        return None;
    }
    text.parse::<i64>().ok().or_else(|| {
        text.parse::<f64>()
            .ok()
            .filter(|d| d.is_finite())
            .map(truncate)
    })
}

fn parse_double(text: &str) -> Option<f64> {
    if !is_number_lexeme(text) {
        return None;
    }
    text.parse::<f64>().ok()
}

/// Truncate toward zero into an i64. Saturates at the bounds; NaN is 0.
pub fn truncate(d: f64) -> i64 {
    d as i64
}
