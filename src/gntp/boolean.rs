//! Rendering of boolean header values
//!
//! GNTP expects `True` or `False`. Values arrive as native booleans, numbers
//! or free-form strings. `true`/`yes` and `false`/`no` are matched without
//! regard to case; anything else falls back to truthiness in lenient mode
//! (so `"maybe"` renders as `True`) or is rejected in strict mode.

use super::types::BoolValue;
use crate::common::{Error, Result};

pub const TRUE: &str = "True";
pub const FALSE: &str = "False";

/// How unrecognized strings are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strictness {
    /// Any non-empty string other than `"0"` is true
    #[default]
    Lenient,
    /// Only true/yes/false/no are accepted for strings
    Strict,
}

impl Strictness {
    pub fn from_flag(strict: bool) -> Self {
        if strict {
            Self::Strict
        } else {
            Self::Lenient
        }
    }
}

/// Render a value as the `True`/`False` token used in headers
pub fn render(value: &BoolValue, strictness: Strictness) -> Result<&'static str> {
    let truth = match value {
        BoolValue::Bool(b) => *b,
        BoolValue::Int(n) => *n != 0,
        BoolValue::Text(s) => match parse_word(s) {
            Some(b) => b,
            None if strictness == Strictness::Strict => {
                return Err(Error::InvalidBoolean(s.clone()))
            }
            None => is_truthy(s),
        },
    };

    Ok(if truth { TRUE } else { FALSE })
}

fn parse_word(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("yes") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") || s.eq_ignore_ascii_case("no") {
        Some(false)
    } else {
        None
    }
}

// Empty and "0" are the only falsy strings.
fn is_truthy(s: &str) -> bool {
    !s.is_empty() && s != "0"
}
