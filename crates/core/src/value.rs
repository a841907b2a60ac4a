//! Typed attribute values
//!
//! The store persists every attribute tagged with its type. [`AttributeValue`]
//! serializes to the same shape the wire format uses:
//!
//! ```json
//! {"S": "order::1"}  {"N": "42"}  {"BOOL": true}  {"L": [{"N": "1"}]}  {"NULL": true}
//! ```
//!
//! Numbers are carried as their decimal string, exactly as the store does.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A record: attribute name to typed value.
pub type Item = HashMap<String, AttributeValue>;

/// A single typed attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttributeValue {
    /// String
    S(String),
    /// Number, as its decimal string
    N(String),
    /// Boolean
    #[serde(rename = "BOOL")]
    Bool(bool),
    /// Heterogeneous list
    L(Vec<AttributeValue>),
    /// Explicit null
    #[serde(rename = "NULL")]
    Null(bool),
}

impl AttributeValue {
    /// Build a string value.
    pub fn s(value: impl Into<String>) -> Self {
        AttributeValue::S(value.into())
    }

    /// Build a numeric value.
    pub fn n(value: i64) -> Self {
        AttributeValue::N(value.to_string())
    }

    /// Build an explicit null.
    pub fn null() -> Self {
        AttributeValue::Null(true)
    }

    /// Get the string payload, if this is a string.
    pub fn as_s(&self) -> Option<&str> {
        match self {
            AttributeValue::S(s) => Some(s),
            _ => None,
        }
    }

    /// Get the numeric payload as an integer.
    ///
    /// Returns `None` for non-numbers and for numbers that do not fit an `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttributeValue::N(n) => n.parse().ok(),
            _ => None,
        }
    }

    /// Get the boolean payload.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the list payload.
    pub fn as_list(&self) -> Option<&[AttributeValue]> {
        match self {
            AttributeValue::L(items) => Some(items),
            _ => None,
        }
    }

    /// Check for an explicit null.
    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null(_))
    }

    /// Wire tag of this value ("S", "N", "BOOL", "L", "NULL").
    pub fn type_tag(&self) -> &'static str {
        match self {
            AttributeValue::S(_) => "S",
            AttributeValue::N(_) => "N",
            AttributeValue::Bool(_) => "BOOL",
            AttributeValue::L(_) => "L",
            AttributeValue::Null(_) => "NULL",
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::S(s) => write!(f, "{:?}", s),
            AttributeValue::N(n) => write!(f, "{}", n),
            AttributeValue::Bool(b) => write!(f, "{}", b),
            AttributeValue::L(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            AttributeValue::Null(_) => write!(f, "null"),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::S(s.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        AttributeValue::S(s)
    }
}

impl From<i64> for AttributeValue {
    fn from(n: i64) -> Self {
        AttributeValue::n(n)
    }
}

impl From<bool> for AttributeValue {
    fn from(b: bool) -> Self {
        AttributeValue::Bool(b)
    }
}
