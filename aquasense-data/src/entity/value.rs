//! Backend-neutral scalar values
//!
//! Every column value crossing the store seam is a [`Value`]. Equality
//! follows SQL comparison semantics in one respect: when predicates are
//! evaluated, `Null` compares equal to nothing, not even itself; see
//! [`Value::matches`].

use std::fmt;

use chrono::{DateTime, Utc};

/// A scalar column value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// 64-bit integer
    Int(i64),
    /// 64-bit float
    Float(f64),
    /// Text
    Text(String),
    /// Boolean
    Bool(bool),
    /// UTC timestamp
    Timestamp(DateTime<Utc>),
    /// Absent value
    Null,
}

impl Value {
    /// True when the value is `Null`
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Integer payload, if any
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Float payload, if any
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Text payload, if any
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Boolean payload, if any
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Timestamp payload, if any
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Timestamp(t) => Some(*t),
            _ => None,
        }
    }

    /// Predicate equality: same variant, same payload, and never `Null`
    ///
    /// This is the comparison used when criteria are evaluated, so a
    /// `col = NULL` predicate matches no row, as it would in SQL.
    pub fn matches(&self, other: &Value) -> bool {
        if self.is_null() || other.is_null() {
            return false;
        }
        self == other
    }

    /// Hashable identity for deduplication and uniqueness checks
    ///
    /// Floats hash by bit pattern; `Null` has its own identity so that a
    /// row's key identity is always well-defined.
    pub fn identity(&self) -> ValueIdentity {
        match self {
            Self::Int(n) => ValueIdentity::Int(*n),
            Self::Float(n) => ValueIdentity::Float(n.to_bits()),
            Self::Text(s) => ValueIdentity::Text(s.clone()),
            Self::Bool(b) => ValueIdentity::Bool(*b),
            Self::Timestamp(t) => ValueIdentity::Timestamp(*t),
            Self::Null => ValueIdentity::Null,
        }
    }
}

/// Hashable projection of a [`Value`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueIdentity {
    Int(i64),
    /// Float bit pattern
    Float(u64),
    Text(String),
    Bool(bool),
    Timestamp(DateTime<Utc>),
    Null,
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{}", n),
            Self::Float(n) => write!(f, "{}", n),
            Self::Text(s) => write!(f, "{}", s),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Timestamp(t) => write!(f, "{}", t.to_rfc3339()),
            Self::Null => write!(f, "null"),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(t: DateTime<Utc>) -> Self {
        Self::Timestamp(t)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => Self::Null,
        }
    }
}
