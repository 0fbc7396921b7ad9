use std::{cmp::Ordering, fmt, sync::Arc};

use crate::{ast::ComparisonOp, data_type::DataType, error::TypeError};

/// Represents a single data value stored in the database.
///
/// This enum wraps all supported Rust types into a single type that can be
/// passed around the engine. A value's variant always matches the declared
/// [DataType] of the column holding it.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A 64-bit signed integer value.
    Int(i64),
    /// A 64-bit floating-point value.
    Float(f64),
    /// A UTF-8 string value, wrapped in an [Arc] for cheap cloning.
    Text(Arc<str>),
    /// A boolean value.
    Bool(bool),
}

impl Value {
    /// Returns a reference to the inner string slice if this is a [Value::Text].
    /// Otherwise, returns `None`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the logical [DataType] corresponding to this value.
    pub fn data_type(&self) -> DataType {
        match self {
            Self::Int(_) => DataType::Int,
            Self::Float(_) => DataType::Float,
            Self::Text(_) => DataType::Text,
            Self::Bool(_) => DataType::Bool,
        }
    }

    /// Applies `op` with `self` on the left and `other` on the right.
    ///
    /// Integers and floats are ordered numerically against each other, but an
    /// `INT` only equals a `FLOAT` when the float holds exactly that integer.
    /// Strings are ordered lexicographically. Booleans only support `=` and
    /// `!=`.
    ///
    /// # Errors
    /// Returns a [TypeError] when the two types cannot be compared with `op`.
    ///
    /// # Example
    /// ```
    /// # use minidb::{Value, ast::ComparisonOp};
    /// assert!(Value::Int(3).compare(ComparisonOp::Lt, &Value::Float(3.5)).unwrap());
    /// assert!(Value::Int(3).compare(ComparisonOp::Eq, &Value::Float(3.0)).unwrap());
    /// assert!(Value::Bool(true).compare(ComparisonOp::Gt, &Value::Bool(false)).is_err());
    /// ```
    pub fn compare(&self, op: ComparisonOp, other: &Value) -> Result<bool, TypeError> {
        self.data_type().check_comparison(op, other.data_type())?;

        let ordering = match (self, other) {
            (Self::Int(l), Self::Int(r)) => Some(l.cmp(r)),
            (Self::Float(l), Self::Float(r)) => l.partial_cmp(r),
            (Self::Int(l), Self::Float(r)) => int_float_ordering(*l, *r),
            (Self::Float(l), Self::Int(r)) => int_float_ordering(*r, *l).map(Ordering::reverse),
            (Self::Text(l), Self::Text(r)) => Some(l.cmp(r)),
            (Self::Bool(l), Self::Bool(r)) => Some(l.cmp(r)),
            _ => {
                return Err(TypeError::Incomparable {
                    left: self.data_type(),
                    right: other.data_type(),
                });
            }
        };

        // NaN is unordered: only `!=` holds.
        Ok(match ordering {
            Some(ordering) => op.matches(ordering),
            None => op == ComparisonOp::NotEq,
        })
    }
}

/// Orders an integer against a float without losing precision when the
/// float is integral and fits in an `i64`.
fn int_float_ordering(int: i64, float: f64) -> Option<Ordering> {
    if float.fract() == 0.0 && float >= i64::MIN as f64 && float < i64::MAX as f64 {
        Some(int.cmp(&(float as i64)))
    } else {
        (int as f64).partial_cmp(&float)
    }
}

/// Formats the value as a literal the tokenizer reads back to the same value.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            // keep the decimal point so the literal stays a FLOAT
            Self::Float(v) if v.is_finite() && v.fract() == 0.0 => write!(f, "{v:.1}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(s) => write_quoted(f, s),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// Writes `s` between double quotes, escaping `"` and `\`.
pub(crate) fn write_quoted(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("\"")?;
    for ch in s.chars() {
        if matches!(ch, '"' | '\\') {
            f.write_str("\\")?;
        }
        write!(f, "{ch}")?;
    }
    f.write_str("\"")
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.into())
    }
}
