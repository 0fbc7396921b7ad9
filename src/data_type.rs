use std::fmt;

use crate::{ast::ComparisonOp, error::TypeError};

/// Represents the supported data types in the database schema.
/// These types define the structure of columns and the expected format of values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// A 64-bit signed integer, spelled `INT`.
    Int,
    /// A 64-bit floating-point number, spelled `FLOAT`.
    Float,
    /// A variable-length UTF-8 character string, spelled `STRING`.
    Text,
    /// A boolean value (true or false), spelled `BOOL`.
    Bool,
}

impl DataType {
    /// The keyword used for this type in a `CREATE` command.
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Int => "INT",
            Self::Float => "FLOAT",
            Self::Text => "STRING",
            Self::Bool => "BOOL",
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Int | Self::Float)
    }

    /// Checks whether values of `self` and `other` can be compared with `op`.
    ///
    /// Numbers compare with numbers (across `INT` and `FLOAT`), strings with
    /// strings, booleans with booleans for equality only.
    ///
    /// # Errors
    /// [TypeError::Incomparable] for mismatched types,
    /// [TypeError::UnsupportedOperator] for an ordering operator on booleans.
    pub fn check_comparison(self, op: ComparisonOp, other: DataType) -> Result<(), TypeError> {
        match (self, other) {
            (l, r) if l.is_numeric() && r.is_numeric() => Ok(()),
            (Self::Text, Self::Text) => Ok(()),
            (Self::Bool, Self::Bool) if op.is_equality() => Ok(()),
            (Self::Bool, Self::Bool) => Err(TypeError::UnsupportedOperator {
                op,
                data_type: Self::Bool,
            }),
            _ => Err(TypeError::Incomparable {
                left: self,
                right: other,
            }),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}
