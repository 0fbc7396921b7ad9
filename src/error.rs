//! Error types for the command pipeline.
//!
//! Every stage reports through its own enum so callers can tell a syntax
//! problem from a schema or typing problem. [Error] wraps them all.

use std::path::PathBuf;

use thiserror::Error;

use crate::{DataType, ast::ComparisonOp};

pub type Result<T> = std::result::Result<T, Error>;

/// Raised by the tokenizer and the parser. Positions are character offsets
/// into the input line.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("empty command")]
    Empty,

    #[error("unexpected character {found:?} at position {position}")]
    UnexpectedChar { found: char, position: usize },

    #[error("unterminated string starting at position {position}")]
    UnterminatedString { position: usize },

    #[error("invalid number literal {literal:?} at position {position}")]
    InvalidNumber { literal: String, position: usize },

    #[error("unknown operator {op:?} at position {position}")]
    UnknownOperator { op: String, position: usize },

    #[error("unknown command {found} at position {position}")]
    UnknownCommand { found: String, position: usize },

    #[error("unknown column type {found} at position {position}")]
    UnknownType { found: String, position: usize },

    #[error("expected {expected}, found {found} at position {position}")]
    UnexpectedToken {
        expected: String,
        found: String,
        position: usize,
    },

    #[error("unbalanced parenthesis at position {position}")]
    UnbalancedParenthesis { position: usize },

    #[error("literal {found} on the left-hand side of a comparison at position {position}")]
    LiteralOnLeft { found: String, position: usize },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("table {0} already exists")]
    DuplicateTable(String),

    #[error("column {0} is defined more than once")]
    DuplicateColumn(String),

    #[error("unknown column {0}")]
    UnknownColumn(String),

    #[error("key column {column} declared as {declared} but the database key type is {expected}")]
    KeyTypeConflict {
        column: String,
        declared: DataType,
        expected: DataType,
    },

    #[error("missing columns on insert into {table}: {columns:?}")]
    MissingColumns { table: String, columns: Vec<String> },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TypeError {
    #[error("column {column} expects {expected}, got {found}")]
    Mismatch {
        column: String,
        expected: DataType,
        found: DataType,
    },

    #[error("cannot compare {left} with {right}")]
    Incomparable { left: DataType, right: DataType },

    #[error("operator {op} is not supported on {data_type}")]
    UnsupportedOperator { op: ComparisonOp, data_type: DataType },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("type error: {0}")]
    Type(#[from] TypeError),

    #[error("table {0} not found")]
    TableNotFound(String),

    #[error("cannot access {path}: {message}")]
    Io { path: PathBuf, message: String },

    #[error("READ_FROM nested deeper than {0} levels")]
    ReplayDepthExceeded(usize),
}
