//! Command descriptors produced by the parser.
//!
//! Every type here implements [Display](fmt::Display) in the exact syntax
//! the parser accepts, so a command can be written to a log and parsed back
//! into an equal value.

use std::{
    cmp::Ordering,
    fmt,
    path::{Path, PathBuf},
};

use crate::{ColumnDef, Value, value::write_quoted};

/// One parsed command, consumed exactly once by its executor.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    CreateTable(CreateTable),
    InsertInto(InsertInto),
    Select(Select),
    Delete(Delete),
    SaveAs(PathBuf),
    ReadFrom(PathBuf),
}

/// `CREATE <table> KEY <col> [FIELDS <col>:<TYPE>, ...]`
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTable {
    pub name: String,
    pub key_column: String,
    pub fields: Vec<ColumnDef>,
}

/// `INSERT <col>=<value>, ... INTO <table>`
#[derive(Debug, Clone, PartialEq)]
pub struct InsertInto {
    pub table: String,
    /// Column/value pairs in the order they were written.
    pub values: Vec<(String, Value)>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnsSelect {
    Star,
    ColumnsNames(Vec<String>),
}

/// `SELECT <col,...|*> FROM <table> [WHERE <expr>]`
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    pub columns: ColumnsSelect,
    pub table: String,
    /// `None` matches every record.
    pub where_clause: Option<Expr>,
}

/// `DELETE FROM <table> WHERE [<expr>]`
#[derive(Debug, Clone, PartialEq)]
pub struct Delete {
    pub table: String,
    /// `None` matches every record.
    pub where_clause: Option<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Eq,
    NotEq,
    Gt,
    GtEq,
    Lt,
    LtEq,
}

impl ComparisonOp {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::Lt => "<",
            Self::LtEq => "<=",
        }
    }

    pub fn is_equality(self) -> bool {
        matches!(self, Self::Eq | Self::NotEq)
    }

    /// Whether `left.cmp(right) == ordering` satisfies `left <op> right`.
    pub fn matches(self, ordering: Ordering) -> bool {
        match self {
            Self::Eq => ordering == Ordering::Equal,
            Self::NotEq => ordering != Ordering::Equal,
            Self::Gt => ordering == Ordering::Greater,
            Self::GtEq => ordering != Ordering::Less,
            Self::Lt => ordering == Ordering::Less,
            Self::LtEq => ordering != Ordering::Greater,
        }
    }
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Literal(Value),
    Column(String),
}

/// A node of the WHERE predicate tree.
///
/// The left-hand side of a comparison is always a column of the record
/// being tested.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Comparison {
        column: String,
        op: ComparisonOp,
        rhs: Operand,
    },
    And {
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Or {
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

impl Expr {
    pub fn compare(column: impl Into<String>, op: ComparisonOp, rhs: Operand) -> Self {
        Self::Comparison {
            column: column.into(),
            op,
            rhs,
        }
    }

    pub fn and(left: Expr, right: Expr) -> Self {
        Self::And {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn or(left: Expr, right: Expr) -> Self {
        Self::Or {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Binding strength, used to decide where parentheses are needed.
    fn precedence(&self) -> u8 {
        match self {
            Self::Or { .. } => 1,
            Self::And { .. } => 2,
            Self::Comparison { .. } => 3,
        }
    }

    /// Writes `child`, parenthesized when it binds looser than `min`.
    fn fmt_child(f: &mut fmt::Formatter<'_>, child: &Expr, min: u8) -> fmt::Result {
        if child.precedence() < min {
            write!(f, "({child})")
        } else {
            write!(f, "{child}")
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => write!(f, "{value}"),
            Self::Column(name) => f.write_str(name),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // AND and OR parse left-associative, so a right child of the same
        // precedence needs parentheses to keep its shape.
        match self {
            Self::Comparison { column, op, rhs } => write!(f, "{column} {op} {rhs}"),
            Self::And { left, right } => {
                Self::fmt_child(f, left, 2)?;
                f.write_str(" AND ")?;
                Self::fmt_child(f, right, 3)
            }
            Self::Or { left, right } => {
                Self::fmt_child(f, left, 1)?;
                f.write_str(" OR ")?;
                Self::fmt_child(f, right, 2)
            }
        }
    }
}

fn write_path(f: &mut fmt::Formatter<'_>, path: &Path) -> fmt::Result {
    let path = path.to_string_lossy();
    if path.is_empty() || path.contains(char::is_whitespace) || path.starts_with(['"', '\'']) {
        write_quoted(f, &path)
    } else {
        f.write_str(&path)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateTable(create) => {
                write!(f, "CREATE {} KEY {}", create.name, create.key_column)?;
                for (i, field) in create.fields.iter().enumerate() {
                    f.write_str(if i == 0 { " FIELDS " } else { ", " })?;
                    write!(f, "{}:{}", field.name, field.data_type)?;
                }
                Ok(())
            }
            Self::InsertInto(insert) => {
                f.write_str("INSERT ")?;
                for (i, (column, value)) in insert.values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{column}={value}")?;
                }
                write!(f, " INTO {}", insert.table)
            }
            Self::Select(select) => {
                f.write_str("SELECT ")?;
                match &select.columns {
                    ColumnsSelect::Star => f.write_str("*")?,
                    ColumnsSelect::ColumnsNames(names) => f.write_str(&names.join(", "))?,
                }
                write!(f, " FROM {}", select.table)?;
                if let Some(expr) = &select.where_clause {
                    write!(f, " WHERE {expr}")?;
                }
                Ok(())
            }
            Self::Delete(delete) => {
                write!(f, "DELETE FROM {} WHERE", delete.table)?;
                if let Some(expr) = &delete.where_clause {
                    write!(f, " {expr}")?;
                }
                Ok(())
            }
            Self::SaveAs(path) => {
                f.write_str("SAVE_AS ")?;
                write_path(f, path)
            }
            Self::ReadFrom(path) => {
                f.write_str("READ_FROM ")?;
                write_path(f, path)
            }
        }
    }
}
