//! Evaluation of WHERE predicate trees.
//!
//! Both functions are pure: they walk the tree and read the record or
//! schema, nothing else.

use crate::{
    ast::{Expr, Operand},
    error::{Result, SchemaError},
    table::{Record, Schema},
};

/// Evaluates a WHERE clause expression against a single record.
///
/// - **Comparisons** fetch the column's value and compare it with the
///   right-hand side, which is either a literal or another column of the
///   same record. Both cases go through [Value::compare](crate::Value::compare).
/// - **AND** / **OR** short-circuit.
///
/// # Errors
/// An unknown column, or a comparison between incompatible types. A type
/// error is never turned into `false`.
///
/// # Example
/// ```
/// # use std::collections::HashMap;
/// # use minidb::{Value, filter, table::Record, ast::{Expr, ComparisonOp, Operand}};
/// let record = Record::new(HashMap::from([
///     ("Age".to_string(), Value::Int(25)),
///     ("MinAge".to_string(), Value::Int(21)),
/// ]));
/// let expr = Expr::compare("Age", ComparisonOp::Gt, Operand::Column("MinAge".into()));
/// assert!(filter::evaluate(&expr, &record).unwrap());
/// ```
pub fn evaluate(expr: &Expr, record: &Record) -> Result<bool> {
    match expr {
        Expr::Comparison { column, op, rhs } => {
            let left = record.value(column)?;
            let right = match rhs {
                Operand::Literal(value) => value,
                Operand::Column(name) => record.value(name)?,
            };
            Ok(left.compare(*op, right)?)
        }
        Expr::And { left, right } => Ok(evaluate(left, record)? && evaluate(right, record)?),
        Expr::Or { left, right } => Ok(evaluate(left, record)? || evaluate(right, record)?),
    }
}

/// Checks an expression against a table schema without touching any record:
/// every referenced column must exist and every comparison must be
/// type-compatible.
///
/// Running this first means a bad predicate is rejected even on an empty
/// table, and before any record is modified.
pub fn validate(expr: &Expr, schema: &Schema) -> Result<()> {
    match expr {
        Expr::Comparison { column, op, rhs } => {
            let left = schema
                .get(column)
                .ok_or_else(|| SchemaError::UnknownColumn(column.clone()))?
                .data_type;
            let right = match rhs {
                Operand::Literal(value) => value.data_type(),
                Operand::Column(name) => {
                    schema
                        .get(name)
                        .ok_or_else(|| SchemaError::UnknownColumn(name.clone()))?
                        .data_type
                }
            };
            Ok(left.check_comparison(*op, right)?)
        }
        Expr::And { left, right } | Expr::Or { left, right } => {
            validate(left, schema)?;
            validate(right, schema)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use proptest::prelude::*;

    use super::*;
    use crate::{
        DataType, Value,
        ast::ComparisonOp,
        error::{Error, TypeError},
        table::ColumnDef,
    };

    fn record(values: &[(&str, Value)]) -> Record {
        Record::new(
            values
                .iter()
                .map(|(name, value)| (name.to_string(), value.clone()))
                .collect::<HashMap<_, _>>(),
        )
    }

    fn literal(column: &str, op: ComparisonOp, value: Value) -> Expr {
        Expr::compare(column, op, Operand::Literal(value))
    }

    fn is_true(column: &str) -> Expr {
        literal(column, ComparisonOp::Eq, Value::Bool(true))
    }

    #[test]
    fn test_column_against_literal() {
        let r = record(&[("Age", Value::Int(30)), ("Name", Value::Text("Ann".into()))]);

        assert!(evaluate(&literal("Age", ComparisonOp::Gt, Value::Int(18)), &r).unwrap());
        assert!(!evaluate(&literal("Age", ComparisonOp::Lt, Value::Int(18)), &r).unwrap());
        assert!(evaluate(&literal("Name", ComparisonOp::Eq, Value::Text("Ann".into())), &r).unwrap());
        assert!(evaluate(&literal("Age", ComparisonOp::LtEq, Value::Float(30.5)), &r).unwrap());
    }

    #[test]
    fn test_column_against_column() {
        let employees = [
            (1, record(&[("Age", Value::Int(25)), ("MinAge", Value::Int(21))])),
            (2, record(&[("Age", Value::Int(19)), ("MinAge", Value::Int(21))])),
        ];
        let expr = Expr::compare("Age", ComparisonOp::Gt, Operand::Column("MinAge".into()));

        let matched: Vec<i32> = employees
            .iter()
            .filter(|(_, r)| evaluate(&expr, r).unwrap())
            .map(|(id, _)| *id)
            .collect();
        assert_eq!(matched, vec![1]);
    }

    #[test]
    fn test_column_comparison_uses_same_type_rules() {
        let r = record(&[("Name", Value::Text("Ann".into())), ("Age", Value::Int(3))]);

        let by_column = Expr::compare("Name", ComparisonOp::Eq, Operand::Column("Age".into()));
        let by_literal = literal("Name", ComparisonOp::Eq, Value::Int(3));

        let expected = Err(Error::Type(TypeError::Incomparable {
            left: DataType::Text,
            right: DataType::Int,
        }));
        assert_eq!(evaluate(&by_column, &r), expected);
        assert_eq!(evaluate(&by_literal, &r), expected);
    }

    #[test]
    fn test_unknown_column_is_an_error() {
        let r = record(&[("Age", Value::Int(3))]);
        assert_eq!(
            evaluate(&literal("Height", ComparisonOp::Eq, Value::Int(3)), &r),
            Err(SchemaError::UnknownColumn("Height".into()).into())
        );
        let expr = Expr::compare("Age", ComparisonOp::Eq, Operand::Column("Height".into()));
        assert!(evaluate(&expr, &r).is_err());
    }

    #[test]
    fn test_bool_ordering_is_a_type_error() {
        let r = record(&[("Active", Value::Bool(true))]);
        assert!(matches!(
            evaluate(&literal("Active", ComparisonOp::Gt, Value::Bool(false)), &r),
            Err(Error::Type(TypeError::UnsupportedOperator { .. }))
        ));
    }

    #[test]
    fn test_validate_against_schema() {
        let schema = Schema {
            columns: vec![
                ColumnDef {
                    name: "Age".into(),
                    data_type: DataType::Int,
                },
                ColumnDef {
                    name: "Score".into(),
                    data_type: DataType::Float,
                },
                ColumnDef {
                    name: "Name".into(),
                    data_type: DataType::Text,
                },
            ],
        };

        let ok = Expr::and(
            Expr::compare("Age", ComparisonOp::Lt, Operand::Column("Score".into())),
            literal("Name", ComparisonOp::NotEq, Value::Text("x".into())),
        );
        assert!(validate(&ok, &schema).is_ok());

        let unknown = Expr::or(ok.clone(), literal("Nope", ComparisonOp::Eq, Value::Int(1)));
        assert_eq!(
            validate(&unknown, &schema),
            Err(SchemaError::UnknownColumn("Nope".into()).into())
        );

        let mistyped = literal("Name", ComparisonOp::Gt, Value::Int(1));
        assert!(matches!(
            validate(&mistyped, &schema),
            Err(Error::Type(TypeError::Incomparable { .. }))
        ));
    }

    proptest! {
        #[test]
        fn test_and_of_or_matches_truth_table(a: bool, b: bool, c: bool) {
            let r = record(&[
                ("A", Value::Bool(a)),
                ("B", Value::Bool(b)),
                ("C", Value::Bool(c)),
            ]);
            let expr = Expr::and(is_true("A"), Expr::or(is_true("B"), is_true("C")));

            prop_assert_eq!(evaluate(&expr, &r).unwrap(), a && (b || c));
        }

        #[test]
        fn test_int_comparisons_match_rust_ordering(x: i64, y: i64) {
            let r = record(&[("X", Value::Int(x)), ("Y", Value::Int(y))]);
            let cases = [
                (ComparisonOp::Eq, x == y),
                (ComparisonOp::NotEq, x != y),
                (ComparisonOp::Gt, x > y),
                (ComparisonOp::GtEq, x >= y),
                (ComparisonOp::Lt, x < y),
                (ComparisonOp::LtEq, x <= y),
            ];
            for (op, expected) in cases {
                let by_column = Expr::compare("X", op, Operand::Column("Y".into()));
                prop_assert_eq!(evaluate(&by_column, &r).unwrap(), expected);
                prop_assert_eq!(evaluate(&literal("X", op, Value::Int(y)), &r).unwrap(), expected);
            }
        }
    }
}
