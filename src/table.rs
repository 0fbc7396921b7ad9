use std::collections::{BTreeMap, HashMap, HashSet};

use bitvec::prelude::*;

use crate::{
    ast::Expr,
    data_type::DataType,
    error::{Error, Result, SchemaError, TypeError},
    filter,
    key::{Key, KeyType},
    value::Value,
};

/// Column definition in the schema
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    pub data_type: DataType,
}

/// Ordered column list of a table. Names are unique.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub columns: Vec<ColumnDef>,
}

impl Schema {
    pub fn get(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Column names in schema order.
    pub fn names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }
}

/// One row of a table: a value for every column, addressed by column name.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    values: HashMap<String, Value>,
}

impl Record {
    pub fn new(values: HashMap<String, Value>) -> Self {
        Self { values }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    /// Like [Record::get], but an absent column is an error.
    pub fn value(&self, column: &str) -> Result<&Value> {
        self.get(column)
            .ok_or_else(|| SchemaError::UnknownColumn(column.to_string()).into())
    }

    /// Returns the values of `columns`, in that order.
    pub fn project(&self, columns: &[String]) -> Result<Vec<Value>> {
        columns
            .iter()
            .map(|name| self.value(name).cloned())
            .collect()
    }
}

/// A keyed collection of records sharing one schema.
///
/// Records are iterated in ascending key order.
#[derive(Debug)]
pub struct Table {
    pub name: String,
    pub schema: Schema,
    key_column: String,
    key_type: KeyType,
    records: BTreeMap<Key, Record>,
}

impl Table {
    /// Creates an empty table. `schema` must already contain `key_column`
    /// typed as `key_type`; [Database::create_table](crate::Database::create_table)
    /// takes care of that.
    pub fn new(name: String, key_column: String, key_type: KeyType, schema: Schema) -> Self {
        Self {
            name,
            schema,
            key_column,
            key_type,
            records: BTreeMap::new(),
        }
    }

    pub fn key_column(&self) -> &str {
        &self.key_column
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, key: &Key) -> Option<&Record> {
        self.records.get(key)
    }

    /// Records in iteration order.
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.records.values()
    }

    /// Validates a full set of column values and upserts the record.
    ///
    /// Every schema column must be given exactly once, with a value of the
    /// column's declared type. Nothing is stored unless all checks pass.
    ///
    /// Returns `true` when a record with the same key was replaced.
    ///
    /// # Errors
    /// [SchemaError::UnknownColumn], [SchemaError::DuplicateColumn],
    /// [SchemaError::MissingColumns] or [TypeError::Mismatch].
    pub fn insert(&mut self, values: Vec<(String, Value)>) -> Result<bool> {
        let mut seen = HashSet::new();
        for (name, value) in &values {
            let column = self
                .schema
                .get(name)
                .ok_or_else(|| SchemaError::UnknownColumn(name.clone()))?;

            if !seen.insert(name.as_str()) {
                return Err(SchemaError::DuplicateColumn(name.clone()).into());
            }

            if value.data_type() != column.data_type {
                return Err(TypeError::Mismatch {
                    column: name.clone(),
                    expected: column.data_type,
                    found: value.data_type(),
                }
                .into());
            }
        }

        let missing: Vec<String> = self
            .schema
            .columns
            .iter()
            .filter(|c| !seen.contains(c.name.as_str()))
            .map(|c| c.name.clone())
            .collect();
        if !missing.is_empty() {
            return Err(SchemaError::MissingColumns {
                table: self.name.clone(),
                columns: missing,
            }
            .into());
        }

        let record = Record::new(values.into_iter().collect());
        let key_value = record.value(&self.key_column)?;
        let key = Key::from_value(key_value, self.key_type).ok_or_else(|| {
            Error::from(TypeError::Mismatch {
                column: self.key_column.clone(),
                expected: self.key_type.data_type(),
                found: key_value.data_type(),
            })
        })?;

        Ok(self.records.insert(key, record).is_some())
    }

    /// Evaluates `predicate` against every record and returns one bit per
    /// record, in iteration order, set where the record matched. `None`
    /// matches all.
    ///
    /// # Errors
    /// Propagates the first evaluation error; no partial mask is returned.
    pub fn selection_mask(&self, predicate: Option<&Expr>) -> Result<BitVec> {
        let mut mask = BitVec::with_capacity(self.records.len());
        for record in self.records.values() {
            let matched = match predicate {
                Some(expr) => filter::evaluate(expr, record)?,
                None => true,
            };
            mask.push(matched);
        }
        Ok(mask)
    }

    /// Records whose bit is set in `mask`, in iteration order.
    pub fn masked<'a>(&'a self, mask: &'a BitSlice) -> impl Iterator<Item = &'a Record> + 'a {
        self.records
            .values()
            .zip(mask.iter().by_vals())
            .filter_map(|(record, selected)| selected.then_some(record))
    }

    /// Removes every record whose bit is set in `mask` and returns how many
    /// were removed. `mask` must come from [Table::selection_mask] with no
    /// mutation in between.
    pub fn remove_masked(&mut self, mask: &BitSlice) -> usize {
        let mut bits = mask.iter().by_vals();
        let before = self.records.len();
        // retain visits entries in the same ascending order as values()
        self.records.retain(|_, _| !bits.next().unwrap_or(false));
        before - self.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ComparisonOp, Operand};

    fn users_table() -> Table {
        let schema = Schema {
            columns: vec![
                ColumnDef {
                    name: "id".into(),
                    data_type: DataType::Int,
                },
                ColumnDef {
                    name: "name".into(),
                    data_type: DataType::Text,
                },
                ColumnDef {
                    name: "age".into(),
                    data_type: DataType::Int,
                },
            ],
        };
        Table::new("users".into(), "id".into(), KeyType::Int, schema)
    }

    fn row(id: i64, name: &str, age: i64) -> Vec<(String, Value)> {
        vec![
            ("id".into(), Value::Int(id)),
            ("name".into(), Value::Text(name.into())),
            ("age".into(), Value::Int(age)),
        ]
    }

    #[test]
    fn test_table_creation() {
        let table = users_table();
        assert_eq!(table.schema.columns.len(), 3);
        assert_eq!(table.key_column(), "id");
        assert!(table.is_empty());
    }

    #[test]
    fn test_insert_and_get() {
        let mut table = users_table();

        assert!(!table.insert(row(1, "Alice", 30)).unwrap());
        assert_eq!(table.len(), 1);

        let record = table.get(&Key::Int(1)).unwrap();
        assert_eq!(record.get("name"), Some(&Value::Text("Alice".into())));
        assert_eq!(record.get("age"), Some(&Value::Int(30)));
    }

    #[test]
    fn test_insert_any_column_order() {
        let mut table = users_table();
        let mut values = row(1, "Alice", 30);
        values.reverse();
        table.insert(values).unwrap();
        assert_eq!(table.get(&Key::Int(1)).unwrap().get("id"), Some(&Value::Int(1)));
    }

    #[test]
    fn test_insert_same_key_replaces() {
        let mut table = users_table();
        table.insert(row(1, "Alice", 30)).unwrap();

        assert!(table.insert(row(1, "Alicia", 31)).unwrap());
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.get(&Key::Int(1)).unwrap().get("name"),
            Some(&Value::Text("Alicia".into()))
        );
    }

    #[test]
    fn test_missing_columns_error() {
        let mut table = users_table();
        let result = table.insert(vec![("id".into(), Value::Int(1))]);

        assert_eq!(
            result,
            Err(SchemaError::MissingColumns {
                table: "users".into(),
                columns: vec!["name".into(), "age".into()]
            }
            .into())
        );
        assert!(table.is_empty());
    }

    #[test]
    fn test_unknown_and_duplicate_columns() {
        let mut table = users_table();

        let mut values = row(1, "Alice", 30);
        values.push(("email".into(), Value::Text("a@b".into())));
        assert_eq!(
            table.insert(values),
            Err(SchemaError::UnknownColumn("email".into()).into())
        );

        let mut values = row(1, "Alice", 30);
        values.push(("age".into(), Value::Int(31)));
        assert_eq!(
            table.insert(values),
            Err(SchemaError::DuplicateColumn("age".into()).into())
        );
        assert!(table.is_empty());
    }

    #[test]
    fn test_type_mismatch_error() {
        let mut table = users_table();
        let values = vec![
            ("id".into(), Value::Int(1)),
            ("name".into(), Value::Text("Alice".into())),
            ("age".into(), Value::Text("thirty".into())),
        ];

        assert_eq!(
            table.insert(values),
            Err(TypeError::Mismatch {
                column: "age".into(),
                expected: DataType::Int,
                found: DataType::Text
            }
            .into())
        );
        assert!(table.is_empty());
    }

    #[test]
    fn test_selection_mask_and_removal() {
        let mut table = users_table();
        table.insert(row(3, "Charlie", 25)).unwrap();
        table.insert(row(1, "Alice", 30)).unwrap();
        table.insert(row(2, "Bob", 17)).unwrap();

        let adults = Expr::compare("age", ComparisonOp::GtEq, Operand::Literal(Value::Int(18)));
        let mask = table.selection_mask(Some(&adults)).unwrap();

        // key order: 1, 2, 3
        assert_eq!(mask, bitvec![1, 0, 1]);
        let names: Vec<_> = table
            .masked(&mask)
            .map(|r| r.get("name").cloned().unwrap())
            .collect();
        assert_eq!(
            names,
            vec![Value::Text("Alice".into()), Value::Text("Charlie".into())]
        );

        assert_eq!(table.remove_masked(&mask), 2);
        assert_eq!(table.len(), 1);
        assert!(table.get(&Key::Int(2)).is_some());
    }

    #[test]
    fn test_selection_mask_without_filter_selects_all() {
        let mut table = users_table();
        table.insert(row(1, "Alice", 30)).unwrap();
        table.insert(row(2, "Bob", 17)).unwrap();

        let mask = table.selection_mask(None).unwrap();
        assert_eq!(mask.count_ones(), 2);
    }

    #[test]
    fn test_project() {
        let mut table = users_table();
        table.insert(row(1, "Alice", 30)).unwrap();
        let record = table.get(&Key::Int(1)).unwrap();

        assert_eq!(
            record.project(&["age".into(), "id".into()]).unwrap(),
            vec![Value::Int(30), Value::Int(1)]
        );
        assert!(record.project(&["nope".into()]).is_err());
    }
}
