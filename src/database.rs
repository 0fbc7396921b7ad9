use std::{collections::HashMap, fmt};

use tracing::{debug, info};

use crate::{
    ColumnDef,
    ast::{ColumnsSelect, CreateTable, Delete, InsertInto, Select},
    error::{Error, Result, SchemaError},
    filter,
    key::KeyType,
    table::{Schema, Table},
    value::Value,
};

/// The in-memory database: a collection of tables sharing one primary-key
/// type. It runs the data commands (`CREATE`, `INSERT`, `SELECT`, `DELETE`).
/// Text parsing and history live in [Session](crate::Session).
#[derive(Debug)]
pub struct Database {
    key_type: KeyType,
    /// A map of table names to their respective [Table] structures.
    tables: HashMap<String, Table>,
}

/// Represents the result of a successful `SELECT` query.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    /// The names of the columns included in the result set.
    pub columns: Vec<String>,
    /// The actual data, returned as a vector of rows, where each row is a vector of [Value].
    pub rows: Vec<Vec<Value>>,
}

impl QueryResult {
    fn cell(value: &Value) -> String {
        match value.as_str() {
            Some(s) => s.to_string(),
            None => value.to_string(),
        }
    }

    fn write_line(f: &mut fmt::Formatter<'_>, line: &[String], widths: &[usize]) -> fmt::Result {
        let text: Vec<String> = line
            .iter()
            .zip(widths)
            .map(|(cell, &width)| format!("{cell:width$}"))
            .collect();
        writeln!(f, "{}", text.join("  ").trim_end())
    }
}

/// Renders the rows as a left-aligned text table: a header line, a line of
/// dashes, then one line per row. Text values are shown unquoted.
impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cells: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| row.iter().map(Self::cell).collect())
            .collect();

        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.chars().count()).collect();
        for row in &cells {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        Self::write_line(f, &self.columns, &widths)?;
        let dashes: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        Self::write_line(f, &dashes, &widths)?;
        for row in &cells {
            Self::write_line(f, row, &widths)?;
        }
        Ok(())
    }
}

impl Database {
    /// Creates a new, empty database whose tables are keyed by `key_type`.
    pub fn new(key_type: KeyType) -> Self {
        Self {
            key_type,
            tables: HashMap::default(),
        }
    }

    pub fn key_type(&self) -> KeyType {
        self.key_type
    }

    /// Creates a new table in the database.
    ///
    /// The key column comes first in the schema, typed with the database key
    /// type. It may also be listed in `fields` as long as the declared type
    /// agrees, in which case it is not added twice.
    ///
    /// # Errors
    /// [SchemaError::DuplicateTable] if the name is taken,
    /// [SchemaError::DuplicateColumn] if two fields share a name,
    /// [SchemaError::KeyTypeConflict] if the key column is redeclared with
    /// another type.
    pub fn create_table(
        &mut self,
        name: String,
        key_column: String,
        fields: Vec<ColumnDef>,
    ) -> Result<()> {
        if self.tables.contains_key(&name) {
            return Err(SchemaError::DuplicateTable(name).into());
        }

        let key_data_type = self.key_type.data_type();
        let mut columns = vec![ColumnDef {
            name: key_column.clone(),
            data_type: key_data_type,
        }];
        let mut key_redeclared = false;

        for field in fields {
            if field.name == key_column {
                if field.data_type != key_data_type {
                    return Err(SchemaError::KeyTypeConflict {
                        column: field.name,
                        declared: field.data_type,
                        expected: key_data_type,
                    }
                    .into());
                }
                if key_redeclared {
                    return Err(SchemaError::DuplicateColumn(field.name).into());
                }
                key_redeclared = true;
                continue;
            }

            if columns.iter().any(|c| c.name == field.name) {
                return Err(SchemaError::DuplicateColumn(field.name).into());
            }
            columns.push(field);
        }

        info!(table = %name, key = %key_column, columns = columns.len(), "created table");
        let table = Table::new(name.clone(), key_column, self.key_type, Schema { columns });
        self.tables.insert(name, table);
        Ok(())
    }

    /// Retrieves a reference to a table by name.
    pub fn get_table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    /// Retrieves a mutable reference to a table by name.
    pub fn get_table_mut(&mut self, name: &str) -> Option<&mut Table> {
        self.tables.get_mut(name)
    }

    /// Returns the names of all tables, sorted.
    pub fn list_tables(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn table(&self, name: &str) -> Result<&Table> {
        self.get_table(name)
            .ok_or_else(|| Error::TableNotFound(name.to_string()))
    }

    fn table_mut(&mut self, name: &str) -> Result<&mut Table> {
        self.get_table_mut(name)
            .ok_or_else(|| Error::TableNotFound(name.to_string()))
    }

    /// Executes a `CREATE` command.
    pub fn create(&mut self, create: CreateTable) -> Result<()> {
        self.create_table(create.name, create.key_column, create.fields)
    }

    /// Executes an `INSERT` command: the record is stored under its key
    /// column's value, replacing any record already there.
    ///
    /// Returns `true` when an existing record was replaced.
    ///
    /// # Errors
    /// [Error::TableNotFound], or any validation error from [Table::insert];
    /// the table is unchanged in that case.
    pub fn insert(&mut self, insert: InsertInto) -> Result<bool> {
        let table = self.table_mut(&insert.table)?;
        let replaced = table.insert(insert.values)?;
        debug!(table = %insert.table, replaced, "inserted record");
        Ok(replaced)
    }

    /// Executes a `SELECT` query and returns the resulting data set.
    ///
    /// 1. **Resolves** the projected columns (`*` means all, in schema order).
    /// 2. **Validates** the `WHERE` clause against the schema.
    /// 3. **Filters** records into a selection mask.
    /// 4. **Projects** the selected records, in table iteration order.
    ///
    /// # Errors
    /// [Error::TableNotFound], an unknown column in the projection or the
    /// filter, or a type error in the filter.
    pub fn select(&self, select: &Select) -> Result<QueryResult> {
        let table = self.table(&select.table)?;

        let columns = match &select.columns {
            ColumnsSelect::Star => table.schema.names(),
            ColumnsSelect::ColumnsNames(names) => {
                if let Some(unknown) = names.iter().find(|n| !table.schema.contains(n)) {
                    return Err(SchemaError::UnknownColumn(unknown.clone()).into());
                }
                names.clone()
            }
        };

        if let Some(expr) = &select.where_clause {
            filter::validate(expr, &table.schema)?;
        }

        let mask = table.selection_mask(select.where_clause.as_ref())?;
        let rows = table
            .masked(&mask)
            .map(|record| record.project(&columns))
            .collect::<Result<Vec<_>>>()?;

        debug!(table = %select.table, rows = rows.len(), "selected rows");
        Ok(QueryResult { columns, rows })
    }

    /// Executes a `DELETE` command, removing every record matching the
    /// `WHERE` clause (all records when it is empty).
    ///
    /// Deletion is performed in two phases: the selection mask is computed
    /// first, then matching records are removed. If evaluation fails on any
    /// record nothing is removed.
    ///
    /// Returns the number of records removed.
    pub fn delete(&mut self, delete: Delete) -> Result<usize> {
        let table = self.table_mut(&delete.table)?;

        if let Some(expr) = &delete.where_clause {
            filter::validate(expr, &table.schema)?;
        }

        let mask = table.selection_mask(delete.where_clause.as_ref())?;
        let removed = table.remove_masked(&mask);

        debug!(table = %delete.table, removed, "deleted records");
        Ok(removed)
    }
}
