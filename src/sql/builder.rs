//! Parameterized DML construction.
//!
//! [`SqlCommandBuilder`] turns a table name plus value/key maps into SQL
//! text and a separate bound-parameter list. Values never appear in the
//! text; every bound value gets a uniquely named `@placeholder`. Required
//! inputs are checked before any SQL is assembled.

use std::sync::Arc;

use crate::core::{BridgeError, Record, Result, Value};
use crate::sql::dialect::{BoundColumn, Dialect, SqlServerDialect};

/// One named value bound to a statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub value: Value,
}

impl Parameter {
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// SQL text plus the parameters it references.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltCommand {
    pub sql: String,
    pub params: Vec<Parameter>,
}

/// Allocates unique parameter names within one statement.
///
/// Column names are sanitized to identifier characters; a repeated base name
/// gets a numeric suffix. Key-derived names carry a `k_` prefix so a column
/// appearing in both the values and keys maps never collides.
struct ParamNamer {
    used: Vec<String>,
}

impl ParamNamer {
    fn new() -> Self {
        Self { used: Vec::new() }
    }

    fn next(&mut self, base: &str) -> String {
        let base = sanitize_param_name(base);
        let mut candidate = base.clone();
        let mut attempt = 1;
        while self.used.iter().any(|name| name == &candidate) {
            attempt += 1;
            candidate = format!("{}_{}", base, attempt);
        }
        self.used.push(candidate.clone());
        candidate
    }
}

fn sanitize_param_name(raw: &str) -> String {
    let mut name: String = raw
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                ch
            } else {
                '_'
            }
        })
        .collect();

    let starts_with_digit = name.chars().next().is_some_and(|c| c.is_ascii_digit());
    if name.is_empty() || starts_with_digit {
        name.insert(0, 'p');
    }
    name
}

pub struct SqlCommandBuilder {
    dialect: Arc<dyn Dialect>,
}

impl SqlCommandBuilder {
    pub fn new(dialect: Arc<dyn Dialect>) -> Self {
        Self { dialect }
    }

    pub fn dialect(&self) -> &Arc<dyn Dialect> {
        &self.dialect
    }

    /// `INSERT INTO t (cols) VALUES (params)`.
    pub fn insert(&self, table: &str, values: &Record) -> Result<BuiltCommand> {
        check_table_name(table)?;
        check_map(values, "values", "Insert")?;

        let mut namer = ParamNamer::new();
        let mut params = Vec::with_capacity(values.len());
        let mut columns = Vec::with_capacity(values.len());
        let mut placeholders = Vec::with_capacity(values.len());

        for (column, value) in values.iter() {
            check_column_name(column)?;
            let name = namer.next(column);
            columns.push(self.dialect.quote(column));
            placeholders.push(format!("@{}", name));
            params.push(Parameter::new(name, value.clone()));
        }

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.dialect.quote(table),
            columns.join(", "),
            placeholders.join(", ")
        );
        Ok(BuiltCommand { sql, params })
    }

    /// `UPDATE t SET cols = params WHERE keycols = keyparams`. The WHERE
    /// side binds under `k_`-prefixed names, so a column present in both
    /// maps stays unambiguous.
    pub fn update(&self, table: &str, values: &Record, keys: &Record) -> Result<BuiltCommand> {
        check_table_name(table)?;
        check_map(values, "values", "Update")?;
        check_map(keys, "keys", "Update")?;

        let mut namer = ParamNamer::new();
        let mut params = Vec::with_capacity(values.len() + keys.len());

        let mut assignments = Vec::with_capacity(values.len());
        for (column, value) in values.iter() {
            check_column_name(column)?;
            let name = namer.next(column);
            assignments.push(format!("{} = @{}", self.dialect.quote(column), name));
            params.push(Parameter::new(name, value.clone()));
        }

        let mut conditions = Vec::with_capacity(keys.len());
        for (column, value) in keys.iter() {
            check_column_name(column)?;
            let name = namer.next(&format!("k_{}", column));
            conditions.push(format!("{} = @{}", self.dialect.quote(column), name));
            params.push(Parameter::new(name, value.clone()));
        }

        let sql = format!(
            "UPDATE {} SET {} WHERE {}",
            self.dialect.quote(table),
            assignments.join(", "),
            conditions.join(" AND ")
        );
        Ok(BuiltCommand { sql, params })
    }

    /// `DELETE FROM t WHERE keycols = keyparams`.
    pub fn delete(&self, table: &str, keys: &Record) -> Result<BuiltCommand> {
        check_table_name(table)?;
        check_map(keys, "keys", "Delete")?;

        let mut namer = ParamNamer::new();
        let mut params = Vec::with_capacity(keys.len());
        let mut conditions = Vec::with_capacity(keys.len());

        for (column, value) in keys.iter() {
            check_column_name(column)?;
            let name = namer.next(&format!("k_{}", column));
            conditions.push(format!("{} = @{}", self.dialect.quote(column), name));
            params.push(Parameter::new(name, value.clone()));
        }

        let sql = format!(
            "DELETE FROM {} WHERE {}",
            self.dialect.quote(table),
            conditions.join(" AND ")
        );
        Ok(BuiltCommand { sql, params })
    }

    /// Conditional merge on `keys`: update the non-key values when matched,
    /// insert keys and values otherwise. A values entry whose column also
    /// appears in `keys` is carried by the key parameter alone.
    pub fn upsert(&self, table: &str, values: &Record, keys: &Record) -> Result<BuiltCommand> {
        check_table_name(table)?;
        check_map(values, "values", "Upsert")?;
        check_map(keys, "keys", "Upsert")?;

        let mut namer = ParamNamer::new();
        let mut params = Vec::with_capacity(values.len() + keys.len());

        let mut key_columns = Vec::with_capacity(keys.len());
        for (column, value) in keys.iter() {
            check_column_name(column)?;
            let name = namer.next(&format!("k_{}", column));
            key_columns.push(BoundColumn::new(column, format!("@{}", name)));
            params.push(Parameter::new(name, value.clone()));
        }

        let mut value_columns = Vec::with_capacity(values.len());
        for (column, value) in values.iter() {
            check_column_name(column)?;
            if keys.contains_key(column) {
                continue;
            }
            let name = namer.next(column);
            value_columns.push(BoundColumn::new(column, format!("@{}", name)));
            params.push(Parameter::new(name, value.clone()));
        }

        if value_columns.is_empty() {
            return Err(BridgeError::Validation(
                "Upsert requires at least one non-key value column".to_string(),
            ));
        }

        let sql = self.dialect.upsert(table, &key_columns, &value_columns);
        Ok(BuiltCommand { sql, params })
    }

    /// One multi-row INSERT. Columns come from the first item; later items
    /// are projected onto them by name, binding null for anything missing,
    /// and are not otherwise validated.
    pub fn insert_range(&self, table: &str, items: &[Record]) -> Result<BuiltCommand> {
        check_table_name(table)?;
        check_items(items, "InsertRange")?;

        let columns = columns_of_first(items)?;
        let mut namer = ParamNamer::new();
        let mut params = Vec::with_capacity(items.len() * columns.len());
        let mut groups = Vec::with_capacity(items.len());

        for (index, item) in items.iter().enumerate() {
            let mut placeholders = Vec::with_capacity(columns.len());
            for column in &columns {
                let name = namer.next(&format!("{}_{}", column, index));
                placeholders.push(format!("@{}", name));
                let value = item.get(column).cloned().unwrap_or(Value::Null);
                params.push(Parameter::new(name, value));
            }
            groups.push(format!("({})", placeholders.join(", ")));
        }

        let quoted_columns: Vec<String> =
            columns.iter().map(|c| self.dialect.quote(c)).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES {}",
            self.dialect.quote(table),
            quoted_columns.join(", "),
            groups.join(", ")
        );
        Ok(BuiltCommand { sql, params })
    }

    /// One merge over the whole batch, joined on `key_columns`. Columns come
    /// from the first item, and every key column must be among them.
    pub fn upsert_range(
        &self,
        table: &str,
        items: &[Record],
        key_columns: &[String],
    ) -> Result<BuiltCommand> {
        check_table_name(table)?;
        check_items(items, "UpsertRange")?;
        if key_columns.is_empty() {
            return Err(BridgeError::Validation(
                "UpsertRange requires a non-empty key-column list".to_string(),
            ));
        }

        let columns = columns_of_first(items)?;
        for key in key_columns {
            check_column_name(key)?;
            if !columns.iter().any(|c| c.eq_ignore_ascii_case(key)) {
                return Err(BridgeError::Validation(format!(
                    "Key column '{}' is not present in the first item",
                    key
                )));
            }
        }
        let non_key_count = columns
            .iter()
            .filter(|c| !key_columns.iter().any(|k| k.eq_ignore_ascii_case(c)))
            .count();
        if non_key_count == 0 {
            return Err(BridgeError::Validation(
                "UpsertRange requires at least one non-key column".to_string(),
            ));
        }

        let mut namer = ParamNamer::new();
        let mut params = Vec::with_capacity(items.len() * columns.len());
        let mut rows = Vec::with_capacity(items.len());

        for (index, item) in items.iter().enumerate() {
            let mut placeholders = Vec::with_capacity(columns.len());
            for column in &columns {
                let name = namer.next(&format!("{}_{}", column, index));
                placeholders.push(format!("@{}", name));
                let value = item.get(column).cloned().unwrap_or(Value::Null);
                params.push(Parameter::new(name, value));
            }
            rows.push(placeholders);
        }

        let sql = self
            .dialect
            .upsert_range(table, &columns, key_columns, &rows);
        Ok(BuiltCommand { sql, params })
    }
}

impl Default for SqlCommandBuilder {
    fn default() -> Self {
        Self::new(Arc::new(SqlServerDialect))
    }
}

fn check_table_name(table: &str) -> Result<()> {
    if table.trim().is_empty() {
        return Err(BridgeError::Validation(
            "Table name cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn check_column_name(column: &str) -> Result<()> {
    if column.is_empty() {
        return Err(BridgeError::Validation(
            "Column names cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn check_map(map: &Record, what: &str, operation: &str) -> Result<()> {
    if map.is_empty() {
        return Err(BridgeError::Validation(format!(
            "{} requires a non-empty {} map",
            operation, what
        )));
    }
    Ok(())
}

fn check_items(items: &[Record], operation: &str) -> Result<()> {
    if items.is_empty() {
        return Err(BridgeError::Validation(format!(
            "{} requires a non-empty item list",
            operation
        )));
    }
    Ok(())
}

fn columns_of_first(items: &[Record]) -> Result<Vec<String>> {
    let first = &items[0];
    if first.is_empty() {
        return Err(BridgeError::Validation(
            "The first item carries no columns".to_string(),
        ));
    }
    let columns: Vec<String> = first.keys().map(|k| k.to_string()).collect();
    for column in &columns {
        check_column_name(column)?;
    }
    Ok(columns)
}
