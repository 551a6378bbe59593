//! Store dialect strategies.
//!
//! Everything vendor-specific lives behind the [`Dialect`] trait: the
//! identifier delimiter pair and the shape of the conditional merge
//! statement. The rest of the SQL builder is dialect-agnostic.

/// One column paired with the placeholder carrying its value.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundColumn {
    pub column: String,
    pub placeholder: String,
}

impl BoundColumn {
    pub fn new(column: impl Into<String>, placeholder: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            placeholder: placeholder.into(),
        }
    }
}

/// Strategy for one target store.
///
/// The provided [`quote`](Dialect::quote) is the single place identifiers
/// are delimited and escaped; no other code assembles quoted names.
pub trait Dialect: Send + Sync {
    fn name(&self) -> &'static str;

    /// Opening and closing delimiter for quoted identifiers.
    fn delimiters(&self) -> (char, char);

    /// Wraps an identifier in the delimiter pair, doubling any embedded
    /// closing delimiter. An already-delimited identifier passes through
    /// unchanged, which makes quoting idempotent.
    fn quote(&self, ident: &str) -> String {
        let (open, close) = self.delimiters();
        if ident.len() >= 2 && ident.starts_with(open) && ident.ends_with(close) {
            return ident.to_string();
        }

        let mut quoted = String::with_capacity(ident.len() + 2);
        quoted.push(open);
        for ch in ident.chars() {
            quoted.push(ch);
            if ch == close {
                quoted.push(close);
            }
        }
        quoted.push(close);
        quoted
    }

    /// Conditional merge for one row: match on `keys`, update `values` when
    /// matched, insert keys and values otherwise. The builder guarantees
    /// both lists are non-empty.
    fn upsert(&self, table: &str, keys: &[BoundColumn], values: &[BoundColumn]) -> String;

    /// Conditional merge over a batch. `rows` holds one placeholder list
    /// per input row, aligned with `columns`; `key_columns` is a non-empty
    /// subset of `columns`.
    fn upsert_range(
        &self,
        table: &str,
        columns: &[String],
        key_columns: &[String],
        rows: &[Vec<String>],
    ) -> String;
}

/// T-SQL: bracket-delimited identifiers and MERGE statements.
#[derive(Debug, Clone, Default)]
pub struct SqlServerDialect;

impl Dialect for SqlServerDialect {
    fn name(&self) -> &'static str {
        "sqlserver"
    }

    fn delimiters(&self) -> (char, char) {
        ('[', ']')
    }

    fn upsert(&self, table: &str, keys: &[BoundColumn], values: &[BoundColumn]) -> String {
        let source_projection: Vec<String> = keys
            .iter()
            .map(|key| format!("{} AS {}", key.placeholder, self.quote(&key.column)))
            .collect();
        let join_condition: Vec<String> = keys
            .iter()
            .map(|key| {
                let quoted = self.quote(&key.column);
                format!("target.{} = source.{}", quoted, quoted)
            })
            .collect();
        let update_set: Vec<String> = values
            .iter()
            .map(|value| format!("{} = {}", self.quote(&value.column), value.placeholder))
            .collect();
        let insert_columns: Vec<String> = keys
            .iter()
            .chain(values.iter())
            .map(|bound| self.quote(&bound.column))
            .collect();
        let insert_values: Vec<String> = keys
            .iter()
            .chain(values.iter())
            .map(|bound| bound.placeholder.clone())
            .collect();

        format!(
            "MERGE INTO {} AS target USING (SELECT {}) AS source ON {} \
             WHEN MATCHED THEN UPDATE SET {} \
             WHEN NOT MATCHED THEN INSERT ({}) VALUES ({});",
            self.quote(table),
            source_projection.join(", "),
            join_condition.join(" AND "),
            update_set.join(", "),
            insert_columns.join(", "),
            insert_values.join(", ")
        )
    }

    fn upsert_range(
        &self,
        table: &str,
        columns: &[String],
        key_columns: &[String],
        rows: &[Vec<String>],
    ) -> String {
        // first SELECT aliases the columns, the rest ride on position
        let mut selects = Vec::with_capacity(rows.len());
        if let Some(first) = rows.first() {
            let aliased: Vec<String> = first
                .iter()
                .zip(columns.iter())
                .map(|(placeholder, column)| {
                    format!("{} AS {}", placeholder, self.quote(column))
                })
                .collect();
            selects.push(format!("SELECT {}", aliased.join(", ")));
        }
        for row in rows.iter().skip(1) {
            selects.push(format!("SELECT {}", row.join(", ")));
        }

        let join_condition: Vec<String> = key_columns
            .iter()
            .map(|key| {
                let quoted = self.quote(key);
                format!("target.{} = source.{}", quoted, quoted)
            })
            .collect();
        let update_set: Vec<String> = columns
            .iter()
            .filter(|column| !is_key_column(column, key_columns))
            .map(|column| {
                let quoted = self.quote(column);
                format!("{} = source.{}", quoted, quoted)
            })
            .collect();
        let insert_columns: Vec<String> = columns.iter().map(|c| self.quote(c)).collect();
        let insert_values: Vec<String> = columns
            .iter()
            .map(|column| format!("source.{}", self.quote(column)))
            .collect();

        format!(
            "MERGE INTO {} AS target USING ({}) AS source ON {} \
             WHEN MATCHED THEN UPDATE SET {} \
             WHEN NOT MATCHED THEN INSERT ({}) VALUES ({});",
            self.quote(table),
            selects.join(" UNION ALL "),
            join_condition.join(" AND "),
            update_set.join(", "),
            insert_columns.join(", "),
            insert_values.join(", ")
        )
    }
}

/// PostgreSQL: double-quoted identifiers and INSERT .. ON CONFLICT.
#[derive(Debug, Clone, Default)]
pub struct PostgresDialect;

impl Dialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn delimiters(&self) -> (char, char) {
        ('"', '"')
    }

    fn upsert(&self, table: &str, keys: &[BoundColumn], values: &[BoundColumn]) -> String {
        let insert_columns: Vec<String> = keys
            .iter()
            .chain(values.iter())
            .map(|bound| self.quote(&bound.column))
            .collect();
        let insert_values: Vec<String> = keys
            .iter()
            .chain(values.iter())
            .map(|bound| bound.placeholder.clone())
            .collect();
        let conflict_columns: Vec<String> = keys.iter().map(|k| self.quote(&k.column)).collect();
        let update_set: Vec<String> = values
            .iter()
            .map(|value| {
                let quoted = self.quote(&value.column);
                format!("{} = EXCLUDED.{}", quoted, quoted)
            })
            .collect();

        format!(
            "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT ({}) DO UPDATE SET {}",
            self.quote(table),
            insert_columns.join(", "),
            insert_values.join(", "),
            conflict_columns.join(", "),
            update_set.join(", ")
        )
    }

    fn upsert_range(
        &self,
        table: &str,
        columns: &[String],
        key_columns: &[String],
        rows: &[Vec<String>],
    ) -> String {
        let insert_columns: Vec<String> = columns.iter().map(|c| self.quote(c)).collect();
        let value_groups: Vec<String> = rows
            .iter()
            .map(|row| format!("({})", row.join(", ")))
            .collect();
        let conflict_columns: Vec<String> = key_columns.iter().map(|k| self.quote(k)).collect();
        let update_set: Vec<String> = columns
            .iter()
            .filter(|column| !is_key_column(column, key_columns))
            .map(|column| {
                let quoted = self.quote(column);
                format!("{} = EXCLUDED.{}", quoted, quoted)
            })
            .collect();

        format!(
            "INSERT INTO {} ({}) VALUES {} ON CONFLICT ({}) DO UPDATE SET {}",
            self.quote(table),
            insert_columns.join(", "),
            value_groups.join(", "),
            conflict_columns.join(", "),
            update_set.join(", ")
        )
    }
}

fn is_key_column(column: &str, key_columns: &[String]) -> bool {
    key_columns
        .iter()
        .any(|key| key.eq_ignore_ascii_case(column))
}
