//! Row projection.
//!
//! Moves data between schema-aligned [`Row`]s and either typed
//! [`TableModel`] instances or loosely-typed [`Record`]s. The schema, not
//! the source shape, decides what gets copied: model fields without a
//! matching column are dropped, columns without a matching field stay null.
//!
//! Batch projection reports a per-row outcome. A row that fails to convert
//! never discards its siblings.

use crate::core::{BridgeError, Record, Result, Row, Schema, Value};
use crate::model::TableModel;

pub struct RowProjector;

impl RowProjector {
    /// Copies a model into a new row with one slot per schema column.
    /// Columns the model does not expose are filled with `Value::Null`.
    pub fn model_to_row<T: TableModel>(model: &T, schema: &Schema) -> Row {
        schema
            .columns()
            .iter()
            .map(|column| model.get(&column.name).unwrap_or(Value::Null))
            .collect()
    }

    /// Builds a model from a row. Null slots and columns without a matching
    /// field keep the field's default; present values are coerced by the
    /// model's own `set`.
    pub fn row_to_model<T: TableModel + Default>(row: &Row, schema: &Schema) -> Result<T> {
        check_row_width(row, schema)?;

        let model_columns = T::columns();
        let mut model = T::default();
        for (column, slot) in schema.columns().iter().zip(row.iter()) {
            if slot.is_null() {
                continue;
            }
            if !model_columns
                .iter()
                .any(|c| c.name.eq_ignore_ascii_case(&column.name))
            {
                continue;
            }
            model.set(&column.name, slot.clone())?;
        }
        Ok(model)
    }

    /// Converts a batch of rows, one outcome per row. A failed conversion
    /// carries its reason in place; successful rows are unaffected.
    pub fn rows_to_models<T: TableModel + Default>(
        rows: &[Row],
        schema: &Schema,
    ) -> Vec<Result<T>> {
        rows.iter()
            .map(|row| Self::row_to_model(row, schema))
            .collect()
    }

    /// Like [`rows_to_models`](Self::rows_to_models) but fails on the first
    /// unconvertible row.
    pub fn rows_to_models_strict<T: TableModel + Default>(
        rows: &[Row],
        schema: &Schema,
    ) -> Result<Vec<T>> {
        rows.iter()
            .map(|row| Self::row_to_model(row, schema))
            .collect()
    }

    /// Converts a row into exactly one record holding every non-null slot.
    /// Null slots produce no entry.
    pub fn row_to_record(row: &Row, schema: &Schema) -> Result<Record> {
        check_row_width(row, schema)?;

        let mut record = Record::new();
        for (column, slot) in schema.columns().iter().zip(row.iter()) {
            if !slot.is_null() {
                record.insert(column.name.clone(), slot.clone());
            }
        }
        Ok(record)
    }

    /// Converts each row into one record. Output length always equals input
    /// length on success.
    pub fn rows_to_records(rows: &[Row], schema: &Schema) -> Result<Vec<Record>> {
        rows.iter()
            .map(|row| Self::row_to_record(row, schema))
            .collect()
    }

    /// Builds a row from a record, coercing each present value to its
    /// column's type. Absent or null keys become `Value::Null`, which is
    /// rejected for non-nullable columns.
    pub fn record_to_row(record: &Record, schema: &Schema) -> Result<Row> {
        let mut row = Row::with_capacity(schema.column_count());
        for column in schema.columns() {
            let slot = match record.get(&column.name) {
                Some(value) if !value.is_null() => value.coerce(&column.data_type)?,
                _ => Value::Null,
            };
            column.validate(&slot)?;
            row.push(slot);
        }
        Ok(row)
    }
}

fn check_row_width(row: &Row, schema: &Schema) -> Result<()> {
    if row.len() != schema.column_count() {
        return Err(BridgeError::Validation(format!(
            "Row has {} slots but schema '{}' has {} columns",
            row.len(),
            schema.name(),
            schema.column_count()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Column, DataType};

    #[derive(Debug, Default, PartialEq)]
    struct Person {
        id: i64,
        name: String,
        nickname: Option<String>,
    }

    impl TableModel for Person {
        fn table_name() -> &'static str {
            "Person"
        }

        fn columns() -> Vec<Column> {
            vec![
                Column::new("id", DataType::Integer).not_null(),
                Column::new("name", DataType::Text).not_null(),
                Column::new("nickname", DataType::Text),
            ]
        }

        fn get(&self, column: &str) -> Option<Value> {
            if column.eq_ignore_ascii_case("id") {
                Some(Value::from(self.id))
            } else if column.eq_ignore_ascii_case("name") {
                Some(Value::from(self.name.clone()))
            } else if column.eq_ignore_ascii_case("nickname") {
                Some(Value::from(self.nickname.clone()))
            } else {
                None
            }
        }

        fn set(&mut self, column: &str, value: Value) -> Result<()> {
            if column.eq_ignore_ascii_case("id") {
                self.id = value.try_into_i64()?;
            } else if column.eq_ignore_ascii_case("name") {
                self.name = value.try_into_string()?;
            } else if column.eq_ignore_ascii_case("nickname") {
                self.nickname = if value.is_null() {
                    None
                } else {
                    Some(value.try_into_string()?)
                };
            } else {
                return Err(BridgeError::ColumnNotFound(
                    column.to_string(),
                    "Person".to_string(),
                ));
            }
            Ok(())
        }
    }

    fn person_schema() -> Schema {
        Schema::new("Person", Person::columns())
    }

    #[test]
    fn test_model_row_round_trip() {
        let schema = person_schema();
        let person = Person {
            id: 7,
            name: "Ada".into(),
            nickname: None,
        };

        let row = RowProjector::model_to_row(&person, &schema);
        assert_eq!(
            row,
            vec![Value::Integer(7), Value::Text("Ada".into()), Value::Null]
        );

        let back: Person = RowProjector::row_to_model(&row, &schema).unwrap();
        assert_eq!(back, person);
    }

    #[test]
    fn test_schema_governs_what_is_copied() {
        // schema narrower than the model: nickname is dropped
        let schema = Schema::new("Person", vec![Column::new("id", DataType::Integer)]);
        let person = Person {
            id: 1,
            name: "Ada".into(),
            nickname: Some("A".into()),
        };
        assert_eq!(
            RowProjector::model_to_row(&person, &schema),
            vec![Value::Integer(1)]
        );

        // schema wider than the model: unknown column stays null, field untouched
        let schema = Schema::new(
            "Person",
            vec![
                Column::new("id", DataType::Integer),
                Column::new("elsewhere", DataType::Text),
            ],
        );
        let row = vec![Value::Integer(2), Value::Text("ignored".into())];
        let back: Person = RowProjector::row_to_model(&row, &schema).unwrap();
        assert_eq!(back.id, 2);
        assert_eq!(back.name, "");
    }

    #[test]
    fn test_batch_reports_per_row_outcomes() {
        let schema = person_schema();
        let good = vec![Value::Integer(1), Value::Text("a".into()), Value::Null];
        let bad = vec![
            Value::Text("not a number".into()),
            Value::Text("b".into()),
            Value::Null,
        ];

        let outcomes: Vec<Result<Person>> =
            RowProjector::rows_to_models(&[good.clone(), bad.clone()], &schema);
        assert!(outcomes[0].is_ok());
        assert!(outcomes[1].is_err());

        assert!(RowProjector::rows_to_models_strict::<Person>(&[good, bad], &schema).is_err());
    }

    #[test]
    fn test_row_to_record_omits_nulls() {
        let schema = person_schema();
        let row = vec![Value::Integer(3), Value::Text("c".into()), Value::Null];

        let record = RowProjector::row_to_record(&row, &schema).unwrap();
        assert_eq!(record.len(), 2);
        assert!(!record.contains_key("nickname"));
        assert_eq!(record.get("id"), Some(&Value::Integer(3)));
    }

    #[test]
    fn test_rows_to_records_is_one_to_one() {
        let schema = person_schema();
        let rows = vec![
            vec![Value::Integer(1), Value::Text("a".into()), Value::Null],
            vec![Value::Null, Value::Null, Value::Null],
        ];

        let records = RowProjector::rows_to_records(&rows, &schema).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records[1].is_empty());
    }

    #[test]
    fn test_record_to_row_coerces_and_validates() {
        let schema = person_schema();
        let record = Record::new()
            .with("id", Value::Text("42".into()))
            .with("name", Value::Text("d".into()));

        let row = RowProjector::record_to_row(&record, &schema).unwrap();
        assert_eq!(row[0], Value::Integer(42));
        assert_eq!(row[2], Value::Null);

        // name is non-nullable, missing key fails
        let incomplete = Record::new().with("id", Value::Integer(1));
        assert!(RowProjector::record_to_row(&incomplete, &schema).is_err());
    }

    #[test]
    fn test_row_width_mismatch_rejected() {
        let schema = person_schema();
        let short = vec![Value::Integer(1)];
        assert!(matches!(
            RowProjector::row_to_record(&short, &schema),
            Err(BridgeError::Validation(_))
        ));
    }
}
