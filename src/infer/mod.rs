//! Schema inference.
//!
//! Derives a [`Schema`] either structurally from a [`TableModel`] type or by
//! scanning loosely-typed [`Record`]s. The record scan takes the union of
//! keys across all records: each key's column is fixed the first time the
//! key is seen with a non-null value, taking that value's runtime type and
//! keeping first-seen ordinal position.

use crate::core::{
    BridgeError, Column, DataType, Record, Result, Row, Schema, Value, validate_identifier,
};
use crate::model::TableModel;

/// Controls how the record scan treats keys that never carry a non-null
/// value anywhere in the input.
#[derive(Debug, Clone)]
pub struct InferenceOptions {
    /// Keep always-null keys as nullable columns instead of dropping them.
    /// Retained columns are appended after all value-bearing columns, in the
    /// order the keys were first seen.
    pub keep_null_only_keys: bool,
    /// Column type assigned to retained always-null keys.
    pub null_key_type: DataType,
}

impl Default for InferenceOptions {
    fn default() -> Self {
        Self {
            keep_null_only_keys: false,
            null_key_type: DataType::Text,
        }
    }
}

pub struct SchemaInferer;

impl SchemaInferer {
    /// Builds a schema from a model type's declared columns. Purely
    /// structural; no instance is needed.
    pub fn from_model<T: TableModel>() -> Result<Schema> {
        let name = T::table_name();
        validate_identifier(name)?;

        let columns = T::columns();
        if columns.is_empty() {
            return Err(BridgeError::Validation(format!(
                "Model for table '{}' declares no columns",
                name
            )));
        }

        for column in &columns {
            validate_identifier(&column.name)?;
        }
        check_duplicate_names(&columns)?;

        Ok(Schema::new(name, columns))
    }

    /// Builds a schema from the union of keys across `records`. Every
    /// inferred column is nullable; a key missing from some records is the
    /// normal case, not an error.
    pub fn from_records(
        name: &str,
        records: &[Record],
        options: &InferenceOptions,
    ) -> Result<Schema> {
        validate_identifier(name)?;
        if records.is_empty() {
            return Err(BridgeError::Validation(format!(
                "Cannot infer a schema for '{}' from an empty record set",
                name
            )));
        }

        let mut columns: Vec<Column> = Vec::new();
        // keys seen so far only with null values, in first-seen order
        let mut null_only: Vec<String> = Vec::new();

        for record in records {
            for (key, value) in record.iter() {
                if key.is_empty() {
                    return Err(BridgeError::Validation(
                        "Record keys cannot be empty".to_string(),
                    ));
                }
                if columns
                    .iter()
                    .any(|col| col.name.eq_ignore_ascii_case(key))
                {
                    continue;
                }

                match value.data_type() {
                    Some(data_type) => {
                        null_only.retain(|k| !k.eq_ignore_ascii_case(key));
                        columns.push(Column::new(key, data_type));
                    }
                    None => {
                        if !null_only.iter().any(|k| k.eq_ignore_ascii_case(key)) {
                            null_only.push(key.to_string());
                        }
                    }
                }
            }
        }

        if options.keep_null_only_keys {
            for key in null_only {
                columns.push(Column::new(key, options.null_key_type.clone()));
            }
        }

        if columns.is_empty() {
            return Err(BridgeError::Validation(format!(
                "No non-null values found in any record for '{}'",
                name
            )));
        }

        Ok(Schema::new(name, columns))
    }

    /// Infers a schema and projects every record onto it in one pass over
    /// the input. Slots for keys absent from a record (or null in it) hold
    /// `Value::Null`; present values are coerced to the column type.
    pub fn infer_and_fill(
        name: &str,
        records: &[Record],
        options: &InferenceOptions,
    ) -> Result<(Schema, Vec<Row>)> {
        let schema = Self::from_records(name, records, options)?;

        let mut rows = Vec::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            let mut row = Row::with_capacity(schema.column_count());
            for column in schema.columns() {
                let slot = match record.get(&column.name) {
                    Some(value) if !value.is_null() => {
                        value.coerce(&column.data_type).map_err(|err| {
                            BridgeError::Conversion(format!(
                                "Record {} column '{}': {}",
                                index, column.name, err
                            ))
                        })?
                    }
                    _ => Value::Null,
                };
                row.push(slot);
            }
            rows.push(row);
        }

        Ok((schema, rows))
    }
}

fn check_duplicate_names(columns: &[Column]) -> Result<()> {
    for (i, column) in columns.iter().enumerate() {
        if columns[..i]
            .iter()
            .any(|prev| prev.name.eq_ignore_ascii_case(&column.name))
        {
            return Err(BridgeError::Validation(format!(
                "Duplicate column name '{}'",
                column.name
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(entries: &[(&str, Value)]) -> Record {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_union_of_keys_first_seen_order() {
        let records = vec![
            record(&[("id", Value::Integer(1)), ("name", Value::Text("a".into()))]),
            record(&[("id", Value::Integer(2)), ("score", Value::Float(0.5))]),
        ];

        let schema =
            SchemaInferer::from_records("items", &records, &InferenceOptions::default()).unwrap();
        let names: Vec<&str> = schema.columns().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "name", "score"]);
        assert_eq!(schema.get_column("score").unwrap().data_type, DataType::Float);
        assert!(schema.columns().iter().all(|c| c.nullable));
    }

    #[test]
    fn test_type_fixed_at_first_non_null_sighting() {
        let records = vec![
            record(&[("v", Value::Null)]),
            record(&[("v", Value::Integer(7))]),
        ];

        let schema =
            SchemaInferer::from_records("t", &records, &InferenceOptions::default()).unwrap();
        assert_eq!(schema.get_column("v").unwrap().data_type, DataType::Integer);
    }

    #[test]
    fn test_always_null_keys_dropped_by_default() {
        let records = vec![
            record(&[("id", Value::Integer(1)), ("ghost", Value::Null)]),
            record(&[("id", Value::Integer(2)), ("ghost", Value::Null)]),
        ];

        let schema =
            SchemaInferer::from_records("t", &records, &InferenceOptions::default()).unwrap();
        assert!(schema.get_column("ghost").is_none());
    }

    #[test]
    fn test_always_null_keys_retained_on_request() {
        let records = vec![record(&[("id", Value::Integer(1)), ("ghost", Value::Null)])];
        let options = InferenceOptions {
            keep_null_only_keys: true,
            null_key_type: DataType::Text,
        };

        let schema = SchemaInferer::from_records("t", &records, &options).unwrap();
        let ghost = schema.get_column("ghost").unwrap();
        assert_eq!(ghost.data_type, DataType::Text);
        assert!(ghost.nullable);
        // retained keys trail the value-bearing columns
        assert_eq!(schema.find_column_index("ghost"), Some(1));
    }

    #[test]
    fn test_empty_record_set_rejected() {
        let err = SchemaInferer::from_records("t", &[], &InferenceOptions::default());
        assert!(matches!(err, Err(BridgeError::Validation(_))));
    }

    #[test]
    fn test_infer_and_fill_null_marks_absent_keys() {
        let records = vec![
            record(&[("a", Value::Integer(1)), ("b", Value::Text("x".into()))]),
            record(&[("a", Value::Integer(2))]),
        ];

        let (schema, rows) =
            SchemaInferer::infer_and_fill("t", &records, &InferenceOptions::default()).unwrap();
        assert_eq!(schema.column_count(), 2);
        assert_eq!(rows[0], vec![Value::Integer(1), Value::Text("x".into())]);
        assert_eq!(rows[1], vec![Value::Integer(2), Value::Null]);
    }

    #[test]
    fn test_infer_and_fill_coerces_to_column_type() {
        // first sighting fixes Float; later integers widen on fill
        let records = vec![
            record(&[("v", Value::Float(1.5))]),
            record(&[("v", Value::Integer(2))]),
        ];

        let (_, rows) =
            SchemaInferer::infer_and_fill("t", &records, &InferenceOptions::default()).unwrap();
        assert_eq!(rows[1], vec![Value::Float(2.0)]);
    }

    #[test]
    fn test_invalid_table_name_rejected() {
        let records = vec![record(&[("a", Value::Integer(1))])];
        let err = SchemaInferer::from_records("bad name", &records, &InferenceOptions::default());
        assert!(matches!(err, Err(BridgeError::InvalidIdentifier(_))));
    }
}
