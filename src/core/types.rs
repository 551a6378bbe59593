use serde::{Deserialize, Serialize};

use super::{BridgeError, DataType, Result, Value};

/// Ordered value slots aligned 1:1 with a schema's columns.
/// `Value::Null` is the explicit null marker for a slot.
pub type Row = Vec<Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub data_type: DataType,
    pub nullable: bool,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: true,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn validate(&self, value: &Value) -> Result<()> {
        if value.is_null() {
            if !self.nullable {
                return Err(BridgeError::TypeMismatch(format!(
                    "Column '{}' cannot be NULL",
                    self.name
                )));
            }
            return Ok(());
        }

        if !self.data_type.is_compatible(value) {
            return Err(BridgeError::TypeMismatch(format!(
                "Column '{}' expects type {}, got {}",
                self.name,
                self.data_type,
                value.type_name()
            )));
        }

        Ok(())
    }
}

/// Named, ordered column definition set. Immutable once built; column names
/// are unique case-insensitively (inference and synthesis enforce this).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    name: String,
    columns: Vec<Column>,
}

impl Schema {
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn find_column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|col| col.name.eq_ignore_ascii_case(name))
    }

    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.find_column_index(name).map(|idx| &self.columns[idx])
    }
}

/// Insertion-ordered string-keyed value mapping. Keys are unique
/// case-insensitively: re-inserting `ID` after `id` replaces the value and
/// keeps the first spelling and position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    entries: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        let key = key.into();
        for (existing, slot) in &mut self.entries {
            if existing.eq_ignore_ascii_case(&key) {
                return Some(std::mem::replace(slot, value));
            }
        }
        self.entries.push((key, value));
        None
    }

    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let idx = self
            .entries
            .iter()
            .position(|(k, _)| k.eq_ignore_ascii_case(key))?;
        Some(self.entries.remove(idx).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (key, value) in iter {
            record.insert(key, value);
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_validate() {
        let col = Column::new("age", DataType::Integer);
        assert!(col.validate(&Value::Integer(1)).is_ok());
        assert!(col.validate(&Value::Null).is_ok());
        assert!(col.validate(&Value::Text("x".into())).is_err());

        let strict = Column::new("id", DataType::Integer).not_null();
        assert!(strict.validate(&Value::Null).is_err());
    }

    #[test]
    fn test_schema_lookup_is_case_insensitive() {
        let schema = Schema::new(
            "users",
            vec![
                Column::new("Id", DataType::Integer),
                Column::new("Name", DataType::Text),
            ],
        );

        assert_eq!(schema.find_column_index("id"), Some(0));
        assert_eq!(schema.get_column("NAME").unwrap().name, "Name");
        assert!(schema.get_column("missing").is_none());
    }

    #[test]
    fn test_record_replaces_case_insensitively() {
        let mut record = Record::new();
        assert!(record.insert("id", Value::Integer(1)).is_none());
        let replaced = record.insert("ID", Value::Integer(2));

        assert_eq!(replaced, Some(Value::Integer(1)));
        assert_eq!(record.len(), 1);
        // first spelling and position win
        assert_eq!(record.keys().next(), Some("id"));
        assert_eq!(record.get("Id"), Some(&Value::Integer(2)));
    }

    #[test]
    fn test_record_preserves_insertion_order() {
        let record = Record::new()
            .with("b", Value::Integer(1))
            .with("a", Value::Integer(2))
            .with("c", Value::Integer(3));

        let keys: Vec<&str> = record.keys().collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }
}
