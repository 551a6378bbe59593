//! Runtime type synthesis.
//!
//! Materializes a concrete, usable "type" for a schema only known at
//! runtime: a [`ModelDescriptor`] carrying a fresh identity plus
//! [`DynamicModel`] instances with one typed, null-checked slot per column.
//! Every [`TypeSynthesizer::synthesize`] call mints a new identity, even for
//! structurally identical schemas; callers wanting a stable identity hold on
//! to the returned descriptor.

use std::sync::Arc;

use uuid::Uuid;

use crate::core::{BridgeError, Record, Result, Row, Schema, Value, validate_identifier};

pub struct TypeSynthesizer;

impl TypeSynthesizer {
    /// Validates the schema and emits a descriptor for it. Fails before any
    /// descriptor exists on an empty column set, a duplicate column name, or
    /// a name that is not a valid identifier.
    pub fn synthesize(schema: &Schema) -> Result<Arc<ModelDescriptor>> {
        check_schema(schema)?;

        Ok(Arc::new(ModelDescriptor {
            type_id: Uuid::new_v4(),
            name: to_pascal_case(schema.name()),
            schema: schema.clone(),
        }))
    }
}

/// Identity and shape of one synthesized type.
#[derive(Debug, Clone)]
pub struct ModelDescriptor {
    type_id: Uuid,
    name: String,
    schema: Schema,
}

impl ModelDescriptor {
    /// Unique per `synthesize` call.
    pub fn type_id(&self) -> Uuid {
        self.type_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }
}

/// One instance of a synthesized type: a value slot per column, readable and
/// writable by column name with the column's type and nullability enforced.
#[derive(Debug, Clone)]
pub struct DynamicModel {
    descriptor: Arc<ModelDescriptor>,
    slots: Vec<Value>,
}

impl DynamicModel {
    /// Fresh instance with every slot null.
    pub fn new(descriptor: &Arc<ModelDescriptor>) -> Self {
        let slots = vec![Value::Null; descriptor.schema().column_count()];
        Self {
            descriptor: Arc::clone(descriptor),
            slots,
        }
    }

    /// Instance populated from a row, coercing each slot to its column's
    /// type and enforcing nullability.
    pub fn from_row(descriptor: &Arc<ModelDescriptor>, row: &Row) -> Result<Self> {
        let schema = descriptor.schema();
        if row.len() != schema.column_count() {
            return Err(BridgeError::Validation(format!(
                "Row has {} slots but schema '{}' has {} columns",
                row.len(),
                schema.name(),
                schema.column_count()
            )));
        }

        let mut model = Self::new(descriptor);
        for (index, (column, slot)) in schema.columns().iter().zip(row.iter()).enumerate() {
            let stored = if slot.is_null() {
                Value::Null
            } else {
                slot.coerce(&column.data_type)?
            };
            column.validate(&stored)?;
            model.slots[index] = stored;
        }
        Ok(model)
    }

    /// Populates one instance per row, reporting a per-row outcome.
    pub fn from_rows(descriptor: &Arc<ModelDescriptor>, rows: &[Row]) -> Vec<Result<Self>> {
        rows.iter()
            .map(|row| Self::from_row(descriptor, row))
            .collect()
    }

    pub fn descriptor(&self) -> &Arc<ModelDescriptor> {
        &self.descriptor
    }

    /// Reads a slot by column name. `None` means no such column.
    pub fn get(&self, column: &str) -> Option<&Value> {
        let index = self.descriptor.schema().find_column_index(column)?;
        Some(&self.slots[index])
    }

    /// Writes a slot by column name, coercing the value to the column's
    /// type. Nulls are rejected for non-nullable columns.
    pub fn set(&mut self, column: &str, value: Value) -> Result<()> {
        let schema = self.descriptor.schema();
        let index = schema.find_column_index(column).ok_or_else(|| {
            BridgeError::ColumnNotFound(column.to_string(), schema.name().to_string())
        })?;
        let target = &schema.columns()[index];

        let stored = if value.is_null() {
            Value::Null
        } else {
            value.coerce(&target.data_type)?
        };
        target.validate(&stored)?;
        self.slots[index] = stored;
        Ok(())
    }

    pub fn to_row(&self) -> Row {
        self.slots.clone()
    }

    /// Non-null slots as a record; nulls produce no entry.
    pub fn to_record(&self) -> Record {
        self.descriptor
            .schema()
            .columns()
            .iter()
            .zip(self.slots.iter())
            .filter(|(_, slot)| !slot.is_null())
            .map(|(column, slot)| (column.name.clone(), slot.clone()))
            .collect()
    }
}

/// Rejects schemas no concrete type can be built for: empty column sets,
/// duplicate column names, names that are not valid identifiers.
pub(crate) fn check_schema(schema: &Schema) -> Result<()> {
    validate_identifier(schema.name())
        .map_err(|err| BridgeError::Construction(err.to_string()))?;

    if schema.columns().is_empty() {
        return Err(BridgeError::Construction(format!(
            "Schema '{}' has no columns to synthesize",
            schema.name()
        )));
    }

    for (i, column) in schema.columns().iter().enumerate() {
        validate_identifier(&column.name)
            .map_err(|err| BridgeError::Construction(err.to_string()))?;
        if schema.columns()[..i]
            .iter()
            .any(|prev| prev.name.eq_ignore_ascii_case(&column.name))
        {
            return Err(BridgeError::Construction(format!(
                "Duplicate column name '{}' in schema '{}'",
                column.name,
                schema.name()
            )));
        }
    }

    Ok(())
}

pub(crate) fn to_pascal_case(value: &str) -> String {
    let mut out = String::new();
    for chunk in value.split('_').filter(|part| !part.is_empty()) {
        let mut chars = chunk.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    if out.is_empty() { value.to_string() } else { out }
}
