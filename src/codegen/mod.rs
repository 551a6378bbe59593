//! Ahead-of-time source generation.
//!
//! The compile-time counterpart to runtime synthesis: consumes a [`Schema`]
//! and produces Rust model source plus CREATE TABLE DDL. Generated structs
//! derive `TableModel`, so the output plugs straight back into inference
//! and projection.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::core::{BridgeError, Column, DataType, Result, Schema};
use crate::sql::Dialect;
use crate::synth::{check_schema, to_pascal_case};

/// Renders the Rust source of one model struct for `schema`. Nullable
/// columns become `Option` fields; a field whose snake_case name differs
/// from its column keeps the original spelling in a `#[column]` attribute.
pub fn generate_source(schema: &Schema) -> Result<String> {
    check_schema(schema)?;

    let struct_name = to_pascal_case(schema.name());
    let mut out = String::new();
    out.push_str("use rowbridge::TableModel;\n\n");
    out.push_str("#[derive(Debug, Clone, Default, TableModel)]\n");
    out.push_str(&format!("#[table(name = \"{}\")]\n", schema.name()));
    out.push_str(&format!("pub struct {} {{\n", struct_name));

    for column in schema.columns() {
        let field = to_snake_case(&column.name);
        if field != column.name {
            out.push_str(&format!("    #[column(name = \"{}\")]\n", column.name));
        }
        out.push_str(&format!("    pub {}: {},\n", field, rust_type(column)));
    }

    out.push_str("}\n");
    Ok(out)
}

/// CREATE TABLE statement for `schema` in the given dialect.
pub fn create_table_sql(schema: &Schema, dialect: &dyn Dialect) -> String {
    let column_defs: Vec<String> = schema
        .columns()
        .iter()
        .map(|column| {
            let null_constraint = if column.nullable { "" } else { " NOT NULL" };
            format!(
                "{} {}{}",
                dialect.quote(&column.name),
                column.data_type,
                null_constraint
            )
        })
        .collect();

    format!(
        "CREATE TABLE {} ({})",
        dialect.quote(schema.name()),
        column_defs.join(", ")
    )
}

/// Generates the model source and writes it under `dir` as
/// `<snake_case_name>.rs`, atomically via a temp file. Returns the path of
/// the written file.
pub fn write_source(schema: &Schema, dir: &Path) -> Result<PathBuf> {
    let source = generate_source(schema)?;
    let path = dir.join(format!("{}.rs", to_snake_case(schema.name())));

    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(source.as_bytes())?;
    temp.persist(&path)
        .map_err(|err| BridgeError::IoError(err.to_string()))?;

    Ok(path)
}

fn rust_type(column: &Column) -> String {
    let base = match column.data_type {
        DataType::Integer => "i64",
        DataType::Float => "f64",
        DataType::Text => "String",
        DataType::Boolean => "bool",
        DataType::Timestamp => "chrono::DateTime<chrono::Utc>",
        DataType::Date => "chrono::NaiveDate",
        DataType::Uuid => "uuid::Uuid",
    };

    if column.nullable {
        format!("Option<{}>", base)
    } else {
        base.to_string()
    }
}

fn to_snake_case(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    let mut out = String::with_capacity(value.len() + 4);
    for (i, &ch) in chars.iter().enumerate() {
        if ch.is_ascii_uppercase() {
            let prev_is_lower = i > 0 && chars[i - 1].is_ascii_lowercase();
            let next_is_lower = chars
                .get(i + 1)
                .map(|c| c.is_ascii_lowercase())
                .unwrap_or(false);
            if i > 0 && (prev_is_lower || next_is_lower) && !out.ends_with('_') {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}
