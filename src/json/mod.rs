//! JSON bridging.
//!
//! Converts between `serde_json` documents and loosely-typed [`Record`]s so
//! schema inference and projection can run over data arriving as JSON.
//! Object key order is preserved, which keeps inferred column order stable.

use serde_json::Value as JsonValue;

use crate::core::{BridgeError, Record, Result, Value};

/// Converts a single JSON scalar into a [`Value`].
///
/// Numbers become `Integer` when they fit `i64`, otherwise `Float`. Strings
/// stay `Text`; typed parsing happens later when a value is coerced against
/// a schema column. Arrays and nested objects are rejected.
pub fn value_from_json(json: &JsonValue) -> Result<Value> {
    match json {
        JsonValue::Null => Ok(Value::Null),
        JsonValue::Bool(b) => Ok(Value::Boolean(*b)),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Integer(i))
            } else if let Some(f) = n.as_f64() {
                Ok(Value::Float(f))
            } else {
                Err(BridgeError::Conversion(format!(
                    "Number {} does not fit a 64-bit integer or float",
                    n
                )))
            }
        }
        JsonValue::String(s) => Ok(Value::Text(s.clone())),
        JsonValue::Array(_) => Err(BridgeError::Conversion(
            "Nested arrays are not supported in records".to_string(),
        )),
        JsonValue::Object(_) => Err(BridgeError::Conversion(
            "Nested objects are not supported in records".to_string(),
        )),
    }
}

/// Renders a [`Value`] as JSON. Non-finite floats have no JSON number
/// representation and are rendered as strings.
pub fn value_to_json(value: &Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Integer(i) => JsonValue::from(*i),
        Value::Float(f) => match serde_json::Number::from_f64(*f) {
            Some(n) => JsonValue::Number(n),
            None => JsonValue::String(value.to_string()),
        },
        Value::Text(s) => JsonValue::String(s.clone()),
        Value::Boolean(b) => JsonValue::Bool(*b),
        Value::Timestamp(ts) => JsonValue::String(ts.to_rfc3339()),
        Value::Date(d) => JsonValue::String(d.format("%Y-%m-%d").to_string()),
        Value::Uuid(u) => JsonValue::String(u.to_string()),
    }
}

/// Converts a JSON object into a [`Record`], keeping key order.
pub fn record_from_json(json: &JsonValue) -> Result<Record> {
    let obj = json.as_object().ok_or_else(|| {
        BridgeError::Conversion(format!(
            "Expected a JSON object, got {}",
            json_type_name(json)
        ))
    })?;

    let mut record = Record::new();
    for (key, value) in obj {
        record.insert(key.clone(), value_from_json(value)?);
    }
    Ok(record)
}

/// Converts a JSON document into records. Accepts a single object or an
/// array of objects.
pub fn records_from_json(json: &JsonValue) -> Result<Vec<Record>> {
    match json {
        JsonValue::Object(_) => Ok(vec![record_from_json(json)?]),
        JsonValue::Array(items) => items.iter().map(record_from_json).collect(),
        other => Err(BridgeError::Conversion(format!(
            "Expected a JSON object or array of objects, got {}",
            json_type_name(other)
        ))),
    }
}

/// Renders a [`Record`] as a JSON object in entry order.
pub fn record_to_json(record: &Record) -> JsonValue {
    let mut obj = serde_json::Map::new();
    for (key, value) in record.iter() {
        obj.insert(key.to_string(), value_to_json(value));
    }
    JsonValue::Object(obj)
}

fn json_type_name(json: &JsonValue) -> &'static str {
    match json {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalars_from_json() {
        assert_eq!(value_from_json(&json!(null)).unwrap(), Value::Null);
        assert_eq!(value_from_json(&json!(42)).unwrap(), Value::Integer(42));
        assert_eq!(value_from_json(&json!(1.5)).unwrap(), Value::Float(1.5));
        assert_eq!(value_from_json(&json!(true)).unwrap(), Value::Boolean(true));
        assert_eq!(
            value_from_json(&json!("hi")).unwrap(),
            Value::Text("hi".into())
        );
    }

    #[test]
    fn test_nested_structures_rejected() {
        assert!(value_from_json(&json!([1, 2])).is_err());
        assert!(value_from_json(&json!({"a": 1})).is_err());
    }

    #[test]
    fn test_record_round_trip_keeps_order() {
        let doc = json!({"zeta": 1, "alpha": "x", "mid": null});
        let record = record_from_json(&doc).unwrap();

        let keys: Vec<&str> = record.keys().collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
        assert_eq!(record.get("mid"), Some(&Value::Null));

        assert_eq!(record_to_json(&record), doc);
    }

    #[test]
    fn test_records_from_array_and_object() {
        let single = records_from_json(&json!({"a": 1})).unwrap();
        assert_eq!(single.len(), 1);

        let many = records_from_json(&json!([{"a": 1}, {"a": 2}])).unwrap();
        assert_eq!(many.len(), 2);

        assert!(records_from_json(&json!(42)).is_err());
        assert!(records_from_json(&json!([{"a": 1}, 7])).is_err());
    }

    #[test]
    fn test_non_finite_floats_render_as_strings() {
        assert_eq!(
            value_to_json(&Value::Float(f64::NAN)),
            JsonValue::String("NaN".to_string())
        );
    }
}
