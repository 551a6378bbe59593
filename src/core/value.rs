use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::{BridgeError, Result};

#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
    Boolean(bool),
    Timestamp(DateTime<Utc>),
    Date(NaiveDate),
    Uuid(Uuid),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "NULL",
            Self::Integer(_) => "INTEGER",
            Self::Float(_) => "FLOAT",
            Self::Text(_) => "TEXT",
            Self::Boolean(_) => "BOOLEAN",
            Self::Timestamp(_) => "TIMESTAMP",
            Self::Date(_) => "DATE",
            Self::Uuid(_) => "UUID",
        }
    }

    /// Runtime type of this value; `None` for `Null`, which carries no type.
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Self::Null => None,
            Self::Integer(_) => Some(DataType::Integer),
            Self::Float(_) => Some(DataType::Float),
            Self::Text(_) => Some(DataType::Text),
            Self::Boolean(_) => Some(DataType::Boolean),
            Self::Timestamp(_) => Some(DataType::Timestamp),
            Self::Date(_) => Some(DataType::Date),
            Self::Uuid(_) => Some(DataType::Uuid),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Best-effort conversion to `target`, preserving the value's meaning.
    ///
    /// `Null` passes through untouched regardless of target. Lossy numeric
    /// narrowing is rejected: a `Float` becomes an `Integer` only when it has
    /// no fractional part and fits the range.
    pub fn coerce(&self, target: &DataType) -> Result<Value> {
        if self.is_null() {
            return Ok(Value::Null);
        }
        if self.data_type().as_ref() == Some(target) {
            return Ok(self.clone());
        }

        match (self, target) {
            (Value::Integer(i), DataType::Float) => Ok(Value::Float(*i as f64)),
            (Value::Float(f), DataType::Integer) => {
                if f.is_finite()
                    && f.fract() == 0.0
                    && *f >= i64::MIN as f64
                    && *f <= i64::MAX as f64
                {
                    Ok(Value::Integer(*f as i64))
                } else {
                    Err(self.conversion_error(target))
                }
            }

            // Canonical text renderings
            (Value::Integer(i), DataType::Text) => Ok(Value::Text(i.to_string())),
            (Value::Float(f), DataType::Text) => Ok(Value::Text(f.to_string())),
            (Value::Boolean(b), DataType::Text) => Ok(Value::Text(b.to_string())),
            (Value::Timestamp(t), DataType::Text) => Ok(Value::Text(t.to_rfc3339())),
            (Value::Date(d), DataType::Text) => Ok(Value::Text(d.format("%Y-%m-%d").to_string())),
            (Value::Uuid(u), DataType::Text) => Ok(Value::Text(u.to_string())),

            // Parsing from text
            (Value::Text(s), DataType::Integer) => s
                .trim()
                .parse::<i64>()
                .map(Value::Integer)
                .map_err(|_| self.conversion_error(target)),
            (Value::Text(s), DataType::Float) => s
                .trim()
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| self.conversion_error(target)),
            (Value::Text(s), DataType::Boolean) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Ok(Value::Boolean(true)),
                "false" | "0" => Ok(Value::Boolean(false)),
                _ => Err(self.conversion_error(target)),
            },
            (Value::Text(s), DataType::Timestamp) => DateTime::parse_from_rfc3339(s.trim())
                .map(|dt| Value::Timestamp(dt.with_timezone(&Utc)))
                .map_err(|_| self.conversion_error(target)),
            (Value::Text(s), DataType::Date) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                .map(Value::Date)
                .map_err(|_| self.conversion_error(target)),
            (Value::Text(s), DataType::Uuid) => Uuid::parse_str(s.trim())
                .map(Value::Uuid)
                .map_err(|_| self.conversion_error(target)),

            _ => Err(self.conversion_error(target)),
        }
    }

    fn conversion_error(&self, target: &DataType) -> BridgeError {
        BridgeError::Conversion(format!(
            "Cannot convert {} value '{}' to {}",
            self.type_name(),
            self,
            target
        ))
    }

    pub fn try_into_i64(self) -> Result<i64> {
        match self.coerce(&DataType::Integer)? {
            Value::Integer(i) => Ok(i),
            other => Err(other.conversion_error(&DataType::Integer)),
        }
    }

    pub fn try_into_f64(self) -> Result<f64> {
        match self.coerce(&DataType::Float)? {
            Value::Float(f) => Ok(f),
            other => Err(other.conversion_error(&DataType::Float)),
        }
    }

    pub fn try_into_string(self) -> Result<String> {
        match self.coerce(&DataType::Text)? {
            Value::Text(s) => Ok(s),
            other => Err(other.conversion_error(&DataType::Text)),
        }
    }

    pub fn try_into_bool(self) -> Result<bool> {
        match self.coerce(&DataType::Boolean)? {
            Value::Boolean(b) => Ok(b),
            other => Err(other.conversion_error(&DataType::Boolean)),
        }
    }

    pub fn try_into_timestamp(self) -> Result<DateTime<Utc>> {
        match self.coerce(&DataType::Timestamp)? {
            Value::Timestamp(t) => Ok(t),
            other => Err(other.conversion_error(&DataType::Timestamp)),
        }
    }

    pub fn try_into_date(self) -> Result<NaiveDate> {
        match self.coerce(&DataType::Date)? {
            Value::Date(d) => Ok(d),
            other => Err(other.conversion_error(&DataType::Date)),
        }
    }

    pub fn try_into_uuid(self) -> Result<Uuid> {
        match self.coerce(&DataType::Uuid)? {
            Value::Uuid(u) => Ok(u),
            other => Err(other.conversion_error(&DataType::Uuid)),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => {
                if a.is_nan() && b.is_nan() {
                    return true;
                }
                (a - b).abs() < f64::EPSILON
            }
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Timestamp(a), Self::Timestamp(b)) => a == b,
            (Self::Date(a), Self::Date(b)) => a == b,
            (Self::Uuid(a), Self::Uuid(b)) => a == b,
            // Integer and Float compare across types
            (Self::Integer(i), Self::Float(f)) | (Self::Float(f), Self::Integer(i)) => {
                (*i as f64 - f).abs() < f64::EPSILON
            }
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Float(fl) => {
                if fl.is_nan() {
                    write!(f, "NaN")
                } else if fl.is_infinite() {
                    if *fl > 0.0 {
                        write!(f, "Infinity")
                    } else {
                        write!(f, "-Infinity")
                    }
                } else {
                    write!(f, "{}", fl)
                }
            }
            Self::Text(s) => write!(f, "{}", s),
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Timestamp(t) => write!(f, "{}", t.to_rfc3339()),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::Uuid(u) => write!(f, "{}", u),
        }
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Integer(i as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Self::Float(f as f64)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(t: DateTime<Utc>) -> Self {
        Self::Timestamp(t)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Self::Date(d)
    }
}

impl From<Uuid> for Value {
    fn from(u: Uuid) -> Self {
        Self::Uuid(u)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => Self::Null,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Integer,
    Float,
    Text,
    Boolean,
    Timestamp,
    Date,
    Uuid,
}

impl DataType {
    /// Whether a value may be stored in a slot of this type without coercion.
    pub fn is_compatible(&self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Null) => true,
            (Self::Integer, Value::Integer(_)) => true,
            (Self::Float, Value::Float(_)) => true,
            (Self::Float, Value::Integer(_)) => true, // widening is allowed
            (Self::Text, Value::Text(_)) => true,
            (Self::Boolean, Value::Boolean(_)) => true,
            (Self::Timestamp, Value::Timestamp(_)) => true,
            (Self::Date, Value::Date(_)) => true,
            (Self::Uuid, Value::Uuid(_)) => true,
            _ => false,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer => write!(f, "INTEGER"),
            Self::Float => write!(f, "FLOAT"),
            Self::Text => write!(f, "TEXT"),
            Self::Boolean => write!(f, "BOOLEAN"),
            Self::Timestamp => write!(f, "TIMESTAMP"),
            Self::Date => write!(f, "DATE"),
            Self::Uuid => write!(f, "UUID"),
        }
    }
}
