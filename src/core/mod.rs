pub mod error;
pub mod types;
pub mod validate;
pub mod value;

pub use error::{BridgeError, Result};
pub use types::{Column, Record, Row, Schema};
pub use validate::validate_identifier;
pub use value::{DataType, Value};
