use lazy_static::lazy_static;
use regex::Regex;

use super::{BridgeError, Result};

const MAX_IDENTIFIER_LENGTH: usize = 64;

lazy_static! {
    static ref IDENTIFIER_PATTERN: Regex =
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
}

/// Checks a table or column name against the identifier rules: starts with a
/// letter or underscore, continues with letters, digits or underscores, and
/// stays within the length limit.
pub fn validate_identifier(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(BridgeError::InvalidIdentifier(
            "Identifier cannot be empty".to_string(),
        ));
    }

    if name.len() > MAX_IDENTIFIER_LENGTH {
        return Err(BridgeError::InvalidIdentifier(format!(
            "Identifier '{}' exceeds maximum length of {} characters",
            name, MAX_IDENTIFIER_LENGTH
        )));
    }

    if !IDENTIFIER_PATTERN.is_match(name) {
        return Err(BridgeError::InvalidIdentifier(format!(
            "Identifier '{}' must start with a letter or underscore and contain only letters, digits and underscores",
            name
        )));
    }

    Ok(())
}
