//! Identifier validation for the record table
//!
//! Values never reach SQL text; they are bound. Identifiers cannot be bound,
//! so the table name is checked against a strict pattern and every column a
//! query names must be one of the record table's own columns.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{RecordStoreError, Result};
use crate::record::RECORD_COLUMNS;

/// Keywords reserved by at least one supported dialect
pub const RESERVED_WORDS: &[&str] = &[
    "ALL", "ALTER", "AND", "ANY", "AS", "ASC", "BETWEEN", "BY", "CASE", "CHECK", "COLUMN",
    "CONSTRAINT", "CREATE", "CROSS", "DATABASE", "DEFAULT", "DELETE", "DESC", "DISTINCT", "DROP",
    "ELSE", "END", "EXCEPT", "EXISTS", "FALSE", "FETCH", "FOR", "FOREIGN", "FROM", "FULL",
    "GRANT", "GROUP", "HAVING", "IN", "INDEX", "INNER", "INSERT", "INTERSECT", "INTO", "IS",
    "JOIN", "KEY", "LEFT", "LIKE", "LIMIT", "NOT", "NULL", "OFFSET", "ON", "OR", "ORDER",
    "OUTER", "PRIMARY", "REFERENCES", "REPLACE", "RETURNING", "RIGHT", "SELECT", "SET", "TABLE",
    "THEN", "TO", "TRUE", "UNION", "UNIQUE", "UPDATE", "USER", "USING", "VALUES", "WHEN",
    "WHERE", "WITH",
];

static TABLE_NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9_]*$").expect("table name pattern is valid"));

/// Validate the name of the record table
///
/// Rules:
/// - Must start with a lowercase letter
/// - Can only contain lowercase letters, numbers, and underscores
/// - At most 63 characters (the PostgreSQL identifier limit)
/// - Cannot be a reserved keyword
///
/// # Example
/// ```
/// use runtara_record_store::sql::validate_table_name;
///
/// assert!(validate_table_name("records").is_ok());
/// assert!(validate_table_name("select").is_err());
/// assert!(validate_table_name("Records").is_err());
/// ```
pub fn validate_table_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(RecordStoreError::validation("table name cannot be empty"));
    }

    if name.len() > 63 {
        return Err(RecordStoreError::validation(format!(
            "table name '{}' is longer than 63 characters",
            name
        )));
    }

    if !TABLE_NAME_PATTERN.is_match(name) {
        return Err(RecordStoreError::validation(format!(
            "table name '{}' is invalid. Must start with a lowercase letter and contain only lowercase letters, numbers, and underscores.",
            name
        )));
    }

    if RESERVED_WORDS.contains(&name.to_uppercase().as_str()) {
        return Err(RecordStoreError::validation(format!(
            "table name '{}' is a reserved keyword",
            name
        )));
    }

    Ok(())
}

/// Validate that `name` is a column of the record table
pub fn validate_record_column(name: &str) -> Result<()> {
    if RECORD_COLUMNS.contains(&name) {
        Ok(())
    } else {
        Err(RecordStoreError::validation(format!(
            "unknown column '{}'. Must be one of: {}",
            name,
            RECORD_COLUMNS.join(", ")
        )))
    }
}
