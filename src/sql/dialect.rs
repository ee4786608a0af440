//! SQL dialects supported by the statement compiler
//!
//! A dialect decides how identifiers are quoted, how bind parameters are
//! written and how LIKE escapes are spelled. Everything else in the generated
//! SQL is shared.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RecordStoreError;

/// Target SQL syntax
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Postgres,
    MySql,
    Sqlite,
}

impl Dialect {
    /// Canonical lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Postgres => "postgres",
            Dialect::MySql => "mysql",
            Dialect::Sqlite => "sqlite",
        }
    }

    /// Infer the dialect from a database URL scheme
    ///
    /// # Example
    /// ```
    /// use runtara_record_store::Dialect;
    ///
    /// assert_eq!(Dialect::from_database_url("postgres://localhost/db").unwrap(), Dialect::Postgres);
    /// assert_eq!(Dialect::from_database_url("sqlite::memory:").unwrap(), Dialect::Sqlite);
    /// assert!(Dialect::from_database_url("oracle://host").is_err());
    /// ```
    pub fn from_database_url(url: &str) -> Result<Self, RecordStoreError> {
        let scheme = url.split(':').next().unwrap_or_default();
        scheme.parse()
    }

    /// Quote an identifier, escaping the quote character by doubling it
    pub fn quote_identifier(&self, identifier: &str) -> String {
        match self {
            Dialect::MySql => format!("`{}`", identifier.replace('`', "``")),
            Dialect::Postgres | Dialect::Sqlite => {
                format!("\"{}\"", identifier.replace('"', "\"\""))
            }
        }
    }

    /// Bind parameter placeholder for the 1-based parameter `index`
    pub fn placeholder(&self, index: usize) -> String {
        match self {
            Dialect::Postgres => format!("${}", index),
            Dialect::MySql | Dialect::Sqlite => "?".to_string(),
        }
    }

    /// `ESCAPE` clause declaring backslash as the LIKE escape character
    pub fn like_escape_clause(&self) -> &'static str {
        match self {
            // MySQL treats backslash as an escape inside string literals too
            Dialect::MySql => "ESCAPE '\\\\'",
            Dialect::Postgres | Dialect::Sqlite => "ESCAPE '\\'",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = RecordStoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" | "pgsql" | "pg" => Ok(Dialect::Postgres),
            "mysql" | "mariadb" => Ok(Dialect::MySql),
            "sqlite" | "sqlite3" => Ok(Dialect::Sqlite),
            other => Err(RecordStoreError::unsupported_dialect(other)),
        }
    }
}
