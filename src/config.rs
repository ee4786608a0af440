//! Configuration for RecordStore
//!
//! Provides a builder pattern for configuring the record store.

use crate::error::Result;
use crate::sql::dialect::Dialect;

/// Default name of the record table
pub const DEFAULT_TABLE_NAME: &str = "records";

/// Default upper bound on pooled connections
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Configuration for the record store
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Database URL; its scheme selects the driver
    pub database_url: String,
    /// Name of the record table (default: "records")
    pub table_name: String,
    /// SQL dialect; inferred from `database_url` when `None`
    pub dialect: Option<Dialect>,
    /// Whether to create the record table on connect (default: true)
    pub automigrate: bool,
    /// Maximum pool size (default: 5)
    pub max_connections: u32,
}

impl StoreConfig {
    /// Create a new configuration builder
    pub fn builder(database_url: impl Into<String>) -> StoreConfigBuilder {
        StoreConfigBuilder::new(database_url)
    }

    /// The configured dialect, or the one implied by the URL scheme
    pub fn resolved_dialect(&self) -> Result<Dialect> {
        match self.dialect {
            Some(dialect) => Ok(dialect),
            None => Dialect::from_database_url(&self.database_url),
        }
    }
}

/// Builder for StoreConfig
#[derive(Debug)]
pub struct StoreConfigBuilder {
    database_url: String,
    table_name: String,
    dialect: Option<Dialect>,
    automigrate: bool,
    max_connections: u32,
}

impl StoreConfigBuilder {
    /// Create a new builder with the database URL
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            table_name: DEFAULT_TABLE_NAME.to_string(),
            dialect: None,
            automigrate: true,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }

    /// Set the record table name (default: "records")
    pub fn table_name(mut self, name: impl Into<String>) -> Self {
        self.table_name = name.into();
        self
    }

    /// Force a dialect instead of inferring it from the URL
    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = Some(dialect);
        self
    }

    /// Enable or disable table creation on connect (default: true)
    pub fn automigrate(mut self, enabled: bool) -> Self {
        self.automigrate = enabled;
        self
    }

    /// Set the maximum pool size (default: 5)
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Build the configuration
    pub fn build(self) -> StoreConfig {
        StoreConfig {
            database_url: self.database_url,
            table_name: self.table_name,
            dialect: self.dialect,
            automigrate: self.automigrate,
            max_connections: self.max_connections,
        }
    }
}
