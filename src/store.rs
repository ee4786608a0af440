//! RecordStore - Main entry point for JSON record storage
//!
//! This module provides the `RecordStore` struct that persists [`Record`]s in
//! a single SQL table and reads them back through compiled [`RecordQuery`]s.

use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};
use sqlx::any::{AnyPoolOptions, AnyRow};
use sqlx::{AnyPool, Row};

use crate::clock::{Clock, SystemClock, format_timestamp, parse_timestamp, soft_delete_sentinel};
use crate::config::StoreConfig;
use crate::error::{RecordStoreError, Result};
use crate::id::{IdGenerator, UuidV7Generator};
use crate::query::RecordQuery;
use crate::record::{
    COLUMN_CREATED_AT, COLUMN_ID, COLUMN_MEMO, COLUMN_METAS, COLUMN_PAYLOAD,
    COLUMN_SOFT_DELETED_AT, COLUMN_TYPE, COLUMN_UPDATED_AT, RECORD_COLUMNS, Record,
};
use crate::sql::ddl::DdlGenerator;
use crate::sql::dialect::Dialect;
use crate::sql::sanitize::validate_table_name;
use crate::sql::select::{SelectCompiler, Statement};

/// JSON record store over one SQL table
///
/// Every operation is a single self-contained round trip; the store keeps no
/// cache and takes no locks. It is `Send + Sync` and can be shared behind an
/// `Arc`.
pub struct RecordStore {
    /// Database connection pool
    pool: AnyPool,
    /// Store configuration
    config: StoreConfig,
    /// Dialect used for every generated statement
    dialect: Dialect,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
}

impl RecordStore {
    /// Create a new RecordStore from configuration
    ///
    /// This will:
    /// 1. Resolve the dialect and validate the table name
    /// 2. Connect to the database
    /// 3. Create the record table if `automigrate` is enabled
    pub async fn new(config: StoreConfig) -> Result<Self> {
        sqlx::any::install_default_drivers();

        config.resolved_dialect()?;
        validate_table_name(&config.table_name)?;

        let pool = AnyPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.database_url)
            .await
            .map_err(|e| {
                RecordStoreError::Connection(format!("Database connection failed: {}", e))
            })?;

        Self::from_pool(pool, config).await
    }

    /// Create a new RecordStore from an existing pool
    ///
    /// Use this when you already have a connection pool and want to
    /// share it with the record store.
    pub async fn from_pool(pool: AnyPool, config: StoreConfig) -> Result<Self> {
        let dialect = config.resolved_dialect()?;
        validate_table_name(&config.table_name)?;

        let store = Self {
            pool,
            config,
            dialect,
            clock: Arc::new(SystemClock),
            ids: Arc::new(UuidV7Generator),
        };

        if store.config.automigrate {
            store.migrate().await?;
        }

        Ok(store)
    }

    /// Replace the time source
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the id generator used for records created without an id
    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    /// Get a reference to the configuration
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn table_name(&self) -> &str {
        &self.config.table_name
    }

    /// Create the record table and its indexes if they don't exist
    pub async fn migrate(&self) -> Result<()> {
        let ddl = DdlGenerator::new(self.dialect, self.table_name());
        for statement in ddl.generate_migration() {
            tracing::debug!("Migrating: {}", statement);
            sqlx::query(&statement).execute(&self.pool).await?;
        }
        tracing::info!(
            "Record table '{}' ready ({})",
            self.table_name(),
            self.dialect
        );
        Ok(())
    }

    // =========================================================================
    // Write Operations
    // =========================================================================

    /// Insert a new record
    ///
    /// Assigns an id when the record has none and stamps both `created_at`
    /// and `updated_at` with the current time.
    pub async fn create(&self, record: &mut Record) -> Result<()> {
        if record.record_type().is_empty() {
            return Err(RecordStoreError::validation("type is required"));
        }

        if record.id().is_empty() {
            record.set_id(self.ids.generate());
        }

        let now = self.now();
        record.set_created_at(now);
        record.set_updated_at(now);

        let columns: Vec<String> = RECORD_COLUMNS.iter().map(|c| self.column(c)).collect();
        let placeholders: Vec<String> = (1..=RECORD_COLUMNS.len())
            .map(|i| self.dialect.placeholder(i))
            .collect();

        let insert_sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.table(),
            columns.join(", "),
            placeholders.join(", ")
        );

        tracing::debug!("Creating record {} of type {}", record.id(), record.record_type());

        sqlx::query(&insert_sql)
            .bind(record.id().to_string())
            .bind(record.record_type().to_string())
            .bind(record.payload().to_string())
            .bind(record.memo().to_string())
            .bind(record.metas_raw().to_string())
            .bind(format_timestamp(&record.created_at()))
            .bind(format_timestamp(&record.updated_at()))
            .bind(format_timestamp(&record.soft_deleted_at()))
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Persist payload, memo, metas and soft-delete time of an existing record
    ///
    /// `updated_at` is always refreshed. The type and `created_at` are never
    /// rewritten.
    pub async fn update(&self, record: &mut Record) -> Result<()> {
        if record.id().is_empty() {
            return Err(RecordStoreError::validation("id is required"));
        }

        let now = self.now();

        let assignments = [
            COLUMN_PAYLOAD,
            COLUMN_MEMO,
            COLUMN_METAS,
            COLUMN_UPDATED_AT,
            COLUMN_SOFT_DELETED_AT,
        ]
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{} = {}", self.column(c), self.dialect.placeholder(i + 1)))
        .collect::<Vec<_>>();

        let update_sql = format!(
            "UPDATE {} SET {} WHERE {} = {}",
            self.table(),
            assignments.join(", "),
            self.column(COLUMN_ID),
            self.dialect.placeholder(assignments.len() + 1)
        );

        let result = sqlx::query(&update_sql)
            .bind(record.payload().to_string())
            .bind(record.memo().to_string())
            .bind(record.metas_raw().to_string())
            .bind(format_timestamp(&now))
            .bind(format_timestamp(&record.soft_deleted_at()))
            .bind(record.id().to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            tracing::warn!("Update skipped, record {} does not exist", record.id());
            return Err(RecordStoreError::not_found(record.id()));
        }

        record.set_updated_at(now);
        Ok(())
    }

    /// Soft-delete a record, stamping its `soft_deleted_at` with now
    pub async fn soft_delete(&self, record: &mut Record) -> Result<()> {
        let now = self.mark_soft_deleted(record.id()).await?;
        record.set_soft_deleted_at(now);
        Ok(())
    }

    /// Soft-delete the record with the given id
    pub async fn soft_delete_by_id(&self, id: &str) -> Result<()> {
        self.mark_soft_deleted(id).await.map(|_| ())
    }

    /// Remove a record's row
    pub async fn delete(&self, record: &Record) -> Result<()> {
        self.delete_by_id(record.id()).await
    }

    /// Remove the row with the given id
    pub async fn delete_by_id(&self, id: &str) -> Result<()> {
        if id.is_empty() {
            return Err(RecordStoreError::validation("id is required"));
        }

        let delete_sql = format!(
            "DELETE FROM {} WHERE {} = {}",
            self.table(),
            self.column(COLUMN_ID),
            self.dialect.placeholder(1)
        );

        let result = sqlx::query(&delete_sql)
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            tracing::warn!("Delete skipped, record {} does not exist", id);
            return Err(RecordStoreError::not_found(id));
        }

        Ok(())
    }

    // =========================================================================
    // Read Operations
    // =========================================================================

    /// Find a non-deleted record by id
    pub async fn find_by_id(&self, id: &str) -> Result<Option<Record>> {
        if id.is_empty() {
            return Err(RecordStoreError::validation("id is required"));
        }

        let query = RecordQuery::new().with_id(id).with_limit(1);
        Ok(self.list(&query).await?.into_iter().next())
    }

    /// List records matching `query`
    ///
    /// Records from a query with projected columns carry defaults in the
    /// fields that were not selected.
    pub async fn list(&self, query: &RecordQuery) -> Result<Vec<Record>> {
        let statement = self.compile(query)?;

        let mut select = sqlx::query(&statement.sql);
        for param in &statement.params {
            select = select.bind(param.clone());
        }

        let rows = select.fetch_all(&self.pool).await?;

        rows.iter().map(row_to_record).collect()
    }

    /// Count records matching `query`, ignoring pagination and projection
    pub async fn count(&self, query: &RecordQuery) -> Result<i64> {
        let statement = self.compile(&query.clone().with_count_only(true))?;

        let mut count = sqlx::query_scalar::<_, i64>(&statement.sql);
        for param in &statement.params {
            count = count.bind(param.clone());
        }

        Ok(count.fetch_one(&self.pool).await?)
    }

    // =========================================================================
    // Internal Helpers
    // =========================================================================

    fn compile(&self, query: &RecordQuery) -> Result<Statement> {
        let statement =
            SelectCompiler::new(self.dialect, self.table_name()).compile(query, self.now())?;
        tracing::debug!(
            "Executing: {} ({} params)",
            statement.sql,
            statement.params.len()
        );
        Ok(statement)
    }

    async fn mark_soft_deleted(&self, id: &str) -> Result<DateTime<Utc>> {
        if id.is_empty() {
            return Err(RecordStoreError::validation("id is required"));
        }

        let now = self.now();

        let update_sql = format!(
            "UPDATE {} SET {} = {} WHERE {} = {}",
            self.table(),
            self.column(COLUMN_SOFT_DELETED_AT),
            self.dialect.placeholder(1),
            self.column(COLUMN_ID),
            self.dialect.placeholder(2)
        );

        let result = sqlx::query(&update_sql)
            .bind(format_timestamp(&now))
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            tracing::warn!("Soft delete skipped, record {} does not exist", id);
            return Err(RecordStoreError::not_found(id));
        }

        Ok(now)
    }

    /// Current time at the precision timestamps are stored with
    fn now(&self) -> DateTime<Utc> {
        self.clock.now().trunc_subsecs(6)
    }

    fn table(&self) -> String {
        self.dialect.quote_identifier(self.table_name())
    }

    fn column(&self, name: &str) -> String {
        self.dialect.quote_identifier(name)
    }
}

/// Map a row to a record; columns missing from a projection keep defaults
fn row_to_record(row: &AnyRow) -> Result<Record> {
    let text = |column: &str| -> Option<String> {
        row.try_get::<Option<String>, _>(column).ok().flatten()
    };
    let timestamp = |column: &str| -> Result<Option<DateTime<Utc>>> {
        text(column).map(|value| parse_timestamp(&value)).transpose()
    };

    let mut record = Record::new(text(COLUMN_TYPE).unwrap_or_default())
        .with_id(text(COLUMN_ID).unwrap_or_default())
        .with_payload(text(COLUMN_PAYLOAD).unwrap_or_default())
        .with_memo(text(COLUMN_MEMO).unwrap_or_default());
    record.set_metas_raw(text(COLUMN_METAS).unwrap_or_default());

    record.set_created_at(timestamp(COLUMN_CREATED_AT)?.unwrap_or_default());
    record.set_updated_at(timestamp(COLUMN_UPDATED_AT)?.unwrap_or_default());
    record.set_soft_deleted_at(
        timestamp(COLUMN_SOFT_DELETED_AT)?.unwrap_or_else(soft_delete_sentinel),
    );

    Ok(record)
}
