//! DDL generation for the record table
//!
//! All columns are text. Timestamps use the fixed-width text format from
//! [`crate::clock`], which keeps one table layout valid on every dialect.

use crate::record::{
    COLUMN_CREATED_AT, COLUMN_ID, COLUMN_MEMO, COLUMN_METAS, COLUMN_PAYLOAD,
    COLUMN_SOFT_DELETED_AT, COLUMN_TYPE, COLUMN_UPDATED_AT,
};
use crate::sql::dialect::Dialect;

/// Columns that get a secondary index
const INDEXED_COLUMNS: &[&str] = &[COLUMN_TYPE, COLUMN_SOFT_DELETED_AT];

/// DDL generator for one record table
pub struct DdlGenerator<'a> {
    dialect: Dialect,
    table: &'a str,
}

impl<'a> DdlGenerator<'a> {
    pub fn new(dialect: Dialect, table: &'a str) -> Self {
        Self { dialect, table }
    }

    /// Statements that create the table and its indexes when missing
    ///
    /// MySQL has no `CREATE INDEX IF NOT EXISTS`, so there the indexes are
    /// declared inside the table definition.
    pub fn generate_migration(&self) -> Vec<String> {
        let mut statements = vec![self.generate_create_table()];
        if self.dialect != Dialect::MySql {
            statements.extend(INDEXED_COLUMNS.iter().map(|c| self.generate_create_index(c)));
        }
        statements
    }

    /// Generate `CREATE TABLE IF NOT EXISTS` for the record table
    pub fn generate_create_table(&self) -> String {
        let (key, short, text) = self.column_types();

        let mut column_defs = vec![
            format!("{} {} PRIMARY KEY", self.quote(COLUMN_ID), key),
            format!("{} {} NOT NULL", self.quote(COLUMN_TYPE), short),
            format!("{} {} NOT NULL", self.quote(COLUMN_PAYLOAD), text),
            format!("{} {} NOT NULL", self.quote(COLUMN_MEMO), text),
            format!("{} {} NOT NULL", self.quote(COLUMN_METAS), text),
            format!("{} {} NOT NULL", self.quote(COLUMN_CREATED_AT), short),
            format!("{} {} NOT NULL", self.quote(COLUMN_UPDATED_AT), short),
            format!("{} {} NOT NULL", self.quote(COLUMN_SOFT_DELETED_AT), short),
        ];

        if self.dialect == Dialect::MySql {
            column_defs.extend(INDEXED_COLUMNS.iter().map(|c| {
                format!("INDEX {} ({})", self.quote(&self.index_name(c)), self.quote(c))
            }));
        }

        format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            self.quote(self.table),
            column_defs.join(", ")
        )
    }

    /// Generate `CREATE INDEX IF NOT EXISTS` on one column
    pub fn generate_create_index(&self, column: &str) -> String {
        format!(
            "CREATE INDEX IF NOT EXISTS {} ON {} ({})",
            self.quote(&self.index_name(column)),
            self.quote(self.table),
            self.quote(column)
        )
    }

    fn index_name(&self, column: &str) -> String {
        format!("idx_{}_{}", self.table, column)
    }

    fn quote(&self, identifier: &str) -> String {
        self.dialect.quote_identifier(identifier)
    }

    /// (primary key, short text, long text) column types
    fn column_types(&self) -> (&'static str, &'static str, &'static str) {
        match self.dialect {
            Dialect::Postgres => ("VARCHAR(64)", "VARCHAR(100)", "TEXT"),
            Dialect::MySql => ("VARCHAR(64)", "VARCHAR(100)", "LONGTEXT"),
            Dialect::Sqlite => ("TEXT", "TEXT", "TEXT"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // CREATE TABLE Tests
    // =========================================================================

    #[test]
    fn test_generate_create_table_postgres() {
        let sql = DdlGenerator::new(Dialect::Postgres, "records").generate_create_table();

        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS \"records\" ("));
        assert!(sql.contains("\"id\" VARCHAR(64) PRIMARY KEY"));
        assert!(sql.contains("\"type\" VARCHAR(100) NOT NULL"));
        assert!(sql.contains("\"payload\" TEXT NOT NULL"));
        assert!(sql.contains("\"soft_deleted_at\" VARCHAR(100) NOT NULL"));
        assert!(!sql.contains("INDEX"));
    }

    #[test]
    fn test_generate_create_table_mysql_inlines_indexes() {
        let sql = DdlGenerator::new(Dialect::MySql, "records").generate_create_table();

        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS `records` ("));
        assert!(sql.contains("`payload` LONGTEXT NOT NULL"));
        assert!(sql.contains("INDEX `idx_records_type` (`type`)"));
        assert!(sql.contains("INDEX `idx_records_soft_deleted_at` (`soft_deleted_at`)"));
    }

    #[test]
    fn test_generate_create_table_has_every_record_column() {
        let sql = DdlGenerator::new(Dialect::Sqlite, "records").generate_create_table();
        for column in crate::record::RECORD_COLUMNS {
            assert!(sql.contains(&format!("\"{}\" ", column)), "missing {}", column);
        }
    }

    // =========================================================================
    // Migration Tests
    // =========================================================================

    #[test]
    fn test_generate_migration_sqlite() {
        let statements = DdlGenerator::new(Dialect::Sqlite, "records").generate_migration();

        assert_eq!(statements.len(), 3);
        assert_eq!(
            statements[1],
            "CREATE INDEX IF NOT EXISTS \"idx_records_type\" ON \"records\" (\"type\")"
        );
        assert_eq!(
            statements[2],
            "CREATE INDEX IF NOT EXISTS \"idx_records_soft_deleted_at\" ON \"records\" (\"soft_deleted_at\")"
        );
    }

    #[test]
    fn test_generate_migration_mysql_is_single_statement() {
        let statements = DdlGenerator::new(Dialect::MySql, "records").generate_migration();
        assert_eq!(statements.len(), 1);
    }
}
