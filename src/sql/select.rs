//! SELECT statement compilation for record queries
//!
//! Converts a [`RecordQuery`] into dialect-specific SQL with bound parameters.
//! Predicates are AND-joined in a fixed order so that the same query always
//! produces the same text:
//!
//! 1. `id = ?`
//! 2. `id IN (?, ...)`
//! 3. `(payload LIKE ? OR ...)`
//! 4. `payload NOT LIKE ?` (one per exclusion)
//! 5. `type = ?`
//! 6. `soft_deleted_at > ?`
//!
//! A query that includes soft-deleted records short-circuits after validation:
//! it selects every row of the table, and no filter, ordering, pagination or
//! projection applies.

use chrono::{DateTime, Utc};

use crate::clock::format_timestamp;
use crate::error::Result;
use crate::query::RecordQuery;
use crate::record::{COLUMN_ID, COLUMN_PAYLOAD, COLUMN_SOFT_DELETED_AT, COLUMN_TYPE};
use crate::sql::dialect::Dialect;

/// Limit applied when an offset is requested without one
pub const DEFAULT_LIMIT: u64 = 10;

/// A compiled statement ready to execute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    /// SQL text with dialect placeholders
    pub sql: String,
    /// Values for the placeholders, in order
    pub params: Vec<String>,
    /// Explicitly projected columns; empty when all columns are selected
    pub columns: Vec<String>,
}

/// Compiles record queries against one table in one dialect
#[derive(Debug, Clone, Copy)]
pub struct SelectCompiler<'a> {
    dialect: Dialect,
    table: &'a str,
}

impl<'a> SelectCompiler<'a> {
    pub fn new(dialect: Dialect, table: &'a str) -> Self {
        Self { dialect, table }
    }

    /// Compile `query`, hiding records soft-deleted before `now`
    ///
    /// Validation runs first; an invalid query yields only the error.
    pub fn compile(&self, query: &RecordQuery, now: DateTime<Utc>) -> Result<Statement> {
        query.validate()?;

        if query.is_soft_deleted_included() {
            return Ok(self.unfiltered(query.is_count_only()));
        }

        let mut params = Vec::new();
        let mut conditions = Vec::new();

        if let Some(id) = query.id() {
            conditions.push(self.equals(COLUMN_ID, id, &mut params));
        }

        let ids = query.sanitized_id_list();
        if query.id_list().is_some() && !ids.is_empty() {
            let placeholders: Vec<String> = ids
                .iter()
                .map(|id| self.bind(id, &mut params))
                .collect();
            conditions.push(format!(
                "{} IN ({})",
                self.column(COLUMN_ID),
                placeholders.join(", ")
            ));
        }

        if !query.payload_search().is_empty() {
            let alternatives: Vec<String> = query
                .payload_search()
                .iter()
                .map(|needle| self.payload_like(needle, false, &mut params))
                .collect();
            conditions.push(format!("({})", alternatives.join(" OR ")));
        }

        for needle in query.payload_search_not() {
            conditions.push(self.payload_like(needle, true, &mut params));
        }

        if let Some(record_type) = query.record_type() {
            conditions.push(self.equals(COLUMN_TYPE, record_type, &mut params));
        }

        let now = format_timestamp(&now);
        let placeholder = self.bind(&now, &mut params);
        conditions.push(format!(
            "{} > {}",
            self.column(COLUMN_SOFT_DELETED_AT),
            placeholder
        ));

        let mut sql = if query.is_count_only() {
            self.count_from()
        } else {
            format!(
                "SELECT {} FROM {}",
                self.projection(query.columns()),
                self.dialect.quote_identifier(self.table)
            )
        };

        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }

        if !query.is_count_only() {
            if let Some(column) = query.order_by() {
                sql.push_str(&format!(
                    " ORDER BY {} {}",
                    self.column(column),
                    query.sort_order().unwrap_or_default().as_sql()
                ));
            }

            let limit = query
                .limit()
                .or_else(|| query.offset().map(|_| DEFAULT_LIMIT));
            if let Some(limit) = limit {
                sql.push_str(&format!(" LIMIT {}", limit));
            }
            if let Some(offset) = query.offset() {
                sql.push_str(&format!(" OFFSET {}", offset));
            }
        }

        let columns = if query.is_count_only() {
            Vec::new()
        } else {
            query.columns().to_vec()
        };

        Ok(Statement {
            sql,
            params,
            columns,
        })
    }

    /// Every row of the table, regardless of filters or delete state
    fn unfiltered(&self, count_only: bool) -> Statement {
        let sql = if count_only {
            self.count_from()
        } else {
            format!("SELECT * FROM {}", self.dialect.quote_identifier(self.table))
        };
        Statement {
            sql,
            params: Vec::new(),
            columns: Vec::new(),
        }
    }

    fn count_from(&self) -> String {
        format!(
            "SELECT COUNT(*) AS {} FROM {}",
            self.column("count"),
            self.dialect.quote_identifier(self.table)
        )
    }

    fn column(&self, name: &str) -> String {
        self.dialect.quote_identifier(name)
    }

    fn projection(&self, columns: &[String]) -> String {
        if columns.is_empty() {
            return "*".to_string();
        }
        columns
            .iter()
            .map(|c| self.column(c))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Push a parameter and return its placeholder
    fn bind(&self, value: &str, params: &mut Vec<String>) -> String {
        params.push(value.to_string());
        self.dialect.placeholder(params.len())
    }

    fn equals(&self, column: &str, value: &str, params: &mut Vec<String>) -> String {
        let placeholder = self.bind(value, params);
        format!("{} = {}", self.column(column), placeholder)
    }

    fn payload_like(&self, needle: &str, negate: bool, params: &mut Vec<String>) -> String {
        let pattern = format!("%{}%", escape_like(needle));
        let placeholder = self.bind(&pattern, params);
        format!(
            "{} {} {} {}",
            self.column(COLUMN_PAYLOAD),
            if negate { "NOT LIKE" } else { "LIKE" },
            placeholder,
            self.dialect.like_escape_clause()
        )
    }
}

/// Escape LIKE metacharacters so `needle` matches literally
pub fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
