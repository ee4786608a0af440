//! RecordQuery - declarative description of which records to read
//!
//! Every optional filter is an `Option`, so "never set" and "set to an empty
//! value" stay distinguishable. The builder methods consume and return the
//! query:
//!
//! ```rust
//! use runtara_record_store::{RecordQuery, SortOrder};
//!
//! let query = RecordQuery::new()
//!     .with_type("analysis_report")
//!     .with_id_list(["rec_1", "rec_3"])
//!     .add_payload_search("\"status\":\"done\"")
//!     .with_order_by("created_at")
//!     .with_sort_order(SortOrder::Asc)
//!     .with_limit(20);
//!
//! assert!(query.validate().is_ok());
//! ```
//!
//! A query is a plain value with no interior synchronization. Changing one
//! requires owning it, so sharing a query between threads means sharing an
//! immutable value; a caller that wants several threads to edit the same
//! query must wrap it in its own lock.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{RecordStoreError, Result};
use crate::sql::dialect::Dialect;
use crate::sql::sanitize::validate_record_column;
use crate::sql::select::{SelectCompiler, Statement};

/// Sort direction for `ORDER BY`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Filter, pagination and ordering criteria for listing or counting records
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecordQuery {
    id: Option<String>,
    id_list: Option<Vec<String>>,
    #[serde(rename = "type")]
    record_type: Option<String>,
    columns: Vec<String>,
    count_only: bool,
    soft_deleted_included: bool,
    limit: Option<u64>,
    offset: Option<u64>,
    order_by: Option<String>,
    sort_order: Option<SortOrder>,
    payload_search: Vec<String>,
    payload_search_not: Vec<String>,
}

impl RecordQuery {
    /// An empty query: every non-deleted record
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Builder
    // =========================================================================

    /// Match a single id. An empty id clears the filter.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        let id = id.into();
        self.id = if id.is_empty() { None } else { Some(id) };
        self
    }

    /// Match any of the given ids
    ///
    /// Always marks the filter as set, even for an empty list; such a list is
    /// rejected by [`validate`](Self::validate).
    pub fn with_id_list<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.id_list = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_type(mut self, record_type: impl Into<String>) -> Self {
        self.record_type = Some(record_type.into());
        self
    }

    /// Project only these columns; empty selects all of them
    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_count_only(mut self, count_only: bool) -> Self {
        self.count_only = count_only;
        self
    }

    /// Include soft-deleted records
    ///
    /// This is an all-or-nothing override: once validated, the query selects
    /// every row of the table. Id, id-list, type and payload filters,
    /// projection, ordering and pagination are all ignored.
    pub fn with_soft_deleted_included(mut self, included: bool) -> Self {
        self.soft_deleted_included = included;
        self
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_order_by(mut self, column: impl Into<String>) -> Self {
        self.order_by = Some(column.into());
        self
    }

    /// Direction for [`with_order_by`](Self::with_order_by); descending when unset
    pub fn with_sort_order(mut self, order: SortOrder) -> Self {
        self.sort_order = Some(order);
        self
    }

    /// Require the payload to contain `needle`. Several needles are OR-ed.
    pub fn add_payload_search(mut self, needle: impl Into<String>) -> Self {
        self.payload_search.push(needle.into());
        self
    }

    /// Require the payload not to contain `needle`. Several needles are AND-ed.
    pub fn add_payload_search_not(mut self, needle: impl Into<String>) -> Self {
        self.payload_search_not.push(needle.into());
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn id_list(&self) -> Option<&[String]> {
        self.id_list.as_deref()
    }

    /// The id list with blank (whitespace-only) entries removed
    pub fn sanitized_id_list(&self) -> Vec<&str> {
        self.id_list
            .iter()
            .flatten()
            .filter(|id| !id.trim().is_empty())
            .map(String::as_str)
            .collect()
    }

    pub fn record_type(&self) -> Option<&str> {
        self.record_type.as_deref()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn is_count_only(&self) -> bool {
        self.count_only
    }

    pub fn is_soft_deleted_included(&self) -> bool {
        self.soft_deleted_included
    }

    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    pub fn offset(&self) -> Option<u64> {
        self.offset
    }

    pub fn order_by(&self) -> Option<&str> {
        self.order_by.as_deref()
    }

    pub fn sort_order(&self) -> Option<SortOrder> {
        self.sort_order
    }

    pub fn payload_search(&self) -> &[String] {
        &self.payload_search
    }

    pub fn payload_search_not(&self) -> &[String] {
        &self.payload_search_not
    }

    // =========================================================================
    // Validation & Compilation
    // =========================================================================

    /// Check the query for contradictory or empty filters
    ///
    /// Rules are checked in order and the first failure is returned.
    pub fn validate(&self) -> Result<()> {
        if self.id.as_deref() == Some("") {
            return Err(RecordStoreError::validation("id is required"));
        }

        if let Some(ids) = &self.id_list {
            let usable = self.sanitized_id_list().len();
            if usable == 0 {
                return Err(RecordStoreError::validation("id list is required"));
            }
            if usable != ids.len() {
                return Err(RecordStoreError::validation(
                    "id list contains empty strings",
                ));
            }
        }

        if self.record_type.as_deref() == Some("") {
            return Err(RecordStoreError::validation("type is required"));
        }

        if let Some(column) = &self.order_by {
            validate_record_column(column)?;
        }

        for column in &self.columns {
            validate_record_column(column)?;
        }

        Ok(())
    }

    /// Compile into a SELECT (or COUNT) statement for `table`
    ///
    /// `now` is the reference time for hiding soft-deleted records.
    pub fn to_select_statement(
        &self,
        dialect: Dialect,
        table: &str,
        now: DateTime<Utc>,
    ) -> Result<Statement> {
        SelectCompiler::new(dialect, table).compile(self, now)
    }
}
