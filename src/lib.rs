//! # runtara-record-store
//!
//! Typed JSON records stored in a single SQL table.
//!
//! Each record carries a type, a unique id, a JSON payload, a memo, a
//! string→string metas map and lifecycle timestamps. Records are read back
//! through [`RecordQuery`], a builder that compiles to dialect-specific SQL.
//!
//! ## Features
//!
//! - **One Table, Any Shape**: Payloads are free-form JSON; no per-shape migrations
//! - **Declarative Queries**: Filter by type, id or id list, payload substrings, with pagination and ordering
//! - **Soft Delete**: Records are hidden by a far-future `soft_deleted_at` comparison, and can be included on demand
//! - **Multiple Dialects**: PostgreSQL, MySQL and SQLite through the sqlx `Any` driver
//! - **Deterministic Time**: Pluggable clock and id generator
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use runtara_record_store::{Record, RecordQuery, RecordStore, StoreConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = StoreConfig::builder("postgres://localhost/mydb")
//!         .table_name("records")
//!         .build();
//!     let store = RecordStore::new(config).await?;
//!
//!     let mut report = Record::new("analysis_report")
//!         .with_payload(r#"{"status":"done","score":0.93}"#);
//!     store.create(&mut report).await?;
//!
//!     let done = store
//!         .list(
//!             &RecordQuery::new()
//!                 .with_type("analysis_report")
//!                 .add_payload_search("\"status\":\"done\"")
//!                 .with_order_by("created_at")
//!                 .with_limit(20),
//!         )
//!         .await?;
//!
//!     store.soft_delete(&mut report).await?;
//!     let remaining = store.count(&RecordQuery::new().with_type("analysis_report")).await?;
//!
//!     println!("{} done, {} remaining", done.len(), remaining);
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use runtara_record_store::{Dialect, StoreConfig};
//!
//! let config = StoreConfig::builder("postgres://localhost/mydb")
//!     .table_name("records")          // Default record table name
//!     .dialect(Dialect::Postgres)     // Inferred from the URL when omitted
//!     .automigrate(true)              // Create the table on connect (default)
//!     .max_connections(5)             // Pool size (default)
//!     .build();
//! ```

pub mod clock;
pub mod config;
pub mod error;
pub mod id;
pub mod query;
pub mod record;
pub mod sql;
pub mod store;

// Re-export main types for convenience
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{StoreConfig, StoreConfigBuilder};
pub use error::{RecordStoreError, Result};
pub use id::{IdGenerator, UuidV7Generator};
pub use query::{RecordQuery, SortOrder};
pub use record::Record;
pub use sql::dialect::Dialect;
pub use sql::select::{SelectCompiler, Statement};
pub use store::RecordStore;
