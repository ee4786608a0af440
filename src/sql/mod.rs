//! SQL utilities for Record Store
//!
//! Provides dialect handling, identifier validation, statement compilation
//! and table DDL.

pub mod ddl;
pub mod dialect;
pub mod sanitize;
pub mod select;

pub use ddl::DdlGenerator;
pub use dialect::Dialect;
pub use sanitize::{RESERVED_WORDS, validate_record_column, validate_table_name};
pub use select::{DEFAULT_LIMIT, SelectCompiler, Statement, escape_like};
