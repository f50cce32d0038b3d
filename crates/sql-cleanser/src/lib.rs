//! # sql-cleanser
//!
//! SQL data cleansing and cross-dialect conversion library.
//!
//! This library provides the core functionality for cleansing SQL INSERT
//! dumps and converting them between PostgreSQL and Oracle with support for:
//!
//! - **INSERT parsing** with per-row source provenance
//! - **Dependency ordering** of tables from foreign-key naming conventions
//! - **Key-indexed diffing** of two row sets
//! - **Duplicate detection** with optional advisor-backed fuzzy grouping
//! - **Dialect conversion** of types, values, and whole statements
//! - **Report emission** as markdown and JSON
//!
//! ## Example
//!
//! ```rust,no_run
//! use sql_cleanser::{core::Direction, dialect, parse};
//! use std::path::Path;
//!
//! fn main() -> sql_cleanser::Result<()> {
//!     let text = std::fs::read_to_string("users.sql")?;
//!     let rows = parse::parse_statements(&text, Path::new("users.sql"));
//!     for row in &rows {
//!         println!("{}", dialect::convert_insert(row, Direction::PgToOracle)?);
//!     }
//!     Ok(())
//! }
//! ```

pub mod advisor;
pub mod config;
pub mod core;
pub mod dedup;
pub mod dialect;
pub mod diff;
pub mod error;
pub mod order;
pub mod parse;
pub mod report;

// Re-exports for convenient access
pub use advisor::{AnomalyExplainer, NoAdvisor, PrimaryKeyAdvisor, SimilarityAdvisor};
pub use config::Config;
pub use core::{Direction, PrimaryKey, Provenance, Row, RowKey, RowSet};
pub use dedup::DuplicateReport;
pub use diff::DiffResult;
pub use error::{CleanseError, Result};
pub use order::TableOrder;
pub use report::{MigrationPlan, TableAnalysis};
