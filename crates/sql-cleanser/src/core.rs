//! Core data model: rows, row sets, row keys, and conversion direction.
//!
//! Everything here is a plain, serializable value type. The parser builds
//! [`Row`]s once per ingestion pass; all downstream components (diff engine,
//! duplicate detector, converter) operate on read-only views and never mutate
//! their inputs.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CleanseError;

/// Where a row came from. Diagnostic only: never part of row identity,
/// never compared by the diff engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    /// Originating file path.
    pub file: PathBuf,
    /// 1-based line number of the INSERT statement.
    pub line: u64,
}

impl Provenance {
    pub fn new(file: impl Into<PathBuf>, line: u64) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

/// One logical record extracted from an `INSERT` statement.
///
/// Invariant: `columns.len() == values.len()`. The parser enforces this and
/// discards rows that cannot satisfy it; the converter treats a violation as
/// a fatal caller error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    /// Case-preserved table name as written in the source text.
    pub table: String,
    /// Ordered column names.
    pub columns: Vec<String>,
    /// Raw textual value tokens, positionally aligned with `columns`.
    pub values: Vec<String>,
    /// Originating file and line.
    pub provenance: Provenance,
}

impl Row {
    /// Extract the row key for the given primary-key columns.
    ///
    /// Returns `None` when any key column is absent from this row; callers
    /// that want the degenerate empty-key behavior use
    /// [`Row::key_or_empty`].
    pub fn key(&self, key_columns: &[String]) -> Option<RowKey> {
        let mut parts = Vec::with_capacity(key_columns.len());
        for col in key_columns {
            let idx = self.columns.iter().position(|c| c == col)?;
            parts.push(self.values.get(idx)?.clone());
        }
        Some(RowKey(parts))
    }

    /// Extract the row key, collapsing unresolvable columns to the empty key.
    ///
    /// The empty key is valid (if degenerate): rows lacking a resolvable key
    /// are mutually indistinguishable by key.
    pub fn key_or_empty(&self, key_columns: &[String]) -> RowKey {
        self.key(key_columns).unwrap_or_default()
    }
}

/// Tuple of value strings at a row's primary-key column positions.
///
/// Modeled as a newtype so it can serve directly as an index key during
/// diffing and duplicate detection.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RowKey(pub Vec<String>);

impl RowKey {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Stable textual form used for hashing and report output.
    pub fn canonical_string(&self) -> String {
        self.0.join("\u{1f}")
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.0.join(", "))
    }
}

/// Mapping from table name to its rows, insertion order preserved within a
/// table. `BTreeMap` keeps table iteration stable (sorted by name), which the
/// diff determinism contract relies on.
pub type RowSet = BTreeMap<String, Vec<Row>>;

/// Group parsed rows by table, preserving per-table insertion order.
pub fn group_by_table(rows: Vec<Row>) -> RowSet {
    let mut set = RowSet::new();
    for row in rows {
        set.entry(row.table.clone()).or_default().push(row);
    }
    set
}

/// How a table's primary key was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyOrigin {
    /// Supplied by an external [`PrimaryKeyAdvisor`](crate::advisor::PrimaryKeyAdvisor).
    Advised,
    /// Produced by the deterministic fallback chain.
    Fallback,
}

/// A resolved primary key: ordered column names plus where they came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryKey {
    pub columns: Vec<String>,
    pub origin: KeyOrigin,
}

/// Per-table primary keys, sorted by table name.
pub type PrimaryKeyMap = BTreeMap<String, PrimaryKey>;

/// Merge primary keys from both sides of a comparison.
///
/// Target-declared keys win over source-declared keys for the same table
/// (documented last-writer precedence).
pub fn merge_primary_keys(source: PrimaryKeyMap, target: PrimaryKeyMap) -> PrimaryKeyMap {
    let mut merged = source;
    for (table, pk) in target {
        merged.insert(table, pk);
    }
    merged
}

/// Conversion direction between the two supported dialects.
///
/// Every operation that depends on dialect conventions (identifier casing,
/// sequence naming, type tables) takes a `Direction`; there is no ambient
/// default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// PostgreSQL source, Oracle target.
    PgToOracle,
    /// Oracle source, PostgreSQL target.
    OracleToPg,
}

impl Direction {
    /// The opposite direction.
    #[must_use]
    pub fn inverse(self) -> Self {
        match self {
            Direction::PgToOracle => Direction::OracleToPg,
            Direction::OracleToPg => Direction::PgToOracle,
        }
    }

    /// Human-readable source dialect name.
    pub fn source_dialect(self) -> &'static str {
        match self {
            Direction::PgToOracle => "PostgreSQL",
            Direction::OracleToPg => "Oracle",
        }
    }

    /// Human-readable target dialect name.
    pub fn target_dialect(self) -> &'static str {
        match self {
            Direction::PgToOracle => "Oracle",
            Direction::OracleToPg => "PostgreSQL",
        }
    }

    /// Compact token used in filenames and CLI flags.
    pub fn token(self) -> &'static str {
        match self {
            Direction::PgToOracle => "pg2ora",
            Direction::OracleToPg => "ora2pg",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for Direction {
    type Err = CleanseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pg2ora" => Ok(Direction::PgToOracle),
            "ora2pg" => Ok(Direction::OracleToPg),
            other => Err(CleanseError::Direction(other.to_string())),
        }
    }
}
