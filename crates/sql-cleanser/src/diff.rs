//! Key-indexed structural diffing of two row sets.
//!
//! For each table, rows on both sides are indexed by their [`RowKey`]; set
//! algebra over the key sets yields missing/extra rows, and the intersection
//! yields candidate mismatches compared positionally over raw `values`. No
//! type coercion happens here: `'1'` and `'1.0'` are different values.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{Direction, PrimaryKeyMap, Row, RowKey, RowSet};

/// Rows present under the same key on both sides but with different values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mismatch {
    /// The shared row key.
    pub key: RowKey,
    /// Values on the source side.
    pub source_values: Vec<String>,
    /// Values on the target side.
    pub target_values: Vec<String>,
}

/// Diff of a single table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDiff {
    /// Rows keyed only on the source side.
    pub missing_in_target: Vec<Row>,
    /// Rows keyed only on the target side.
    pub extra_in_target: Vec<Row>,
    /// Rows keyed on both sides with differing values.
    pub mismatches: Vec<Mismatch>,
}

impl TableDiff {
    pub fn is_empty(&self) -> bool {
        self.missing_in_target.is_empty()
            && self.extra_in_target.is_empty()
            && self.mismatches.is_empty()
    }
}

/// Aggregate view over all tables, flattened for report emission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSummary {
    pub total_missing: usize,
    pub total_extra: usize,
    pub total_mismatches: usize,
    /// `(table, row)` pairs for every missing row, in sorted table order.
    pub missing: Vec<(String, Row)>,
    /// `(table, row)` pairs for every extra row, in sorted table order.
    pub extra: Vec<(String, Row)>,
    /// `(table, mismatch)` pairs, in sorted table order.
    pub mismatches: Vec<(String, Mismatch)>,
}

/// Result of diffing two row sets.
///
/// `direction` labels which dialect is logically "source" and which "target",
/// so `missing_in_target`/`extra_in_target` are unambiguous. Table iteration
/// is sorted by name (stable across runs).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffResult {
    pub direction: Direction,
    pub tables: BTreeMap<String, TableDiff>,
    pub summary: DiffSummary,
}

/// Diff `source` against `target` using the supplied per-table primary keys.
///
/// Tables missing a key entry fall back to the empty key, which collapses all
/// of that table's rows to one index slot (last row wins, as in a plain map
/// insert). Tables present on one side only are fully missing or extra.
pub fn diff(
    source: &RowSet,
    target: &RowSet,
    keys: &PrimaryKeyMap,
    direction: Direction,
) -> DiffResult {
    let mut tables: BTreeMap<String, TableDiff> = BTreeMap::new();

    let mut all_tables: Vec<&String> = source.keys().chain(target.keys()).collect();
    all_tables.sort();
    all_tables.dedup();

    for table in all_tables {
        let key_columns: &[String] = keys
            .get(table)
            .map(|pk| pk.columns.as_slice())
            .unwrap_or_default();

        let source_index = index_rows(source.get(table), key_columns);
        let target_index = index_rows(target.get(table), key_columns);

        let mut table_diff = TableDiff::default();

        for (key, row) in &source_index {
            match target_index.get(key) {
                None => table_diff.missing_in_target.push((*row).clone()),
                Some(other) if other.values != row.values => {
                    table_diff.mismatches.push(Mismatch {
                        key: key.clone(),
                        source_values: row.values.clone(),
                        target_values: other.values.clone(),
                    });
                }
                Some(_) => {}
            }
        }
        for (key, row) in &target_index {
            if !source_index.contains_key(key) {
                table_diff.extra_in_target.push((*row).clone());
            }
        }

        debug!(
            table = %table,
            missing = table_diff.missing_in_target.len(),
            extra = table_diff.extra_in_target.len(),
            mismatches = table_diff.mismatches.len(),
            "table diff computed"
        );
        tables.insert(table.clone(), table_diff);
    }

    let summary = summarize(&tables);
    DiffResult {
        direction,
        tables,
        summary,
    }
}

/// Build a key-indexed view of one side's rows for a table.
///
/// Later rows overwrite earlier ones under the same key; collapsing exact
/// duplicates is the duplicate detector's job, not the diff's.
fn index_rows<'a>(rows: Option<&'a Vec<Row>>, key_columns: &[String]) -> BTreeMap<RowKey, &'a Row> {
    let mut index = BTreeMap::new();
    if let Some(rows) = rows {
        for row in rows {
            index.insert(row.key_or_empty(key_columns), row);
        }
    }
    index
}

fn summarize(tables: &BTreeMap<String, TableDiff>) -> DiffSummary {
    let mut summary = DiffSummary::default();
    for (table, diff) in tables {
        for row in &diff.missing_in_target {
            summary.missing.push((table.clone(), row.clone()));
        }
        for row in &diff.extra_in_target {
            summary.extra.push((table.clone(), row.clone()));
        }
        for mismatch in &diff.mismatches {
            summary.mismatches.push((table.clone(), mismatch.clone()));
        }
    }
    summary.total_missing = summary.missing.len();
    summary.total_extra = summary.extra.len();
    summary.total_mismatches = summary.mismatches.len();
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{group_by_table, KeyOrigin, PrimaryKey, Provenance};

    fn make_row(table: &str, columns: &[&str], values: &[&str]) -> Row {
        Row {
            table: table.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            values: values.iter().map(|v| v.to_string()).collect(),
            provenance: Provenance::new("test.sql", 1),
        }
    }

    fn keys_for(table: &str, columns: &[&str]) -> PrimaryKeyMap {
        let mut keys = PrimaryKeyMap::new();
        keys.insert(
            table.to_string(),
            PrimaryKey {
                columns: columns.iter().map(|c| c.to_string()).collect(),
                origin: KeyOrigin::Advised,
            },
        );
        keys
    }

    #[test]
    fn test_missing_row_reported() {
        let source = group_by_table(vec![make_row("t1", &["id", "val"], &["1", "a"])]);
        let target = RowSet::new();
        let keys = keys_for("t1", &["id"]);

        let result = diff(&source, &target, &keys, Direction::PgToOracle);
        assert_eq!(result.summary.total_missing, 1);
        assert_eq!(result.summary.total_extra, 0);
        assert_eq!(result.summary.total_mismatches, 0);
        assert_eq!(result.tables["t1"].missing_in_target[0].values, vec!["1", "a"]);
    }

    #[test]
    fn test_mismatch_reported_with_both_value_vectors() {
        let source = group_by_table(vec![make_row("t1", &["id", "val"], &["1", "a"])]);
        let target = group_by_table(vec![make_row("t1", &["id", "val"], &["1", "b"])]);
        let keys = keys_for("t1", &["id"]);

        let result = diff(&source, &target, &keys, Direction::PgToOracle);
        assert_eq!(result.summary.total_missing, 0);
        assert_eq!(result.summary.total_extra, 0);
        let mismatches = &result.tables["t1"].mismatches;
        assert_eq!(mismatches.len(), 1);
        assert_eq!(mismatches[0].source_values, vec!["1", "a"]);
        assert_eq!(mismatches[0].target_values, vec!["1", "b"]);
    }

    #[test]
    fn test_identical_rows_produce_empty_diff() {
        let source = group_by_table(vec![make_row("t1", &["id"], &["1"])]);
        let target = group_by_table(vec![make_row("t1", &["id"], &["1"])]);
        let keys = keys_for("t1", &["id"]);

        let result = diff(&source, &target, &keys, Direction::PgToOracle);
        assert!(result.tables["t1"].is_empty());
    }

    #[test]
    fn test_table_only_in_target_is_fully_extra() {
        let source = RowSet::new();
        let target = group_by_table(vec![
            make_row("t2", &["id"], &["1"]),
            make_row("t2", &["id"], &["2"]),
        ]);
        let keys = keys_for("t2", &["id"]);

        let result = diff(&source, &target, &keys, Direction::OracleToPg);
        assert_eq!(result.summary.total_extra, 2);
        assert!(result.tables["t2"].mismatches.is_empty());
    }

    #[test]
    fn test_diff_symmetry() {
        let a = group_by_table(vec![
            make_row("t", &["id", "v"], &["1", "a"]),
            make_row("t", &["id", "v"], &["2", "b"]),
        ]);
        let b = group_by_table(vec![
            make_row("t", &["id", "v"], &["2", "c"]),
            make_row("t", &["id", "v"], &["3", "d"]),
        ]);
        let keys = keys_for("t", &["id"]);

        let forward = diff(&a, &b, &keys, Direction::PgToOracle);
        let backward = diff(&b, &a, &keys, Direction::OracleToPg);

        // Each side's missing set equals the other's extra set.
        assert_eq!(
            forward.tables["t"].missing_in_target,
            backward.tables["t"].extra_in_target
        );
        assert_eq!(
            forward.tables["t"].extra_in_target,
            backward.tables["t"].missing_in_target
        );
        // Mismatch pairs are the same with values swapped.
        let fwd = &forward.tables["t"].mismatches[0];
        let bwd = &backward.tables["t"].mismatches[0];
        assert_eq!(fwd.key, bwd.key);
        assert_eq!(fwd.source_values, bwd.target_values);
        assert_eq!(fwd.target_values, bwd.source_values);
    }

    #[test]
    fn test_null_key_rows_collapse_consistently() {
        // No key entry for the table: every row falls back to the empty key.
        let source = group_by_table(vec![
            make_row("t", &["a"], &["1"]),
            make_row("t", &["a"], &["2"]),
        ]);
        let target = group_by_table(vec![make_row("t", &["a"], &["2"])]);
        let keys = PrimaryKeyMap::new();

        let first = diff(&source, &target, &keys, Direction::PgToOracle);
        let second = diff(&source, &target, &keys, Direction::PgToOracle);
        assert_eq!(first, second);
        // Both sides collapse to one slot under the empty key; last source
        // row wins and matches the target row.
        assert!(first.tables["t"].is_empty());
    }

    #[test]
    fn test_determinism_across_runs() {
        let source = group_by_table(vec![
            make_row("b", &["id"], &["1"]),
            make_row("a", &["id"], &["1"]),
        ]);
        let target = RowSet::new();
        let keys = PrimaryKeyMap::new();

        let first = diff(&source, &target, &keys, Direction::PgToOracle);
        let second = diff(&source, &target, &keys, Direction::PgToOracle);
        assert_eq!(first, second);
        // Sorted table order in the summary.
        assert_eq!(first.summary.missing[0].0, "a");
        assert_eq!(first.summary.missing[1].0, "b");
    }
}
