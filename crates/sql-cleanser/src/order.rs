//! Table dependency ordering.
//!
//! Builds a directed graph over tables from the foreign-key naming convention
//! (a column `foo_id` in table `t` implies `foo` must load before `t`) and
//! produces an execution order via Kahn's algorithm. The order is a hint for
//! output generation and report ordering only; nothing blocks on it.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::RowSet;

/// Column suffix that marks a foreign-key-like reference.
const FK_SUFFIX: &str = "_id";

/// A safe table execution order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableOrder {
    /// Table names, dependencies first.
    pub tables: Vec<String>,
    /// True when the inferred graph had a cycle and the order fell back to
    /// lexicographic. Degraded but safe, and visible to callers.
    pub cyclic_fallback: bool,
}

/// Order tables given their column lists.
///
/// Edge rule: for column `C` in table `T`, if `C` ends with `_id`
/// (case-insensitive) and the stripped prefix names another known table `R`
/// (matched case-insensitively, singular or plural: `user_id` references
/// `users`), then `R` orders before `T`. A column referencing its own table
/// implies nothing. Cycles never fail the pipeline: the result degrades to a
/// lexicographic total order with `cyclic_fallback` set.
pub fn order_tables(columns_by_table: &BTreeMap<String, Vec<String>>) -> TableOrder {
    let tables: BTreeSet<&String> = columns_by_table.keys().collect();

    // edges[r] = tables that reference r and must come after it
    let mut edges: BTreeMap<&String, BTreeSet<&String>> = BTreeMap::new();
    let mut indegree: BTreeMap<&String, usize> = tables.iter().map(|t| (*t, 0)).collect();

    for (table, columns) in columns_by_table {
        for column in columns {
            let Some(prefix_len) = column.len().checked_sub(FK_SUFFIX.len()) else {
                continue;
            };
            let suffix_ok = column
                .get(prefix_len..)
                .is_some_and(|s| s.eq_ignore_ascii_case(FK_SUFFIX));
            if !suffix_ok || prefix_len == 0 {
                continue;
            }
            let prefix = &column[..prefix_len];
            let Some(referenced) = resolve_referenced_table(columns_by_table, prefix) else {
                continue;
            };
            if referenced == table {
                continue;
            }
            if edges.entry(referenced).or_default().insert(table) {
                *indegree.get_mut(table).expect("table is a node") += 1;
            }
        }
    }

    // Kahn's algorithm with a sorted ready set for deterministic tie-breaking.
    let mut ready: BTreeSet<&String> = indegree
        .iter()
        .filter(|(_, deg)| **deg == 0)
        .map(|(t, _)| *t)
        .collect();
    let mut ordered: Vec<String> = Vec::with_capacity(tables.len());

    while let Some(next) = ready.iter().next().copied() {
        ready.remove(next);
        ordered.push(next.clone());
        if let Some(dependents) = edges.get(next) {
            for dependent in dependents {
                let deg = indegree.get_mut(dependent).expect("table is a node");
                *deg -= 1;
                if *deg == 0 {
                    ready.insert(dependent);
                }
            }
        }
    }

    if ordered.len() == tables.len() {
        TableOrder {
            tables: ordered,
            cyclic_fallback: false,
        }
    } else {
        warn!("dependency graph has a cycle; falling back to lexicographic table order");
        TableOrder {
            tables: tables.into_iter().cloned().collect(),
            cyclic_fallback: true,
        }
    }
}

/// Resolve a stripped `_id` prefix to a known table name.
///
/// Exact match first, then case-insensitive with plural tolerance, so
/// `user_id` resolves to `users` and `ORDER_ID` to `orders`.
fn resolve_referenced_table<'a>(
    columns_by_table: &'a BTreeMap<String, Vec<String>>,
    prefix: &str,
) -> Option<&'a String> {
    if let Some((name, _)) = columns_by_table.get_key_value(prefix) {
        return Some(name);
    }
    let lower = prefix.to_lowercase();
    let plural = format!("{lower}s");
    columns_by_table.keys().find(|name| {
        let name = name.to_lowercase();
        name == lower || name == plural
    })
}

/// Order the tables of a [`RowSet`], taking each table's column list from its
/// first row.
pub fn order_row_set(rows_by_table: &RowSet) -> TableOrder {
    let columns: BTreeMap<String, Vec<String>> = rows_by_table
        .iter()
        .map(|(table, rows)| {
            let cols = rows.first().map(|r| r.columns.clone()).unwrap_or_default();
            (table.clone(), cols)
        })
        .collect();
    order_tables(&columns)
}
