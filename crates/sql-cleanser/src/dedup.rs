//! Duplicate detection.
//!
//! The exact phase hashes each row's key and keeps the first row seen per
//! key as canonical; it is total and deterministic. The fuzzy phase is an
//! optional advisor-backed extension over a bounded sample of the canonical
//! survivors and degrades to "no fuzzy duplicates found" whenever the
//! capability is unavailable or returns unusable output.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::advisor::SimilarityAdvisor;
use crate::config::DataQualityConfig;
use crate::core::{Row, RowKey};

/// A detected duplicate, annotated with why it was flagged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateRow {
    pub row: Row,
    pub reason: String,
}

/// Output of duplicate detection for one table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateReport {
    /// First-seen row per key, in input order. Never mutated copies of input.
    pub canonical: Vec<Row>,
    /// Every later row sharing a key with a canonical row.
    pub duplicates: Vec<DuplicateRow>,
    /// Groups of indices into `canonical` the similarity advisor considers
    /// the same entity. Empty unless the fuzzy phase ran and found groups.
    pub fuzzy_groups: Vec<Vec<usize>>,
    /// False when the fuzzy phase was skipped, unavailable, or unusable.
    /// Lets callers assert on degradation explicitly.
    pub fuzzy_available: bool,
}

/// Detect exact duplicates by key hash, then optionally group near-duplicates
/// through the similarity advisor.
pub fn detect_duplicates(
    rows: &[Row],
    key_columns: &[String],
    config: &DataQualityConfig,
    advisor: &dyn SimilarityAdvisor,
) -> DuplicateReport {
    let mut report = DuplicateReport::default();
    let mut seen: HashMap<String, (usize, RowKey)> = HashMap::new();

    for row in rows {
        let key = row.key(key_columns);
        let hash = key_hash(key.as_ref());
        match seen.get(&hash) {
            Some((canonical_idx, key)) => {
                let canonical = &report.canonical[*canonical_idx];
                report.duplicates.push(DuplicateRow {
                    row: row.clone(),
                    reason: format!(
                        "exact duplicate of key {} first seen at {}:{}",
                        key,
                        canonical.provenance.file.display(),
                        canonical.provenance.line
                    ),
                });
            }
            None => {
                seen.insert(hash, (report.canonical.len(), key.unwrap_or_default()));
                report.canonical.push(row.clone());
            }
        }
    }

    if config.enable_fuzzy_matching {
        run_fuzzy_phase(&mut report, config, advisor);
    }

    debug!(
        canonical = report.canonical.len(),
        duplicates = report.duplicates.len(),
        fuzzy_available = report.fuzzy_available,
        "duplicate detection finished"
    );
    report
}

/// Consult the similarity advisor over a bounded sample of canonical rows.
fn run_fuzzy_phase(
    report: &mut DuplicateReport,
    config: &DataQualityConfig,
    advisor: &dyn SimilarityAdvisor,
) {
    let sample_len = report.canonical.len().min(config.fuzzy_sample_size);
    let sample = &report.canonical[..sample_len];

    let Some(groups) = advisor.group(sample, config.similarity_threshold) else {
        return;
    };

    // Unusable output (out-of-range indices) degrades like unavailability.
    let usable = groups
        .iter()
        .flatten()
        .all(|&idx| idx < sample_len);
    if !usable {
        debug!("similarity advisor returned out-of-range indices; ignoring fuzzy result");
        return;
    }

    report.fuzzy_groups = groups.into_iter().filter(|g| g.len() >= 2).collect();
    report.fuzzy_available = true;
}

/// Stable content hash of a row key.
///
/// `None` (unresolvable key) hashes to its own bucket, so key-less rows
/// collapse together, matching the exact-phase contract.
fn key_hash(key: Option<&RowKey>) -> String {
    let mut hasher = Sha256::new();
    match key {
        Some(key) => {
            hasher.update([1u8]);
            hasher.update(key.canonical_string().as_bytes());
        }
        None => hasher.update([0u8]),
    }
    format!("{:x}", hasher.finalize())
}
