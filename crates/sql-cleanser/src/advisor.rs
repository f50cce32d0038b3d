//! External capability interfaces and their deterministic fallbacks.
//!
//! The core consumes AI-assisted advisors for primary-key inference, anomaly
//! explanation, and fuzzy duplicate grouping. Each capability has exactly two
//! outcomes: a value, or unavailable (`None`). Transport, retries, and
//! timeouts are orchestration-layer concerns and never appear here; every
//! consumer must work with the fallback logic alone.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{KeyOrigin, PrimaryKey, Row};

/// Column names that win the primary-key fallback outright.
const PK_NAME_CANDIDATES: [&str; 4] = ["id", "pk", "primary_key", "key"];

/// Suggests primary-key columns for a table from its columns and sample rows.
pub trait PrimaryKeyAdvisor {
    /// Return an ordered key column list, or `None` when unavailable.
    fn suggest(&self, columns: &[String], sample: &[Row]) -> Option<Vec<String>>;
}

/// Explains detected anomalies in prose.
pub trait AnomalyExplainer {
    /// Return a remediation explanation, or `None` when unavailable.
    fn explain(
        &self,
        duplicate_count: usize,
        order_issue_count: usize,
        samples: &[Row],
    ) -> Option<Explanation>;
}

/// Groups near-duplicate rows (same entity, formatting variance).
pub trait SimilarityAdvisor {
    /// Return groups of indices into `sample`, or `None` when unavailable.
    fn group(&self, sample: &[Row], threshold: f64) -> Option<Vec<Vec<usize>>>;
}

/// Stub advisor: every capability is unavailable.
///
/// The CLI default, and the test double for every degraded path.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAdvisor;

impl PrimaryKeyAdvisor for NoAdvisor {
    fn suggest(&self, _columns: &[String], _sample: &[Row]) -> Option<Vec<String>> {
        None
    }
}

impl AnomalyExplainer for NoAdvisor {
    fn explain(&self, _d: usize, _o: usize, _samples: &[Row]) -> Option<Explanation> {
        None
    }
}

impl SimilarityAdvisor for NoAdvisor {
    fn group(&self, _sample: &[Row], _threshold: f64) -> Option<Vec<Vec<usize>>> {
        None
    }
}

/// A migration/remediation explanation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Explanation {
    /// Brief action plan.
    pub plan: String,
    /// Detailed markdown analysis.
    pub markdown: String,
}

/// Resolve a table's primary key through the advisor, falling back to the
/// deterministic chain when the advisor is unavailable or suggests columns
/// the table does not have.
pub fn resolve_primary_key(
    advisor: &dyn PrimaryKeyAdvisor,
    columns: &[String],
    sample: &[Row],
) -> PrimaryKey {
    if let Some(suggested) = advisor.suggest(columns, sample) {
        let valid = !suggested.is_empty() && suggested.iter().all(|c| columns.contains(c));
        if valid {
            return PrimaryKey {
                columns: suggested,
                origin: KeyOrigin::Advised,
            };
        }
        debug!("advisor key suggestion references unknown columns; using fallback");
    }
    PrimaryKey {
        columns: fallback_primary_key(columns),
        origin: KeyOrigin::Fallback,
    }
}

/// Deterministic primary-key fallback.
///
/// Prefers a column literally named `id`/`pk`/`primary_key`/`key`; else the
/// unique column ending in `_id`; else the first declared column; else empty.
pub fn fallback_primary_key(columns: &[String]) -> Vec<String> {
    for column in columns {
        if PK_NAME_CANDIDATES
            .iter()
            .any(|c| column.eq_ignore_ascii_case(c))
        {
            return vec![column.clone()];
        }
    }

    let id_suffixed: Vec<&String> = columns
        .iter()
        .filter(|c| c.to_lowercase().ends_with("_id"))
        .collect();
    if let [only] = id_suffixed.as_slice() {
        return vec![(*only).clone()];
    }

    columns.first().cloned().into_iter().collect()
}

/// Severity bucket for anomaly totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    None,
    Low,
    Medium,
    High,
}

impl Severity {
    /// Bucket a total issue count.
    pub fn from_issue_count(total: usize) -> Self {
        match total {
            0 => Severity::None,
            1..=3 => Severity::Low,
            4..=10 => Severity::Medium,
            _ => Severity::High,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Severity::None => "NONE",
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
        }
    }
}

/// Templated explanation used when the [`AnomalyExplainer`] is unavailable.
///
/// Always producible: report generation never blocks on the capability.
pub fn fallback_explanation(duplicate_count: usize, order_issue_count: usize) -> Explanation {
    let total = duplicate_count + order_issue_count;
    let severity = Severity::from_issue_count(total);

    let plan = if total > 0 {
        format!("Manual review required - {} priority", severity.label())
    } else {
        "No critical issues detected".to_string()
    };

    let duplicates_line = if duplicate_count > 0 {
        "- Data integrity compromised by duplicate entries"
    } else {
        "- No duplicate data detected"
    };
    let order_line = if order_issue_count > 0 {
        "- Table dependency order may cause referential integrity issues"
    } else {
        "- Table ordering appears correct"
    };

    let markdown = format!(
        "## Data Quality Analysis\n\n\
         **Severity Level:** {}\n\n\
         ### Issues Detected:\n\
         - **Duplicate Records:** {} found\n\
         - **Ordering Issues:** {} found\n\n\
         ### Impact Assessment:\n\
         {}\n\
         {}\n\n\
         ### Recommended Actions:\n\
         1. **Immediate:** Review and remove duplicate entries before migration\n\
         2. **Data Validation:** Implement unique constraints on primary keys\n\
         3. **Process Improvement:** Add data validation checks in source system\n\
         4. **Monitoring:** Set up alerts for future duplicate detection\n",
        severity.label(),
        duplicate_count,
        order_issue_count,
        duplicates_line,
        order_line,
    );

    Explanation { plan, markdown }
}

/// Resolve an explanation through the advisor with the templated fallback.
pub fn resolve_explanation(
    explainer: &dyn AnomalyExplainer,
    duplicate_count: usize,
    order_issue_count: usize,
    samples: &[Row],
) -> Explanation {
    explainer
        .explain(duplicate_count, order_issue_count, samples)
        .unwrap_or_else(|| fallback_explanation(duplicate_count, order_issue_count))
}
