//! Markdown and JSON report emission.
//!
//! Reports are pure renderings of already-computed results; nothing here
//! re-derives analysis. Section layout and headings are stable so downstream
//! tooling can anchor on them.

use serde::{Deserialize, Serialize};

use crate::advisor::{Explanation, Severity};
use crate::core::{KeyOrigin, PrimaryKey};
use crate::diff::DiffResult;

/// Per-table analysis summary fed into the markdown reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableAnalysis {
    pub table: String,
    pub row_count: usize,
    pub primary_key: PrimaryKey,
    pub duplicate_count: usize,
    /// Source files the table's rows were parsed from, deduplicated.
    pub source_files: Vec<String>,
}

/// Structured migration plan, serialized to JSON alongside its markdown form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationPlan {
    pub steps: Vec<String>,
    pub risk_level: String,
    pub estimated_effort: String,
    pub warnings: Vec<String>,
}

/// Render the diff result as a markdown report.
pub fn diff_report_markdown(diff: &DiffResult) -> String {
    let mut lines = vec![
        "# Diff Report".to_string(),
        String::new(),
        format!("**Direction:** {}", diff.direction),
        String::new(),
        "## Summary".to_string(),
        String::new(),
        format!("- Missing in target: {}", diff.summary.total_missing),
        format!("- Extra in target: {}", diff.summary.total_extra),
        format!("- Value mismatches: {}", diff.summary.total_mismatches),
        String::new(),
    ];

    for (table, table_diff) in &diff.tables {
        if table_diff.is_empty() {
            continue;
        }
        lines.push(format!("## Table: {table}"));
        lines.push(String::new());
        if !table_diff.missing_in_target.is_empty() {
            lines.push(format!(
                "### Missing in target ({})",
                table_diff.missing_in_target.len()
            ));
            for row in &table_diff.missing_in_target {
                lines.push(format!(
                    "- `({})` from {}:{}",
                    row.values.join(", "),
                    row.provenance.file.display(),
                    row.provenance.line
                ));
            }
            lines.push(String::new());
        }
        if !table_diff.extra_in_target.is_empty() {
            lines.push(format!(
                "### Extra in target ({})",
                table_diff.extra_in_target.len()
            ));
            for row in &table_diff.extra_in_target {
                lines.push(format!("- `({})`", row.values.join(", ")));
            }
            lines.push(String::new());
        }
        if !table_diff.mismatches.is_empty() {
            lines.push(format!("### Mismatches ({})", table_diff.mismatches.len()));
            for mismatch in &table_diff.mismatches {
                lines.push(format!(
                    "- key {}: source `({})` vs target `({})`",
                    mismatch.key,
                    mismatch.source_values.join(", "),
                    mismatch.target_values.join(", ")
                ));
            }
            lines.push(String::new());
        }
    }

    if diff.tables.values().all(|t| t.is_empty()) {
        lines.push("No differences detected.".to_string());
        lines.push(String::new());
    }

    lines.join("\n")
}

/// Render the full analysis report: per-table detail plus the data quality
/// explanation.
pub fn analysis_report_markdown(analyses: &[TableAnalysis], explanation: &Explanation) -> String {
    let mut lines = vec!["# Analysis Report".to_string(), String::new()];

    for analysis in analyses {
        lines.push(format!("## Table: {}", analysis.table));
        lines.push(String::new());
        lines.push(format!("- Rows: {}", analysis.row_count));
        lines.push(format!(
            "- Primary key: {} ({})",
            if analysis.primary_key.columns.is_empty() {
                "(none)".to_string()
            } else {
                analysis.primary_key.columns.join(", ")
            },
            key_origin_label(analysis.primary_key.origin)
        ));
        lines.push(format!("- Duplicates removed: {}", analysis.duplicate_count));
        lines.push(format!(
            "- Source files: {}",
            analysis.source_files.join(", ")
        ));
        lines.push(String::new());
    }

    lines.push(explanation.markdown.clone());
    lines.join("\n")
}

/// Render the one-line-per-table pipe table.
pub fn table_summary_markdown(analyses: &[TableAnalysis]) -> String {
    let mut lines = vec![
        "# Table Summary".to_string(),
        String::new(),
        "| Table | Rows | Duplicates | Primary Key | Source Files |".to_string(),
        "|-------|------|------------|-------------|--------------|".to_string(),
    ];

    for analysis in analyses {
        lines.push(format!(
            "| {} | {} | {} | {} | {} |",
            analysis.table,
            analysis.row_count,
            analysis.duplicate_count,
            if analysis.primary_key.columns.is_empty() {
                "(none)".to_string()
            } else {
                analysis.primary_key.columns.join(", ")
            },
            analysis.source_files.join(", ")
        ));
    }

    lines.push(String::new());
    lines.join("\n")
}

/// Deterministic migration plan derived from the diff alone. Used whenever
/// the anomaly explainer cannot produce one.
pub fn fallback_migration_plan(diff: &DiffResult) -> MigrationPlan {
    let total =
        diff.summary.total_missing + diff.summary.total_extra + diff.summary.total_mismatches;
    let severity = Severity::from_issue_count(total);

    let mut steps = vec!["Review the diff report for affected tables".to_string()];
    if diff.summary.total_missing > 0 {
        steps.push(format!(
            "Apply the missing-records script to insert {} missing row(s)",
            diff.summary.total_missing
        ));
    }
    if diff.summary.total_mismatches > 0 {
        steps.push(format!(
            "Reconcile {} mismatched row(s) manually",
            diff.summary.total_mismatches
        ));
    }
    if diff.summary.total_extra > 0 {
        steps.push(format!(
            "Decide whether {} extra target row(s) should be removed",
            diff.summary.total_extra
        ));
    }
    steps.push("Re-run the comparison to confirm convergence".to_string());

    let mut warnings = Vec::new();
    for (table, mismatch) in &diff.summary.mismatches {
        warnings.push(format!(
            "Value mismatch in {} at key {}",
            table, mismatch.key
        ));
    }

    MigrationPlan {
        steps,
        risk_level: severity.label().to_string(),
        estimated_effort: match severity {
            Severity::None => "none".to_string(),
            Severity::Low => "under an hour".to_string(),
            Severity::Medium => "a few hours".to_string(),
            Severity::High => "dedicated review session".to_string(),
        },
        warnings,
    }
}

/// Render a migration plan as markdown.
pub fn migration_plan_markdown(plan: &MigrationPlan) -> String {
    let mut lines = vec![
        "# Migration Plan".to_string(),
        String::new(),
        format!("**Risk level:** {}", plan.risk_level),
        format!("**Estimated effort:** {}", plan.estimated_effort),
        String::new(),
        "## Steps".to_string(),
        String::new(),
    ];
    for (idx, step) in plan.steps.iter().enumerate() {
        lines.push(format!("{}. {}", idx + 1, step));
    }
    if !plan.warnings.is_empty() {
        lines.push(String::new());
        lines.push("## Warnings".to_string());
        lines.push(String::new());
        for warning in &plan.warnings {
            lines.push(format!("- {warning}"));
        }
    }
    lines.push(String::new());
    lines.join("\n")
}

fn key_origin_label(origin: KeyOrigin) -> &'static str {
    match origin {
        KeyOrigin::Advised => "advised",
        KeyOrigin::Fallback => "fallback",
    }
}
