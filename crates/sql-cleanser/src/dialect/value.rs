//! Scalar value conversion between PostgreSQL and Oracle.
//!
//! Works on raw textual tokens as the parser produced them. Boolean rewriting
//! only fires when column type metadata marks the column boolean; without
//! type information a token like `1` is an opaque scalar.

use std::sync::LazyLock;

use regex::Regex;

use crate::core::Direction;

static PG_NEXTVAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)nextval\(['"]?([^'"()]+)['"]?\)"#).expect("nextval regex is valid")
});

static ORACLE_NEXTVAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)([^.\s]+)\.nextval").expect("nextval regex is valid"));

/// Convert one scalar value token to the other dialect.
///
/// `column_type` is the column's type in the source dialect, or empty when
/// unknown; it only gates boolean rewriting.
pub fn convert_value(value: &str, column_type: &str, direction: Direction) -> String {
    match direction {
        Direction::PgToOracle => pg_value_to_oracle(value, column_type),
        Direction::OracleToPg => oracle_value_to_pg(value, column_type),
    }
}

fn pg_value_to_oracle(value: &str, column_type: &str) -> String {
    if is_null_like(value) {
        return "NULL".to_string();
    }

    let lower = value.to_lowercase();

    if is_boolean_column(column_type) {
        if matches!(lower.as_str(), "true" | "t" | "yes" | "y" | "1") {
            return "1".to_string();
        }
        if matches!(lower.as_str(), "false" | "f" | "no" | "n" | "0") {
            return "0".to_string();
        }
    }

    match lower.as_str() {
        "now()" | "current_timestamp" | "current_date" => return "SYSDATE".to_string(),
        "current_time" => return "SYSTIMESTAMP".to_string(),
        _ => {}
    }

    if lower.contains("nextval(") {
        if let Some(caps) = PG_NEXTVAL_RE.captures(value) {
            return format!("{}.NEXTVAL", caps[1].to_uppercase());
        }
    }

    if is_numeric(value) {
        return value.to_string();
    }

    quote_escaped(value)
}

fn oracle_value_to_pg(value: &str, column_type: &str) -> String {
    if is_null_like(value) {
        return "NULL".to_string();
    }

    let lower = value.to_lowercase();

    if is_oracle_boolean_column(column_type) {
        if value == "1" {
            return "TRUE".to_string();
        }
        if value == "0" {
            return "FALSE".to_string();
        }
    }

    match lower.as_str() {
        "sysdate" | "systimestamp" => return "NOW()".to_string(),
        "current_date" => return "CURRENT_DATE".to_string(),
        "current_timestamp" => return "CURRENT_TIMESTAMP".to_string(),
        _ => {}
    }

    if lower.contains(".nextval") {
        if let Some(caps) = ORACLE_NEXTVAL_RE.captures(value) {
            return format!("nextval('{}_seq')", caps[1].to_lowercase());
        }
    }

    if is_numeric(value) {
        return value.to_string();
    }

    quote_escaped(value)
}

/// Empty, `null`, and `none` (case-insensitive) all mean NULL.
pub(crate) fn is_null_like(value: &str) -> bool {
    value.is_empty() || value.eq_ignore_ascii_case("null") || value.eq_ignore_ascii_case("none")
}

fn is_boolean_column(column_type: &str) -> bool {
    let lower = column_type.to_lowercase();
    lower == "boolean" || lower == "bool"
}

fn is_oracle_boolean_column(column_type: &str) -> bool {
    let lower = column_type.to_lowercase();
    lower == "number(1)" || lower == "boolean"
}

/// Anything `f64` accepts is a numeric literal and goes out unquoted.
fn is_numeric(value: &str) -> bool {
    value.parse::<f64>().is_ok()
}

/// Quote a string value, doubling embedded single quotes.
///
/// Already-quoted inputs are stripped of one quote layer and unescaped
/// before re-escaping, so converting a converted value does not
/// double-escape.
fn quote_escaped(value: &str) -> String {
    let inner = if value.len() >= 2 && value.starts_with('\'') && value.ends_with('\'') {
        value[1..value.len() - 1].replace("''", "'")
    } else {
        value.to_string()
    };
    format!("'{}'", inner.replace('\'', "''"))
}

/// Clean malformed parenthesized fragments produced by upstream parsing of
/// free-text values. Returns `None` when cleaning leaves nothing: the value
/// becomes NULL rather than an empty quoted string.
pub(crate) fn clean_paren_fragment(value: &str) -> Option<String> {
    let cleaned = if value.starts_with('(') && !value.ends_with(')') {
        value.trim_matches('(').trim().to_string()
    } else if value.ends_with("()") && !value.starts_with('(') {
        value.replace("()", "").trim().to_string()
    } else {
        return Some(value.to_string());
    };

    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}
