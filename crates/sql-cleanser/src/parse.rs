//! INSERT statement parsing.
//!
//! Recognizes the single statement shape
//! `INSERT INTO <table> (<cols>) VALUES (<vals>)[, (<vals>)]*;` and turns each
//! value tuple into one [`Row`]. Anything else is silently skipped: this is a
//! deliberate non-grammar, not an error path. Values containing embedded
//! commas inside quoted strings can misparse; the resulting arity mismatch is
//! caught and the row dropped rather than stored malformed.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::core::{Provenance, Row};

static INSERT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)^INSERT\s+INTO\s+['"]?(\w+)['"]?\s*\((.*?)\)\s*VALUES\s*(\(.+\));"#)
        .expect("INSERT statement regex is valid")
});

static VALUE_TUPLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((.*?)\)").expect("value tuple regex is valid"));

/// Parse every recognizable INSERT statement in a text blob.
///
/// `source` is recorded as provenance on each row, along with the 1-based
/// line number the statement started on. Statements that do not match the
/// expected shape produce no rows; a value tuple whose arity disagrees with
/// the column list is dropped with a debug log.
pub fn parse_statements(text: &str, source: &Path) -> Vec<Row> {
    let mut rows = Vec::new();

    for (idx, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim();
        if !line
            .get(..6)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("insert"))
        {
            continue;
        }
        let Some(caps) = INSERT_RE.captures(line) else {
            continue;
        };

        let table = caps[1].to_string();
        let columns: Vec<String> = caps[2].split(',').map(strip_token).collect();
        let values_clause = &caps[3];

        for tuple in VALUE_TUPLE_RE.captures_iter(values_clause) {
            let values: Vec<String> = tuple[1].split(',').map(strip_token).collect();
            if values.len() != columns.len() {
                debug!(
                    table = %table,
                    line = idx + 1,
                    expected = columns.len(),
                    got = values.len(),
                    "dropping value tuple with mismatched arity"
                );
                continue;
            }
            rows.push(Row {
                table: table.clone(),
                columns: columns.clone(),
                values,
                provenance: Provenance::new(source, (idx + 1) as u64),
            });
        }
    }

    rows
}

/// Trim surrounding whitespace and a single layer of single quotes.
fn strip_token(token: &str) -> String {
    let trimmed = token.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('\'') && trimmed.ends_with('\'') {
        trimmed[1..trimmed.len() - 1].to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn parse(text: &str) -> Vec<Row> {
        parse_statements(text, &PathBuf::from("test.sql"))
    }

    #[test]
    fn test_single_statement() {
        let rows = parse("INSERT INTO users (id, name) VALUES (1, 'alice');");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].table, "users");
        assert_eq!(rows[0].columns, vec!["id", "name"]);
        assert_eq!(rows[0].values, vec!["1", "alice"]);
    }

    #[test]
    fn test_multi_tuple_statement_shares_columns() {
        let rows = parse("INSERT INTO t (a, b) VALUES (1, 'x'), (2, 'y');");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].columns, rows[1].columns);
        assert_eq!(rows[1].values, vec!["2", "y"]);
    }

    #[test]
    fn test_case_insensitive_keywords() {
        let rows = parse("insert into Users (ID) values (7);");
        assert_eq!(rows.len(), 1);
        // Table casing is preserved as written.
        assert_eq!(rows[0].table, "Users");
    }

    #[test]
    fn test_non_insert_lines_are_skipped() {
        let text = "CREATE TABLE users (id int);\n\
                    -- comment\n\
                    INSERT INTO users (id) VALUES (1);\n\
                    DELETE FROM users;";
        let rows = parse(text);
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_malformed_statement_is_skipped_not_error() {
        let rows = parse("INSERT INTO users VALUES (1);");
        assert!(rows.is_empty());
    }

    #[test]
    fn test_arity_mismatch_tuple_is_dropped() {
        // Embedded comma in an unquoted-looking token splits the tuple into
        // three values against two columns; the row is discarded.
        let rows = parse("INSERT INTO t (a, b) VALUES (1, 2, 3);");
        assert!(rows.is_empty());
    }

    #[test]
    fn test_provenance_records_line_numbers() {
        let text = "-- header\nINSERT INTO t (a) VALUES (1);\n";
        let rows = parse(text);
        assert_eq!(rows[0].provenance.line, 2);
        assert_eq!(rows[0].provenance.file, PathBuf::from("test.sql"));
    }

    #[test]
    fn test_single_quote_layer_stripped() {
        let rows = parse("INSERT INTO t (a) VALUES ('''quoted''');");
        // One layer stripped; inner quotes preserved for the converter.
        assert_eq!(rows[0].values[0], "''quoted''");
    }

    #[test]
    fn test_quoted_table_name() {
        let rows = parse("INSERT INTO 'orders' (id) VALUES (1);");
        assert_eq!(rows[0].table, "orders");
    }
}
