//! INSERT statement and script rendering.
//!
//! Identifiers are always re-cased to the target dialect's convention
//! (Oracle upper, PostgreSQL lower) regardless of how they were written in
//! the source text. Script and file naming is part of the compatibility
//! contract and must not change.

use chrono::Local;

use crate::core::{Direction, Row};
use crate::diff::DiffResult;
use crate::error::{CleanseError, Result};
use crate::order::TableOrder;

use super::value::{clean_paren_fragment, convert_value, is_null_like};

/// Convert one row into a rendered INSERT statement for the target dialect.
///
/// A column/value arity mismatch here is a caller contract violation: the
/// parser never produces such rows.
pub fn convert_insert(row: &Row, direction: Direction) -> Result<String> {
    if row.columns.len() != row.values.len() {
        return Err(CleanseError::row_shape(
            &row.table,
            row.columns.len(),
            row.values.len(),
        ));
    }

    let table = cased(&row.table, direction);
    let columns: Vec<String> = row.columns.iter().map(|c| cased(c, direction)).collect();

    let mut rendered = Vec::with_capacity(row.values.len());
    for (column, value) in row.columns.iter().zip(&row.values) {
        let converted = match clean_paren_fragment(value) {
            Some(cleaned) => convert_value(&cleaned, "", direction),
            None => "NULL".to_string(),
        };
        rendered.push(finalize_value(&table, column, value, converted, direction));
    }

    Ok(format!(
        "INSERT INTO {} ({}) VALUES ({});",
        table,
        columns.join(", "),
        rendered.join(", ")
    ))
}

/// Apply the key-column sequence rewrite on top of plain value conversion.
fn finalize_value(
    table: &str,
    column: &str,
    raw: &str,
    converted: String,
    direction: Direction,
) -> String {
    let key_column = column.to_lowercase().ends_with("_id");
    let null_key = is_null_like(raw);

    match direction {
        Direction::PgToOracle => {
            if key_column && null_key {
                return format!("{table}_SEQ.NEXTVAL");
            }
            converted
        }
        Direction::OracleToPg => {
            if key_column && null_key {
                return format!("nextval('{table}_id_seq')");
            }
            // Any source-side sequence advance is renamed to the target
            // table's own sequence.
            if raw.to_lowercase().contains(".nextval") {
                return format!("nextval('{table}_id_seq')");
            }
            converted
        }
    }
}

/// Table/column identifier cased per the target dialect.
fn cased(identifier: &str, direction: Direction) -> String {
    match direction {
        Direction::PgToOracle => identifier.to_uppercase(),
        Direction::OracleToPg => identifier.to_lowercase(),
    }
}

/// Sequence name for a table under the target dialect's naming convention:
/// Oracle uses an upper-case `_SEQ` suffix, PostgreSQL `<table>_id_seq`.
pub fn sequence_name(table: &str, direction: Direction) -> String {
    match direction {
        Direction::PgToOracle => format!("{}_SEQ", table.to_uppercase()),
        Direction::OracleToPg => format!("{}_id_seq", table.to_lowercase()),
    }
}

/// Script filename for a converted table: `<table cased per dialect>.sql`.
pub fn script_file_name(table: &str, direction: Direction) -> String {
    format!("{}.sql", cased(table, direction))
}

/// Filename for the missing-record conversion script.
pub fn missing_records_file_name(direction: Direction) -> String {
    format!("missing_records_{}.sql", direction.token())
}

/// Sequence-creation DDL stubs for a set of tables, in the given order.
pub fn sequence_ddl(tables: &[String], direction: Direction) -> Vec<String> {
    let mut statements = Vec::new();
    for table in tables {
        statements.push(format!("-- Table: {}", cased(table, direction)));
        statements.push(format!(
            "CREATE SEQUENCE {} START WITH 1 INCREMENT BY 1;",
            sequence_name(table, direction)
        ));
        statements.push(String::new());
    }
    statements
}

/// Render the full per-table conversion script: header, sequence preamble,
/// one INSERT per row, record-count trailer.
pub fn render_table_script(table: &str, rows: &[Row], direction: Direction) -> Result<String> {
    let display = cased(table, direction);
    let mut lines = vec![
        format!("-- {} SQL for table: {}", direction.target_dialect(), display),
        format!(
            "-- Generated by SQL Cleanser on {}",
            Local::now().format("%Y-%m-%d %H:%M:%S")
        ),
        format!("-- Source: {} INSERT statements", direction.source_dialect()),
        format!("-- Direction: {}", direction.token().to_uppercase()),
        String::new(),
        "-- Create sequence for auto-incrementing primary key".to_string(),
        format!("CREATE SEQUENCE {} START WITH 1;", sequence_name(table, direction)),
        String::new(),
        format!(
            "-- Insert statements (converted from {} syntax)",
            direction.source_dialect()
        ),
    ];

    for row in rows {
        lines.push(convert_insert(row, direction)?);
    }

    lines.push(String::new());
    lines.push("-- End of file".to_string());
    lines.push(format!("-- Total records inserted: {}", rows.len()));

    Ok(lines.join("\n"))
}

/// Render the script that re-creates every row missing in the target, in
/// dependency order.
pub fn render_missing_records_script(diff: &DiffResult, order: &TableOrder) -> Result<String> {
    let direction = diff.direction;
    let mut lines = vec![
        "-- Missing record conversion script".to_string(),
        format!("-- Direction: {}", direction.token().to_uppercase()),
        format!(
            "-- Generated by SQL Cleanser on {}",
            Local::now().format("%Y-%m-%d %H:%M:%S")
        ),
        String::new(),
    ];

    // Dependency order first, then any diffed table the orderer did not see.
    let mut tables: Vec<&String> = order.tables.iter().collect();
    for table in diff.tables.keys() {
        if !order.tables.contains(table) {
            tables.push(table);
        }
    }

    let mut total = 0usize;
    for table in tables {
        let Some(table_diff) = diff.tables.get(table) else {
            continue;
        };
        if table_diff.missing_in_target.is_empty() {
            continue;
        }
        lines.push(format!("-- Table: {}", cased(table, direction)));
        for row in &table_diff.missing_in_target {
            lines.push(convert_insert(row, direction)?);
            total += 1;
        }
        lines.push(String::new());
    }

    lines.push(format!("-- Total missing records: {}", total));
    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{group_by_table, Provenance, PrimaryKeyMap, RowSet};
    use crate::diff::diff;
    use crate::order::order_row_set;

    fn make_row(table: &str, columns: &[&str], values: &[&str]) -> Row {
        Row {
            table: table.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            values: values.iter().map(|v| v.to_string()).collect(),
            provenance: Provenance::new("test.sql", 1),
        }
    }

    #[test]
    fn test_pg_to_oracle_insert_uppercases_identifiers() {
        let row = make_row("users", &["id", "name"], &["1", "alice"]);
        let sql = convert_insert(&row, Direction::PgToOracle).unwrap();
        assert_eq!(sql, "INSERT INTO USERS (ID, NAME) VALUES (1, 'alice');");
    }

    #[test]
    fn test_oracle_to_pg_insert_lowercases_identifiers() {
        let row = make_row("USERS", &["ID", "NAME"], &["1", "ALICE"]);
        let sql = convert_insert(&row, Direction::OracleToPg).unwrap();
        assert_eq!(sql, "INSERT INTO users (id, name) VALUES (1, 'ALICE');");
    }

    #[test]
    fn test_null_key_column_becomes_sequence_advance() {
        let row = make_row("orders", &["order_id", "total"], &["null", "9.5"]);
        let sql = convert_insert(&row, Direction::PgToOracle).unwrap();
        assert!(sql.contains("ORDERS_SEQ.NEXTVAL"));

        let sql = convert_insert(&row, Direction::OracleToPg).unwrap();
        assert!(sql.contains("nextval('orders_id_seq')"));
    }

    #[test]
    fn test_source_sequence_renamed_to_table_sequence() {
        let row = make_row("ORDERS", &["ORDER_ID"], &["OTHER_SEQ.NEXTVAL"]);
        let sql = convert_insert(&row, Direction::OracleToPg).unwrap();
        assert!(sql.contains("nextval('orders_id_seq')"));
    }

    #[test]
    fn test_malformed_paren_fragment_cleaned() {
        let row = make_row("t", &["label"], &["(Biller ID("]);
        let sql = convert_insert(&row, Direction::PgToOracle).unwrap();
        assert!(sql.contains("'Biller ID'"));

        let row = make_row("t", &["label"], &["(("]);
        let sql = convert_insert(&row, Direction::PgToOracle).unwrap();
        assert!(sql.contains("VALUES (NULL)"));
    }

    #[test]
    fn test_arity_mismatch_is_fatal() {
        let row = Row {
            table: "t".to_string(),
            columns: vec!["a".to_string(), "b".to_string()],
            values: vec!["1".to_string()],
            provenance: Provenance::new("test.sql", 1),
        };
        let err = convert_insert(&row, Direction::PgToOracle).unwrap_err();
        assert!(matches!(err, CleanseError::RowShape { .. }));
    }

    #[test]
    fn test_file_naming_conventions() {
        assert_eq!(script_file_name("users", Direction::PgToOracle), "USERS.sql");
        assert_eq!(script_file_name("USERS", Direction::OracleToPg), "users.sql");
        assert_eq!(
            missing_records_file_name(Direction::PgToOracle),
            "missing_records_pg2ora.sql"
        );
        assert_eq!(
            missing_records_file_name(Direction::OracleToPg),
            "missing_records_ora2pg.sql"
        );
    }

    #[test]
    fn test_sequence_names() {
        assert_eq!(sequence_name("users", Direction::PgToOracle), "USERS_SEQ");
        assert_eq!(sequence_name("USERS", Direction::OracleToPg), "users_id_seq");
    }

    #[test]
    fn test_table_script_layout() {
        let rows = vec![make_row("users", &["id", "name"], &["1", "alice"])];
        let script = render_table_script("users", &rows, Direction::PgToOracle).unwrap();
        assert!(script.starts_with("-- Oracle SQL for table: USERS"));
        assert!(script.contains("CREATE SEQUENCE USERS_SEQ START WITH 1;"));
        assert!(script.contains("INSERT INTO USERS"));
        assert!(script.contains("-- Total records inserted: 1"));
    }

    #[test]
    fn test_sequence_ddl_stubs() {
        let tables = vec!["users".to_string()];
        let ddl = sequence_ddl(&tables, Direction::PgToOracle);
        assert_eq!(ddl[0], "-- Table: USERS");
        assert_eq!(ddl[1], "CREATE SEQUENCE USERS_SEQ START WITH 1 INCREMENT BY 1;");
    }

    #[test]
    fn test_missing_records_script_follows_dependency_order() {
        let source = group_by_table(vec![
            make_row("orders", &["id", "user_id"], &["1", "1"]),
            make_row("users", &["id"], &["1"]),
        ]);
        let target = RowSet::new();
        let keys = PrimaryKeyMap::new();
        let result = diff(&source, &target, &keys, Direction::PgToOracle);
        let order = order_row_set(&source);

        let script = render_missing_records_script(&result, &order).unwrap();
        let users_pos = script.find("-- Table: USERS").unwrap();
        let orders_pos = script.find("-- Table: ORDERS").unwrap();
        assert!(users_pos < orders_pos);
        assert!(script.contains("-- Total missing records: 2"));
    }
}
