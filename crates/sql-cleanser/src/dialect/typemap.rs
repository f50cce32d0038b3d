//! Column type mapping between PostgreSQL and Oracle.
//!
//! Total with default passthrough: unknown types are upper-cased and passed
//! through rather than rejected. Parameterized forms (`varchar(n)`,
//! `numeric(p,s)`, `NUMBER(p[,s])`) are handled before the bare-name table.

use std::sync::LazyLock;

use regex::Regex;

use crate::core::Direction;

static LENGTH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((\d+)\)").expect("length regex is valid"));

static PARAMS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([^)]+)\)").expect("params regex is valid"));

/// Convert a column type name to the other dialect.
pub fn convert_type(type_name: &str, direction: Direction) -> String {
    match direction {
        Direction::PgToOracle => pg_to_oracle(type_name),
        Direction::OracleToPg => oracle_to_pg(type_name),
    }
}

fn pg_to_oracle(pg_type: &str) -> String {
    let lower = pg_type.to_lowercase();

    if lower.starts_with("varchar(") || lower.starts_with("character varying(") {
        return match first_length(&lower) {
            Some(n) => format!("VARCHAR2({n})"),
            None => "VARCHAR2(4000)".to_string(),
        };
    }
    if lower.starts_with("char(") || lower.starts_with("character(") {
        return match first_length(&lower) {
            Some(n) => format!("CHAR({n})"),
            None => "CHAR(1)".to_string(),
        };
    }
    if lower.starts_with("numeric(") || lower.starts_with("decimal(") {
        return match first_params(&lower) {
            Some(params) => format!("NUMBER({params})"),
            None => "NUMBER".to_string(),
        };
    }

    match lower.as_str() {
        "integer" | "int" | "int4" | "serial" => "NUMBER".to_string(),
        "bigint" | "int8" | "bigserial" => "NUMBER(19)".to_string(),
        "smallint" | "int2" => "NUMBER(5)".to_string(),
        "real" | "float4" => "BINARY_FLOAT".to_string(),
        "double precision" | "float8" => "BINARY_DOUBLE".to_string(),
        "numeric" | "decimal" => "NUMBER".to_string(),
        "money" => "NUMBER(15,2)".to_string(),
        "text" => "CLOB".to_string(),
        "char" | "character" => "CHAR".to_string(),
        "varchar" | "character varying" => "VARCHAR2".to_string(),
        "boolean" | "bool" => "NUMBER(1)".to_string(),
        "date" => "DATE".to_string(),
        "timestamp" | "timestamp without time zone" => "TIMESTAMP".to_string(),
        "timestamp with time zone" | "time with time zone" => {
            "TIMESTAMP WITH TIME ZONE".to_string()
        }
        "time" | "time without time zone" => "DATE".to_string(),
        "interval" => "INTERVAL DAY TO SECOND".to_string(),
        "bytea" => "BLOB".to_string(),
        "uuid" => "VARCHAR2(36)".to_string(),
        "json" | "jsonb" => "CLOB".to_string(),
        "xml" => "XMLTYPE".to_string(),
        "point" | "line" | "lseg" | "box" | "path" | "polygon" | "circle" => {
            "SDO_GEOMETRY".to_string()
        }
        _ => pg_type.to_uppercase(),
    }
}

fn oracle_to_pg(oracle_type: &str) -> String {
    let lower = oracle_type.to_lowercase();

    if lower.starts_with("number(") {
        return number_to_pg(&lower);
    }
    if lower.starts_with("varchar2(") {
        return match first_length(&lower) {
            Some(n) => format!("VARCHAR({n})"),
            None => "VARCHAR".to_string(),
        };
    }
    if lower.starts_with("char(") {
        return match first_length(&lower) {
            Some(n) => format!("CHAR({n})"),
            None => "CHAR(1)".to_string(),
        };
    }

    match lower.as_str() {
        "number" => "NUMERIC".to_string(),
        "binary_float" => "REAL".to_string(),
        "binary_double" | "float" => "DOUBLE PRECISION".to_string(),
        "char" | "nchar" => "CHAR".to_string(),
        "varchar2" | "nvarchar2" => "VARCHAR".to_string(),
        "clob" | "nclob" => "TEXT".to_string(),
        "blob" | "raw" | "long raw" => "BYTEA".to_string(),
        "date" | "timestamp" => "TIMESTAMP".to_string(),
        "timestamp with time zone" | "timestamp with local time zone" => {
            "TIMESTAMP WITH TIME ZONE".to_string()
        }
        "interval year to month" | "interval day to second" => "INTERVAL".to_string(),
        "xmltype" => "XML".to_string(),
        "sdo_geometry" => "GEOMETRY".to_string(),
        "rowid" => "VARCHAR(18)".to_string(),
        "urowid" => "VARCHAR(4000)".to_string(),
        _ => oracle_type.to_uppercase(),
    }
}

/// Map Oracle `NUMBER(p[,s])` to the narrowest PostgreSQL type that holds it.
fn number_to_pg(lower: &str) -> String {
    let Some(params) = first_params(lower) else {
        return "NUMERIC".to_string();
    };

    let parts: Vec<&str> = params.split(',').map(str::trim).collect();
    match parts.as_slice() {
        [precision, scale] => {
            if *scale == "0" {
                bucket_precision(precision)
            } else {
                format!("NUMERIC({params})")
            }
        }
        [precision] => bucket_precision(precision),
        _ => "NUMERIC".to_string(),
    }
}

fn bucket_precision(precision: &str) -> String {
    match precision.parse::<u32>() {
        Ok(1) => "BOOLEAN".to_string(),
        Ok(p) if p <= 4 => "SMALLINT".to_string(),
        Ok(p) if p <= 9 => "INTEGER".to_string(),
        Ok(_) => "BIGINT".to_string(),
        Err(_) => "NUMERIC".to_string(),
    }
}

fn first_length(lower: &str) -> Option<String> {
    LENGTH_RE
        .captures(lower)
        .map(|caps| caps[1].to_string())
}

fn first_params(lower: &str) -> Option<String> {
    PARAMS_RE
        .captures(lower)
        .map(|caps| caps[1].to_string())
}
