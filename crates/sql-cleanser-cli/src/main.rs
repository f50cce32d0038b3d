//! sql-cleanser CLI - SQL data cleansing and cross-dialect conversion.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{info, Level};
use tracing_subscriber::fmt::format::FmtSpan;

use sql_cleanser::advisor::{resolve_explanation, resolve_primary_key};
use sql_cleanser::core::{group_by_table, merge_primary_keys, PrimaryKeyMap};
use sql_cleanser::dedup::detect_duplicates;
use sql_cleanser::dialect::{
    missing_records_file_name, render_missing_records_script, render_table_script,
    script_file_name,
};
use sql_cleanser::diff::diff;
use sql_cleanser::order::order_row_set;
use sql_cleanser::parse::parse_statements;
use sql_cleanser::report::{
    analysis_report_markdown, diff_report_markdown, fallback_migration_plan,
    migration_plan_markdown, table_summary_markdown, TableAnalysis,
};
use sql_cleanser::{CleanseError, Config, Direction, NoAdvisor, Row, RowSet};

#[derive(Parser)]
#[command(name = "sql-cleanser")]
#[command(about = "SQL data cleansing and PostgreSQL/Oracle conversion")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Output JSON result to stdout
    #[arg(long)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse, deduplicate, and convert a directory of INSERT dumps
    Cleanse {
        /// Directory containing .sql/.txt input files
        #[arg(long)]
        input: PathBuf,

        /// Output directory for converted scripts and reports
        #[arg(long)]
        out: PathBuf,

        /// Conversion direction: pg2ora or ora2pg
        #[arg(long, default_value = "pg2ora")]
        direction: String,
    },

    /// Diff two directories of INSERT dumps and emit reconciliation output
    Compare {
        /// Directory containing the source-side dumps
        #[arg(long)]
        base: PathBuf,

        /// Directory containing the target-side dumps
        #[arg(long)]
        target: PathBuf,

        /// Output directory for diff artifacts
        #[arg(long)]
        out: PathBuf,

        /// Conversion direction: pg2ora or ora2pg
        #[arg(long, default_value = "pg2ora")]
        direction: String,
    },
}

#[derive(Serialize)]
struct CleanseSummary {
    direction: String,
    tables: usize,
    rows: usize,
    duplicates_removed: usize,
    cyclic_fallback: bool,
}

#[derive(Serialize)]
struct CompareSummary {
    direction: String,
    tables: usize,
    missing_in_target: usize,
    extra_in_target: usize,
    mismatches: usize,
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

fn run() -> Result<(), CleanseError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format)
        .map_err(|e| CleanseError::Config(e.to_string()))?;

    // A missing config file at the default path means "use defaults"; an
    // explicit file must parse and validate.
    let config = if cli.config.exists() {
        let config = Config::load(&cli.config)?;
        config.validate()?;
        info!("Loaded configuration from {:?}", cli.config);
        config
    } else {
        Config::default()
    };

    match cli.command {
        Commands::Cleanse {
            input,
            out,
            direction,
        } => {
            let direction: Direction = direction.parse()?;
            let summary = run_cleanse(&input, &out, direction, &config)?;

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("Cleanse completed!");
                println!("  Direction: {}", summary.direction);
                println!("  Tables: {}", summary.tables);
                println!("  Rows written: {}", summary.rows);
                println!("  Duplicates removed: {}", summary.duplicates_removed);
                if summary.cyclic_fallback {
                    println!("  Note: dependency cycle detected; used name order");
                }
            }
        }

        Commands::Compare {
            base,
            target,
            out,
            direction,
        } => {
            let direction: Direction = direction.parse()?;
            let summary = run_compare(&base, &target, &out, direction, &config)?;

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("Compare completed!");
                println!("  Direction: {}", summary.direction);
                println!("  Tables: {}", summary.tables);
                println!("  Missing in target: {}", summary.missing_in_target);
                println!("  Extra in target: {}", summary.extra_in_target);
                println!("  Mismatches: {}", summary.mismatches);
            }
        }
    }

    Ok(())
}

fn run_cleanse(
    input: &Path,
    out: &Path,
    direction: Direction,
    config: &Config,
) -> Result<CleanseSummary, CleanseError> {
    let rows = parse_directory(input)?;
    let row_set = group_by_table(rows);
    let keys = resolve_keys(&row_set, config);
    let order = order_row_set(&row_set);

    fs::create_dir_all(out)?;

    let mut analyses = Vec::new();
    let mut rows_written = 0usize;
    let mut duplicates_removed = 0usize;

    // Walk in dependency order so the reports read the way the scripts load.
    for table in &order.tables {
        let Some(rows) = row_set.get(table) else {
            continue;
        };
        let key = &keys[table];
        let report = detect_duplicates(rows, &key.columns, &config.data_quality, &NoAdvisor);

        let script = render_table_script(table, &report.canonical, direction)?;
        fs::write(out.join(script_file_name(table, direction)), script)?;

        rows_written += report.canonical.len();
        duplicates_removed += report.duplicates.len();
        analyses.push(TableAnalysis {
            table: table.clone(),
            row_count: report.canonical.len(),
            primary_key: key.clone(),
            duplicate_count: report.duplicates.len(),
            source_files: source_files(rows),
        });
        info!(
            table = %table,
            rows = report.canonical.len(),
            duplicates = report.duplicates.len(),
            "table cleansed"
        );
    }

    let order_issues = usize::from(order.cyclic_fallback);
    let samples: Vec<Row> = row_set
        .values()
        .flat_map(|rows| rows.iter().take(1).cloned())
        .take(config.processing.max_sample_rows)
        .collect();
    let explanation =
        resolve_explanation(&NoAdvisor, duplicates_removed, order_issues, &samples);

    fs::write(
        out.join("analysis_report.md"),
        analysis_report_markdown(&analyses, &explanation),
    )?;
    fs::write(
        out.join("table_summary.md"),
        table_summary_markdown(&analyses),
    )?;

    Ok(CleanseSummary {
        direction: direction.to_string(),
        tables: analyses.len(),
        rows: rows_written,
        duplicates_removed,
        cyclic_fallback: order.cyclic_fallback,
    })
}

fn run_compare(
    base: &Path,
    target: &Path,
    out: &Path,
    direction: Direction,
    config: &Config,
) -> Result<CompareSummary, CleanseError> {
    let base_set = group_by_table(parse_directory(base)?);
    let target_set = group_by_table(parse_directory(target)?);

    // Target-side keys take precedence: the target schema is the one being
    // reconciled against.
    let keys = merge_primary_keys(
        resolve_keys(&base_set, config),
        resolve_keys(&target_set, config),
    );

    let result = diff(&base_set, &target_set, &keys, direction);
    let order = order_row_set(&base_set);

    fs::create_dir_all(out)?;

    fs::write(out.join("diff.json"), serde_json::to_string_pretty(&result)?)?;
    fs::write(out.join("diff_report.md"), diff_report_markdown(&result))?;

    let plan = fallback_migration_plan(&result);
    fs::write(
        out.join("migration_plan.json"),
        serde_json::to_string_pretty(&plan)?,
    )?;
    fs::write(out.join("migration_plan.md"), migration_plan_markdown(&plan))?;

    fs::write(
        out.join(missing_records_file_name(direction)),
        render_missing_records_script(&result, &order)?,
    )?;

    info!(
        missing = result.summary.total_missing,
        extra = result.summary.total_extra,
        mismatches = result.summary.total_mismatches,
        "comparison finished"
    );

    Ok(CompareSummary {
        direction: direction.to_string(),
        tables: result.tables.len(),
        missing_in_target: result.summary.total_missing,
        extra_in_target: result.summary.total_extra,
        mismatches: result.summary.total_mismatches,
    })
}

/// Parse every `.sql`/`.txt` file in a directory, in sorted name order.
fn parse_directory(dir: &Path) -> Result<Vec<Row>, CleanseError> {
    if !dir.is_dir() {
        return Err(CleanseError::Config(format!(
            "Input directory not found: {:?}",
            dir
        )));
    }

    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("sql") || ext.eq_ignore_ascii_case("txt"))
        })
        .collect();
    paths.sort();

    let mut rows = Vec::new();
    for path in &paths {
        let text = fs::read_to_string(path)?;
        let parsed = parse_statements(&text, path);
        info!(file = %path.display(), rows = parsed.len(), "parsed input file");
        rows.extend(parsed);
    }
    Ok(rows)
}

/// Resolve a primary key per table through the advisor chain.
fn resolve_keys(row_set: &RowSet, config: &Config) -> PrimaryKeyMap {
    let mut keys = BTreeMap::new();
    for (table, rows) in row_set {
        let columns = rows.first().map(|r| r.columns.clone()).unwrap_or_default();
        let sample_len = rows.len().min(config.processing.max_sample_rows);
        let key = resolve_primary_key(&NoAdvisor, &columns, &rows[..sample_len]);
        keys.insert(table.clone(), key);
    }
    keys
}

/// Distinct source files for a table's rows, in first-seen order.
fn source_files(rows: &[Row]) -> Vec<String> {
    let mut files = Vec::new();
    for row in rows {
        let name = row.provenance.file.display().to_string();
        if !files.contains(&name) {
            files.push(name);
        }
    }
    files
}

fn setup_logging(verbosity: &str, format: &str) -> Result<(), String> {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(std::io::stderr);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    Ok(())
}
