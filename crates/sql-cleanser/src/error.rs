//! Error types for the cleanser library.

use thiserror::Error;

/// Main error type for cleanse/compare operations.
#[derive(Error, Debug)]
pub enum CleanseError {
    /// Configuration error (invalid YAML, out-of-range tunables, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unrecognized conversion direction token.
    ///
    /// This is a caller contract violation, not a degradation case: there is
    /// no sensible default direction to fall back to.
    #[error("Unsupported direction: {0} (expected 'pg2ora' or 'ora2pg')")]
    Direction(String),

    /// A row with mismatched column/value arity reached the converter.
    ///
    /// The parser discards such rows, so seeing one here means an upstream
    /// caller constructed a `Row` by hand and got it wrong.
    #[error("Row shape violation in table {table}: {columns} columns vs {values} values")]
    RowShape {
        table: String,
        columns: usize,
        values: usize,
    },

    /// IO error (file operations in the orchestration layer).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CleanseError {
    /// Create a RowShape error for a given table and arity pair.
    pub fn row_shape(table: impl Into<String>, columns: usize, values: usize) -> Self {
        CleanseError::RowShape {
            table: table.into(),
            columns,
            values,
        }
    }

    /// Process exit code for this error (used by the CLI).
    pub fn exit_code(&self) -> u8 {
        match self {
            CleanseError::Config(_) => 1,
            CleanseError::Direction(_) => 2,
            CleanseError::RowShape { .. } => 3,
            CleanseError::Yaml(_) => 1,
            CleanseError::Json(_) => 6,
            CleanseError::Io(_) => 7,
        }
    }

    /// Format error with full details including error chain.
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for cleanser operations.
pub type Result<T> = std::result::Result<T, CleanseError>;
