//! Error types for table loading and resolution.

use std::path::PathBuf;

/// Alias for `Result<T, TableError>`.
pub type TableResult<T> = Result<T, TableError>;

/// Errors that can occur while loading, validating, or rolling on tables.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// No definition file exists for the requested table name.
    #[error("table not found: {0}")]
    TableNotFound(String),

    /// The definition is structurally malformed.
    #[error("invalid table \"{table}\": {reason}")]
    InvalidTable {
        /// Table name (or file stem when the name is unknown).
        table: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A column has neither a name nor a table reference.
    #[error("invalid column {index} in table \"{table}\": needs a name or a table")]
    InvalidColumn {
        /// Table the column belongs to.
        table: String,
        /// Zero-based column position.
        index: usize,
    },

    /// A repeat count did not evaluate to a non-negative integer.
    #[error("invalid quantity \"{value}\" in table \"{table}\"")]
    InvalidQuantity {
        /// Table the quantity belongs to.
        table: String,
        /// The evaluated quantity.
        value: String,
    },

    /// The configured data directory does not exist.
    #[error("data directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    /// A weighted draw fell outside the table's rows.
    ///
    /// Load-time validation makes this unreachable for stored tables.
    #[error("row index out of bounds in \"{table}\": index {index}, total weight {total_weight}")]
    RowIndexOutOfBounds {
        /// Table being rolled on.
        table: String,
        /// The drawn index.
        index: u32,
        /// The table's declared total weight.
        total_weight: u32,
    },

    /// Table references nest deeper than the engine allows.
    #[error("table references nest too deep at \"{table}\" (depth {depth}); is there a cycle?")]
    CyclicReference {
        /// Table that was about to be resolved.
        table: String,
        /// Nesting depth reached.
        depth: usize,
    },

    /// A definition could not be parsed.
    #[error("cannot parse {origin}: {reason}")]
    Parse {
        /// File path or other description of where the text came from.
        origin: String,
        /// Parser message.
        reason: String,
    },

    /// A definition could not be serialized.
    #[error("cannot write table definition: {0}")]
    Write(String),

    /// Reading from the data directory failed.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        /// File or directory being read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A line of conversion input could not be turned into a row.
    #[error("line {line}: {reason}")]
    Convert {
        /// One-based input line number.
        line: usize,
        /// What is wrong with it.
        reason: String,
    },
}

impl TableError {
    /// Shorthand for an [`TableError::InvalidTable`] error.
    pub fn invalid(table: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidTable {
            table: table.into(),
            reason: reason.into(),
        }
    }
}
