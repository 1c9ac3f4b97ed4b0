//! Error types for tabmerge operations

use thiserror::Error;

pub type Result<T> = std::result::Result<T, MergeError>;

#[derive(Error, Debug)]
pub enum MergeError {
    #[error("Cannot connect to store '{dsn}': {message}")]
    Connectivity { dsn: String, message: String },

    #[error("Schema error on table '{table}': {message}")]
    Schema { table: String, message: String },

    #[error("Failed to read table '{table}': {message}")]
    Read { table: String, message: String },

    #[error("Failed to write rows {first}-{last} into table '{table}': {message}")]
    Write {
        table: String,
        first: usize,
        last: usize,
        message: String,
    },

    #[error("Interactive input failed: {message}")]
    Input { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    #[error("Generic error: {0}")]
    Generic(#[from] anyhow::Error),
}

impl MergeError {
    pub fn connectivity(dsn: impl Into<String>, msg: impl ToString) -> Self {
        Self::Connectivity {
            dsn: dsn.into(),
            message: msg.to_string(),
        }
    }

    pub fn schema(table: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Schema {
            table: table.into(),
            message: msg.into(),
        }
    }

    pub fn read(table: impl Into<String>, msg: impl ToString) -> Self {
        Self::Read {
            table: table.into(),
            message: msg.to_string(),
        }
    }

    /// `first` and `last` are 1-based, inclusive record positions
    pub fn write(table: impl Into<String>, first: usize, last: usize, msg: impl ToString) -> Self {
        Self::Write {
            table: table.into(),
            first,
            last,
            message: msg.to_string(),
        }
    }

    pub fn input(msg: impl ToString) -> Self {
        Self::Input {
            message: msg.to_string(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Whether the run can continue after this error
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Input { .. })
    }
}
