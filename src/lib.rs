pub mod args;
pub mod config;
pub mod etl;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod store;
pub mod table;

use thiserror::Error;

pub use args::{Cli, PipelineArgs};
pub use config::PipelineConfig;
pub use metrics::PipelineMetrics;
pub use table::{Column, ColumnType, Table, Value};

#[derive(Debug, Error)]
pub enum EtlError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to open {path}: {source}")]
    Open {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("column '{column}' not found in {context}")]
    MissingColumn { column: String, context: String },

    #[error("duplicate column name: {0}")]
    DuplicateColumn(String),

    #[error("row {row}: expected {expected} fields, found {found}")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("key column '{column}' is {left} on the left but {right} on the right")]
    KeyTypeMismatch {
        column: String,
        left: ColumnType,
        right: ColumnType,
    },

    #[error("cannot derive category columns from an empty table")]
    EmptyTable,

    #[error("row {row}: categories field is missing or not text")]
    InvalidCategoryField { row: usize },

    #[error("row {row}: malformed category token '{token}'")]
    MalformedCategoryToken { row: usize, token: String },

    #[error("row {row}: category layout {found:?} does not match first row {expected:?}")]
    CategoryMismatch {
        row: usize,
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("row {row}: category '{name}' has non-integer value '{value}'")]
    InvalidCategoryValue {
        row: usize,
        name: String,
        value: String,
    },
}

// Result type for pipeline operations
pub type EtlResult<T> = Result<T, EtlError>;
