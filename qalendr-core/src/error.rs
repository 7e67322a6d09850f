//! Error types for the qalendr engine.

use thiserror::Error;

/// Errors that can occur during event derivation and ICS generation.
#[derive(Error, Debug)]
pub enum QalendrError {
    #[error("Unknown date pattern: {0}")]
    UnknownPattern(String),

    #[error("No {category} data available for {scope}")]
    MissingData {
        category: &'static str,
        scope: String,
    },

    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    #[error("Data table parse error: {0}")]
    DataParse(#[from] serde_json::Error),
}

/// Result type alias for qalendr operations.
pub type QalendrResult<T> = Result<T, QalendrError>;
