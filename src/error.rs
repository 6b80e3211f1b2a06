//! Error types for promptbatch.
//!
//! All errors are represented by the `PromptBatchError` enum. Startup errors
//! (config, template, input) are fatal; `Http` errors are reported per record.

use thiserror::Error;

/// Unified error type for all promptbatch operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PromptBatchError {
    /// Configuration parsing or validation errors.
    #[error("{0}")]
    Config(String),

    /// Workflow template loading errors.
    #[error("{0}")]
    Workflow(String),

    /// Tabular input reading errors.
    #[error("{0}")]
    Input(String),

    /// Submission errors: transport failures and non-success statuses.
    #[error("{0}")]
    Http(String),
}

impl From<toml::de::Error> for PromptBatchError {
    fn from(error: toml::de::Error) -> Self {
        PromptBatchError::Config(error.to_string())
    }
}

impl From<csv::Error> for PromptBatchError {
    fn from(error: csv::Error) -> Self {
        PromptBatchError::Input(error.to_string())
    }
}
