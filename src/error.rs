//! Error types for phishnet
//!
//! Library functions return [`PhishError`]; the binary wraps them in
//! `anyhow` at the CLI boundary.

use thiserror::Error;

/// Errors that can occur while extracting, training or classifying
#[derive(Error, Debug)]
pub enum PhishError {
    /// The URL does not start with `http://` or `https://`
    #[error("Invalid URL: {url:?} (expected an http:// or https:// prefix)")]
    InvalidInput { url: String },

    #[error("Unknown feature name: {0}")]
    UnknownFeature(String),

    #[error("Feature listed twice in schema: {0}")]
    DuplicateFeature(String),

    /// Vector or table was built against a different schema than the model
    #[error("Feature schema mismatch: model expects {expected}, got {found}")]
    SchemaMismatch { expected: String, found: String },

    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("Training failed: {0}")]
    Training(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type PhishResult<T> = Result<T, PhishError>;
