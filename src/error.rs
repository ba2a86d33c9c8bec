//! Error types for the logistics library
//!
//! Binaries wrap these in `anyhow`; the REST layer maps them to status codes.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LogisticsError {
    /// I/O errors (artifact files, uploads)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Tabular input that could not be parsed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Model bundle or payload decoding errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// User-supplied input rejected before any computation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Missing or inconsistent trained artifact
    #[error("Artifact error: {0}")]
    Artifact(String),

    /// Failure inside the assignment pipeline
    #[error("Processing error: {0}")]
    Processing(String),

    /// External pest classifier unreachable or misbehaving
    #[error("Classifier error: {0}")]
    Classifier(String),
}

impl LogisticsError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn artifact(msg: impl Into<String>) -> Self {
        Self::Artifact(msg.into())
    }

    pub fn processing(msg: impl Into<String>) -> Self {
        Self::Processing(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, LogisticsError>;
