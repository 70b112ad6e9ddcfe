//! Error types for Steward

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Insufficient data for {field}: {reason}")]
    InsufficientData { field: &'static str, reason: String },

    #[error("Invalid input for {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("Narrative service unavailable: {0}")]
    NarrativeUnavailable(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn insufficient_data(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InsufficientData {
            field,
            reason: reason.into(),
        }
    }

    pub fn invalid_input(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    /// Taxonomy tag for structured error reporting
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InsufficientData { .. } => "insufficient_data",
            Self::InvalidInput { .. } => "invalid_input",
            Self::NarrativeUnavailable(_) => "narrative_unavailable",
            Self::Http(_) => "http",
            Self::Json(_) => "json",
        }
    }

    /// The offending input field, when the error names one
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::InsufficientData { field, .. } | Self::InvalidInput { field, .. } => Some(field),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
