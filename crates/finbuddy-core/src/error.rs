use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single form field that failed validation, with the message shown
/// next to the field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: &str) -> Self {
        FieldError {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum FinBuddyError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Validation failed: {}", describe_field_errors(.0))]
    ValidationFailed(Vec<FieldError>),

    #[error("Financial impossibility: {0}")]
    FinancialImpossibility(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

fn describe_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{} ({})", e.message, e.field))
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<serde_json::Error> for FinBuddyError {
    fn from(e: serde_json::Error) -> Self {
        FinBuddyError::SerializationError(e.to_string())
    }
}

impl From<std::io::Error> for FinBuddyError {
    fn from(e: std::io::Error) -> Self {
        FinBuddyError::Export(e.to_string())
    }
}

#[cfg(feature = "export")]
impl From<csv::Error> for FinBuddyError {
    fn from(e: csv::Error) -> Self {
        FinBuddyError::Export(e.to_string())
    }
}
