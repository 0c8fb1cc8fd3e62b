//! Error types for the prp_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for prp_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required request field was absent
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// A dosage parameter failed a positivity check
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Request body was not a JSON object
    #[error("{0}")]
    MalformedRequest(String),

    /// A request value could not be coerced to a finite number
    #[error("Field '{field}' is not a number: {value}")]
    NonNumeric { field: String, value: String },

    /// A valid request produced a plan that cannot be represented
    #[error("{0}")]
    Calculation(String),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Transport status a collaborator should answer with.
    ///
    /// Caller mistakes map to 400. Anything else is an internal failure (500),
    /// including values that cannot be coerced to numbers.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::MissingField(_) | Error::InvalidInput(_) | Error::MalformedRequest(_) => 400,
            _ => 500,
        }
    }

    /// Whether this error was caused by the caller rather than the calculator
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_are_client_errors() {
        assert_eq!(Error::MissingField("thrombocytes".into()).status_code(), 400);
        assert_eq!(Error::InvalidInput("bad".into()).status_code(), 400);
        assert_eq!(Error::MalformedRequest("Invalid JSON data".into()).status_code(), 400);
    }

    #[test]
    fn test_non_numeric_is_internal() {
        let err = Error::NonNumeric {
            field: "prp_yield".into(),
            value: "\"abc\"".into(),
        };
        assert_eq!(err.status_code(), 500);
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_calculation_failure_is_internal() {
        assert_eq!(Error::Calculation("too many tubes".into()).status_code(), 500);
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(
            Error::MissingField("thrombocytes".into()).to_string(),
            "Missing required field: thrombocytes"
        );
        assert_eq!(
            Error::InvalidInput("PRP yield per tube must be greater than 0".into()).to_string(),
            "Invalid input: PRP yield per tube must be greater than 0"
        );
    }
}
