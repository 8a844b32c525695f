//! Error types for the ThermoHub client.
//!
//! This module defines all error types using `thiserror` for ergonomic error handling.
//! Each error variant carries enough context for a caller (or the CLI) to tell the
//! user what went wrong and what to check next.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HubError {
    #[error("Configuration error: {message}")]
    Configuration { message: String, suggestion: String },

    #[error("ThermoDataSet '{dataset}' was not found")]
    DatasetNotFound { dataset: String },

    #[error("Connection failed: {message}")]
    Connection { message: String, suggestion: String },

    #[error("Persistence error: {message} (path: {path})")]
    Persistence { message: String, path: String },

    #[error("Query error: {message}")]
    Query {
        message: String,
        /// ArangoDB `errorNum`, e.g. 1501 for an AQL syntax error
        error_num: Option<u32>,
    },

    #[error("Timeout: {operation} exceeded {elapsed_secs}s")]
    Timeout {
        operation: String,
        elapsed_secs: u64,
    },

    #[error("Unexpected response: {message}")]
    Decode { message: String },

    #[error("Formula '{formula}': {reason}")]
    Formula { formula: String, reason: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },
}

impl HubError {
    /// Create a configuration error with a helpful suggestion.
    pub fn configuration(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Create a dataset not found error.
    pub fn dataset_not_found(dataset: impl Into<String>) -> Self {
        Self::DatasetNotFound {
            dataset: dataset.into(),
        }
    }

    /// Create a connection error with a helpful suggestion.
    pub fn connection(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Create a persistence error for the given local path.
    pub fn persistence(message: impl Into<String>, path: impl Into<String>) -> Self {
        Self::Persistence {
            message: message.into(),
            path: path.into(),
        }
    }

    /// Create a query error with an optional ArangoDB error number.
    pub fn query(message: impl Into<String>, error_num: Option<u32>) -> Self {
        Self::Query {
            message: message.into(),
            error_num,
        }
    }

    /// Create a timeout error.
    pub fn timeout(operation: impl Into<String>, elapsed_secs: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            elapsed_secs,
        }
    }

    /// Create a decode error.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create a formula parsing error.
    pub fn formula(formula: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Formula {
            formula: formula.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Get the suggestion for this error, if available.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Configuration { suggestion, .. } => Some(suggestion),
            Self::Connection { suggestion, .. } => Some(suggestion),
            Self::DatasetNotFound { .. } => {
                Some("Run `thermohub datasets` to list the available ThermoDataSet symbols")
            }
            Self::Timeout { .. } => Some("Consider increasing the timeout"),
            _ => None,
        }
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connection { .. } | Self::Timeout { .. })
    }
}

/// Convert reqwest errors to HubError.
///
/// Request timeouts become [`HubError::Timeout`] in `ArangoConnection`, which knows the
/// configured limit; here they are plain connection failures.
impl From<reqwest::Error> for HubError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() {
            HubError::connection(
                format!("Cannot reach ThermoHub server: {}", err),
                "Check network connectivity and the DB_URL in the connection configuration",
            )
        } else if err.is_decode() {
            HubError::decode(format!("Invalid response body: {}", err))
        } else if err.is_builder() {
            HubError::configuration(
                format!("Cannot build HTTP client: {}", err),
                "Check the DB_URL and TLS settings",
            )
        } else {
            HubError::connection(
                format!("Request failed: {}", err),
                "Check ThermoHub server status",
            )
        }
    }
}

/// Result type alias for ThermoHub operations.
pub type HubResult<T> = Result<T, HubError>;
