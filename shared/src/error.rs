use serde::{Serialize, Deserialize};
use std::fmt;
use thiserror::Error;

use crate::validation::ValidationError;

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum ErrorCode {
    #[error("Invalid input provided")]
    InvalidInput,
    #[error("Resource not found")]
    NotFound,
    #[error("Operation not authorized")]
    Unauthorized,
    #[error("Resource conflict")]
    Conflict,
    #[error("Internal system error")]
    SystemError,
    #[error("Validation failed")]
    ValidationFailed,
    #[error("Rate limit exceeded")]
    RateLimited,
}

/// Error body returned by the vote persistence service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(details) = &self.details {
            write!(f, "{}: {} ({})", self.code, self.message, details)
        } else {
            write!(f, "{}: {}", self.code, self.message)
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(code: ErrorCode, message: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Transport-level failure talking to the remote service.
    pub fn network(details: impl Into<String>) -> Self {
        Self::with_details(ErrorCode::SystemError, "Remote service unreachable", details)
    }

    /// Maps an HTTP status returned by the remote service onto an error code.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let code = match status {
            400 | 422 => ErrorCode::InvalidInput,
            401 | 403 => ErrorCode::Unauthorized,
            404 => ErrorCode::NotFound,
            409 => ErrorCode::Conflict,
            429 => ErrorCode::RateLimited,
            _ => ErrorCode::SystemError,
        };
        Self::new(code, message)
    }
}

impl From<ValidationError> for Error {
    fn from(e: ValidationError) -> Self {
        Self::with_details(ErrorCode::ValidationFailed, "Validation failed", e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
