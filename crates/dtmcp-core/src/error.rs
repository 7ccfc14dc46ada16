//! Error types for the Dynatrace MCP domain

use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

// ============================================================================
// Error Codes - Machine-readable codes for API consumers
// ============================================================================

/// Machine-readable error codes.
///
/// Error code ranges:
/// - 1xxx: Budget errors
/// - 2xxx: Query errors
/// - 3xxx: Config errors
/// - 5xxx: Infrastructure errors
/// - 6xxx: Auth errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "u16")]
pub enum ErrorCode {
    /// Session scan budget exhausted (1001)
    BudgetExceeded = 1001,

    /// Query rejected by the verification endpoint (2001)
    QueryInvalid = 2001,

    /// Invalid configuration (3001)
    ConfigInvalid = 3001,

    /// HTTP call to the Dynatrace platform failed (5001)
    HttpError = 5001,
    /// Serialization error (5004)
    SerializationError = 5004,

    /// Authentication failed (6001)
    Unauthorized = 6001,
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code as u16
    }
}

/// Error categorization for client retry handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    /// Temporary failure, safe to retry (gateway timeout, busy backend)
    Retryable,
    /// Permanent failure, don't retry (invalid input, budget exhausted)
    Terminal,
    /// Security-related, may need re-authentication
    Security,
}

impl ErrorCategory {
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCategory::Retryable)
    }
}

impl ErrorCode {
    pub fn as_u16(self) -> u16 {
        self as u16
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ErrorCode::HttpError => ErrorCategory::Retryable,
            ErrorCode::BudgetExceeded
            | ErrorCode::QueryInvalid
            | ErrorCode::ConfigInvalid
            | ErrorCode::SerializationError => ErrorCategory::Terminal,
            ErrorCode::Unauthorized => ErrorCategory::Security,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ErrorCode::BudgetExceeded => "BUDGET_EXCEEDED",
            ErrorCode::QueryInvalid => "QUERY_INVALID",
            ErrorCode::ConfigInvalid => "CONFIG_INVALID",
            ErrorCode::HttpError => "HTTP_ERROR",
            ErrorCode::SerializationError => "SERIALIZATION_ERROR",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
        }
    }
}

// ============================================================================
// Domain Error
// ============================================================================

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Hard failure raised before submission when the session budget gate is
    /// closed. Carries the user-facing budget warning text.
    #[error("Grail query budget exceeded: {0}")]
    BudgetExceeded(String),

    #[error("Invalid DQL statement: {0}")]
    QueryInvalid(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// HTTP failure from the Dynatrace platform. Status 0 means the request
    /// never produced a response (connect error, timeout).
    #[error("Dynatrace API error (HTTP {status}): {message}")]
    Http { status: u16, message: String },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Authentication failed: {0}")]
    Unauthorized(String),
}

impl Error {
    /// Get the machine-readable error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::BudgetExceeded(_) => ErrorCode::BudgetExceeded,
            Error::QueryInvalid(_) => ErrorCode::QueryInvalid,
            Error::InvalidConfig(_) => ErrorCode::ConfigInvalid,
            Error::Http { .. } => ErrorCode::HttpError,
            Error::Serialization(_) => ErrorCode::SerializationError,
            Error::Unauthorized(_) => ErrorCode::Unauthorized,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        self.code().category()
    }

    pub fn is_retryable(&self) -> bool {
        self.category().is_retryable()
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::BudgetExceeded("limit reached".to_string());
        assert_eq!(
            err.to_string(),
            "Grail query budget exceeded: limit reached"
        );
    }

    #[test]
    fn test_error_code_budget_exceeded() {
        let err = Error::BudgetExceeded("limit reached".to_string());
        assert_eq!(err.code(), ErrorCode::BudgetExceeded);
        assert_eq!(err.code().as_u16(), 1001);
        assert_eq!(err.code().name(), "BUDGET_EXCEEDED");
        assert_eq!(err.category(), ErrorCategory::Terminal);
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_error_category_http_retryable() {
        let err = Error::Http {
            status: 503,
            message: "service unavailable".to_string(),
        };
        assert!(err.is_retryable());
    }

    #[test]
    fn test_error_code_serialization() {
        let code = ErrorCode::BudgetExceeded;
        let json = serde_json::to_string(&code).unwrap();
        assert_eq!(json, "1001");
    }
}
