//! Conversion from domain errors to MCP errors

use dtmcp_core::{Error, ErrorCategory};
use rmcp::ErrorData as McpError;

/// Extension trait mapping domain errors by their category: terminal errors
/// (budget, invalid input) become invalid-params, everything else becomes an
/// internal error the client may retry.
pub trait DomainToMcpResult<T> {
    fn mcp_domain(self) -> Result<T, McpError>;
}

impl<T> DomainToMcpResult<T> for Result<T, Error> {
    fn mcp_domain(self) -> Result<T, McpError> {
        self.map_err(|e| match e.category() {
            ErrorCategory::Terminal => McpError::invalid_params(e.to_string(), None),
            ErrorCategory::Retryable | ErrorCategory::Security => {
                McpError::internal_error(e.to_string(), None)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_exceeded_maps_to_invalid_params() {
        let result: Result<(), Error> = Err(Error::BudgetExceeded("over limit".to_string()));
        let err = result.mcp_domain().unwrap_err();
        assert!(err.message.contains("over limit"));
    }

    #[test]
    fn test_http_error_maps_to_internal_error() {
        let result: Result<(), Error> = Err(Error::Http {
            status: 503,
            message: "busy".to_string(),
        });
        let err = result.mcp_domain().unwrap_err();
        assert!(err.message.contains("HTTP 503"));
    }
}
