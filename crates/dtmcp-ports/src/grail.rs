//! Grail backend interface
//!
//! Defines the traits the query execution engine needs from the remote
//! data-scanning backend: submit, poll, and statement verification. This
//! enables testing the poll loop with mocks and keeps the engine free of
//! HTTP concerns.

use async_trait::async_trait;
use dtmcp_core::{ExecuteRequest, QueryPollResponse, QueryStartResponse, Result};
use serde::Deserialize;
use std::sync::Arc;

/// Thread-safe reference to a query executor
pub type GrailQueryExecutorRef = Arc<dyn GrailQueryExecutor + Send + Sync>;

/// Thread-safe reference to a query verifier
pub type GrailQueryVerifierRef = Arc<dyn GrailQueryVerifier + Send + Sync>;

/// Submission and polling against the Grail query execution endpoints.
///
/// `client_context` is a stable client-identifying string forwarded to the
/// backend for usage attribution; implementations must pass it on every call.
#[async_trait]
pub trait GrailQueryExecutor {
    /// Submit a query to the synchronous execute endpoint. The backend
    /// either answers immediately or hands back a continuation token.
    async fn submit_query(
        &self,
        request: &ExecuteRequest,
        client_context: &str,
    ) -> Result<QueryStartResponse>;

    /// Poll an in-flight execution by continuation token.
    async fn poll_query(
        &self,
        request_token: &str,
        client_context: &str,
    ) -> Result<QueryPollResponse>;
}

/// One notification from the verification endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyNotification {
    #[serde(default)]
    pub severity: String,
    #[serde(default)]
    pub message: String,
}

/// Outcome of verifying a DQL statement without executing it.
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyResponse {
    pub valid: bool,
    #[serde(default)]
    pub notifications: Vec<VerifyNotification>,
}

/// Statement verification. The engine itself never parses DQL; syntax
/// checking is delegated to this collaborator.
#[async_trait]
pub trait GrailQueryVerifier {
    async fn verify_query(&self, statement: &str) -> Result<VerifyResponse>;
}
