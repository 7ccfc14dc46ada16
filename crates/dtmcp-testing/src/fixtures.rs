//! Fixtures for scripting the mock Grail backend

use dtmcp_core::{
    GrailMetadata, QueryPollResponse, QueryResult, QueryResultMetadata, QueryStartResponse,
    QueryState,
};
use serde_json::json;

/// A completed result with one record and the given scanned-bytes figure.
pub fn result_with_scan(scanned_bytes: u64) -> QueryResult {
    QueryResult {
        records: vec![json!({"field1": "value1"})],
        types: None,
        metadata: Some(QueryResultMetadata {
            grail: Some(GrailMetadata {
                scanned_bytes: Some(scanned_bytes),
                scanned_records: Some(1),
                execution_time_milliseconds: Some(100),
                query_id: Some("test-query-id".to_string()),
                sampled: Some(false),
            }),
        }),
    }
}

/// A submit response that answers synchronously with the given result.
pub fn immediate_start(result: QueryResult) -> QueryStartResponse {
    QueryStartResponse {
        state: Some(QueryState::Succeeded),
        result: Some(result),
        request_token: None,
    }
}

/// A submit response that hands back a continuation token.
pub fn pending_start(token: &str) -> QueryStartResponse {
    QueryStartResponse {
        state: Some(QueryState::Running),
        result: None,
        request_token: Some(token.to_string()),
    }
}

/// A submit response violating the backend contract: neither result nor token.
pub fn invalid_start() -> QueryStartResponse {
    QueryStartResponse {
        state: Some(QueryState::Running),
        result: None,
        request_token: None,
    }
}

/// A poll response still in progress.
pub fn running_poll() -> QueryPollResponse {
    QueryPollResponse {
        state: QueryState::Running,
        result: None,
    }
}

/// A poll response that has not started yet.
pub fn not_started_poll() -> QueryPollResponse {
    QueryPollResponse {
        state: QueryState::NotStarted,
        result: None,
    }
}

/// A terminal poll response carrying the result.
pub fn finished_poll(result: QueryResult) -> QueryPollResponse {
    QueryPollResponse {
        state: QueryState::Succeeded,
        result: Some(result),
    }
}

/// A terminal poll response without a result (inconclusive execution).
pub fn failed_poll() -> QueryPollResponse {
    QueryPollResponse {
        state: QueryState::Failed,
        result: None,
    }
}
