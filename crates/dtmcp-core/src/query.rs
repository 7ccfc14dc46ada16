//! Grail query wire shapes
//!
//! Request and response types for the Grail query execution endpoints. The
//! DQL statement itself is opaque to this crate - it is forwarded as-is and
//! never parsed or validated here (verification is a separate backend
//! endpoint).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Request body for query execution. Immutable once submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteRequest {
    /// The DQL statement, forwarded verbatim
    pub query: String,
    /// Cap on the number of result records
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_result_records: Option<u64>,
    /// Cap on the result payload size in bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_result_bytes: Option<u64>,
}

impl ExecuteRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            max_result_records: None,
            max_result_bytes: None,
        }
    }

    pub fn with_limits(mut self, max_records: u64, max_bytes: u64) -> Self {
        self.max_result_records = Some(max_records);
        self.max_result_bytes = Some(max_bytes);
        self
    }
}

/// Execution state reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueryState {
    NotStarted,
    Running,
    Succeeded,
    Failed,
    Cancelled,
    /// Any state this client does not know about
    #[serde(other)]
    Unknown,
}

impl QueryState {
    /// True while the backend is still working and polling should continue.
    pub fn is_in_progress(&self) -> bool {
        matches!(self, QueryState::Running | QueryState::NotStarted)
    }
}

impl fmt::Display for QueryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            QueryState::NotStarted => "NOT_STARTED",
            QueryState::Running => "RUNNING",
            QueryState::Succeeded => "SUCCEEDED",
            QueryState::Failed => "FAILED",
            QueryState::Cancelled => "CANCELLED",
            QueryState::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

/// Grail cost/performance facts attached to a completed result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrailMetadata {
    pub scanned_bytes: Option<u64>,
    pub scanned_records: Option<u64>,
    pub execution_time_milliseconds: Option<u64>,
    pub query_id: Option<String>,
    pub sampled: Option<bool>,
}

/// Metadata envelope on a query result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResultMetadata {
    pub grail: Option<GrailMetadata>,
}

/// A completed query result: records plus cost metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    #[serde(default)]
    pub records: Vec<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub types: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<QueryResultMetadata>,
}

impl QueryResult {
    /// Extract the scan metadata for one completed execution.
    ///
    /// `scanned_bytes` of `Some(0)` means the query touched no data, which is
    /// distinct from `None` (backend did not report a figure).
    pub fn scan_metadata(&self) -> ScanMetadata {
        let grail = self
            .metadata
            .as_ref()
            .and_then(|m| m.grail.as_ref())
            .cloned()
            .unwrap_or_default();
        ScanMetadata {
            scanned_bytes: grail.scanned_bytes,
            scanned_records: grail.scanned_records,
            execution_time_ms: grail.execution_time_milliseconds,
            query_id: grail.query_id,
            sampled: grail.sampled.unwrap_or(false),
        }
    }
}

/// Cost/performance facts about one completed execution. Produced once per
/// completed query; read-only afterward.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanMetadata {
    pub scanned_bytes: Option<u64>,
    pub scanned_records: Option<u64>,
    pub execution_time_ms: Option<u64>,
    pub query_id: Option<String>,
    pub sampled: bool,
}

/// Response from the synchronous execute endpoint.
///
/// The backend either answers immediately (`result` present) or hands back a
/// continuation token for polling. Use [`into_outcome`](Self::into_outcome)
/// to get the explicit, exhaustively matchable variant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryStartResponse {
    pub state: Option<QueryState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<QueryResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_token: Option<String>,
}

/// The synchronous-vs-asynchronous submission race, made explicit.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The scan completed synchronously; no polling needed
    Immediate(QueryResult),
    /// The backend requires polling with this continuation token
    Pending(String),
    /// Backend contract violation: neither a result nor a token
    Invalid,
}

impl QueryStartResponse {
    pub fn into_outcome(self) -> SubmitOutcome {
        match (self.result, self.request_token) {
            (Some(result), _) => SubmitOutcome::Immediate(result),
            (None, Some(token)) => SubmitOutcome::Pending(token),
            (None, None) => SubmitOutcome::Invalid,
        }
    }
}

/// Response from the poll endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryPollResponse {
    pub state: QueryState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<QueryResult>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_execute_request_serializes_camel_case() {
        let request = ExecuteRequest::new("fetch logs").with_limits(5000, 5_000_000);
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "query": "fetch logs",
                "maxResultRecords": 5000,
                "maxResultBytes": 5_000_000,
            })
        );
    }

    #[test]
    fn test_execute_request_omits_absent_limits() {
        let request = ExecuteRequest::new("fetch logs");
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value, json!({ "query": "fetch logs" }));
    }

    #[test]
    fn test_submit_outcome_prefers_immediate_result() {
        let response = QueryStartResponse {
            state: Some(QueryState::Succeeded),
            result: Some(QueryResult::default()),
            request_token: Some("token".to_string()),
        };
        assert!(matches!(
            response.into_outcome(),
            SubmitOutcome::Immediate(_)
        ));
    }

    #[test]
    fn test_submit_outcome_pending_and_invalid() {
        let pending = QueryStartResponse {
            state: Some(QueryState::Running),
            result: None,
            request_token: Some("abc".to_string()),
        };
        assert_eq!(
            pending.into_outcome(),
            SubmitOutcome::Pending("abc".to_string())
        );

        let invalid = QueryStartResponse::default();
        assert_eq!(invalid.into_outcome(), SubmitOutcome::Invalid);
    }

    #[test]
    fn test_poll_response_deserializes_backend_states() {
        let poll: QueryPollResponse =
            serde_json::from_value(json!({ "state": "NOT_STARTED" })).unwrap();
        assert_eq!(poll.state, QueryState::NotStarted);
        assert!(poll.state.is_in_progress());

        let poll: QueryPollResponse =
            serde_json::from_value(json!({ "state": "SOMETHING_NEW" })).unwrap();
        assert_eq!(poll.state, QueryState::Unknown);
        assert!(!poll.state.is_in_progress());
    }

    #[test]
    fn test_scan_metadata_extraction() {
        let result: QueryResult = serde_json::from_value(json!({
            "records": [{"field1": "value1"}],
            "metadata": {
                "grail": {
                    "scannedBytes": 1000,
                    "scannedRecords": 1,
                    "executionTimeMilliseconds": 100,
                    "queryId": "q-1",
                    "sampled": true
                }
            }
        }))
        .unwrap();

        let meta = result.scan_metadata();
        assert_eq!(meta.scanned_bytes, Some(1000));
        assert_eq!(meta.scanned_records, Some(1));
        assert_eq!(meta.execution_time_ms, Some(100));
        assert_eq!(meta.query_id.as_deref(), Some("q-1"));
        assert!(meta.sampled);
    }

    #[test]
    fn test_scan_metadata_zero_bytes_is_not_unknown() {
        let with_zero: QueryResult = serde_json::from_value(json!({
            "records": [],
            "metadata": { "grail": { "scannedBytes": 0 } }
        }))
        .unwrap();
        assert_eq!(with_zero.scan_metadata().scanned_bytes, Some(0));

        let without = QueryResult::default();
        assert_eq!(without.scan_metadata().scanned_bytes, None);
    }
}
