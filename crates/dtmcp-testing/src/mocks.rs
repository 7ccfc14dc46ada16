//! Mock Grail backend implementations
//!
//! The mocks are scripted: tests enqueue the responses the backend should
//! return, then assert on invocation counts afterwards.

use async_trait::async_trait;
use dtmcp_core::{Error, ExecuteRequest, QueryPollResponse, QueryStartResponse, Result};
use dtmcp_ports::{GrailQueryExecutor, GrailQueryVerifier, VerifyResponse};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// A scripted Grail backend for testing the query execution engine.
///
/// # Example
///
/// ```no_run
/// use dtmcp_testing::{fixtures, MockGrailExecutor};
///
/// let backend = MockGrailExecutor::new();
/// backend.script_submit(fixtures::pending_start("token-1"));
/// backend.script_poll(fixtures::running_poll());
/// backend.script_poll(fixtures::finished_poll(fixtures::result_with_scan(1000)));
/// ```
#[derive(Debug, Default)]
pub struct MockGrailExecutor {
    submit_responses: Mutex<VecDeque<QueryStartResponse>>,
    poll_responses: Mutex<VecDeque<QueryPollResponse>>,
    submit_count: AtomicUsize,
    poll_count: AtomicUsize,
    last_context: Mutex<Option<String>>,
    last_request: Mutex<Option<ExecuteRequest>>,
}

impl MockGrailExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a response for the next `submit_query` call.
    pub fn script_submit(&self, response: QueryStartResponse) {
        self.submit_responses.lock().unwrap().push_back(response);
    }

    /// Enqueue a response for the next `poll_query` call.
    pub fn script_poll(&self, response: QueryPollResponse) {
        self.poll_responses.lock().unwrap().push_back(response);
    }

    /// Number of `submit_query` invocations.
    pub fn submit_count(&self) -> usize {
        self.submit_count.load(Ordering::SeqCst)
    }

    /// Number of `poll_query` invocations.
    pub fn poll_count(&self) -> usize {
        self.poll_count.load(Ordering::SeqCst)
    }

    /// The client context string passed on the most recent call.
    pub fn last_context(&self) -> Option<String> {
        self.last_context.lock().unwrap().clone()
    }

    /// The request body passed to the most recent `submit_query`.
    pub fn last_request(&self) -> Option<ExecuteRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl GrailQueryExecutor for MockGrailExecutor {
    async fn submit_query(
        &self,
        request: &ExecuteRequest,
        client_context: &str,
    ) -> Result<QueryStartResponse> {
        self.submit_count.fetch_add(1, Ordering::SeqCst);
        *self.last_context.lock().unwrap() = Some(client_context.to_string());
        *self.last_request.lock().unwrap() = Some(request.clone());
        self.submit_responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| Error::Http {
                status: 0,
                message: "mock: no submit response scripted".to_string(),
            })
    }

    async fn poll_query(
        &self,
        _request_token: &str,
        client_context: &str,
    ) -> Result<QueryPollResponse> {
        self.poll_count.fetch_add(1, Ordering::SeqCst);
        *self.last_context.lock().unwrap() = Some(client_context.to_string());
        self.poll_responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| Error::Http {
                status: 0,
                message: "mock: no poll response scripted".to_string(),
            })
    }
}

/// A scripted verification endpoint.
#[derive(Debug, Default)]
pub struct MockGrailVerifier {
    responses: Mutex<VecDeque<VerifyResponse>>,
    verify_count: AtomicUsize,
}

impl MockGrailVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script_verify(&self, response: VerifyResponse) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn verify_count(&self) -> usize {
        self.verify_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GrailQueryVerifier for MockGrailVerifier {
    async fn verify_query(&self, _statement: &str) -> Result<VerifyResponse> {
        self.verify_count.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| Error::Http {
                status: 0,
                message: "mock: no verify response scripted".to_string(),
            })
    }
}
