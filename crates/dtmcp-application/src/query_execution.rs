//! Grail query execution engine
//!
//! Submits a DQL statement to the Grail execute endpoint, resolves the
//! synchronous-vs-asynchronous race, drives the poll loop to a terminal
//! outcome, and settles the session scan budget.
//!
//! Failure semantics are asymmetric on purpose: an exhausted budget is a hard
//! error raised *before* submission, while "the query produced no usable
//! result" (inconclusive polling, backend contract violation) is logged and
//! surfaced as `Ok(None)` so callers can render a graceful "no data" message
//! instead of an error banner. Network errors from submit or poll propagate
//! unmodified.

use dtmcp_core::{
    budget_exhausted_message, generate_budget_warning, BudgetState, Error, ExecuteRequest,
    GrailBudgetTracker, QueryResult, Result, ScanMetadata, SubmitOutcome,
};
use dtmcp_ports::GrailQueryExecutorRef;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

/// Outcome of one completed query execution: the records plus the scan cost
/// facts, and - when the call was budget-tracked - the budget state after
/// settlement and any warning to show the user.
#[derive(Debug, Clone)]
pub struct QueryExecution {
    pub records: Vec<serde_json::Value>,
    pub metadata: ScanMetadata,
    pub budget_state: Option<BudgetState>,
    pub budget_warning: Option<String>,
}

impl QueryExecution {
    /// Human-readable cost summary. Bytes scanned of 0 is meaningful (the
    /// query touched no data) and rendered differently from an absent figure.
    pub fn cost_summary(&self) -> String {
        let scanned = match self.metadata.scanned_bytes {
            Some(bytes) => format!("{} bytes scanned", bytes),
            None => "scanned bytes unknown".to_string(),
        };
        format!(
            "{}, {} records, {} ms (query id: {}{})",
            scanned,
            self.metadata.scanned_records.unwrap_or(0),
            self.metadata.execution_time_ms.unwrap_or(0),
            self.metadata.query_id.as_deref().unwrap_or("unknown"),
            if self.metadata.sampled { ", sampled" } else { "" },
        )
    }
}

/// Executes DQL statements against Grail.
///
/// One instance is shared by all tools for the lifetime of the server. The
/// statement text is opaque here - it is forwarded verbatim, never parsed.
pub struct QueryExecutionService {
    executor: GrailQueryExecutorRef,
    /// Stable client-identifying string sent with every backend call for
    /// usage attribution.
    client_context: String,
    poll_interval: Duration,
    /// Overall cap on the poll phase. `None` (the default) preserves the
    /// historical unbounded behavior: a backend stuck in RUNNING is polled
    /// forever.
    poll_deadline: Option<Duration>,
}

impl QueryExecutionService {
    pub fn new(executor: GrailQueryExecutorRef, client_context: impl Into<String>) -> Self {
        Self {
            executor,
            client_context: client_context.into(),
            poll_interval: dtmcp_config::constants::QUERY_POLL_INTERVAL,
            poll_deadline: None,
        }
    }

    /// Override the inter-poll delay. Tests use this together with tokio's
    /// paused clock.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Opt in to a bounded poll phase. Off by default.
    pub fn with_poll_deadline(mut self, deadline: Duration) -> Self {
        self.poll_deadline = Some(deadline);
        self
    }

    /// Execute a query without budget accounting.
    ///
    /// Returns `Ok(None)` when the backend produced no usable result.
    pub async fn execute(&self, request: &ExecuteRequest) -> Result<Option<QueryExecution>> {
        match self.run_to_terminal(request).await? {
            Some(result) => Ok(Some(self.finish(result, None))),
            None => Ok(None),
        }
    }

    /// Execute a query under the given session budget tracker.
    ///
    /// The gate is checked before anything is sent: if the tracker already
    /// reports exceeded, this returns [`Error::BudgetExceeded`] and the
    /// backend sees no submission. After a completed scan the actually
    /// scanned bytes are added to the tracker - also for repeated submissions
    /// of an identical statement; there is no deduplication.
    pub async fn execute_with_budget(
        &self,
        request: &ExecuteRequest,
        tracker: &GrailBudgetTracker,
    ) -> Result<Option<QueryExecution>> {
        let state = tracker.state();
        if state.is_budget_exceeded {
            return Err(Error::BudgetExceeded(budget_exhausted_message(&state)));
        }

        match self.run_to_terminal(request).await? {
            Some(result) => Ok(Some(self.finish(result, Some(tracker)))),
            None => Ok(None),
        }
    }

    /// Submit and, if needed, poll until a terminal outcome.
    async fn run_to_terminal(&self, request: &ExecuteRequest) -> Result<Option<QueryResult>> {
        let response = self
            .executor
            .submit_query(request, &self.client_context)
            .await?;

        match response.into_outcome() {
            SubmitOutcome::Immediate(result) => Ok(Some(result)),
            SubmitOutcome::Pending(token) => self.poll_to_completion(&token).await,
            SubmitOutcome::Invalid => {
                // backend contract violation, soft failure
                warn!("query submission returned neither a result nor a request token");
                Ok(None)
            }
        }
    }

    /// Poll an in-flight execution, sleeping before each attempt, until the
    /// backend hands over a result or leaves the RUNNING/NOT_STARTED states
    /// without one.
    async fn poll_to_completion(&self, request_token: &str) -> Result<Option<QueryResult>> {
        let started = Instant::now();
        loop {
            if let Some(deadline) = self.poll_deadline {
                if started.elapsed() >= deadline {
                    warn!(?deadline, "query polling deadline reached without a result");
                    return Ok(None);
                }
            }

            sleep(self.poll_interval).await;

            let poll = self
                .executor
                .poll_query(request_token, &self.client_context)
                .await?;

            if let Some(result) = poll.result {
                return Ok(Some(result));
            }
            if poll.state.is_in_progress() {
                continue;
            }

            // terminal state without a result: inconclusive, soft failure
            warn!(state = %poll.state, "query polling ended without a result");
            return Ok(None);
        }
    }

    /// Extract scan metadata, settle the budget for tracked calls, and log
    /// the cost facts.
    fn finish(&self, result: QueryResult, tracker: Option<&GrailBudgetTracker>) -> QueryExecution {
        let metadata = result.scan_metadata();

        let (budget_state, budget_warning) = match tracker {
            Some(tracker) => {
                let scanned = metadata.scanned_bytes.unwrap_or(0);
                let state = tracker.add_bytes_scanned(scanned);
                let warning = generate_budget_warning(&state, scanned);
                (Some(state), warning)
            }
            None => (None, None),
        };

        debug!(
            scanned_bytes = ?metadata.scanned_bytes,
            scanned_records = ?metadata.scanned_records,
            execution_time_ms = ?metadata.execution_time_ms,
            query_id = metadata.query_id.as_deref().unwrap_or("unknown"),
            sampled = metadata.sampled,
            "query completed"
        );

        QueryExecution {
            records: result.records,
            metadata,
            budget_state,
            budget_warning,
        }
    }
}
