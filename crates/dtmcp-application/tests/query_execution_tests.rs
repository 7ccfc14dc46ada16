//! Engine tests against the scripted mock backend.
//!
//! All tests run on a paused tokio clock, so the 2-second inter-poll delays
//! elapse virtually and the suite finishes in milliseconds.

use dtmcp_application::QueryExecutionService;
use dtmcp_config::constants::QUERY_POLL_INTERVAL;
use dtmcp_core::{Error, ExecuteRequest, GrailBudgetTracker};
use dtmcp_testing::{fixtures, MockGrailExecutor};
use std::sync::Arc;
use std::time::Duration;

const CONTEXT: &str = "dynatrace-mcp-rust/test";

fn service(backend: &Arc<MockGrailExecutor>) -> QueryExecutionService {
    QueryExecutionService::new(backend.clone(), CONTEXT)
}

#[tokio::test(start_paused = true)]
async fn immediate_result_skips_polling() {
    let backend = Arc::new(MockGrailExecutor::new());
    backend.script_submit(fixtures::immediate_start(fixtures::result_with_scan(1234)));

    let execution = service(&backend)
        .execute(&ExecuteRequest::new("fetch logs"))
        .await
        .unwrap()
        .expect("result expected");

    assert_eq!(execution.records.len(), 1);
    assert_eq!(execution.metadata.scanned_bytes, Some(1234));
    assert_eq!(backend.submit_count(), 1);
    assert_eq!(backend.poll_count(), 0);
    assert!(execution.budget_state.is_none());
}

#[tokio::test(start_paused = true)]
async fn pending_submission_is_polled_until_the_result_arrives() {
    let backend = Arc::new(MockGrailExecutor::new());
    backend.script_submit(fixtures::pending_start("token-1"));
    backend.script_poll(fixtures::running_poll());
    backend.script_poll(fixtures::not_started_poll());
    backend.script_poll(fixtures::finished_poll(fixtures::result_with_scan(5000)));

    let execution = service(&backend)
        .execute(&ExecuteRequest::new("fetch logs"))
        .await
        .unwrap()
        .expect("result expected");

    assert_eq!(execution.metadata.scanned_bytes, Some(5000));
    assert_eq!(backend.submit_count(), 1);
    assert_eq!(backend.poll_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn the_full_interval_elapses_before_the_first_poll() {
    let backend = Arc::new(MockGrailExecutor::new());
    backend.script_submit(fixtures::pending_start("token-1"));
    backend.script_poll(fixtures::finished_poll(fixtures::result_with_scan(1)));

    let engine = service(&backend);
    let handle =
        tokio::spawn(async move { engine.execute(&ExecuteRequest::new("fetch logs")).await });

    // let the execution run up to its first sleep
    tokio::task::yield_now().await;
    assert_eq!(backend.submit_count(), 1);
    assert_eq!(backend.poll_count(), 0);

    // one millisecond short of the interval: still waiting
    tokio::time::advance(QUERY_POLL_INTERVAL - Duration::from_millis(1)).await;
    tokio::task::yield_now().await;
    assert_eq!(backend.poll_count(), 0);

    tokio::time::advance(Duration::from_millis(1)).await;
    tokio::task::yield_now().await;
    assert_eq!(backend.poll_count(), 1);

    assert!(handle.await.unwrap().unwrap().is_some());
}

#[tokio::test(start_paused = true)]
async fn client_context_reaches_both_endpoints() {
    let backend = Arc::new(MockGrailExecutor::new());
    backend.script_submit(fixtures::pending_start("token-1"));
    backend.script_poll(fixtures::finished_poll(fixtures::result_with_scan(1)));

    service(&backend)
        .execute(&ExecuteRequest::new("fetch logs"))
        .await
        .unwrap();

    assert_eq!(backend.last_context().as_deref(), Some(CONTEXT));
    let request = backend.last_request().unwrap();
    assert_eq!(request.query, "fetch logs");
}

#[tokio::test(start_paused = true)]
async fn terminal_poll_without_result_is_inconclusive() {
    let backend = Arc::new(MockGrailExecutor::new());
    backend.script_submit(fixtures::pending_start("token-1"));
    backend.script_poll(fixtures::running_poll());
    backend.script_poll(fixtures::failed_poll());

    let outcome = service(&backend)
        .execute(&ExecuteRequest::new("fetch logs"))
        .await
        .unwrap();

    assert!(outcome.is_none());
    assert_eq!(backend.poll_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn submission_without_result_or_token_is_a_soft_failure() {
    let backend = Arc::new(MockGrailExecutor::new());
    backend.script_submit(fixtures::invalid_start());

    let outcome = service(&backend)
        .execute(&ExecuteRequest::new("fetch logs"))
        .await
        .unwrap();

    assert!(outcome.is_none());
    assert_eq!(backend.submit_count(), 1);
    assert_eq!(backend.poll_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn exhausted_budget_blocks_before_submission() {
    let backend = Arc::new(MockGrailExecutor::new());
    let tracker = GrailBudgetTracker::new(1.0);
    tracker.add_bytes_scanned(2_000_000_000);

    let err = service(&backend)
        .execute_with_budget(&ExecuteRequest::new("fetch logs"), &tracker)
        .await
        .unwrap_err();

    let Error::BudgetExceeded(message) = err else {
        panic!("expected a budget error, got {err:?}");
    };
    // nothing was submitted, so the message must not report a query cost
    assert!(message.contains("Grail Budget Exceeded"));
    assert!(!message.contains("This query scanned"));
    assert_eq!(backend.submit_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn completed_scan_settles_the_budget() {
    let backend = Arc::new(MockGrailExecutor::new());
    backend.script_submit(fixtures::immediate_start(fixtures::result_with_scan(
        900_000_000,
    )));
    let tracker = GrailBudgetTracker::new(1.0);

    let execution = service(&backend)
        .execute_with_budget(&ExecuteRequest::new("fetch logs"), &tracker)
        .await
        .unwrap()
        .expect("result expected");

    let state = execution.budget_state.expect("tracked call carries state");
    assert_eq!(state.total_bytes_scanned, 900_000_000);
    assert!(!state.is_budget_exceeded);
    // 90% of a 1 GB budget: the approaching warning fires
    let warning = execution.budget_warning.expect("approaching warning");
    assert!(warning.contains("Grail Budget Warning"));
}

#[tokio::test(start_paused = true)]
async fn resubmission_counts_against_the_budget_again() {
    let backend = Arc::new(MockGrailExecutor::new());
    backend.script_submit(fixtures::immediate_start(fixtures::result_with_scan(
        600_000_000,
    )));
    backend.script_submit(fixtures::immediate_start(fixtures::result_with_scan(
        600_000_000,
    )));
    let tracker = GrailBudgetTracker::new(1.0);
    let service = service(&backend);
    let request = ExecuteRequest::new("fetch logs");

    let first = service
        .execute_with_budget(&request, &tracker)
        .await
        .unwrap()
        .unwrap();
    assert!(!first.budget_state.as_ref().unwrap().is_budget_exceeded);

    let second = service
        .execute_with_budget(&request, &tracker)
        .await
        .unwrap()
        .unwrap();
    assert!(second.budget_state.as_ref().unwrap().is_budget_exceeded);

    // the next attempt is gated
    let err = service
        .execute_with_budget(&request, &tracker)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::BudgetExceeded(_)));
    assert_eq!(backend.submit_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn unlimited_budget_never_gates() {
    let backend = Arc::new(MockGrailExecutor::new());
    backend.script_submit(fixtures::immediate_start(fixtures::result_with_scan(
        1_000_000_000,
    )));
    let tracker = GrailBudgetTracker::new(-1.0);

    let execution = service(&backend)
        .execute_with_budget(&ExecuteRequest::new("fetch logs"), &tracker)
        .await
        .unwrap()
        .expect("result expected");

    let state = execution.budget_state.unwrap();
    assert!(!state.is_budget_exceeded);
    assert_eq!(state.budget_limit_bytes, -1);
    assert!(execution.budget_warning.is_none());
}

#[tokio::test(start_paused = true)]
async fn backend_errors_propagate_unmodified() {
    // nothing scripted: the mock answers with an HTTP error
    let backend = Arc::new(MockGrailExecutor::new());

    let err = service(&backend)
        .execute(&ExecuteRequest::new("fetch logs"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Http { .. }));
}

#[tokio::test(start_paused = true)]
async fn poll_deadline_gives_up_on_a_stuck_backend() {
    let backend = Arc::new(MockGrailExecutor::new());
    backend.script_submit(fixtures::pending_start("token-1"));
    backend.script_poll(fixtures::running_poll());

    let outcome = service(&backend)
        .with_poll_deadline(Duration::from_secs(1))
        .execute(&ExecuteRequest::new("fetch logs"))
        .await
        .unwrap();

    assert!(outcome.is_none());
    assert_eq!(backend.poll_count(), 1);
}
