//! Grail budget tracker - tracks and limits bytes scanned by Grail queries
//!
//! The tracker is the single source of truth for cumulative data-scan cost
//! within a session. It is shared mutable state: every query execution reads
//! it before submission and writes to it after completion. The running total
//! is monotonically non-decreasing; there are no rollback semantics.
//!
//! Budgets are expressed in gigabytes, base 1000 (1 GB = 1,000,000,000
//! bytes). A limit of exactly `-1` means unlimited: the exceeded predicate is
//! always false and remaining quantities report the `-1` sentinel, no matter
//! how many bytes are added.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Bytes per gigabyte, base 1000.
pub const BYTES_PER_GB: u64 = 1_000_000_000;

/// Fraction of the budget at which the "approaching" warning starts.
const WARNING_THRESHOLD_PERCENT: f64 = 80.0;

/// Snapshot of the budget tracker.
///
/// `budget_limit_bytes`, `remaining_budget_bytes` and `remaining_budget_gb`
/// are `-1` for an unlimited tracker, mirroring the limit sentinel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetState {
    /// Current total bytes scanned in this session
    pub total_bytes_scanned: u64,
    /// Budget limit in bytes, or -1 for unlimited
    pub budget_limit_bytes: i64,
    /// Budget limit in GB as configured (may be -1)
    pub budget_limit_gb: f64,
    /// Whether the budget has been reached or exceeded
    pub is_budget_exceeded: bool,
    /// Remaining budget in bytes, or -1 for unlimited
    pub remaining_budget_bytes: i64,
    /// Remaining budget in GB, or -1 for unlimited
    pub remaining_budget_gb: f64,
}

/// In-memory tracker for the Grail scan budget across a session.
///
/// Constructed once per process (or per test) and shared via `Arc`. The
/// counter is atomic so concurrent query executions never lose updates;
/// each `add_bytes_scanned` is a single additive mutation.
#[derive(Debug)]
pub struct GrailBudgetTracker {
    total_bytes_scanned: AtomicU64,
    /// Limit in bytes. `None` means unlimited.
    budget_limit_bytes: Option<u64>,
    budget_limit_gb: f64,
}

impl GrailBudgetTracker {
    /// Create a tracker with a limit in GB (base 1000). `-1` means unlimited.
    pub fn new(budget_limit_gb: f64) -> Self {
        let budget_limit_bytes = if budget_limit_gb == -1.0 {
            None
        } else {
            Some((budget_limit_gb * BYTES_PER_GB as f64) as u64)
        };
        Self {
            total_bytes_scanned: AtomicU64::new(0),
            budget_limit_bytes,
            budget_limit_gb,
        }
    }

    /// True if this tracker was constructed with the unlimited sentinel.
    pub fn is_unlimited(&self) -> bool {
        self.budget_limit_bytes.is_none()
    }

    /// Add bytes scanned by one completed query and return the new state.
    ///
    /// Safe with `n = 0`. The total never decreases; once a finite-budget
    /// tracker reports exceeded it stays exceeded until [`reset`](Self::reset).
    pub fn add_bytes_scanned(&self, bytes_scanned: u64) -> BudgetState {
        self.total_bytes_scanned
            .fetch_add(bytes_scanned, Ordering::SeqCst);
        self.state()
    }

    /// Current state of the tracker. Pure read, no side effect.
    pub fn state(&self) -> BudgetState {
        let total = self.total_bytes_scanned.load(Ordering::SeqCst);
        match self.budget_limit_bytes {
            None => BudgetState {
                total_bytes_scanned: total,
                budget_limit_bytes: -1,
                budget_limit_gb: self.budget_limit_gb,
                is_budget_exceeded: false,
                remaining_budget_bytes: -1,
                remaining_budget_gb: -1.0,
            },
            Some(limit) => {
                let remaining = limit.saturating_sub(total);
                BudgetState {
                    total_bytes_scanned: total,
                    budget_limit_bytes: limit as i64,
                    budget_limit_gb: self.budget_limit_gb,
                    // at exactly the limit the budget is already exceeded
                    is_budget_exceeded: total >= limit,
                    remaining_budget_bytes: remaining as i64,
                    remaining_budget_gb: remaining as f64 / BYTES_PER_GB as f64,
                }
            }
        }
    }

    /// Set the running total back to zero without changing the limit.
    ///
    /// Intended for test isolation and explicit session restarts; not exposed
    /// as an MCP tool.
    pub fn reset(&self) {
        self.total_bytes_scanned.store(0, Ordering::SeqCst);
    }
}

// ============================================================================
// Session-global tracker
// ============================================================================

static SESSION_TRACKER: Mutex<Option<Arc<GrailBudgetTracker>>> = Mutex::new(None);

/// Default budget when no limit is configured: 1000 GB.
pub const DEFAULT_BUDGET_GB: f64 = 1000.0;

/// Get the session-wide budget tracker, constructing it on first call.
///
/// The limit argument is consumed only by the *first* caller in the process;
/// later calls return the existing tracker and silently ignore a different
/// limit. This is intentional session-scoped configuration: the first caller
/// wins. When no limit is supplied on first call, [`DEFAULT_BUDGET_GB`]
/// applies.
pub fn session_tracker(budget_limit_gb: Option<f64>) -> Arc<GrailBudgetTracker> {
    let mut guard = SESSION_TRACKER
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    guard
        .get_or_insert_with(|| {
            Arc::new(GrailBudgetTracker::new(
                budget_limit_gb.unwrap_or(DEFAULT_BUDGET_GB),
            ))
        })
        .clone()
}

/// Drop the session tracker so the next [`session_tracker`] call constructs a
/// fresh one. Primarily for tests.
pub fn reset_session_tracker() {
    let mut guard = SESSION_TRACKER
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = None;
}

// ============================================================================
// Formatting and warnings
// ============================================================================

/// Format a byte count as GB with tiered precision for readability.
///
/// ≥10 GB → 1 decimal; ≥1 GB → 2 decimals; ≥0.1 GB → 3 decimals; below that
/// → 4 decimals.
pub fn format_bytes_as_gb(bytes: u64) -> String {
    let gb = bytes as f64 / BYTES_PER_GB as f64;
    if gb >= 10.0 {
        format!("{:.1}", gb)
    } else if gb >= 1.0 {
        format!("{:.2}", gb)
    } else if gb >= 0.1 {
        format!("{:.3}", gb)
    } else {
        format!("{:.4}", gb)
    }
}

/// Message for the pre-flight gate: the budget is already exhausted and no
/// query was submitted, so there is no current-query cost to report.
pub fn budget_exhausted_message(state: &BudgetState) -> String {
    format!(
        "🚨 **Grail Budget Exceeded:** Session usage: {} GB / {} GB budget limit. \
         You will not be able to perform any more queries in this session.",
        format_bytes_as_gb(state.total_bytes_scanned),
        state.budget_limit_gb
    )
}

/// Generate a budget message for the given state and the bytes scanned by the
/// current query. Returns `None` when usage is comfortably inside the budget.
///
/// An exceeded message always takes priority over the approaching warning;
/// the two are never emitted together. Unlimited trackers never warn.
pub fn generate_budget_warning(state: &BudgetState, current_query_bytes: u64) -> Option<String> {
    if state.is_budget_exceeded {
        let total_gb = format_bytes_as_gb(state.total_bytes_scanned);
        let current_gb = format_bytes_as_gb(current_query_bytes);
        return Some(format!(
            "🚨 **Grail Budget Exceeded:** This query scanned {} GB. \
             Total session usage: {} GB / {} GB budget limit. \
             You will not be able to perform any more queries in this session.",
            current_gb, total_gb, state.budget_limit_gb
        ));
    }

    if state.budget_limit_bytes <= 0 {
        // unlimited, nothing to warn about
        return None;
    }

    let usage_percentage =
        state.total_bytes_scanned as f64 / state.budget_limit_bytes as f64 * 100.0;
    if usage_percentage >= WARNING_THRESHOLD_PERCENT {
        let remaining_gb = format_bytes_as_gb(state.remaining_budget_bytes.max(0) as u64);
        let total_gb = format_bytes_as_gb(state.total_bytes_scanned);
        return Some(format!(
            "⚠️ **Grail Budget Warning:** Session usage: {} GB / {} GB ({:.1}%). Remaining: {} GB.",
            total_gb, state.budget_limit_gb, usage_percentage, remaining_gb
        ));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_bytes_scanned_accumulates() {
        let tracker = GrailBudgetTracker::new(1.0);
        assert_eq!(tracker.state().total_bytes_scanned, 0);

        let state = tracker.add_bytes_scanned(500);
        assert_eq!(state.total_bytes_scanned, 500);

        let state = tracker.add_bytes_scanned(0);
        assert_eq!(state.total_bytes_scanned, 500);

        let state = tracker.add_bytes_scanned(1500);
        assert_eq!(state.total_bytes_scanned, 2000);
    }

    #[test]
    fn test_add_bytes_scanned_is_atomic_across_threads() {
        let tracker = Arc::new(GrailBudgetTracker::new(1000.0));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let tracker = Arc::clone(&tracker);
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        tracker.add_bytes_scanned(1_000);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(tracker.state().total_bytes_scanned, 8_000_000);
    }

    #[test]
    fn test_state_is_pure() {
        let tracker = GrailBudgetTracker::new(1.0);
        tracker.add_bytes_scanned(42);
        let before = tracker.state();
        let after = tracker.state();
        assert_eq!(before, after);
    }

    #[test]
    fn test_unlimited_budget_never_exceeds() {
        let tracker = GrailBudgetTracker::new(-1.0);
        assert!(tracker.is_unlimited());

        let state = tracker.add_bytes_scanned(1_000_000_000_000_000); // 1e15
        assert!(!state.is_budget_exceeded);
        assert_eq!(state.budget_limit_bytes, -1);
        assert_eq!(state.remaining_budget_bytes, -1);
        assert_eq!(state.remaining_budget_gb, -1.0);
    }

    #[test]
    fn test_exceeded_exactly_at_limit() {
        let tracker = GrailBudgetTracker::new(0.001); // 1 MB
        let state = tracker.add_bytes_scanned(999_999);
        assert!(!state.is_budget_exceeded);
        assert_eq!(state.remaining_budget_bytes, 1);

        // at the limit, not over it
        let state = tracker.add_bytes_scanned(1);
        assert!(state.is_budget_exceeded);
        assert_eq!(state.remaining_budget_bytes, 0);

        // and it stays exceeded
        let state = tracker.add_bytes_scanned(1);
        assert!(state.is_budget_exceeded);
        assert_eq!(state.remaining_budget_bytes, 0);
    }

    #[test]
    fn test_reset_clears_total_keeps_limit() {
        let tracker = GrailBudgetTracker::new(0.001);
        tracker.add_bytes_scanned(2_000_000);
        assert!(tracker.state().is_budget_exceeded);

        tracker.reset();
        let state = tracker.state();
        assert_eq!(state.total_bytes_scanned, 0);
        assert!(!state.is_budget_exceeded);
        assert_eq!(state.budget_limit_gb, 0.001);
    }

    #[test]
    fn test_format_bytes_as_gb_tiers() {
        assert_eq!(format_bytes_as_gb(0), "0.0000");
        assert_eq!(format_bytes_as_gb(150_000_000), "0.150");
        assert_eq!(format_bytes_as_gb(1_500_000_000), "1.50");
        assert_eq!(format_bytes_as_gb(15_000_000_000), "15.0");
    }

    #[test]
    fn test_warning_at_80_percent() {
        let tracker = GrailBudgetTracker::new(0.000001); // 1000 bytes
        let state = tracker.add_bytes_scanned(800);
        let warning = generate_budget_warning(&state, 800).expect("expected approaching warning");
        assert!(warning.contains("Budget Warning"));
        assert!(warning.contains("80.0%"));
        assert!(!warning.contains("Budget Exceeded"));
    }

    #[test]
    fn test_no_warning_below_80_percent() {
        let tracker = GrailBudgetTracker::new(0.000001); // 1000 bytes
        let state = tracker.add_bytes_scanned(799);
        assert_eq!(generate_budget_warning(&state, 799), None);
    }

    #[test]
    fn test_exceeded_takes_priority_over_approaching() {
        let tracker = GrailBudgetTracker::new(0.000001); // 1000 bytes
        let state = tracker.add_bytes_scanned(1000);
        let warning = generate_budget_warning(&state, 1000).expect("expected exceeded message");
        assert!(warning.contains("Budget Exceeded"));
        assert!(!warning.contains("Budget Warning"));
    }

    #[test]
    fn test_exhausted_message_has_no_current_query_clause() {
        let tracker = GrailBudgetTracker::new(0.000001); // 1000 bytes
        let state = tracker.add_bytes_scanned(1500);
        let message = budget_exhausted_message(&state);
        assert!(message.contains("Grail Budget Exceeded"));
        assert!(message.contains("Session usage:"));
        assert!(!message.contains("This query scanned"));
    }

    #[test]
    fn test_no_warning_for_unlimited() {
        let tracker = GrailBudgetTracker::new(-1.0);
        let state = tracker.add_bytes_scanned(u64::MAX / 2);
        assert_eq!(generate_budget_warning(&state, 123), None);
    }

    #[test]
    fn test_session_tracker_first_caller_wins() {
        // single test covers the whole global lifecycle to avoid interference
        // with parallel tests touching the same static
        reset_session_tracker();

        let first = session_tracker(Some(5.0));
        let second = session_tracker(Some(20.0));
        assert_eq!(first.state().budget_limit_gb, 5.0);
        assert_eq!(second.state().budget_limit_gb, 5.0);

        // both handles observe the same counter
        first.add_bytes_scanned(1234);
        assert_eq!(second.state().total_bytes_scanned, 1234);

        // after a reset, the next caller configures the limit again
        reset_session_tracker();
        let fresh = session_tracker(None);
        assert_eq!(fresh.state().budget_limit_gb, DEFAULT_BUDGET_GB);
        assert_eq!(fresh.state().total_bytes_scanned, 0);

        reset_session_tracker();
    }
}
