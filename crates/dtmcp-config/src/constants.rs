//! Shared constants

use std::time::Duration;

/// Default Grail scan budget in GB (base 1000) when
/// `DT_GRAIL_QUERY_BUDGET_GB` is not set.
pub const DEFAULT_GRAIL_BUDGET_GB: f64 = 1000.0;

/// Sentinel for an unlimited Grail budget.
pub const UNLIMITED_BUDGET_GB: f64 = -1.0;

/// Unconditional delay before each poll of an in-flight query.
pub const QUERY_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Default timeout for HTTP calls to the Dynatrace platform.
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Result caps used by the canned problem/vulnerability queries.
pub const DQL_MAX_RESULT_RECORDS: u64 = 5000;
pub const DQL_MAX_RESULT_BYTES: u64 = 5_000_000; // 5 MB

/// Maximum recipients across TO, CC and BCC for the email endpoint.
pub const EMAIL_MAX_RECIPIENTS: usize = 10;
