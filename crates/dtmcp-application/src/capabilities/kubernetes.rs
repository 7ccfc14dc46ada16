//! Kubernetes cluster event retrieval

use crate::QueryExecutionService;
use dtmcp_core::{ExecuteRequest, Result};

/// Fetch all events for a Kubernetes cluster, identified by its
/// `k8s.cluster.uid` (not the Dynatrace environment id). Returns the raw
/// event records; empty means no events (or an inconclusive query).
pub async fn cluster_events(
    service: &QueryExecutionService,
    cluster_id: &str,
) -> Result<Vec<serde_json::Value>> {
    let request = ExecuteRequest::new(format!(
        "fetch events | filter k8s.cluster.id == \"{cluster_id}\""
    ));
    Ok(service
        .execute(&request)
        .await?
        .map(|execution| execution.records)
        .unwrap_or_default())
}
