//! Log retrieval for a single monitored entity

use crate::QueryExecutionService;
use dtmcp_core::{ExecuteRequest, Result};

/// Fetch the logs attributed to the given entity id. Returns the raw log
/// records; empty means no logs (or an inconclusive query).
pub async fn logs_for_entity(
    service: &QueryExecutionService,
    entity_id: &str,
) -> Result<Vec<serde_json::Value>> {
    let request = ExecuteRequest::new(format!(
        "fetch logs | filter dt.source_entity == \"{entity_id}\""
    ));
    Ok(service
        .execute(&request)
        .await?
        .map(|execution| execution.records)
        .unwrap_or_default())
}
