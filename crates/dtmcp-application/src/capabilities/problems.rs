//! Davis problem listing
//!
//! Runs the Problems app query: all Davis problems from the last 12 hours,
//! duplicates filtered out, sorted open-first then newest-first.

use crate::QueryExecutionService;
use dtmcp_core::{ExecuteRequest, Result};
use dtmcp_config::constants::{DQL_MAX_RESULT_BYTES, DQL_MAX_RESULT_RECORDS};

/// Build the problem listing request. `additional_filter` is a raw DQL
/// filter expression inserted verbatim.
pub fn problems_query(additional_filter: Option<&str>) -> ExecuteRequest {
    let extra = match additional_filter {
        Some(filter) => format!("| filter {filter}\n"),
        None => String::new(),
    };
    let dql = format!(
        "fetch dt.davis.problems, from: now()-12h, to: now()\n\
         | filter isNull(dt.davis.is_duplicate) OR not(dt.davis.is_duplicate)\n\
         {extra}\
         | fieldsAdd\n\
         \x20  duration = coalesce(event.end, now()) - event.start,\n\
         \x20  affected_entities_count = arraySize(affected_entity_ids),\n\
         \x20  event_count = arraySize(dt.davis.event_ids),\n\
         \x20  affected_users_count = dt.davis.affected_users_count,\n\
         \x20  problem_id = event.id\n\
         | fields display_id, event.name, event.description, event.status, event.category, event.start, event.end,\n\
         \x20        root_cause_entity_id, root_cause_entity_name, duration, affected_entities_count,\n\
         \x20        event_count, affected_users_count, problem_id, dt.davis.mute.status, dt.davis.mute.user,\n\
         \x20        entity_tags, labels.alerting_profile, maintenance.is_under_maintenance,\n\
         \x20        aws.account.id, azure.resource.group, azure.subscription, cloud.provider, cloud.region,\n\
         \x20        dt.cost.costcenter, dt.cost.product, dt.host_group.id, dt.security_context, gcp.project.id,\n\
         \x20        host.name,\n\
         \x20        k8s.cluster.name, k8s.cluster.uid, k8s.container.name, k8s.namespace.name, k8s.node.name, k8s.pod.name, k8s.service.name, k8s.workload.kind, k8s.workload.name\n\
         | sort event.status asc, event.start desc\n"
    );
    ExecuteRequest::new(dql).with_limits(DQL_MAX_RESULT_RECORDS, DQL_MAX_RESULT_BYTES)
}

/// List current Davis problems. Returns the raw problem records; an empty
/// vector means no problems (or an inconclusive query).
pub async fn list_problems(
    service: &QueryExecutionService,
    additional_filter: Option<&str>,
) -> Result<Vec<serde_json::Value>> {
    let request = problems_query(additional_filter);
    Ok(service
        .execute(&request)
        .await?
        .map(|execution| execution.records)
        .unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_covers_last_twelve_hours_and_filters_duplicates() {
        let request = problems_query(None);
        assert!(request
            .query
            .starts_with("fetch dt.davis.problems, from: now()-12h, to: now()"));
        assert!(request
            .query
            .contains("isNull(dt.davis.is_duplicate) OR not(dt.davis.is_duplicate)"));
        assert!(request.query.contains("| sort event.status asc, event.start desc"));
        assert_eq!(request.max_result_records, Some(DQL_MAX_RESULT_RECORDS));
        assert_eq!(request.max_result_bytes, Some(DQL_MAX_RESULT_BYTES));
    }

    #[test]
    fn additional_filter_is_inserted_before_field_projection() {
        let request = problems_query(Some("host.name == \"web-01\""));
        let filter_pos = request.query.find("| filter host.name == \"web-01\"").unwrap();
        let fields_pos = request.query.find("| fieldsAdd").unwrap();
        assert!(filter_pos < fields_pos);
    }
}
