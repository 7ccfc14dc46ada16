//! Vulnerability listing
//!
//! Runs over the security events bucket: latest state-report snapshot per
//! vulnerability/entity pair, open and above the risk score threshold.

use crate::QueryExecutionService;
use dtmcp_core::{ExecuteRequest, Result};
use dtmcp_config::constants::{DQL_MAX_RESULT_BYTES, DQL_MAX_RESULT_RECORDS};

const DEFAULT_MIN_RISK_SCORE: f64 = 8.0;

/// Build the vulnerability listing request over the last 30 days of
/// security events.
pub fn vulnerabilities_query(
    additional_filter: Option<&str>,
    min_risk_score: Option<f64>,
) -> ExecuteRequest {
    let risk_score = min_risk_score.unwrap_or(DEFAULT_MIN_RISK_SCORE);
    let extra = match additional_filter {
        Some(filter) => format!("| filter {filter}\n"),
        None => String::new(),
    };
    let dql = format!(
        "fetch security.events\n\
         | filter dt.system.bucket==\"default_securityevents_builtin\"\n\
         \x20   AND event.provider==\"Dynatrace\"\n\
         \x20   AND event.type==\"VULNERABILITY_STATE_REPORT_EVENT\"\n\
         \x20   AND event.level==\"ENTITY\"\n\
         // latest snapshot per entity\n\
         | dedup {{vulnerability.display_id, affected_entity.id}}, sort:{{timestamp desc}}\n\
         // open, non-muted, above the risk score threshold\n\
         | filter vulnerability.resolution.status==\"OPEN\"\n\
         \x20   AND vulnerability.risk.score >= {risk_score}\n\
         {extra}\
         | sort vulnerability.risk.score desc\n\
         | limit 100"
    );
    ExecuteRequest::new(dql).with_limits(DQL_MAX_RESULT_RECORDS, DQL_MAX_RESULT_BYTES)
}

fn field<'a>(record: &'a serde_json::Value, name: &str) -> &'a str {
    record.get(name).and_then(|v| v.as_str()).unwrap_or("N/A")
}

fn number_field(record: &serde_json::Value, name: &str) -> String {
    match record.get(name) {
        Some(value) if value.is_number() => value.to_string(),
        Some(serde_json::Value::String(s)) => s.clone(),
        _ => "N/A".to_string(),
    }
}

/// List open vulnerabilities as one summary line each. An empty vector
/// means none matched (or the query was inconclusive).
pub async fn list_vulnerabilities(
    service: &QueryExecutionService,
    additional_filter: Option<&str>,
    min_risk_score: Option<f64>,
) -> Result<Vec<String>> {
    let request = vulnerabilities_query(additional_filter, min_risk_score);
    let Some(execution) = service.execute(&request).await? else {
        return Ok(Vec::new());
    };

    Ok(execution
        .records
        .iter()
        .map(|vuln| {
            format!(
                "{} (Vulnerability ID: {}, Vulnerability Display ID: {}, Risk Score: {}, Risk Level: {}, \
                 Affected Entity: {}, External Vulnerability ID: {}, CVE: {}, Mute Status: {}, \
                 Parent Mute Status: {}, Full Details: {})",
                record_title(vuln),
                field(vuln, "vulnerability.id"),
                field(vuln, "vulnerability.display_id"),
                number_field(vuln, "vulnerability.risk.score"),
                field(vuln, "vulnerability.risk.level"),
                field(vuln, "affected_entity.name"),
                field(vuln, "vulnerability.external_id"),
                field(vuln, "vulnerability.references.cve"),
                field(vuln, "vulnerability.mute.status"),
                field(vuln, "vulnerability.parent.mute.status"),
                field(vuln, "vulnerability.url"),
            )
        })
        .collect())
}

fn record_title(record: &serde_json::Value) -> &str {
    record
        .get("vulnerability.title")
        .and_then(|v| v.as_str())
        .unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn query_defaults_to_risk_score_eight() {
        let request = vulnerabilities_query(None, None);
        assert!(request.query.contains("vulnerability.risk.score >= 8"));
        assert!(request.query.contains("| limit 100"));
        assert!(request
            .query
            .contains("dedup {vulnerability.display_id, affected_entity.id}"));
    }

    #[test]
    fn query_honors_custom_threshold_and_filter() {
        let request = vulnerabilities_query(Some("affected_entity.name == \"api\""), Some(5.5));
        assert!(request.query.contains("vulnerability.risk.score >= 5.5"));
        assert!(request
            .query
            .contains("| filter affected_entity.name == \"api\""));
    }

    #[test]
    fn missing_record_fields_render_as_not_available() {
        let record = json!({"vulnerability.title": "Log4Shell"});
        assert_eq!(record_title(&record), "Log4Shell");
        assert_eq!(field(&record, "vulnerability.references.cve"), "N/A");
        assert_eq!(number_field(&record, "vulnerability.risk.score"), "N/A");
    }
}
