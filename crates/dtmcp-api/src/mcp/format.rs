//! Human-readable response texts
//!
//! Tool responses are prose blocks with environment UI deep links, so an LLM
//! client can both quote them to the user and follow up with the right ids.

use dtmcp_application::QueryExecution;
use dtmcp_gateway::{
    ConversationResponse, Dql2NlResponse, EmailSendResult, EntityDetails, Nl2DqlResponse,
    ProblemDetails, SecurityProblemDetails, Workflow,
};
use dtmcp_ports::VerifyResponse;

pub fn environment_info_text(info: &serde_json::Value, environment_url: &str) -> String {
    format!(
        "Environment Information (also referred to as tenant):\n{info}\n\
         You can reach it via {environment_url}\n"
    )
}

pub fn vulnerabilities_text(vulnerabilities: &[String], environment_url: &str) -> String {
    if vulnerabilities.is_empty() {
        return "No vulnerabilities found".to_string();
    }
    let mut resp = String::from("Found the following vulnerabilities:");
    for vulnerability in vulnerabilities {
        resp.push_str(&format!("\n* {vulnerability}"));
    }
    resp.push_str(&format!(
        "\nWe recommend to take a look at {environment_url}/ui/apps/dynatrace.security.vulnerabilities \
         to get a better overview of vulnerabilities.\n"
    ));
    resp
}

pub fn vulnerability_details_text(
    details: &SecurityProblemDetails,
    environment_url: &str,
) -> String {
    let mut resp = format!(
        "The Security Problem (Vulnerability) {} with securityProblemId {} has the title {}.\n",
        details.display_id, details.security_problem_id, details.title
    );
    resp.push_str(&format!(
        "The related CVEs are {}.\n",
        details
            .cve_ids
            .as_ref()
            .filter(|ids| !ids.is_empty())
            .map(|ids| ids.join(","))
            .unwrap_or_else(|| "unknown".to_string())
    ));
    if let Some(description) = &details.description {
        resp.push_str(&format!("The description is: {description}.\n"));
    }
    if let Some(remediation) = &details.remediation_description {
        resp.push_str(&format!("The remediation description is: {remediation}.\n"));
    }

    match details.affected_entities.as_deref() {
        Some(entities) if !entities.is_empty() => {
            resp.push_str("The vulnerability affects the following entities:\n");
            for entity in entities {
                resp.push_str(&format!("* {entity}\n"));
            }
        }
        _ => resp.push_str("This vulnerability does not seem to affect any entities.\n"),
    }

    if let Some(code_details) = &details.code_level_vulnerability_details {
        resp.push_str(&format!(
            "Please investigate this on code-level: {code_details}\n"
        ));
    }

    match details.exposed_entities.as_deref() {
        Some(entities) if !entities.is_empty() => {
            resp.push_str("The vulnerability exposes the following entities:\n");
            for entity in entities {
                resp.push_str(&format!("* {entity}\n"));
            }
        }
        _ => resp.push_str("This vulnerability does not seem to expose any entities.\n"),
    }

    match &details.entry_points {
        Some(entry_points) if !entry_points.items.is_empty() => {
            resp.push_str("The following entrypoints are affected:\n");
            for entry_point in &entry_points.items {
                resp.push_str(&format!(
                    "* {}\n",
                    entry_point.source_http_path.as_deref().unwrap_or("unknown")
                ));
            }
            if entry_points.truncated {
                resp.push_str("The list of entry points was truncated.\n");
            }
        }
        _ => resp.push_str("This vulnerability does not seem to affect any entrypoints.\n"),
    }

    let high_risk = details
        .risk_assessment
        .as_ref()
        .and_then(|r| r.risk_score)
        .map(|score| score > 8.0)
        .unwrap_or(false);
    if high_risk {
        resp.push_str(
            "The vulnerability has a high-risk score. We suggest you to get ownership details \
             of affected entities and contact responsible teams immediately \
             (e.g., via send_slack_message).\n",
        );
    }

    resp.push_str(&format!(
        "Tell the user to access the link {environment_url}/ui/apps/dynatrace.security.vulnerabilities/vulnerabilities/{} \
         to get more insights into the vulnerability / security problem.\n",
        details.security_problem_id
    ));
    resp
}

pub fn problems_text(records: &[serde_json::Value]) -> String {
    if records.is_empty() {
        return "No problems found".to_string();
    }
    let joined: Vec<String> = records.iter().map(|r| r.to_string()).collect();
    format!("Found these problems: {}", joined.join(","))
}

pub fn problem_details_text(details: &ProblemDetails, environment_url: &str) -> String {
    let mut resp = format!(
        "The problem {} with the title {} (ID: {}). The severity is {}, and it affects {} entities:",
        details.display_id,
        details.title,
        details.problem_id,
        details.severity_level,
        details.affected_entities.len()
    );
    for entity in &details.affected_entities {
        resp.push_str(&format!(
            "\n- {} (please refer to this entity with `entityId` {})",
            entity.name.as_deref().unwrap_or("unknown"),
            entity
                .entity_id
                .as_ref()
                .and_then(|e| e.id.as_deref())
                .unwrap_or("unknown")
        ));
    }
    resp.push_str(&format!(
        "\nThe problem first appeared at {}\n",
        details.start_time
    ));
    if let Some(root_cause) = &details.root_cause_entity {
        resp.push_str(&format!(
            "The possible root-cause could be in entity {} with `entityId` {}.\n",
            root_cause.name.as_deref().unwrap_or("unknown"),
            root_cause
                .entity_id
                .as_ref()
                .and_then(|e| e.id.as_deref())
                .unwrap_or("unknown")
        ));
    }
    if let Some(impact) = &details.impact_analysis {
        let affected_users: u64 = impact
            .impacts
            .iter()
            .map(|i| i.estimated_affected_users)
            .sum();
        resp.push_str(&format!(
            "The problem is estimated to affect {affected_users} users.\n"
        ));
    }
    resp.push_str(&format!(
        "Tell the user to access the link {environment_url}/ui/apps/dynatrace.davis.problems/problem/{} \
         to get more insights into the problem.\n",
        details.problem_id
    ));
    resp
}

pub fn entity_details_text(details: &EntityDetails, environment_url: &str) -> String {
    let mut resp = format!(
        "Entity {} of type {} with `entityId` {}\nProperties: {}\n",
        details.display_name, details.entity_type, details.entity_id, details.properties
    );
    let link = match details.entity_type.as_str() {
        "SERVICE" => Some(format!(
            "You can find more information about the service at \
             {environment_url}/ui/apps/dynatrace.services/explorer?detailsId={}&sidebarOpen=false",
            details.entity_id
        )),
        "HOST" => Some(format!(
            "You can find more information about the host at \
             {environment_url}/ui/apps/dynatrace.infraops/hosts/{}",
            details.entity_id
        )),
        "KUBERNETES_CLUSTER" => Some(format!(
            "You can find more information about the cluster at \
             {environment_url}/ui/apps/dynatrace.infraops/kubernetes/{}",
            details.entity_id
        )),
        "CLOUD_APPLICATION" => Some(format!(
            "You can find more details about the application at \
             {environment_url}/ui/apps/dynatrace.kubernetes/explorer/workload?detailsId={}",
            details.entity_id
        )),
        _ => None,
    };
    if let Some(link) = link {
        resp.push_str(&link);
    }
    resp
}

pub fn logs_text(records: &[serde_json::Value]) -> String {
    let contents: Vec<&str> = records
        .iter()
        .map(|line| line.get("content").and_then(|c| c.as_str()).unwrap_or("Empty log"))
        .collect();
    format!(
        "Logs:\n{}",
        serde_json::to_string(&contents).unwrap_or_else(|_| "[]".to_string())
    )
}

pub fn verify_text(response: &VerifyResponse) -> String {
    let mut resp = String::from("DQL Statement Verification:\n");
    if !response.notifications.is_empty() {
        resp.push_str(
            "Please consider the following notifications for adapting your DQL statement:\n",
        );
        for notification in &response.notifications {
            resp.push_str(&format!(
                "* {}: {}\n",
                notification.severity, notification.message
            ));
        }
    }
    if response.valid {
        resp.push_str("The DQL statement is valid - you can use the \"execute_dql\" tool.\n");
    } else {
        resp.push_str("The DQL statement is invalid. Please adapt your statement.\n");
    }
    resp
}

/// Records plus the scan cost, the running budget state, and any budget
/// warning - everything a client needs to reason about query spend.
pub fn execute_dql_text(execution: &QueryExecution) -> String {
    let records =
        serde_json::to_string(&execution.records).unwrap_or_else(|_| "[]".to_string());
    let mut resp = format!("DQL Response: {records}\n");
    resp.push_str(&format!("Scan cost: {}\n", execution.cost_summary()));
    if let Some(state) = &execution.budget_state {
        if let Ok(state_json) = serde_json::to_string(state) {
            resp.push_str(&format!("Session budget: {state_json}\n"));
        }
    }
    if let Some(warning) = &execution.budget_warning {
        resp.push_str(&format!("\n{warning}\n"));
    }
    resp
}

pub fn nl2dql_text(text: &str, response: &Nl2DqlResponse) -> String {
    let mut resp = String::from("🔤 Natural Language to DQL:\n\n");
    resp.push_str(&format!("**Query:** \"{text}\"\n\n"));
    resp.push_str(&format!(
        "**Generated DQL:**\n```\n{}\n```\n\n",
        response.dql
    ));
    resp.push_str(&format!("**Status:** {}\n", response.status));
    resp.push_str(&format!("**Message Token:** {}\n", response.message_token));
    if !response.metadata.notifications.is_empty() {
        resp.push_str("\n**Notifications:**\n");
        for notification in &response.metadata.notifications {
            resp.push_str(&format!(
                "- {}: {}\n",
                notification.severity, notification.message
            ));
        }
    }
    resp.push_str("\n💡 **Next Steps:**\n");
    resp.push_str("1. Use \"verify_dql\" tool to validate this query\n");
    resp.push_str("2. Use \"execute_dql\" tool to run the query\n");
    resp.push_str(
        "3. If results don't match expectations, refine your natural language description and try again\n",
    );
    resp
}

pub fn dql2nl_text(dql: &str, response: &Dql2NlResponse) -> String {
    let mut resp = String::from("📝 DQL to Natural Language:\n\n");
    resp.push_str(&format!("**DQL Query:**\n```\n{dql}\n```\n\n"));
    resp.push_str(&format!("**Summary:** {}\n\n", response.summary));
    resp.push_str(&format!(
        "**Detailed Explanation:**\n{}\n\n",
        response.explanation
    ));
    resp.push_str(&format!("**Status:** {}\n", response.status));
    resp.push_str(&format!("**Message Token:** {}\n", response.message_token));
    if !response.metadata.notifications.is_empty() {
        resp.push_str("\n**Notifications:**\n");
        for notification in &response.metadata.notifications {
            resp.push_str(&format!(
                "- {}: {}\n",
                notification.severity, notification.message
            ));
        }
    }
    resp
}

pub fn copilot_chat_text(question: &str, response: &ConversationResponse) -> String {
    let mut resp = String::from("🤖 Davis CoPilot Response:\n\n");
    resp.push_str(&format!("**Your Question:** \"{question}\"\n\n"));
    resp.push_str(&format!("**Answer:**\n{}\n\n", response.text));
    resp.push_str(&format!("**Status:** {}\n", response.status));
    resp.push_str(&format!("**Message Token:** {}\n", response.message_token));
    if !response.metadata.sources.is_empty() {
        resp.push_str("\n**Sources:**\n");
        for source in &response.metadata.sources {
            resp.push_str(&format!(
                "- {}: {}\n",
                source.title.as_deref().unwrap_or("Untitled"),
                source.url.as_deref().unwrap_or("No URL")
            ));
        }
    }
    if !response.metadata.notifications.is_empty() {
        resp.push_str("\n**Notifications:**\n");
        for notification in &response.metadata.notifications {
            resp.push_str(&format!(
                "- {}: {}\n",
                notification.severity, notification.message
            ));
        }
    }
    if let Some(conversation_id) = response
        .state
        .as_ref()
        .and_then(|s| s.conversation_id.as_deref())
    {
        resp.push_str(&format!("\n**Conversation ID:** {conversation_id}"));
    }
    resp
}

pub fn workflow_created_text(
    workflow: &Workflow,
    environment_url: &str,
    is_private: bool,
) -> String {
    let mut resp = format!(
        "Workflow Created: {} with name {}.\n\
         You can access the Workflow via the following link: \
         {environment_url}/ui/apps/dynatrace.automations/workflows/{}.\n\
         Tell the user to inspect the Workflow by visiting the link.\n",
        workflow.id, workflow.title, workflow.id
    );
    match workflow.workflow_type.as_str() {
        "SIMPLE" => {
            resp.push_str("Note: This is a simple workflow. Workflow-hours will not be billed.\n")
        }
        "STANDARD" => {
            resp.push_str("Note: This is a standard workflow. Workflow-hours will be billed.\n")
        }
        _ => {}
    }
    if is_private {
        resp.push_str(
            "This workflow is private and can only be accessed by the owner of the \
             authentication credentials. In case you can not access it, you can instruct me \
             to make the workflow public.",
        );
    }
    resp
}

pub fn workflow_public_text(workflow: &Workflow, environment_url: &str) -> String {
    format!(
        "Workflow {} is now public!\n\
         You can access the Workflow via the following link: \
         {environment_url}/ui/apps/dynatrace.automations/workflows/{}.\n\
         Tell the user to inspect the Workflow by visiting the link.\n",
        workflow.id, workflow.id
    )
}

pub fn kubernetes_events_text(records: &[serde_json::Value]) -> String {
    format!(
        "Kubernetes Events:\n{}",
        serde_json::to_string(records).unwrap_or_else(|_| "[]".to_string())
    )
}

pub fn ownership_text(ownership: &serde_json::Value) -> String {
    format!("Ownership information:\n{ownership}")
}

pub fn email_text(result: &EmailSendResult) -> String {
    let mut resp = format!(
        "Email accepted for delivery (request id: {}): {}\n",
        result.request_id, result.message
    );
    if !result.invalid_destinations.is_empty() {
        resp.push_str(&format!(
            "Invalid destinations: {}\n",
            result.invalid_destinations.join(", ")
        ));
    }
    if !result.bouncing_destinations.is_empty() {
        resp.push_str(&format!(
            "Bouncing destinations: {}\n",
            result.bouncing_destinations.join(", ")
        ));
    }
    if !result.complaining_destinations.is_empty() {
        resp.push_str(&format!(
            "Complaining destinations: {}\n",
            result.complaining_destinations.join(", ")
        ));
    }
    resp
}

#[cfg(test)]
mod tests {
    use super::*;
    use dtmcp_ports::VerifyNotification;
    use serde_json::json;

    const ENV: &str = "https://abc.apps.dynatrace.com";

    #[test]
    fn test_verify_text_valid_statement() {
        let text = verify_text(&VerifyResponse {
            valid: true,
            notifications: vec![],
        });
        assert!(text.contains("is valid"));
        assert!(text.contains("execute_dql"));
    }

    #[test]
    fn test_verify_text_lists_notifications() {
        let text = verify_text(&VerifyResponse {
            valid: false,
            notifications: vec![VerifyNotification {
                severity: "WARNING".to_string(),
                message: "deprecated command".to_string(),
            }],
        });
        assert!(text.contains("* WARNING: deprecated command"));
        assert!(text.contains("is invalid"));
    }

    #[test]
    fn test_problems_text_empty() {
        assert_eq!(problems_text(&[]), "No problems found");
    }

    #[test]
    fn test_entity_details_links_by_type() {
        let host: EntityDetails = serde_json::from_value(json!({
            "entityId": "HOST-1",
            "displayName": "web-01",
            "type": "HOST",
            "properties": {}
        }))
        .unwrap();
        let text = entity_details_text(&host, ENV);
        assert!(text.contains("dynatrace.infraops/hosts/HOST-1"));

        let queue: EntityDetails = serde_json::from_value(json!({
            "entityId": "QUEUE-1",
            "displayName": "orders",
            "type": "QUEUE",
            "properties": {}
        }))
        .unwrap();
        let text = entity_details_text(&queue, ENV);
        assert!(!text.contains("/ui/apps/"));
    }

    #[test]
    fn test_logs_text_uses_content_field() {
        let records = vec![json!({"content": "error: boom"}), json!({"level": "INFO"})];
        let text = logs_text(&records);
        assert!(text.contains("error: boom"));
        assert!(text.contains("Empty log"));
    }

    #[test]
    fn test_vulnerability_details_high_risk_hint() {
        let details: SecurityProblemDetails = serde_json::from_value(json!({
            "securityProblemId": "sp-1",
            "displayId": "S-1",
            "title": "Log4Shell",
            "riskAssessment": { "riskScore": 9.8 }
        }))
        .unwrap();
        let text = vulnerability_details_text(&details, ENV);
        assert!(text.contains("high-risk score"));
        assert!(text.contains("vulnerabilities/sp-1"));
        assert!(text.contains("does not seem to affect any entities"));
    }
}
