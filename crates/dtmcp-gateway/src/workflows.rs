//! Automation workflows
//!
//! Creates a notification workflow that posts to Slack whenever a Davis
//! problem of a given category opens, and can flip an existing workflow
//! from private to public.

use crate::client::PlatformClient;
use crate::BASE_SCOPES;
use dtmcp_core::Result;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

const WORKFLOWS_PATH: &str = "/platform/automation/v1/workflows";

const WORKFLOW_SCOPES: &[&str] = &[
    "automation:workflows:write",
    "automation:workflows:read",
    "automation:workflows:run",
];

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// `SIMPLE` workflows are free of charge, `STANDARD` ones bill
    /// workflow-hours.
    #[serde(rename = "type", default)]
    pub workflow_type: String,
    #[serde(default)]
    pub is_private: bool,
}

pub struct WorkflowGateway {
    client: Arc<PlatformClient>,
}

impl WorkflowGateway {
    pub fn new(client: Arc<PlatformClient>) -> Self {
        Self { client }
    }

    /// Create a workflow that notifies `team_name` in the given Slack
    /// channel whenever a problem of `problem_category` opens.
    pub async fn create_notification_workflow(
        &self,
        team_name: &str,
        channel: &str,
        problem_category: &str,
        is_private: bool,
        slack_connection_id: &str,
    ) -> Result<Workflow> {
        let scopes = scopes();
        let title = format!("Notify {team_name} on {problem_category} problems");
        let message = format!(
            "Dynatrace detected a {problem_category} problem for team {team_name}: \
             {{{{ event()[\"event.name\"] }}}} ({{{{ event()[\"display_id\"] }}}})"
        );
        let body = json!({
            "title": title,
            "description": format!("Automated problem notification for team {team_name}"),
            "isPrivate": is_private,
            "trigger": {
                "eventTrigger": {
                    "triggerConfiguration": {
                        "type": "davis-problem",
                        "value": {
                            "categories": { problem_category: true },
                            "onProblemClose": false,
                        }
                    }
                }
            },
            "tasks": {
                "send_slack_notification": {
                    "name": "send_slack_notification",
                    "action": "dynatrace.slack:slack-send-message",
                    "input": {
                        "connection": slack_connection_id,
                        "channel": channel,
                        "message": message,
                    }
                }
            }
        });

        let response = self.client.post(WORKFLOWS_PATH, &[], &scopes, &body).await?;
        Ok(serde_json::from_value(response)?)
    }

    /// Make a workflow visible to everyone on the environment.
    pub async fn make_public(&self, workflow_id: &str) -> Result<Workflow> {
        let scopes = scopes();
        let response = self
            .client
            .patch(
                &format!("{WORKFLOWS_PATH}/{workflow_id}"),
                &scopes,
                &json!({ "isPrivate": false }),
            )
            .await?;
        Ok(serde_json::from_value(response)?)
    }
}

fn scopes() -> Vec<&'static str> {
    BASE_SCOPES.iter().chain(WORKFLOW_SCOPES).copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workflow_deserializes_type_field() {
        let workflow: Workflow = serde_json::from_value(json!({
            "id": "wf-1",
            "title": "Notify ops on ERROR problems",
            "type": "SIMPLE",
            "isPrivate": true
        }))
        .unwrap();
        assert_eq!(workflow.workflow_type, "SIMPLE");
        assert!(workflow.is_private);
    }
}
