//! Parameter types for the MCP tools
//!
//! Field names are camelCase on the wire to match what Dynatrace MCP clients
//! already send.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[schemars(description = "Parameters for fetching vulnerability details")]
pub struct GetVulnerabilityDetailsParams {
    #[schemars(description = "The securityProblemId of the vulnerability")]
    pub security_problem_id: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[schemars(description = "Parameters for fetching problem details")]
pub struct GetProblemDetailsParams {
    #[schemars(description = "The id of the problem")]
    pub problem_id: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[schemars(description = "Parameters for finding a monitored entity by name")]
pub struct FindEntityByNameParams {
    #[schemars(description = "Name of the entity to search for")]
    pub entity_name: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[schemars(description = "Parameters for fetching monitored entity details")]
pub struct GetEntityDetailsParams {
    #[schemars(description = "The entityId of the monitored entity, e.g. HOST-1234567890ABCDEF")]
    pub entity_id: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[schemars(description = "Parameters for sending a Slack message")]
pub struct SendSlackMessageParams {
    #[schemars(description = "The Slack channel to post to")]
    pub channel: String,
    #[schemars(description = "The message to send")]
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[schemars(description = "Parameters for fetching logs of a monitored entity")]
pub struct GetLogsForEntityParams {
    #[schemars(description = "The entityId of the monitored entity to fetch logs for")]
    pub entity_id: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[schemars(description = "Parameters for verifying a DQL statement")]
pub struct VerifyDqlParams {
    #[schemars(description = "The DQL statement to verify")]
    pub dql_statement: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[schemars(description = "Parameters for executing a DQL statement")]
pub struct ExecuteDqlParams {
    #[schemars(
        description = "The DQL statement to execute, e.g. \"fetch logs | filter dt.source_entity == 'HOST-123' | limit 10\""
    )]
    pub dql_statement: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[schemars(description = "Parameters for generating DQL from natural language")]
pub struct GenerateDqlParams {
    #[schemars(
        description = "Natural language description of what you want to query. Be specific and include time ranges, entities, and metrics of interest."
    )]
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[schemars(description = "Parameters for explaining a DQL statement in natural language")]
pub struct ExplainDqlParams {
    #[schemars(description = "The DQL statement to explain")]
    pub dql: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[schemars(description = "Parameters for a Davis CoPilot conversation turn")]
pub struct ChatWithCopilotParams {
    #[schemars(description = "Your question or request for Davis CoPilot")]
    pub text: String,
    #[schemars(description = "Optional context to provide additional information")]
    pub context: Option<String>,
    #[schemars(description = "Optional instruction for how to format the response")]
    pub instruction: Option<String>,
}

fn default_false() -> bool {
    false
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[schemars(description = "Parameters for creating a problem-notification workflow")]
pub struct CreateWorkflowParams {
    #[schemars(description = "Davis problem category to notify on, e.g. ERROR or AVAILABILITY")]
    pub problem_type: String,
    #[schemars(description = "Name of the team to notify")]
    pub team_name: String,
    #[schemars(description = "The Slack channel to notify")]
    pub channel: String,
    #[schemars(description = "Whether the workflow should be private (default: false)")]
    #[serde(default = "default_false")]
    pub is_private: bool,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[schemars(description = "Parameters for making a workflow public")]
pub struct MakeWorkflowPublicParams {
    #[schemars(description = "The id of the workflow to make public")]
    pub workflow_id: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[schemars(description = "Parameters for fetching Kubernetes cluster events")]
pub struct GetKubernetesEventsParams {
    #[schemars(
        description = "The Kubernetes (K8s) cluster id, referred to as k8s.cluster.uid (this is NOT the Dynatrace environment)"
    )]
    pub cluster_id: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[schemars(description = "Parameters for fetching ownership information")]
pub struct GetOwnershipParams {
    #[schemars(description = "Comma separated list of entityIds")]
    pub entity_ids: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[schemars(description = "Parameters for sending a plain-text email")]
pub struct SendEmailParams {
    #[schemars(description = "TO recipients (at most 10 recipients across TO, CC, and BCC)")]
    pub to_recipients: Vec<String>,
    #[schemars(description = "Optional CC recipients")]
    #[serde(default)]
    pub cc_recipients: Vec<String>,
    #[schemars(description = "Optional BCC recipients")]
    #[serde(default)]
    pub bcc_recipients: Vec<String>,
    #[schemars(description = "The email subject")]
    pub subject: String,
    #[schemars(description = "The plain-text email body")]
    pub body: String,
}
