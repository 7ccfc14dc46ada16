//! Davis CoPilot skills
//!
//! Natural-language-to-DQL, DQL explanation, and conversational assistance.
//! Davis CoPilot AI is generally available, the APIs are still in preview.

use crate::client::PlatformClient;
use crate::BASE_SCOPES;
use dtmcp_core::Result;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

const NL2DQL_PATH: &str = "/platform/davis/copilot/v0.2/skills/nl2dql:execute";
const DQL2NL_PATH: &str = "/platform/davis/copilot/v0.2/skills/dql2nl:execute";
const CONVERSATION_PATH: &str = "/platform/davis/copilot/v0.2/skills/conversations:execute";

#[derive(Debug, Clone, Deserialize)]
pub struct CopilotNotification {
    #[serde(default)]
    pub severity: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CopilotSource {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CopilotMetadata {
    #[serde(default)]
    pub notifications: Vec<CopilotNotification>,
    #[serde(default)]
    pub sources: Vec<CopilotSource>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Nl2DqlResponse {
    #[serde(default)]
    pub dql: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message_token: String,
    #[serde(default)]
    pub metadata: CopilotMetadata,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dql2NlResponse {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message_token: String,
    #[serde(default)]
    pub metadata: CopilotMetadata,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationState {
    #[serde(default)]
    pub conversation_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationResponse {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message_token: String,
    #[serde(default)]
    pub state: Option<ConversationState>,
    #[serde(default)]
    pub metadata: CopilotMetadata,
}

/// Supplementary or instruction context attached to a conversation turn.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationContext {
    #[serde(rename = "type")]
    pub context_type: String,
    pub value: String,
}

impl ConversationContext {
    pub fn supplementary(value: impl Into<String>) -> Self {
        Self {
            context_type: "supplementary".to_string(),
            value: value.into(),
        }
    }

    pub fn instruction(value: impl Into<String>) -> Self {
        Self {
            context_type: "instruction".to_string(),
            value: value.into(),
        }
    }
}

pub struct CopilotGateway {
    client: Arc<PlatformClient>,
}

impl CopilotGateway {
    pub fn new(client: Arc<PlatformClient>) -> Self {
        Self { client }
    }

    /// Convert a plain-English description into a DQL statement.
    pub async fn nl_to_dql(&self, text: &str) -> Result<Nl2DqlResponse> {
        let scopes = with_base("davis-copilot:nl2dql:execute");
        let body = self
            .client
            .post(NL2DQL_PATH, &[], &scopes, &json!({ "text": text }))
            .await?;
        Ok(serde_json::from_value(body)?)
    }

    /// Explain a DQL statement in plain English.
    pub async fn dql_to_nl(&self, dql: &str) -> Result<Dql2NlResponse> {
        let scopes = with_base("davis-copilot:dql2nl:execute");
        let body = self
            .client
            .post(DQL2NL_PATH, &[], &scopes, &json!({ "dql": dql }))
            .await?;
        Ok(serde_json::from_value(body)?)
    }

    /// One conversation turn with Davis CoPilot.
    pub async fn chat(
        &self,
        text: &str,
        context: &[ConversationContext],
    ) -> Result<ConversationResponse> {
        let scopes = with_base("davis-copilot:conversations:execute");
        let body = self
            .client
            .post(
                CONVERSATION_PATH,
                &[],
                &scopes,
                &json!({ "text": text, "context": context }),
            )
            .await?;
        Ok(serde_json::from_value(body)?)
    }
}

fn with_base(extra: &'static str) -> Vec<&'static str> {
    BASE_SCOPES.iter().copied().chain([extra]).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversation_context_serializes_with_type_field() {
        let context = ConversationContext::instruction("answer briefly");
        let value = serde_json::to_value(&context).unwrap();
        assert_eq!(value["type"], "instruction");
        assert_eq!(value["value"], "answer briefly");
    }

    #[test]
    fn test_nl2dql_response_tolerates_missing_metadata() {
        let response: Nl2DqlResponse = serde_json::from_value(serde_json::json!({
            "dql": "fetch logs",
            "status": "SUCCEEDED",
            "messageToken": "tok"
        }))
        .unwrap();
        assert_eq!(response.dql, "fetch logs");
        assert!(response.metadata.notifications.is_empty());
    }
}
