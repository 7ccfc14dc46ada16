//! Slack connector app function

use crate::client::PlatformClient;
use crate::BASE_SCOPES;
use dtmcp_core::Result;
use serde_json::json;
use std::sync::Arc;

pub struct SlackGateway {
    client: Arc<PlatformClient>,
    connection_id: String,
}

impl SlackGateway {
    pub fn new(client: Arc<PlatformClient>, connection_id: impl Into<String>) -> Self {
        Self {
            client,
            connection_id: connection_id.into(),
        }
    }

    /// Post a message to a channel via the configured Slack connection.
    /// Returns the raw connector response.
    pub async fn send_message(&self, channel: &str, message: &str) -> Result<serde_json::Value> {
        let path = "/platform/app-engine/app-functions/v1/apps/dynatrace.slack/api/slack/chat.postMessage";
        let scopes: Vec<&str> = BASE_SCOPES
            .iter()
            .copied()
            .chain(["app-settings:objects:read"])
            .collect();
        self.client
            .post(
                path,
                &[],
                &scopes,
                &json!({
                    "connection": self.connection_id,
                    "channel": channel,
                    "message": message,
                }),
            )
            .await
    }
}
