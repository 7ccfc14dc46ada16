//! Platform email endpoint
//!
//! Plain-text email only. The API answers 202 Accepted on success; at most
//! ten recipients are allowed across TO, CC, and BCC, checked locally before
//! any request is sent.

use crate::client::PlatformClient;
use crate::BASE_SCOPES;
use dtmcp_config::constants::EMAIL_MAX_RECIPIENTS;
use dtmcp_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const EMAIL_PATH: &str = "/platform/email/v1/emails";

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailRecipients {
    pub email_addresses: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct EmailBody {
    content_type: &'static str,
    body: String,
}

#[derive(Debug, Clone)]
pub struct EmailRequest {
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
    pub subject: String,
    pub body: String,
}

impl EmailRequest {
    fn recipient_count(&self) -> usize {
        self.to.len() + self.cc.len() + self.bcc.len()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RejectedDestinations {
    #[serde(default)]
    bouncing_destinations: Vec<String>,
    #[serde(default)]
    complaining_destinations: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EmailResponse {
    #[serde(default)]
    request_id: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    rejected_destinations: Option<RejectedDestinations>,
    #[serde(default)]
    invalid_destinations: Vec<String>,
}

/// Outcome of an accepted email request, including any destinations the
/// platform refused to deliver to.
#[derive(Debug, Clone)]
pub struct EmailSendResult {
    pub request_id: String,
    pub message: String,
    pub invalid_destinations: Vec<String>,
    pub bouncing_destinations: Vec<String>,
    pub complaining_destinations: Vec<String>,
}

pub struct EmailGateway {
    client: Arc<PlatformClient>,
}

impl EmailGateway {
    pub fn new(client: Arc<PlatformClient>) -> Self {
        Self { client }
    }

    pub async fn send(&self, request: &EmailRequest) -> Result<EmailSendResult> {
        let total = request.recipient_count();
        if total > EMAIL_MAX_RECIPIENTS {
            return Err(Error::InvalidConfig(format!(
                "Total recipients ({total}) exceeds maximum limit of {EMAIL_MAX_RECIPIENTS} \
                 across TO, CC, and BCC fields"
            )));
        }

        let body = serde_json::json!({
            "toRecipients": EmailRecipients { email_addresses: request.to.clone() },
            "ccRecipients": EmailRecipients { email_addresses: request.cc.clone() },
            "bccRecipients": EmailRecipients { email_addresses: request.bcc.clone() },
            "subject": request.subject,
            "body": EmailBody { content_type: "text/plain", body: request.body.clone() },
        });

        let scopes: Vec<&str> = BASE_SCOPES
            .iter()
            .copied()
            .chain(["email:emails:send"])
            .collect();
        let response = self
            .client
            .post_with_status(EMAIL_PATH, &scopes, &body)
            .await?;

        // the email API signals acceptance with exactly 202
        if response.status.as_u16() != 202 {
            return Err(Error::Http {
                status: response.status.as_u16(),
                message: format!("Unexpected email API response: {}", response.body),
            });
        }

        let parsed: EmailResponse = serde_json::from_value(response.body)?;
        let rejected = parsed.rejected_destinations.unwrap_or_default();
        Ok(EmailSendResult {
            request_id: parsed.request_id,
            message: parsed.message,
            invalid_destinations: parsed.invalid_destinations,
            bouncing_destinations: rejected.bouncing_destinations,
            complaining_destinations: rejected.complaining_destinations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipient_count_spans_all_fields() {
        let request = EmailRequest {
            to: vec!["a@example.com".to_string(); 4],
            cc: vec!["b@example.com".to_string(); 4],
            bcc: vec!["c@example.com".to_string(); 3],
            subject: "s".to_string(),
            body: "b".to_string(),
        };
        assert_eq!(request.recipient_count(), 11);
        assert!(request.recipient_count() > EMAIL_MAX_RECIPIENTS);
    }
}
