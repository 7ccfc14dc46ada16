//! Grail query endpoints
//!
//! Implements the executor and verifier ports over the storage query API.
//! The client context string travels as the `dt-client-context` query
//! parameter on execute and poll calls.

use crate::client::PlatformClient;
use crate::BASE_SCOPES;
use async_trait::async_trait;
use dtmcp_core::{ExecuteRequest, QueryPollResponse, QueryStartResponse, Result};
use dtmcp_ports::{GrailQueryExecutor, GrailQueryVerifier, VerifyResponse};
use serde_json::json;
use std::sync::Arc;

const QUERY_EXECUTE_PATH: &str = "/platform/storage/query/v1/query:execute";
const QUERY_POLL_PATH: &str = "/platform/storage/query/v1/query:poll";
const QUERY_VERIFY_PATH: &str = "/platform/storage/query/v1/query:verify";

/// Scopes needed to scan the Grail buckets a user statement may touch.
const GRAIL_READ_SCOPES: &[&str] = &[
    "storage:buckets:read",
    "storage:logs:read",
    "storage:metrics:read",
    "storage:bizevents:read",
    "storage:spans:read",
    "storage:entities:read",
    "storage:events:read",
    "storage:system:read",
    "storage:user.events:read",
    "storage:user.sessions:read",
    "storage:security.events:read",
];

pub struct GrailGateway {
    client: Arc<PlatformClient>,
    scopes: Vec<&'static str>,
}

impl GrailGateway {
    pub fn new(client: Arc<PlatformClient>) -> Self {
        let scopes = BASE_SCOPES
            .iter()
            .chain(GRAIL_READ_SCOPES)
            .copied()
            .collect();
        Self { client, scopes }
    }
}

#[async_trait]
impl GrailQueryExecutor for GrailGateway {
    async fn submit_query(
        &self,
        request: &ExecuteRequest,
        client_context: &str,
    ) -> Result<QueryStartResponse> {
        let body = self
            .client
            .post(
                QUERY_EXECUTE_PATH,
                &[("dt-client-context", client_context)],
                &self.scopes,
                request,
            )
            .await?;
        Ok(serde_json::from_value(body)?)
    }

    async fn poll_query(
        &self,
        request_token: &str,
        client_context: &str,
    ) -> Result<QueryPollResponse> {
        let body = self
            .client
            .get(
                QUERY_POLL_PATH,
                &[
                    ("request-token", request_token),
                    ("dt-client-context", client_context),
                ],
                &self.scopes,
            )
            .await?;
        Ok(serde_json::from_value(body)?)
    }
}

#[async_trait]
impl GrailQueryVerifier for GrailGateway {
    async fn verify_query(&self, statement: &str) -> Result<VerifyResponse> {
        let body = self
            .client
            .post(
                QUERY_VERIFY_PATH,
                &[],
                BASE_SCOPES,
                &json!({ "query": statement }),
            )
            .await?;
        Ok(serde_json::from_value(body)?)
    }
}
