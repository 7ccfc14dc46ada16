//! Shared state for the MCP server

use dtmcp_application::QueryExecutionService;
use dtmcp_core::{session_tracker, GrailBudgetTracker, Result};
use dtmcp_gateway::{
    CopilotGateway, EmailGateway, EnvironmentGateway, GrailGateway, PlatformClient, SlackGateway,
    WorkflowGateway,
};
use dtmcp_ports::GrailQueryVerifierRef;
use std::sync::Arc;

/// Everything the tool handlers need, constructed once at startup.
pub struct ApiState {
    environment_url: String,
    slack_connection_id: String,
    pub query_service: QueryExecutionService,
    pub verifier: GrailQueryVerifierRef,
    pub environment: EnvironmentGateway,
    pub copilot: CopilotGateway,
    pub slack: SlackGateway,
    pub workflows: WorkflowGateway,
    pub email: EmailGateway,
    /// Session-wide scan budget; shared by every `execute_dql` call for the
    /// lifetime of the process.
    pub budget: Arc<GrailBudgetTracker>,
}

impl ApiState {
    pub fn new(env: &dtmcp_config::DynatraceEnv) -> Result<Self> {
        let client = Arc::new(PlatformClient::new(env)?);
        let grail = Arc::new(GrailGateway::new(client.clone()));
        let query_service =
            QueryExecutionService::new(grail.clone(), client.client_context().to_string());

        Ok(Self {
            environment_url: env.dt_environment.trim_end_matches('/').to_string(),
            slack_connection_id: env.slack_connection_id.clone(),
            query_service,
            verifier: grail,
            environment: EnvironmentGateway::new(client.clone()),
            copilot: CopilotGateway::new(client.clone()),
            slack: SlackGateway::new(client.clone(), env.slack_connection_id.clone()),
            workflows: WorkflowGateway::new(client.clone()),
            email: EmailGateway::new(client),
            budget: session_tracker(Some(env.grail_budget_gb)),
        })
    }

    /// The environment base URL, used for UI deep links in responses.
    pub fn environment_url(&self) -> &str {
        &self.environment_url
    }

    pub fn slack_connection_id(&self) -> &str {
        &self.slack_connection_id
    }
}
