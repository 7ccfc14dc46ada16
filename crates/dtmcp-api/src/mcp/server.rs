//! MCP server implementation
//!
//! One tool per Dynatrace operation. Handlers stay thin: parse parameters,
//! call the application or gateway layer, format a text response. The only
//! stateful behavior here is the session scan budget on `execute_dql`.

use crate::mcp::error::DomainToMcpResult;
use crate::mcp::format;
use crate::mcp::params::{
    ChatWithCopilotParams, CreateWorkflowParams, ExecuteDqlParams, ExplainDqlParams,
    FindEntityByNameParams, GenerateDqlParams, GetEntityDetailsParams, GetKubernetesEventsParams,
    GetLogsForEntityParams, GetOwnershipParams, GetProblemDetailsParams,
    GetVulnerabilityDetailsParams, MakeWorkflowPublicParams, SendEmailParams,
    SendSlackMessageParams, VerifyDqlParams,
};
use crate::state::ApiState;
use dtmcp_application::capabilities;
use dtmcp_core::{Error, ExecuteRequest};
use dtmcp_gateway::{ConversationContext, EmailRequest};
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::*,
    tool, tool_handler, tool_router, ErrorData as McpError,
};
use std::sync::Arc;
use tracing::info;

fn text_result(text: String) -> CallToolResult {
    CallToolResult::success(vec![Content::text(text)])
}

/// MCP server exposing Dynatrace platform operations to LLM agents.
#[derive(Clone)]
pub struct DynatraceMcpServer {
    state: Arc<ApiState>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl DynatraceMcpServer {
    pub fn new(state: Arc<ApiState>) -> Self {
        Self {
            state,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(description = "Get information about the connected Dynatrace Environment (Tenant)")]
    async fn get_environment_info(&self) -> Result<CallToolResult, McpError> {
        let info = self
            .state
            .environment
            .environment_info()
            .await
            .mcp_domain()?;
        Ok(text_result(format::environment_info_text(
            &info,
            self.state.environment_url(),
        )))
    }

    #[tool(description = "List all vulnerabilities from Dynatrace")]
    async fn list_vulnerabilities(&self) -> Result<CallToolResult, McpError> {
        let vulnerabilities =
            capabilities::list_vulnerabilities(&self.state.query_service, None, None)
                .await
                .mcp_domain()?;
        Ok(text_result(format::vulnerabilities_text(
            &vulnerabilities,
            self.state.environment_url(),
        )))
    }

    #[tool(description = "Get details of a vulnerability by `securityProblemId` on Dynatrace")]
    async fn get_vulnerability_details(
        &self,
        Parameters(params): Parameters<GetVulnerabilityDetailsParams>,
    ) -> Result<CallToolResult, McpError> {
        let details = self
            .state
            .environment
            .security_problem_details(&params.security_problem_id)
            .await
            .mcp_domain()?;
        Ok(text_result(format::vulnerability_details_text(
            &details,
            self.state.environment_url(),
        )))
    }

    #[tool(description = "List all problems known on Dynatrace")]
    async fn list_problems(&self) -> Result<CallToolResult, McpError> {
        let problems = capabilities::list_problems(&self.state.query_service, None)
            .await
            .mcp_domain()?;
        Ok(text_result(format::problems_text(&problems)))
    }

    #[tool(description = "Get details of a problem on Dynatrace")]
    async fn get_problem_details(
        &self,
        Parameters(params): Parameters<GetProblemDetailsParams>,
    ) -> Result<CallToolResult, McpError> {
        let details = self
            .state
            .environment
            .problem_details(&params.problem_id)
            .await
            .mcp_domain()?;
        Ok(text_result(format::problem_details_text(
            &details,
            self.state.environment_url(),
        )))
    }

    #[tool(
        description = "Get the entityId of a monitored entity based on the name of the entity on Dynatrace"
    )]
    async fn find_entity_by_name(
        &self,
        Parameters(params): Parameters<FindEntityByNameParams>,
    ) -> Result<CallToolResult, McpError> {
        let response =
            capabilities::find_entity_by_name(&self.state.query_service, &params.entity_name)
                .await
                .mcp_domain()?;
        Ok(text_result(response))
    }

    #[tool(description = "Get details of a monitored entity based on the entityId on Dynatrace")]
    async fn get_entity_details(
        &self,
        Parameters(params): Parameters<GetEntityDetailsParams>,
    ) -> Result<CallToolResult, McpError> {
        let details = self
            .state
            .environment
            .entity_details(&params.entity_id)
            .await
            .mcp_domain()?;
        Ok(text_result(format::entity_details_text(
            &details,
            self.state.environment_url(),
        )))
    }

    #[tool(
        description = "Sends a Slack message to a dedicated Slack channel via Slack Connector on Dynatrace"
    )]
    async fn send_slack_message(
        &self,
        Parameters(params): Parameters<SendSlackMessageParams>,
    ) -> Result<CallToolResult, McpError> {
        let response = self
            .state
            .slack
            .send_message(&params.channel, &params.message)
            .await
            .mcp_domain()?;
        Ok(text_result(format!(
            "Message sent to Slack channel: {response}"
        )))
    }

    #[tool(description = "Get logs for a monitored entity based on the entityId on Dynatrace")]
    async fn get_logs_for_entity(
        &self,
        Parameters(params): Parameters<GetLogsForEntityParams>,
    ) -> Result<CallToolResult, McpError> {
        let logs = capabilities::logs_for_entity(&self.state.query_service, &params.entity_id)
            .await
            .mcp_domain()?;
        Ok(text_result(format::logs_text(&logs)))
    }

    #[tool(
        description = "Verify a Dynatrace Query Language (DQL) statement on Dynatrace Grail before executing it. This is useful to ensure that the DQL statement is valid and can be executed without errors."
    )]
    async fn verify_dql(
        &self,
        Parameters(params): Parameters<VerifyDqlParams>,
    ) -> Result<CallToolResult, McpError> {
        let response = self
            .state
            .verifier
            .verify_query(&params.dql_statement)
            .await
            .mcp_domain()?;
        Ok(text_result(format::verify_text(&response)))
    }

    #[tool(
        description = "Get logs, metrics, spans or events from Dynatrace Grail by executing a Dynatrace Query Language (DQL) statement. Always use the \"verify_dql\" tool before you execute a DQL statement. A valid statement looks like this: \"fetch [logs, metrics, spans, events] | filter <some-filter> | summarize count(), by:{some-fields}\". Adapt filters for certain attributes: `traceId` could be `trace_id` or `trace.id`. Scanned bytes count against the session budget."
    )]
    async fn execute_dql(
        &self,
        Parameters(params): Parameters<ExecuteDqlParams>,
    ) -> Result<CallToolResult, McpError> {
        let request = ExecuteRequest::new(params.dql_statement);
        let outcome = self
            .state
            .query_service
            .execute_with_budget(&request, &self.state.budget)
            .await;

        match outcome {
            Ok(Some(execution)) => Ok(text_result(format::execute_dql_text(&execution))),
            Ok(None) => Ok(text_result(
                "The query did not produce a result. Please verify the statement with the \
                 \"verify_dql\" tool and try again."
                    .to_string(),
            )),
            // surface the budget gate as a normal text response so the agent
            // can relay it instead of treating it as a tool failure
            Err(Error::BudgetExceeded(warning)) => Ok(text_result(warning)),
            Err(e) => Err(e).mcp_domain(),
        }
    }

    #[tool(
        description = "Convert natural language queries to Dynatrace Query Language (DQL) using Davis CoPilot AI. You can ask for problem events, security issues, logs, metrics, spans, and custom data. Workflow: 1) Generate DQL, 2) Verify with verify_dql tool, 3) Execute with execute_dql tool, 4) Iterate if results don't match expectations."
    )]
    async fn generate_dql_from_natural_language(
        &self,
        Parameters(params): Parameters<GenerateDqlParams>,
    ) -> Result<CallToolResult, McpError> {
        let response = self.state.copilot.nl_to_dql(&params.text).await.mcp_domain()?;
        Ok(text_result(format::nl2dql_text(&params.text, &response)))
    }

    #[tool(
        description = "Explain Dynatrace Query Language (DQL) statements in natural language using Davis CoPilot AI."
    )]
    async fn explain_dql_in_natural_language(
        &self,
        Parameters(params): Parameters<ExplainDqlParams>,
    ) -> Result<CallToolResult, McpError> {
        let response = self.state.copilot.dql_to_nl(&params.dql).await.mcp_domain()?;
        Ok(text_result(format::dql2nl_text(&params.dql, &response)))
    }

    #[tool(
        description = "Use this tool in case no specific tool is available. Get an answer to any Dynatrace related question as well as troubleshooting and guidance. (Note: Davis CoPilot AI is GA, but the Davis CoPilot APIs are in preview)"
    )]
    async fn chat_with_davis_copilot(
        &self,
        Parameters(params): Parameters<ChatWithCopilotParams>,
    ) -> Result<CallToolResult, McpError> {
        let mut context = Vec::new();
        if let Some(supplementary) = &params.context {
            context.push(ConversationContext::supplementary(supplementary));
        }
        if let Some(instruction) = &params.instruction {
            context.push(ConversationContext::instruction(instruction));
        }
        let response = self
            .state
            .copilot
            .chat(&params.text, &context)
            .await
            .mcp_domain()?;
        Ok(text_result(format::copilot_chat_text(
            &params.text,
            &response,
        )))
    }

    #[tool(
        description = "Create a notification for a team based on a problem type within Workflows in Dynatrace"
    )]
    async fn create_workflow_for_notification(
        &self,
        Parameters(params): Parameters<CreateWorkflowParams>,
    ) -> Result<CallToolResult, McpError> {
        let workflow = self
            .state
            .workflows
            .create_notification_workflow(
                &params.team_name,
                &params.channel,
                &params.problem_type,
                params.is_private,
                self.state.slack_connection_id(),
            )
            .await
            .mcp_domain()?;
        info!(workflow_id = %workflow.id, "created notification workflow");
        Ok(text_result(format::workflow_created_text(
            &workflow,
            self.state.environment_url(),
            params.is_private,
        )))
    }

    #[tool(
        description = "Modify a workflow and make it publicly available to everyone on the Dynatrace environment"
    )]
    async fn make_workflow_public(
        &self,
        Parameters(params): Parameters<MakeWorkflowPublicParams>,
    ) -> Result<CallToolResult, McpError> {
        let workflow = self
            .state
            .workflows
            .make_public(&params.workflow_id)
            .await
            .mcp_domain()?;
        Ok(text_result(format::workflow_public_text(
            &workflow,
            self.state.environment_url(),
        )))
    }

    #[tool(description = "Get all events from a specific Kubernetes (K8s) cluster")]
    async fn get_kubernetes_events(
        &self,
        Parameters(params): Parameters<GetKubernetesEventsParams>,
    ) -> Result<CallToolResult, McpError> {
        let events = capabilities::cluster_events(&self.state.query_service, &params.cluster_id)
            .await
            .mcp_domain()?;
        Ok(text_result(format::kubernetes_events_text(&events)))
    }

    #[tool(
        description = "Get detailed ownership information for one or multiple entities on Dynatrace"
    )]
    async fn get_ownership(
        &self,
        Parameters(params): Parameters<GetOwnershipParams>,
    ) -> Result<CallToolResult, McpError> {
        info!(entity_ids = %params.entity_ids, "fetching ownership");
        let ownership = self
            .state
            .environment
            .ownership(&params.entity_ids)
            .await
            .mcp_domain()?;
        Ok(text_result(format::ownership_text(&ownership)))
    }

    #[tool(
        description = "Send a plain-text email via the Dynatrace environment. At most 10 recipients are allowed across TO, CC, and BCC."
    )]
    async fn send_email(
        &self,
        Parameters(params): Parameters<SendEmailParams>,
    ) -> Result<CallToolResult, McpError> {
        let request = EmailRequest {
            to: params.to_recipients,
            cc: params.cc_recipients,
            bcc: params.bcc_recipients,
            subject: params.subject,
            body: params.body,
        };
        let result = self.state.email.send(&request).await.mcp_domain()?;
        Ok(text_result(format::email_text(&result)))
    }
}

#[tool_handler(router = self.tool_router)]
impl rmcp::ServerHandler for DynatraceMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "Dynatrace MCP Server".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            instructions: Some(
                "# Dynatrace MCP Server\n\n\
                 Query and act on a Dynatrace environment: problems, vulnerabilities, \
                 logs, entities, Kubernetes events, workflows, and Grail DQL.\n\n\
                 ## Typical DQL workflow\n\
                 1. generate_dql_from_natural_language (optional)\n\
                 2. verify_dql\n\
                 3. execute_dql\n\n\
                 execute_dql counts scanned bytes against a session-wide budget; once the \
                 budget is exhausted, further queries are refused for this session.\n\n\
                 ## Tips\n\
                 - Use find_entity_by_name to resolve entity names to entityIds first\n\
                 - Use chat_with_davis_copilot when no specific tool fits"
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // the router is assembled at construction; this catches duplicate or
    // misdeclared tool attributes at test time
    #[test]
    fn test_tool_router_lists_all_tools() {
        let router: ToolRouter<DynatraceMcpServer> = DynatraceMcpServer::tool_router();
        let names: Vec<String> = router
            .list_all()
            .into_iter()
            .map(|tool| tool.name.to_string())
            .collect();
        for expected in [
            "get_environment_info",
            "list_vulnerabilities",
            "get_vulnerability_details",
            "list_problems",
            "get_problem_details",
            "find_entity_by_name",
            "get_entity_details",
            "send_slack_message",
            "get_logs_for_entity",
            "verify_dql",
            "execute_dql",
            "generate_dql_from_natural_language",
            "explain_dql_in_natural_language",
            "chat_with_davis_copilot",
            "create_workflow_for_notification",
            "make_workflow_public",
            "get_kubernetes_events",
            "get_ownership",
            "send_email",
        ] {
            assert!(names.contains(&expected.to_string()), "missing {expected}");
        }
        assert_eq!(names.len(), 19);
    }
}
