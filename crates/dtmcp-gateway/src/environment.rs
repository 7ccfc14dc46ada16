//! Environment, entity, problem, and ownership endpoints
//!
//! Mix of the platform management API, the classic environment v2 API, and
//! the ownership app function.

use crate::client::PlatformClient;
use crate::BASE_SCOPES;
use dtmcp_core::Result;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

const ENVIRONMENT_INFO_PATH: &str = "/platform/management/v1/environment";
const ENTITIES_PATH: &str = "/platform/classic/environment-api/v2/entities";
const PROBLEMS_PATH: &str = "/platform/classic/environment-api/v2/problems";
const SECURITY_PROBLEMS_PATH: &str = "/platform/classic/environment-api/v2/securityProblems";
const OWNERSHIP_PATH: &str =
    "/platform/app-engine/app-functions/v1/apps/dynatrace.ownership/api/ownership/get-ownership-from-entity";

/// Details of a monitored entity from the classic v2 API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityDetails {
    pub entity_id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(rename = "type", default)]
    pub entity_type: String,
    #[serde(default)]
    pub properties: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityStub {
    #[serde(default)]
    pub id: Option<String>,
}

/// One entity affected by a problem.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactedEntity {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub entity_id: Option<EntityStub>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemImpact {
    #[serde(default)]
    pub estimated_affected_users: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactAnalysis {
    #[serde(default)]
    pub impacts: Vec<ProblemImpact>,
}

/// Davis problem details from the classic v2 API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemDetails {
    pub problem_id: String,
    #[serde(default)]
    pub display_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub severity_level: String,
    #[serde(default)]
    pub start_time: i64,
    #[serde(default)]
    pub affected_entities: Vec<ImpactedEntity>,
    #[serde(default)]
    pub root_cause_entity: Option<ImpactedEntity>,
    #[serde(default)]
    pub impact_analysis: Option<ImpactAnalysis>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    #[serde(default)]
    pub risk_score: Option<f64>,
    #[serde(default)]
    pub risk_level: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryPoint {
    #[serde(default)]
    pub source_http_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryPoints {
    #[serde(default)]
    pub items: Vec<EntryPoint>,
    #[serde(default)]
    pub truncated: bool,
}

/// Security problem (vulnerability) details from the classic v2 API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityProblemDetails {
    pub security_problem_id: String,
    #[serde(default)]
    pub display_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub remediation_description: Option<String>,
    #[serde(default)]
    pub cve_ids: Option<Vec<String>>,
    #[serde(default)]
    pub affected_entities: Option<Vec<String>>,
    #[serde(default)]
    pub exposed_entities: Option<Vec<String>>,
    #[serde(default)]
    pub entry_points: Option<EntryPoints>,
    #[serde(default)]
    pub risk_assessment: Option<RiskAssessment>,
    #[serde(default)]
    pub code_level_vulnerability_details: Option<serde_json::Value>,
}

pub struct EnvironmentGateway {
    client: Arc<PlatformClient>,
}

impl EnvironmentGateway {
    pub fn new(client: Arc<PlatformClient>) -> Self {
        Self { client }
    }

    /// Raw environment (tenant) information.
    pub async fn environment_info(&self) -> Result<serde_json::Value> {
        self.client
            .get(ENVIRONMENT_INFO_PATH, &[], BASE_SCOPES)
            .await
    }

    pub async fn entity_details(&self, entity_id: &str) -> Result<EntityDetails> {
        let scopes = with_base(&["environment-api:entities:read"]);
        let body = self
            .client
            .get(&format!("{ENTITIES_PATH}/{entity_id}"), &[], &scopes)
            .await?;
        Ok(serde_json::from_value(body)?)
    }

    pub async fn problem_details(&self, problem_id: &str) -> Result<ProblemDetails> {
        let scopes = with_base(&["environment-api:problems:read"]);
        let body = self
            .client
            .get(&format!("{PROBLEMS_PATH}/{problem_id}"), &[], &scopes)
            .await?;
        Ok(serde_json::from_value(body)?)
    }

    pub async fn security_problem_details(
        &self,
        security_problem_id: &str,
    ) -> Result<SecurityProblemDetails> {
        let scopes = with_base(&["environment-api:security-problems:read"]);
        let body = self
            .client
            .get(
                &format!("{SECURITY_PROBLEMS_PATH}/{security_problem_id}"),
                &[(
                    "fields",
                    "+description,+remediationDescription,+affectedEntities,+exposedEntities,\
                     +entryPoints,+riskAssessment,+codeLevelVulnerabilityDetails",
                )],
                &scopes,
            )
            .await?;
        Ok(serde_json::from_value(body)?)
    }

    /// Ownership information for one or more entities (comma separated ids).
    pub async fn ownership(&self, entity_ids: &str) -> Result<serde_json::Value> {
        let scopes = with_base(&["environment-api:entities:read", "settings:objects:read"]);
        let ids: Vec<&str> = entity_ids.split(',').map(str::trim).collect();
        self.client
            .post(OWNERSHIP_PATH, &[], &scopes, &json!({ "entityIds": ids }))
            .await
    }
}

fn with_base(extra: &[&'static str]) -> Vec<&'static str> {
    BASE_SCOPES.iter().chain(extra).copied().collect()
}
