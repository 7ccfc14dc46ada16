//! HTTP gateway to the Dynatrace platform
//!
//! Implements the `dtmcp-ports` traits and the remaining platform surfaces
//! (classic environment v2, app functions, automation, Davis CoPilot, email)
//! over `reqwest`. Authentication is either an OAuth client-credentials flow
//! against the environment's SSO endpoint or a static platform bearer token;
//! tokens are cached per scope set.

mod auth;
mod client;
mod copilot;
mod email;
mod environment;
mod grail;
mod slack;
mod user_agent;
mod workflows;

pub use auth::{AuthProvider, Credentials};
pub use client::PlatformClient;
pub use copilot::{
    ConversationContext, ConversationResponse, ConversationState, CopilotGateway,
    CopilotMetadata, CopilotNotification, CopilotSource, Dql2NlResponse, Nl2DqlResponse,
};
pub use email::{EmailGateway, EmailRequest, EmailSendResult};
pub use environment::{
    EntityDetails, EntityStub, EntryPoint, EntryPoints, EnvironmentGateway, ImpactAnalysis,
    ImpactedEntity, ProblemDetails, ProblemImpact, RiskAssessment, SecurityProblemDetails,
};
pub use grail::GrailGateway;
pub use slack::SlackGateway;
pub use user_agent::user_agent;
pub use workflows::{Workflow, WorkflowGateway};

/// Scopes every platform call needs on top of its own.
pub const BASE_SCOPES: &[&str] = &["app-engine:apps:run", "app-engine:functions:run"];
