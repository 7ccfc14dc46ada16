//! Core domain types for the Dynatrace MCP server
//!
//! This crate has no I/O. It defines the Grail query wire shapes, the
//! session-wide scan budget tracker, the entity type table, and the
//! domain error type. Everything that talks to the network lives in
//! `dtmcp-gateway`; everything that drives the poll loop lives in
//! `dtmcp-application`.

pub mod budget;
pub mod entity_types;
pub mod error;
pub mod query;

pub use budget::{
    budget_exhausted_message, format_bytes_as_gb, generate_budget_warning,
    reset_session_tracker, session_tracker, BudgetState, GrailBudgetTracker,
};
pub use entity_types::{entity_type_for_id, DYNATRACE_ENTITY_TYPES};
pub use error::{Error, ErrorCategory, ErrorCode, Result};
pub use query::{
    ExecuteRequest, GrailMetadata, QueryPollResponse, QueryResult, QueryResultMetadata,
    QueryStartResponse, QueryState, ScanMetadata, SubmitOutcome,
};
