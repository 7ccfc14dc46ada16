//! Application layer for the Dynatrace MCP server
//!
//! Home of the query execution engine - the component that submits a DQL
//! statement to Grail, drives the asynchronous poll loop, and settles the
//! session scan budget - plus the canned DQL capabilities (problems,
//! vulnerabilities, entity search, logs, Kubernetes events) that ride on it.

pub mod capabilities;
mod query_execution;

pub use query_execution::{QueryExecution, QueryExecutionService};
