//! MCP server surface
//!
//! Exposes the Dynatrace platform tools over the Model Context Protocol.
//! Tool handlers are thin: parse parameters, call the application or gateway
//! layer, format a human-readable text response.

pub mod mcp;
mod state;

pub use mcp::DynatraceMcpServer;
pub use state::ApiState;
