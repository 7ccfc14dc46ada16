//! MCP integration
//!
//! - `params` - parameter types for all tools
//! - `server` - `DynatraceMcpServer` with the tool handlers
//! - `format` - response text builders
//! - `error` - domain-to-MCP error conversion

pub mod error;
pub mod format;
pub mod params;
pub mod server;

pub use error::DomainToMcpResult;
pub use server::DynatraceMcpServer;
