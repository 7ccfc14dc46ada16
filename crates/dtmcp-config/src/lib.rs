//! Configuration for the Dynatrace MCP server
//!
//! All configuration comes from environment variables (optionally loaded from
//! a `.env` file by the binary). Validation happens once at startup; the rest
//! of the system works with the validated [`DynatraceEnv`] struct.

pub mod constants;
mod env;

pub use env::DynatraceEnv;
