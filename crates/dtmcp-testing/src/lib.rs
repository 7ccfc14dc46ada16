//! Test utilities for the Dynatrace MCP server
//!
//! # Mocks
//!
//! - [`MockGrailExecutor`] - scripted Grail backend that tracks submit/poll
//!   invocation counts
//! - [`MockGrailVerifier`] - scripted verification endpoint
//!
//! # Fixtures
//!
//! - [`fixtures::result_with_scan`] - a completed query result with Grail
//!   scan metadata
//! - [`fixtures::running_poll`] / [`fixtures::finished_poll`] - poll
//!   responses for scripting the poll loop

pub mod fixtures;
mod mocks;

pub use mocks::{MockGrailExecutor, MockGrailVerifier};
