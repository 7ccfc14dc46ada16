//! Port traits for the Dynatrace MCP server
//!
//! The query execution engine depends on exactly these operations from the
//! outside world. Infrastructure adapters (`dtmcp-gateway`) implement them
//! against the real platform; `dtmcp-testing` provides mocks.

mod grail;

pub use grail::{
    GrailQueryExecutor, GrailQueryExecutorRef, GrailQueryVerifier, GrailQueryVerifierRef,
    VerifyNotification, VerifyResponse,
};
