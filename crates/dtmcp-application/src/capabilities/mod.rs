//! Canned DQL capabilities
//!
//! Each capability builds a DQL statement the way the corresponding
//! Dynatrace app does and runs it through the query execution engine.
//! None of these are budget-tracked; only user-supplied statements count
//! against the session budget.

mod entities;
mod kubernetes;
mod logs;
mod problems;
mod vulnerabilities;

pub use entities::{entity_search_query, find_entity_by_name};
pub use kubernetes::cluster_events;
pub use logs::logs_for_entity;
pub use problems::{list_problems, problems_query};
pub use vulnerabilities::{list_vulnerabilities, vulnerabilities_query};
