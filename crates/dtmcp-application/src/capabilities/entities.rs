//! Entity search across all monitored entity types
//!
//! There is no single "fetch all entities" verb in DQL, so the search
//! statement fetches every known `dt.entity.*` type and appends the
//! sub-results into one table.

use crate::QueryExecutionService;
use dtmcp_core::{Result, ExecuteRequest, DYNATRACE_ENTITY_TYPES};

/// Build one `fetch <type> | search "*<name>*"` per entity type and join
/// them with `| append [ ... ]`. Slow by construction.
pub fn entity_search_query(entity_name: &str) -> String {
    DYNATRACE_ENTITY_TYPES
        .iter()
        .enumerate()
        .map(|(index, entity_type)| {
            let dql =
                format!("fetch {entity_type} | search \"*{entity_name}*\" | fieldsAdd entity.type");
            if index == 0 {
                dql
            } else {
                format!("  | append [ {dql} ]\n")
            }
        })
        .collect()
}

/// Find monitored entities by (partial) name. Returns a human-readable
/// listing of matches, or a message saying nothing was found.
pub async fn find_entity_by_name(
    service: &QueryExecutionService,
    entity_name: &str,
) -> Result<String> {
    if entity_name.is_empty() {
        return Ok("You need to provide an entity name to search for.".to_string());
    }

    let request = ExecuteRequest::new(entity_search_query(entity_name));
    let records = service
        .execute(&request)
        .await?
        .map(|execution| execution.records)
        .unwrap_or_default();

    if records.is_empty() {
        return Ok("No monitored entity found with the specified name.".to_string());
    }

    let mut resp = String::from("The following monitored entities were found:\n");
    for entity in &records {
        let name = entity
            .get("entity.name")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown");
        let entity_type = entity
            .get("entity.type")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown");
        let id = entity.get("id").and_then(|v| v.as_str()).unwrap_or("unknown");
        resp.push_str(&format!(
            "- Entity '{name}' of type '{entity_type}' has entity id '{id}'\n"
        ));
    }
    Ok(resp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_query_starts_with_plain_fetch_and_appends_the_rest() {
        let dql = entity_search_query("my-service");
        assert!(dql.starts_with("fetch dt.entity."));
        assert!(dql.contains("search \"*my-service*\""));
        assert_eq!(
            dql.matches("| append [").count(),
            DYNATRACE_ENTITY_TYPES.len() - 1
        );
    }

    #[test]
    fn every_entity_type_is_searched() {
        let dql = entity_search_query("x");
        for entity_type in DYNATRACE_ENTITY_TYPES {
            assert!(dql.contains(&format!("fetch {entity_type} ")));
        }
    }
}
