//! Environment variable loading and validation

use crate::constants::{DEFAULT_GRAIL_BUDGET_GB, UNLIMITED_BUDGET_GB};
use dtmcp_core::{Error, Result};

/// Validated environment configuration for the Dynatrace MCP server.
#[derive(Debug, Clone, PartialEq)]
pub struct DynatraceEnv {
    /// OAuth client id (client-credentials flow), if configured
    pub oauth_client_id: Option<String>,
    /// OAuth client secret, if configured
    pub oauth_client_secret: Option<String>,
    /// Platform bearer token, if configured
    pub dt_platform_token: Option<String>,
    /// Platform environment URL, e.g. `https://abc12345.apps.dynatrace.com`
    pub dt_environment: String,
    /// Slack connector connection id used by `send_slack_message`
    pub slack_connection_id: String,
    /// Grail scan budget in GB (base 1000); -1 means unlimited
    pub grail_budget_gb: f64,
}

impl DynatraceEnv {
    /// Read and validate configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env), but reading from an arbitrary
    /// lookup function. Used by tests to avoid mutating process state.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let oauth_client_id = lookup("OAUTH_CLIENT_ID");
        let oauth_client_secret = lookup("OAUTH_CLIENT_SECRET");
        let dt_platform_token = lookup("DT_PLATFORM_TOKEN");
        let dt_environment = lookup("DT_ENVIRONMENT").ok_or_else(|| {
            Error::InvalidConfig(
                "Please set DT_ENVIRONMENT to your Dynatrace Platform Environment".to_string(),
            )
        })?;
        let slack_connection_id = lookup("SLACK_CONNECTION_ID")
            .unwrap_or_else(|| "fake-slack-connection-id".to_string());

        if oauth_client_id.is_none() && oauth_client_secret.is_none() && dt_platform_token.is_none()
        {
            return Err(Error::InvalidConfig(
                "Please set either OAUTH_CLIENT_ID and OAUTH_CLIENT_SECRET, or DT_PLATFORM_TOKEN"
                    .to_string(),
            ));
        }

        let grail_budget_gb = match lookup("DT_GRAIL_QUERY_BUDGET_GB") {
            None => DEFAULT_GRAIL_BUDGET_GB,
            Some(raw) => {
                let parsed: f64 = raw.trim().parse().map_err(|_| {
                    Error::InvalidConfig(
                        "DT_GRAIL_QUERY_BUDGET_GB must be a number representing the GB budget for Grail queries"
                            .to_string(),
                    )
                })?;
                // -1 is the unlimited sentinel; any other non-positive value is invalid
                if parsed <= 0.0 && parsed != UNLIMITED_BUDGET_GB {
                    return Err(Error::InvalidConfig(
                        "DT_GRAIL_QUERY_BUDGET_GB must be a positive number (or -1 for unlimited)"
                            .to_string(),
                    ));
                }
                parsed
            }
        };

        if !dt_environment.starts_with("https://") {
            return Err(Error::InvalidConfig(
                "Please set DT_ENVIRONMENT to a valid Dynatrace Environment URL \
                 (e.g., https://<environment-id>.apps.dynatrace.com)"
                    .to_string(),
            ));
        }
        if !dt_environment.contains("apps.dynatrace.com")
            && !dt_environment.contains("apps.dynatracelabs.com")
        {
            return Err(Error::InvalidConfig(
                "Please set DT_ENVIRONMENT to a valid Dynatrace Platform Environment URL \
                 (e.g., https://<environment-id>.apps.dynatrace.com)"
                    .to_string(),
            ));
        }

        Ok(Self {
            oauth_client_id,
            oauth_client_secret,
            dt_platform_token,
            dt_environment,
            slack_connection_id,
            grail_budget_gb,
        })
    }

    /// True when OAuth client-credentials should be used instead of a
    /// platform bearer token.
    pub fn uses_oauth(&self) -> bool {
        self.oauth_client_id.is_some() && self.oauth_client_secret.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_with(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_valid_platform_token_config() {
        let env = DynatraceEnv::from_lookup(env_with(&[
            ("DT_ENVIRONMENT", "https://abc12345.apps.dynatrace.com"),
            ("DT_PLATFORM_TOKEN", "dt0s16.SAMPLE"),
        ]))
        .unwrap();
        assert!(!env.uses_oauth());
        assert_eq!(env.grail_budget_gb, DEFAULT_GRAIL_BUDGET_GB);
        assert_eq!(env.slack_connection_id, "fake-slack-connection-id");
    }

    #[test]
    fn test_missing_environment_rejected() {
        let err =
            DynatraceEnv::from_lookup(env_with(&[("DT_PLATFORM_TOKEN", "tok")])).unwrap_err();
        assert!(err.to_string().contains("DT_ENVIRONMENT"));
    }

    #[test]
    fn test_missing_credentials_rejected() {
        let err = DynatraceEnv::from_lookup(env_with(&[(
            "DT_ENVIRONMENT",
            "https://abc.apps.dynatrace.com",
        )]))
        .unwrap_err();
        assert!(err.to_string().contains("OAUTH_CLIENT_ID"));
    }

    #[test]
    fn test_non_https_environment_rejected() {
        let err = DynatraceEnv::from_lookup(env_with(&[
            ("DT_ENVIRONMENT", "http://abc.apps.dynatrace.com"),
            ("DT_PLATFORM_TOKEN", "tok"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("valid Dynatrace Environment URL"));
    }

    #[test]
    fn test_non_platform_host_rejected() {
        let err = DynatraceEnv::from_lookup(env_with(&[
            ("DT_ENVIRONMENT", "https://abc.live.dynatrace.com"),
            ("DT_PLATFORM_TOKEN", "tok"),
        ]))
        .unwrap_err();
        assert!(err
            .to_string()
            .contains("Dynatrace Platform Environment URL"));
    }

    #[test]
    fn test_budget_parsing() {
        let base = [
            ("DT_ENVIRONMENT", "https://abc.apps.dynatracelabs.com"),
            ("DT_PLATFORM_TOKEN", "tok"),
        ];

        let env = DynatraceEnv::from_lookup(env_with(
            &[base.as_slice(), &[("DT_GRAIL_QUERY_BUDGET_GB", "2.5")]].concat(),
        ))
        .unwrap();
        assert_eq!(env.grail_budget_gb, 2.5);

        // -1 is the documented unlimited sentinel
        let env = DynatraceEnv::from_lookup(env_with(
            &[base.as_slice(), &[("DT_GRAIL_QUERY_BUDGET_GB", "-1")]].concat(),
        ))
        .unwrap();
        assert_eq!(env.grail_budget_gb, -1.0);

        for invalid in ["0", "-5", "abc"] {
            let err = DynatraceEnv::from_lookup(env_with(
                &[base.as_slice(), &[("DT_GRAIL_QUERY_BUDGET_GB", invalid)]].concat(),
            ))
            .unwrap_err();
            assert!(err.to_string().contains("DT_GRAIL_QUERY_BUDGET_GB"));
        }
    }
}
