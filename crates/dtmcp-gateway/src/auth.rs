//! Authentication against the Dynatrace platform
//!
//! Two methods, mutually exclusive per server instance:
//! - OAuth client-credentials against the environment's SSO endpoint, with
//!   tokens cached per scope set until shortly before expiry
//! - a static platform bearer token, which ignores scopes entirely

use dtmcp_core::{Error, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info};
use url::Url;

/// Refresh this long before the token actually expires.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(30);

/// How the server authenticates to the platform.
#[derive(Debug, Clone)]
pub enum Credentials {
    /// OAuth client-credentials flow
    OAuth {
        client_id: String,
        client_secret: String,
    },
    /// Static platform token sent as-is
    PlatformToken(String),
}

impl Credentials {
    /// Pick the authentication method from the validated environment config.
    /// OAuth wins when both are configured, matching the precedence users
    /// expect from the environment variables.
    pub fn from_env(env: &dtmcp_config::DynatraceEnv) -> Result<Self> {
        if let (Some(client_id), Some(client_secret)) =
            (env.oauth_client_id.clone(), env.oauth_client_secret.clone())
        {
            return Ok(Credentials::OAuth {
                client_id,
                client_secret,
            });
        }
        if let Some(token) = env.dt_platform_token.clone() {
            return Ok(Credentials::PlatformToken(token));
        }
        Err(Error::InvalidConfig(
            "Please provide either OAUTH_CLIENT_ID and OAUTH_CLIENT_SECRET, or DT_PLATFORM_TOKEN"
                .to_string(),
        ))
    }
}

/// Derive the SSO token endpoint for an environment URL. Lab environments
/// (`*.dev.apps.dynatracelabs.com`, `*.sprint.apps.dynatracelabs.com`) use
/// their stage-specific SSO; everything else goes through production SSO.
pub fn sso_token_url(environment_url: &str) -> Result<Url> {
    let parsed = Url::parse(environment_url)
        .map_err(|e| Error::InvalidConfig(format!("Invalid environment URL: {e}")))?;
    let host = parsed.host_str().unwrap_or_default();

    let sso_base = if host.ends_with(".dev.apps.dynatracelabs.com") {
        "https://sso-dev.dynatracelabs.com"
    } else if host.ends_with(".sprint.apps.dynatracelabs.com") {
        "https://sso-sprint.dynatracelabs.com"
    } else {
        "https://sso.dynatrace.com"
    };

    Url::parse(&format!("{sso_base}/sso/oauth2/token"))
        .map_err(|e| Error::InvalidConfig(format!("Invalid SSO URL: {e}")))
}

/// Token endpoint response. Error information can arrive with an HTTP 200,
/// so the error fields are checked regardless of status.
#[derive(Debug, Deserialize)]
struct OAuthTokenResponse {
    access_token: Option<String>,
    expires_in: Option<u64>,
    error: Option<String>,
    error_description: Option<String>,
    #[serde(rename = "issueId")]
    issue_id: Option<String>,
}

struct CachedToken {
    token: String,
    expires_at: Instant,
}

/// Produces bearer tokens for platform calls.
pub struct AuthProvider {
    credentials: Credentials,
    token_url: Option<Url>,
    http: reqwest::Client,
    // keyed by the space-joined scope string
    cache: Mutex<HashMap<String, CachedToken>>,
}

impl AuthProvider {
    pub fn new(
        credentials: Credentials,
        environment_url: &str,
        http: reqwest::Client,
    ) -> Result<Self> {
        let token_url = match &credentials {
            Credentials::OAuth { .. } => Some(sso_token_url(environment_url)?),
            Credentials::PlatformToken(_) => None,
        };
        Ok(Self {
            credentials,
            token_url,
            http,
            cache: Mutex::new(HashMap::new()),
        })
    }

    /// Get a bearer token valid for the given scopes.
    pub async fn bearer_token(&self, scopes: &[&str]) -> Result<String> {
        let (client_id, client_secret) = match &self.credentials {
            Credentials::PlatformToken(token) => return Ok(token.clone()),
            Credentials::OAuth {
                client_id,
                client_secret,
            } => (client_id, client_secret),
        };

        let scope = scopes.join(" ");
        let mut cache = self.cache.lock().await;
        if let Some(cached) = cache.get(&scope) {
            if cached.expires_at > Instant::now() {
                return Ok(cached.token.clone());
            }
        }

        let token_url = self
            .token_url
            .as_ref()
            .ok_or_else(|| Error::Unauthorized("SSO token URL not configured".to_string()))?;

        debug!(%token_url, %scope, "requesting OAuth token");
        let response = self
            .http
            .post(token_url.clone())
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", client_id.as_str()),
                ("client_secret", client_secret.as_str()),
                ("scope", scope.as_str()),
            ])
            .send()
            .await
            .map_err(|e| Error::Unauthorized(format!("Failed to reach SSO endpoint: {e}")))?;

        let status = response.status();
        let body: OAuthTokenResponse = response
            .json()
            .await
            .map_err(|e| Error::Unauthorized(format!("Invalid SSO token response: {e}")))?;

        // no token, or any error field populated: the client is most likely
        // misconfigured or missing scopes
        if body.access_token.is_none()
            || body.error.is_some()
            || body.error_description.is_some()
            || body.issue_id.is_some()
        {
            return Err(Error::Unauthorized(format!(
                "Failed to retrieve OAuth token (HTTP {}, IssueId: {}): {} - {}. \
                 Note: Your OAuth client is most likely not configured correctly and/or is missing scopes.",
                status.as_u16(),
                body.issue_id.as_deref().unwrap_or("none"),
                body.error.as_deref().unwrap_or("unknown error"),
                body.error_description.as_deref().unwrap_or(""),
            )));
        }

        let token = body.access_token.unwrap_or_default();
        let ttl = Duration::from_secs(body.expires_in.unwrap_or(300))
            .saturating_sub(TOKEN_EXPIRY_MARGIN);
        info!(%scope, "retrieved OAuth token from SSO");
        cache.insert(
            scope,
            CachedToken {
                token: token.clone(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sso_url_production() {
        let url = sso_token_url("https://abc12345.apps.dynatrace.com").unwrap();
        assert_eq!(url.as_str(), "https://sso.dynatrace.com/sso/oauth2/token");
    }

    #[test]
    fn test_sso_url_lab_stages() {
        let url = sso_token_url("https://abc.dev.apps.dynatracelabs.com").unwrap();
        assert_eq!(
            url.as_str(),
            "https://sso-dev.dynatracelabs.com/sso/oauth2/token"
        );

        let url = sso_token_url("https://abc.sprint.apps.dynatracelabs.com").unwrap();
        assert_eq!(
            url.as_str(),
            "https://sso-sprint.dynatracelabs.com/sso/oauth2/token"
        );
    }

    #[test]
    fn test_credentials_prefer_oauth() {
        let env = dtmcp_config::DynatraceEnv::from_lookup(|key| match key {
            "DT_ENVIRONMENT" => Some("https://abc.apps.dynatrace.com".to_string()),
            "OAUTH_CLIENT_ID" => Some("dt0s02.ID".to_string()),
            "OAUTH_CLIENT_SECRET" => Some("dt0s02.ID.SECRET".to_string()),
            "DT_PLATFORM_TOKEN" => Some("dt0s16.TOKEN".to_string()),
            _ => None,
        })
        .unwrap();
        assert!(matches!(
            Credentials::from_env(&env).unwrap(),
            Credentials::OAuth { .. }
        ));
    }

    #[tokio::test]
    async fn test_platform_token_ignores_scopes() {
        let provider = AuthProvider::new(
            Credentials::PlatformToken("dt0s16.TOKEN".to_string()),
            "https://abc.apps.dynatrace.com",
            reqwest::Client::new(),
        )
        .unwrap();
        let token = provider.bearer_token(&["storage:logs:read"]).await.unwrap();
        assert_eq!(token, "dt0s16.TOKEN");
    }
}
