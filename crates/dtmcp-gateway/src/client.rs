//! Shared platform HTTP client
//!
//! All gateways go through [`PlatformClient`]: one `reqwest` client, one
//! auth provider, uniform error mapping. Non-2xx responses become
//! [`Error::Http`] with the response body as the message; 401/403 become
//! [`Error::Unauthorized`] so the API layer can point at missing scopes.

use crate::auth::{AuthProvider, Credentials};
use crate::user_agent::user_agent;
use dtmcp_config::constants::HTTP_TIMEOUT;
use dtmcp_config::DynatraceEnv;
use dtmcp_core::{Error, Result};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use tracing::debug;
use url::Url;

pub struct PlatformClient {
    base_url: Url,
    http: reqwest::Client,
    auth: AuthProvider,
    user_agent: String,
}

/// A successful platform response with its status preserved, for the few
/// endpoints where the exact 2xx code matters (email returns 202).
pub(crate) struct PlatformResponse {
    pub status: StatusCode,
    pub body: serde_json::Value,
}

impl PlatformClient {
    pub fn new(env: &DynatraceEnv) -> Result<Self> {
        let base_url = Url::parse(&env.dt_environment)
            .map_err(|e| Error::InvalidConfig(format!("Invalid DT_ENVIRONMENT URL: {e}")))?;
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::InvalidConfig(format!("Failed to create HTTP client: {e}")))?;
        let auth = AuthProvider::new(Credentials::from_env(env)?, &env.dt_environment, http.clone())?;
        Ok(Self {
            base_url,
            http,
            auth,
            user_agent: user_agent(),
        })
    }

    /// The environment base URL, used for UI deep links in tool responses.
    pub fn environment_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// The client identification string sent with every request.
    pub fn client_context(&self) -> &str {
        &self.user_agent
    }

    pub async fn get(
        &self,
        path: &str,
        query: &[(&str, &str)],
        scopes: &[&str],
    ) -> Result<serde_json::Value> {
        Ok(self
            .dispatch(Method::GET, path, query, scopes, None::<&()>)
            .await?
            .body)
    }

    pub async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        scopes: &[&str],
        body: &B,
    ) -> Result<serde_json::Value> {
        Ok(self
            .dispatch(Method::POST, path, query, scopes, Some(body))
            .await?
            .body)
    }

    pub async fn patch<B: Serialize + ?Sized>(
        &self,
        path: &str,
        scopes: &[&str],
        body: &B,
    ) -> Result<serde_json::Value> {
        Ok(self
            .dispatch(Method::PATCH, path, &[], scopes, Some(body))
            .await?
            .body)
    }

    pub(crate) async fn post_with_status<B: Serialize + ?Sized>(
        &self,
        path: &str,
        scopes: &[&str],
        body: &B,
    ) -> Result<PlatformResponse> {
        self.dispatch(Method::POST, path, &[], scopes, Some(body))
            .await
    }

    async fn dispatch<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        scopes: &[&str],
        body: Option<&B>,
    ) -> Result<PlatformResponse> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| Error::InvalidConfig(format!("Invalid API path {path}: {e}")))?;
        let token = self.auth.bearer_token(scopes).await?;

        debug!(%method, %url, "platform API call");
        let mut request = self
            .http
            .request(method, url)
            .bearer_auth(token)
            .header("User-Agent", &self.user_agent)
            .header("Accept", "application/json");
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| Error::Http {
            // no response at all (connect error, timeout)
            status: e.status().map(|s| s.as_u16()).unwrap_or(0),
            message: e.to_string(),
        })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::Unauthorized(format!(
                "HTTP {}: {}. Note: Your user or service-user is most likely lacking \
                 the necessary permissions/scopes for this API call.",
                status.as_u16(),
                message
            )));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::Http {
                status: status.as_u16(),
                message,
            });
        }

        // some endpoints (e.g. workflow delete) answer with an empty body
        let text = response.text().await.unwrap_or_default();
        let body = if text.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_str(&text)?
        };
        Ok(PlatformResponse { status, body })
    }
}
