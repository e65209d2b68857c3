//! REST client for the Blumira public API.
//!
//! Wraps [`reqwest`] with bearer-token handling: a cached token valid for
//! at least the next request is reused, otherwise the client-credentials
//! flow runs against the OAuth token endpoint. Non-2xx responses become
//! [`BlumiraError::Api`] carrying the status and body text.

use std::sync::Arc;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use mspdash_core::finding::{
    AccountDetails, AccountUser, AgentDevice, AgentKey, Finding, FindingUpdate, MspAccount,
};

use crate::credentials::{CredentialStore, Credentials};
use crate::error::BlumiraError;
use crate::token::TokenCache;

/// Default OAuth token endpoint.
pub const DEFAULT_AUTH_URL: &str = "https://auth.blumira.com/oauth/token";
/// Default REST base URL.
pub const DEFAULT_API_BASE_URL: &str = "https://api.blumira.com/public-api/v1";
/// Audience claim sent with the client-credentials grant.
const TOKEN_AUDIENCE: &str = "public-api";

/// Endpoint configuration. The URL overrides exist so tests and staging
/// environments can point the client at a stub server.
#[derive(Debug, Clone)]
pub struct BlumiraConfig {
    pub auth_url: String,
    pub api_base_url: String,
}

impl Default for BlumiraConfig {
    fn default() -> Self {
        Self {
            auth_url: DEFAULT_AUTH_URL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }
}

impl BlumiraConfig {
    /// Load from the environment, falling back to the production URLs.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            auth_url: std::env::var("BLUMIRA_AUTH_URL").unwrap_or(defaults.auth_url),
            api_base_url: std::env::var("BLUMIRA_API_BASE_URL").unwrap_or(defaults.api_base_url),
        }
    }
}

/// Standard upstream response envelope. Some endpoints return the payload
/// bare instead; see [`enveloped_or_flat`].
#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    #[allow(dead_code)]
    status: Option<String>,
    data: Option<T>,
    meta: Option<Value>,
}

/// One page of agent devices plus the upstream paging metadata.
#[derive(Debug, Clone)]
pub struct DevicePage {
    pub devices: Vec<AgentDevice>,
    pub meta: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<i64>,
}

/// Client for a single Blumira tenant.
///
/// Owns its credential store and token cache; construct independent
/// instances rather than sharing process-global state.
pub struct BlumiraClient {
    http: reqwest::Client,
    config: BlumiraConfig,
    credentials: Arc<CredentialStore>,
    token_cache: TokenCache,
}

impl BlumiraClient {
    pub fn new(config: BlumiraConfig, credentials: Arc<CredentialStore>) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            credentials,
            token_cache: TokenCache::default(),
        }
    }

    /// The credential store backing this client (shared with the
    /// credentials settings flow).
    pub fn credentials(&self) -> &Arc<CredentialStore> {
        &self.credentials
    }

    /// Drop the cached bearer token, forcing a refresh on the next call.
    pub fn invalidate_token(&self) {
        self.token_cache.invalidate();
    }

    // -- authentication ----------------------------------------------------

    /// Obtain a bearer token, reusing the cached one while it remains valid
    /// for at least the next request.
    pub async fn access_token(&self) -> Result<String, BlumiraError> {
        if let Some(token) = self.token_cache.get_valid(Utc::now()) {
            return Ok(token);
        }

        let creds = self.credentials.get()?;
        let (token, expires_in) = self.request_token(&creds).await?;
        self.token_cache.store(&token, expires_in, Utc::now());
        Ok(token)
    }

    /// Run the client-credentials exchange with an explicit pair, without
    /// touching the cache. Used by the settings flow to validate operator
    /// input before storing it.
    pub async fn validate_credentials(
        &self,
        client_id: &str,
        client_secret: &str,
    ) -> Result<(), BlumiraError> {
        let creds = Credentials {
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
        };
        self.request_token(&creds).await.map(|_| ())
    }

    async fn request_token(&self, creds: &Credentials) -> Result<(String, Option<i64>), BlumiraError> {
        let body = serde_json::json!({
            "grant_type": "client_credentials",
            "client_id": creds.client_id,
            "client_secret": creds.client_secret,
            "audience": TOKEN_AUDIENCE,
        });

        let response = self.http.post(&self.config.auth_url).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = read_body(response).await;
            return Err(BlumiraError::Authentication {
                status: status.as_u16(),
                body,
            });
        }

        let token: TokenResponse = response.json().await?;
        match token.access_token {
            Some(access_token) => Ok((access_token, token.expires_in)),
            None => Err(BlumiraError::Authentication {
                status: status.as_u16(),
                body: "No access token received from authentication endpoint".to_string(),
            }),
        }
    }

    // -- read listers ------------------------------------------------------

    /// `GET /msp/accounts`
    pub async fn msp_accounts(&self) -> Result<Vec<MspAccount>, BlumiraError> {
        let envelope: ApiEnvelope<Vec<MspAccount>> = self.api_get("/msp/accounts").await?;
        Ok(envelope.data.unwrap_or_default())
    }

    /// `GET /msp/accounts/{account_id}`
    pub async fn account_detail(&self, account_id: &str) -> Result<AccountDetails, BlumiraError> {
        let value: Value = self.api_get(&format!("/msp/accounts/{account_id}")).await?;
        enveloped_or_flat(value)
    }

    /// `GET /msp/accounts/findings` — the cross-account findings list.
    pub async fn all_findings(&self) -> Result<Vec<Finding>, BlumiraError> {
        let envelope: ApiEnvelope<Vec<Finding>> = self.api_get("/msp/accounts/findings").await?;
        Ok(envelope.data.unwrap_or_default())
    }

    /// `GET /msp/accounts/{account_id}/findings`
    pub async fn account_findings(&self, account_id: &str) -> Result<Vec<Finding>, BlumiraError> {
        let envelope: ApiEnvelope<Vec<Finding>> = self
            .api_get(&format!("/msp/accounts/{account_id}/findings"))
            .await?;
        Ok(envelope.data.unwrap_or_default())
    }

    /// `GET /msp/accounts/{account_id}/agents/devices`
    pub async fn account_devices(&self, account_id: &str) -> Result<DevicePage, BlumiraError> {
        let envelope: ApiEnvelope<Vec<AgentDevice>> = self
            .api_get(&format!("/msp/accounts/{account_id}/agents/devices"))
            .await?;
        Ok(DevicePage {
            devices: envelope.data.unwrap_or_default(),
            meta: envelope.meta,
        })
    }

    /// `GET /msp/accounts/{account_id}/agents/keys`
    pub async fn account_keys(&self, account_id: &str) -> Result<Vec<AgentKey>, BlumiraError> {
        let envelope: ApiEnvelope<Vec<AgentKey>> = self
            .api_get(&format!("/msp/accounts/{account_id}/agents/keys"))
            .await?;
        Ok(envelope.data.unwrap_or_default())
    }

    /// `GET /msp/accounts/{account_id}/users`
    pub async fn account_users(&self, account_id: &str) -> Result<Vec<AccountUser>, BlumiraError> {
        let envelope: ApiEnvelope<Vec<AccountUser>> = self
            .api_get(&format!("/msp/accounts/{account_id}/users"))
            .await?;
        Ok(envelope.data.unwrap_or_default())
    }

    /// `GET /msp/accounts/{account_id}/findings/{finding_id}` — `None` when
    /// the upstream reports the finding absent.
    pub async fn finding_detail(
        &self,
        account_id: &str,
        finding_id: &str,
    ) -> Result<Option<Finding>, BlumiraError> {
        let token = self.access_token().await?;
        let url = format!(
            "{}/msp/accounts/{account_id}/findings/{finding_id}",
            self.config.api_base_url
        );
        let response = self
            .http
            .get(url)
            .bearer_auth(&token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let value: Value = Self::parse_response(response).await?;
        enveloped_or_flat(value).map(Some)
    }

    // -- writes ------------------------------------------------------------

    /// `PATCH /msp/accounts/{account_id}/findings/{finding_id}` — update a
    /// finding's status/priority/assignee/resolution/notes upstream.
    pub async fn update_finding(
        &self,
        account_id: &str,
        finding_id: &str,
        update: &FindingUpdate,
    ) -> Result<Finding, BlumiraError> {
        let token = self.access_token().await?;
        let url = format!(
            "{}/msp/accounts/{account_id}/findings/{finding_id}",
            self.config.api_base_url
        );
        let response = self
            .http
            .patch(url)
            .bearer_auth(&token)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(update)
            .send()
            .await?;

        let value: Value = Self::parse_response(response).await?;
        enveloped_or_flat(value)
    }

    // -- private helpers ---------------------------------------------------

    async fn api_get<T: DeserializeOwned>(&self, path: &str) -> Result<T, BlumiraError> {
        let token = self.access_token().await?;
        let response = self
            .http
            .get(format!("{}{path}", self.config.api_base_url))
            .bearer_auth(&token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Ensure a success status, then deserialize the body. Non-2xx becomes
    /// [`BlumiraError::Api`] with the status and body text.
    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, BlumiraError> {
        let status = response.status();
        if !status.is_success() {
            let body = read_body(response).await;
            return Err(BlumiraError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json().await?)
    }
}

async fn read_body(response: reqwest::Response) -> String {
    response
        .text()
        .await
        .unwrap_or_else(|_| "<unreadable body>".to_string())
}

/// Unwrap the `{ "data": ... }` envelope when present, otherwise treat the
/// whole body as the payload. Detail endpoints answer in either shape
/// depending on upstream version.
fn enveloped_or_flat<T: DeserializeOwned>(value: Value) -> Result<T, BlumiraError> {
    match value.get("data").filter(|data| !data.is_null()) {
        Some(data) => Ok(serde_json::from_value(data.clone())?),
        None => Ok(serde_json::from_value(value)?),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
