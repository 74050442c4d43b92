//! Azure Authentication
//!
//! Service principal credentials read from the file named by
//! `AZURE_AUTH_LOCATION`, exchanged for bearer tokens with the OAuth2
//! client-credentials grant.

use crate::error::{AnfError, Result};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Environment variable naming the service principal file
pub const AUTH_LOCATION_VAR: &str = "AZURE_AUTH_LOCATION";

pub const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com";
pub const DEFAULT_RESOURCE_MANAGER: &str = "https://management.azure.com";

/// Token expiry buffer - refresh tokens this much before they actually expire
const TOKEN_EXPIRY_BUFFER: Duration = Duration::from_secs(60);

/// Token TTL when the authority doesn't say (conservative: 30 minutes)
const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(30 * 60);

/// Contents of the service principal auth file
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicePrincipal {
    pub client_id: String,
    pub client_secret: String,
    pub tenant_id: String,
    #[serde(default)]
    pub subscription_id: Option<String>,
    #[serde(default)]
    pub active_directory_endpoint_url: Option<String>,
    #[serde(default)]
    pub resource_manager_endpoint_url: Option<String>,
}

impl ServicePrincipal {
    /// Read the auth file named by `AZURE_AUTH_LOCATION`
    pub fn from_env() -> Result<Self> {
        let location = std::env::var(AUTH_LOCATION_VAR).map_err(|_| {
            AnfError::Credentials(format!(
                "Environment variable {} does not exist",
                AUTH_LOCATION_VAR
            ))
        })?;
        Self::from_file(&location)
    }

    /// Read a service principal auth file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(AnfError::Credentials(format!(
                "Could not find auth file at {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            AnfError::Credentials(format!("Unable to read {}: {}", path.display(), e))
        })?;
        let principal: ServicePrincipal = serde_json::from_str(&content).map_err(|e| {
            AnfError::Credentials(format!(
                "Unable to create credentials from {}: {}",
                path.display(),
                e
            ))
        })?;

        principal.validate()?;
        Ok(principal)
    }

    fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("clientId", &self.client_id),
            ("clientSecret", &self.client_secret),
            ("tenantId", &self.tenant_id),
        ] {
            if value.trim().is_empty() {
                return Err(AnfError::Credentials(format!("{} is empty", field)));
            }
        }

        for endpoint in [&self.active_directory_endpoint_url, &self.resource_manager_endpoint_url]
            .into_iter()
            .flatten()
        {
            url::Url::parse(endpoint).map_err(|e| {
                AnfError::Credentials(format!("Invalid endpoint {}: {}", endpoint, e))
            })?;
        }

        Ok(())
    }

    pub fn authority(&self) -> &str {
        self.active_directory_endpoint_url
            .as_deref()
            .unwrap_or(DEFAULT_AUTHORITY)
            .trim_end_matches('/')
    }

    pub fn resource_manager(&self) -> &str {
        self.resource_manager_endpoint_url
            .as_deref()
            .unwrap_or(DEFAULT_RESOURCE_MANAGER)
            .trim_end_matches('/')
    }

    fn token_url(&self) -> String {
        format!(
            "{}/{}/oauth2/v2.0/token",
            self.authority(),
            urlencoding::encode(&self.tenant_id)
        )
    }

    fn scope(&self) -> String {
        format!("{}/.default", self.resource_manager())
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

enum TokenSource {
    ServicePrincipal(ServicePrincipal),
    /// Pre-issued token, never refreshed
    Static(String),
}

#[derive(Clone)]
struct CachedToken {
    token: String,
    /// When this token expires (with buffer applied)
    expires_at: Instant,
}

impl CachedToken {
    fn is_valid(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

/// Azure credentials holder with token caching
#[derive(Clone)]
pub struct AzureCredentials {
    source: Arc<TokenSource>,
    http: reqwest::Client,
    token_cache: Arc<RwLock<Option<CachedToken>>>,
}

impl AzureCredentials {
    pub fn from_service_principal(principal: ServicePrincipal) -> Self {
        Self {
            source: Arc::new(TokenSource::ServicePrincipal(principal)),
            http: reqwest::Client::new(),
            token_cache: Arc::new(RwLock::new(None)),
        }
    }

    /// Credentials that always hand out the same token
    pub fn static_token(token: impl Into<String>) -> Self {
        Self {
            source: Arc::new(TokenSource::Static(token.into())),
            http: reqwest::Client::new(),
            token_cache: Arc::new(RwLock::new(None)),
        }
    }

    /// Get an access token for API calls
    pub async fn get_token(&self) -> Result<String> {
        let principal = match self.source.as_ref() {
            TokenSource::Static(token) => return Ok(token.clone()),
            TokenSource::ServicePrincipal(principal) => principal,
        };

        {
            let cache = self.token_cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.is_valid() {
                    return Ok(cached.token.clone());
                }
                tracing::debug!("Cached token expired, fetching new token");
            }
        }

        let response = self
            .http
            .post(principal.token_url())
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", principal.client_id.as_str()),
                ("client_secret", principal.client_secret.as_str()),
                ("scope", principal.scope().as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            // Token endpoint errors can echo request details, keep them out of the message
            return Err(AnfError::Credentials(format!(
                "Token request for client {} failed: {}",
                principal.client_id, status
            )));
        }

        let token: TokenResponse = response.json().await?;
        let ttl = token
            .expires_in
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TOKEN_TTL);
        let expires_at = Instant::now() + ttl.saturating_sub(TOKEN_EXPIRY_BUFFER);

        {
            let mut cache = self.token_cache.write().await;
            *cache = Some(CachedToken {
                token: token.access_token.clone(),
                expires_at,
            });
        }

        tracing::debug!(
            "New token cached, expires in ~{} minutes",
            ttl.saturating_sub(TOKEN_EXPIRY_BUFFER).as_secs() / 60
        );

        Ok(token.access_token)
    }
}
