//! Azure Client
//!
//! Main client for the Resource Manager API, combining authentication,
//! HTTP and long-running-operation tracking.

use super::auth::{AzureCredentials, ServicePrincipal, DEFAULT_RESOURCE_MANAGER};
use super::http::{ArmHttpClient, ArmResponse};
use crate::error::{AnfError, Result};
use crate::resource::{ResourceId, ResourceKind};
use serde_json::Value;
use std::time::Duration;

/// NetApp resource provider API version
pub const NETAPP_API_VERSION: &str = "2022-05-01";

/// Default wait between long-running operation status checks
pub const DEFAULT_OPERATION_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Main Azure client, scoped to one subscription
#[derive(Clone)]
pub struct AzureClient {
    pub credentials: AzureCredentials,
    pub http: ArmHttpClient,
    pub subscription_id: String,
    endpoint: String,
    operation_poll_interval: Duration,
}

impl AzureClient {
    pub fn new(credentials: AzureCredentials, subscription_id: &str) -> Result<Self> {
        Self::with_endpoint(credentials, subscription_id, DEFAULT_RESOURCE_MANAGER)
    }

    /// Client against a specific Resource Manager endpoint
    pub fn with_endpoint(
        credentials: AzureCredentials,
        subscription_id: &str,
        endpoint: &str,
    ) -> Result<Self> {
        if subscription_id.trim().is_empty() {
            return Err(AnfError::Config("subscriptionId is empty".to_string()));
        }
        url::Url::parse(endpoint)
            .map_err(|e| AnfError::Config(format!("Invalid endpoint {}: {}", endpoint, e)))?;

        Ok(Self {
            credentials,
            http: ArmHttpClient::new()?,
            subscription_id: subscription_id.to_string(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            operation_poll_interval: DEFAULT_OPERATION_POLL_INTERVAL,
        })
    }

    /// Client for a service principal, using the endpoint named in its auth file
    pub fn from_service_principal(principal: ServicePrincipal, subscription_id: &str) -> Result<Self> {
        let endpoint = principal.resource_manager().to_string();
        Self::with_endpoint(
            AzureCredentials::from_service_principal(principal),
            subscription_id,
            &endpoint,
        )
    }

    /// Wait used between operation status checks when the service sends no `Retry-After`
    pub fn with_operation_poll_interval(mut self, interval: Duration) -> Self {
        self.operation_poll_interval = interval;
        self
    }

    pub async fn get_token(&self) -> Result<String> {
        self.credentials.get_token().await
    }

    // =========================================================================
    // URL helpers
    // =========================================================================

    /// URL of a resource group scoped path
    pub fn resource_group_url(&self, resource_group: &str, path: &str) -> String {
        format!(
            "{}/subscriptions/{}/resourceGroups/{}/{}",
            self.endpoint,
            urlencoding::encode(&self.subscription_id),
            urlencoding::encode(resource_group),
            path
        )
    }

    /// URL of a single NetApp resource
    pub fn netapp_url(&self, id: &ResourceId) -> String {
        let path = format!("providers/Microsoft.NetApp/{}", id.provider_path());
        with_api_version(&self.resource_group_url(id.resource_group(), &path))
    }

    /// URL of the collection of `kind` under the given parent names
    pub fn netapp_collection_url(&self, kind: ResourceKind, parents: &[String]) -> Result<String> {
        let Some(resource_group) = parents.first() else {
            return Err(AnfError::InvalidResourceId(format!(
                "listing {} needs a resource group",
                kind
            )));
        };

        let mut path = "providers/Microsoft.NetApp".to_string();
        match kind.parent() {
            Some(parent_kind) => {
                let parent = ResourceId::new(parent_kind, parents)?;
                path.push('/');
                path.push_str(&parent.provider_path());
            }
            None if parents.len() != 1 => {
                return Err(AnfError::InvalidResourceId(format!(
                    "listing {} takes only a resource group",
                    kind
                )));
            }
            None => {}
        }
        path.push('/');
        path.push_str(kind.segment());

        Ok(with_api_version(&self.resource_group_url(resource_group, &path)))
    }

    // =========================================================================
    // Requests
    // =========================================================================

    /// GET a resource or collection
    pub async fn get(&self, url: &str) -> Result<Value> {
        let token = self.get_token().await?;
        Ok(self.http.get(url, &token).await?.body)
    }

    /// GET every page of a collection, following `nextLink`
    pub async fn get_all(&self, url: &str) -> Result<Vec<Value>> {
        let mut items = Vec::new();
        let mut next = Some(url.to_string());

        while let Some(page_url) = next {
            let page = self.get(&page_url).await?;
            if let Some(values) = page.get("value").and_then(|v| v.as_array()) {
                items.extend(values.iter().cloned());
            }
            next = page
                .get("nextLink")
                .and_then(|v| v.as_str())
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string());
        }

        Ok(items)
    }

    /// PUT a resource and wait for the operation, returning the final resource
    pub async fn put(&self, url: &str, body: &Value) -> Result<Value> {
        let token = self.get_token().await?;
        let response = self.http.put(url, &token, body).await?;
        self.finish_with_resource(url, response).await
    }

    /// PATCH a resource and wait for the operation, returning the final resource
    pub async fn patch(&self, url: &str, body: &Value) -> Result<Value> {
        let token = self.get_token().await?;
        let response = self.http.patch(url, &token, body).await?;
        self.finish_with_resource(url, response).await
    }

    /// DELETE a resource and wait for the operation to finish
    pub async fn delete(&self, url: &str) -> Result<()> {
        let token = self.get_token().await?;
        let response = self.http.delete(url, &token).await?;
        if response.is_long_running() {
            self.wait_for_operation(&response).await?;
        }
        Ok(())
    }

    async fn finish_with_resource(&self, url: &str, response: ArmResponse) -> Result<Value> {
        if response.is_long_running() {
            self.wait_for_operation(&response).await?;
            return self.get(url).await;
        }
        if response.body.is_null() {
            return self.get(url).await;
        }
        Ok(response.body)
    }

    /// Poll a long-running operation until it reaches a terminal state.
    /// There is no upper bound on the wait.
    pub async fn wait_for_operation(&self, accepted: &ArmResponse) -> Result<()> {
        let mut delay = accepted.retry_after.unwrap_or(self.operation_poll_interval);

        if let Some(status_url) = accepted.async_operation.as_deref() {
            loop {
                tokio::time::sleep(delay).await;

                let token = self.get_token().await?;
                let response = self.http.get(status_url, &token).await?;
                let status = response
                    .body
                    .get("status")
                    .and_then(|v| v.as_str())
                    .unwrap_or("InProgress");

                match status {
                    "Succeeded" => return Ok(()),
                    "Failed" | "Canceled" => {
                        let message = response
                            .body
                            .pointer("/error/message")
                            .and_then(|v| v.as_str())
                            .unwrap_or("no error details")
                            .to_string();
                        return Err(AnfError::OperationFailed {
                            status: status.to_string(),
                            message,
                        });
                    }
                    _ => {
                        tracing::debug!("Operation {} still {}", status_url, status);
                        delay = response.retry_after.unwrap_or(self.operation_poll_interval);
                    }
                }
            }
        }

        if let Some(location) = accepted.location.as_deref() {
            loop {
                tokio::time::sleep(delay).await;

                let token = self.get_token().await?;
                let response = self.http.get(location, &token).await?;
                if response.status != 202 {
                    return Ok(());
                }
                tracing::debug!("Operation {} still running", location);
                delay = response.retry_after.unwrap_or(self.operation_poll_interval);
            }
        }

        Ok(())
    }
}

fn with_api_version(url: &str) -> String {
    format!("{}?api-version={}", url, NETAPP_API_VERSION)
}
