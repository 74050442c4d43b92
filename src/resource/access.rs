//! Resource access
//!
//! Uniform get/list/create/update/delete over the four NetApp resource kinds.

use super::kind::{ResourceId, ResourceKind};
use super::models::{Resource, ResourcePatch};
use crate::azure::client::AzureClient;
use crate::error::{AnfError, Result};
use async_trait::async_trait;
use serde_json::Value;

/// Operations the orchestrators need from the management API
#[async_trait]
pub trait NetAppApi: Send + Sync {
    /// Fetch a resource. A resource the service doesn't know is `Ok(None)`.
    async fn get(&self, id: &ResourceId) -> Result<Option<Resource>>;

    /// List the resources of `kind` under `parents` (resource group first)
    async fn list(&self, kind: ResourceKind, parents: &[String]) -> Result<Vec<Resource>>;

    /// Create or replace a resource, waiting for the operation to finish
    async fn create_or_update(&self, id: &ResourceId, desired: &Resource) -> Result<Resource>;

    /// Patch a pool or volume in place, waiting for the operation to finish
    async fn update(&self, id: &ResourceId, patch: &ResourcePatch) -> Result<Resource>;

    /// Delete a resource, returning once the service reports the operation done
    async fn delete(&self, id: &ResourceId) -> Result<()>;
}

/// [`NetAppApi`] over the Resource Manager REST API
#[derive(Clone)]
pub struct AzureNetAppApi {
    client: AzureClient,
}

impl AzureNetAppApi {
    pub fn new(client: AzureClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl NetAppApi for AzureNetAppApi {
    async fn get(&self, id: &ResourceId) -> Result<Option<Resource>> {
        let url = self.client.netapp_url(id);
        match self.client.get(&url).await {
            Ok(value) => decode(id.kind(), value).map(Some),
            Err(e) if e.is_not_found() => {
                tracing::debug!("{} not found", id);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn list(&self, kind: ResourceKind, parents: &[String]) -> Result<Vec<Resource>> {
        let url = self.client.netapp_collection_url(kind, parents)?;
        let items = self.client.get_all(&url).await.map_err(|e| {
            tracing::error!("Error listing {} under {}: {}", kind, parents.join("/"), e);
            e
        })?;

        items.into_iter().map(|item| decode(kind, item)).collect()
    }

    async fn create_or_update(&self, id: &ResourceId, desired: &Resource) -> Result<Resource> {
        check_kind(id, desired.kind())?;
        let url = self.client.netapp_url(id);
        let body = encode(desired)?;
        let value = self.client.put(&url, &body).await?;
        decode(id.kind(), value)
    }

    async fn update(&self, id: &ResourceId, patch: &ResourcePatch) -> Result<Resource> {
        check_kind(id, patch.kind())?;
        let url = self.client.netapp_url(id);
        let body = match patch {
            ResourcePatch::Pool(p) => serde_json::to_value(p)?,
            ResourcePatch::Volume(v) => serde_json::to_value(v)?,
        };
        let value = self.client.patch(&url, &body).await?;
        decode(id.kind(), value)
    }

    async fn delete(&self, id: &ResourceId) -> Result<()> {
        let url = self.client.netapp_url(id);
        self.client.delete(&url).await
    }
}

fn check_kind(id: &ResourceId, kind: ResourceKind) -> Result<()> {
    if id.kind() != kind {
        return Err(AnfError::InvalidResourceId(format!(
            "{} body sent to {}",
            kind, id
        )));
    }
    Ok(())
}

/// Decode a service response into the resource of the given kind
pub fn decode(kind: ResourceKind, value: Value) -> Result<Resource> {
    let resource = match kind {
        ResourceKind::Account => Resource::Account(serde_json::from_value(value)?),
        ResourceKind::Pool => Resource::Pool(serde_json::from_value(value)?),
        ResourceKind::Volume => Resource::Volume(serde_json::from_value(value)?),
        ResourceKind::Snapshot => Resource::Snapshot(serde_json::from_value(value)?),
    };
    Ok(resource)
}

/// Encode a resource as a request body
pub fn encode(resource: &Resource) -> Result<Value> {
    let value = match resource {
        Resource::Account(r) => serde_json::to_value(r)?,
        Resource::Pool(r) => serde_json::to_value(r)?,
        Resource::Volume(r) => serde_json::to_value(r)?,
        Resource::Snapshot(r) => serde_json::to_value(r)?,
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::models::NetAppAccount;
    use serde_json::json;

    #[test]
    fn test_decode_by_kind() {
        let value = json!({
            "id": "/subscriptions/s/resourceGroups/rg/providers/Microsoft.NetApp/netAppAccounts/a/capacityPools/p",
            "location": "eastus",
            "properties": { "size": 4398046511104u64, "serviceLevel": "Standard" }
        });
        let resource = decode(ResourceKind::Pool, value).unwrap();
        let pool = resource.into_pool().unwrap();
        assert_eq!(pool.properties.size, 4_398_046_511_104);
    }

    #[test]
    fn test_decode_wrong_shape_fails() {
        let value = json!({ "location": "eastus", "properties": {} });
        assert!(decode(ResourceKind::Pool, value).is_err());
    }

    #[test]
    fn test_check_kind() {
        let id = ResourceId::account("rg", "a");
        assert!(check_kind(&id, ResourceKind::Account).is_ok());
        assert!(check_kind(&id, ResourceKind::Pool).is_err());

        let body = Resource::Account(NetAppAccount {
            location: "eastus".into(),
            ..Default::default()
        });
        assert_eq!(encode(&body).unwrap()["location"], "eastus");
    }
}
