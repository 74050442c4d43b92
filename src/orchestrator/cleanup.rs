//! Cleanup
//!
//! Deletes the configured hierarchy bottom-up: snapshots, volumes, pools, then
//! accounts. Snapshots and volumes are listed from the service so resources
//! the run created on its own (clones, snapshots) go too. After every delete
//! the resource is polled until it stops showing up, so its parent can be
//! deleted next.

use super::report_failure;
use crate::config::ProjectConfig;
use crate::error::Result;
use crate::output;
use crate::poller::{wait_until_absent, RetryPolicy, WaitOutcome};
use crate::resource::{NetAppApi, Resource, ResourceId, ResourceKind};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupSettings {
    /// Polling after each delete
    pub poll: RetryPolicy,
    /// Pause between the last pool delete and the first account delete
    pub account_settle: Duration,
}

impl Default for CleanupSettings {
    fn default() -> Self {
        Self {
            poll: RetryPolicy::default(),
            account_settle: Duration::from_secs(60),
        }
    }
}

/// Deleted resources, in delete order
#[derive(Debug, Default)]
pub struct CleanupReport {
    pub deleted: Vec<ResourceId>,
    /// Deleted but still reported by the service when polling stopped
    pub unconfirmed: Vec<ResourceId>,
}

/// Delete one resource reported by the service and wait for it to go away
async fn delete_resource(
    api: &dyn NetAppApi,
    resource: &Resource,
    settings: &CleanupSettings,
    report: &mut CleanupReport,
) -> Result<()> {
    let path = resource.display_id().to_string();
    let id = ResourceId::of(resource).map_err(|e| {
        report_failure(
            format!("An error occurred while deleting {} {}", resource.kind(), path),
            e,
        )
    })?;

    tracing::info!("Deleting {}", id);
    api.delete(&id)
        .await
        .map_err(|e| report_failure(format!("An error occurred while deleting {}", id), e))?;

    match wait_until_absent(api, id.kind(), &path, &settings.poll).await {
        WaitOutcome::Gone { attempts } => {
            tracing::debug!("{} gone after {} checks", id, attempts);
            output::success(&format!(
                "{} successfully deleted: {}",
                id.kind(),
                path
            ));
        }
        WaitOutcome::StillPresent { .. } | WaitOutcome::Aborted => {
            output::warning(&format!(
                "{} deleted but could not confirm it is gone: {}",
                id.kind(),
                path
            ));
            report.unconfirmed.push(id.clone());
        }
    }

    report.deleted.push(id);
    Ok(())
}

/// Fetch `id` if it is still there
async fn lookup(api: &dyn NetAppApi, id: &ResourceId) -> Result<Option<Resource>> {
    api.get(id).await.map_err(|e| {
        report_failure(format!("An error occurred while looking up {}", id), e)
    })
}

/// List the children of `kind` under `parent`, nothing if the parent is gone
async fn list_children(
    api: &dyn NetAppApi,
    kind: ResourceKind,
    parent: &ResourceId,
) -> Result<Vec<Resource>> {
    if lookup(api, parent).await?.is_none() {
        tracing::debug!("{} is already gone, nothing to list", parent);
        return Ok(Vec::new());
    }

    api.list(kind, parent.names()).await.map_err(|e| {
        report_failure(
            format!("An error occurred while listing {} under {}", kind, parent),
            e,
        )
    })
}

/// Delete everything the configuration describes, children first
pub async fn run_cleanup(
    api: &dyn NetAppApi,
    config: &ProjectConfig,
    settings: &CleanupSettings,
) -> Result<CleanupReport> {
    let resource_group = config.resource_group();
    let mut report = CleanupReport::default();

    output::info("Cleaning up Snapshot(s)...");
    for account in &config.accounts {
        for pool in &account.capacity_pools {
            for volume in &pool.volumes {
                let volume_id =
                    ResourceId::volume(resource_group, &account.name, &pool.name, &volume.name);
                for snapshot in list_children(api, ResourceKind::Snapshot, &volume_id).await? {
                    delete_resource(api, &snapshot, settings, &mut report).await?;
                }
            }
        }
    }

    output::info("Cleaning up Volume(s)...");
    for account in &config.accounts {
        for pool in &account.capacity_pools {
            let pool_id = ResourceId::pool(resource_group, &account.name, &pool.name);
            for volume in list_children(api, ResourceKind::Volume, &pool_id).await? {
                delete_resource(api, &volume, settings, &mut report).await?;
            }
        }
    }

    output::info("Cleaning up Capacity Pool(s)...");
    for account in &config.accounts {
        for pool in &account.capacity_pools {
            let pool_id = ResourceId::pool(resource_group, &account.name, &pool.name);
            match lookup(api, &pool_id).await? {
                Some(found) => delete_resource(api, &found, settings, &mut report).await?,
                None => tracing::debug!("{} is already gone", pool_id),
            }
        }
    }

    if !config.accounts.is_empty() && !settings.account_settle.is_zero() {
        output::info(&format!(
            "Waiting {} seconds before deleting accounts",
            settings.account_settle.as_secs()
        ));
        tokio::time::sleep(settings.account_settle).await;
    }

    output::info("Cleaning up Account(s)...");
    for account in &config.accounts {
        let account_id = ResourceId::account(resource_group, &account.name);
        match lookup(api, &account_id).await? {
            Some(found) => delete_resource(api, &found, settings, &mut report).await?,
            None => tracing::debug!("{} is already gone", account_id),
        }
    }

    tracing::info!(
        "Cleanup finished: {} deleted, {} unconfirmed",
        report.deleted.len(),
        report.unconfirmed.len()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AccountConfig, GeneralConfig, PoolConfig, VolumeConfig};
    use crate::error::AnfError;
    use crate::resource::models::{NetAppAccount, ResourcePatch, ServiceLevel, Snapshot};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Everything exists, and listed snapshots come back without a resource id
    #[derive(Default)]
    struct IdlessSnapshots {
        deletes: AtomicU32,
    }

    #[async_trait]
    impl NetAppApi for IdlessSnapshots {
        async fn get(&self, _id: &ResourceId) -> Result<Option<Resource>> {
            Ok(Some(Resource::Account(NetAppAccount {
                location: "eastus".into(),
                ..Default::default()
            })))
        }

        async fn list(&self, kind: ResourceKind, _parents: &[String]) -> Result<Vec<Resource>> {
            Ok(match kind {
                ResourceKind::Snapshot => vec![Resource::Snapshot(Snapshot {
                    location: "eastus".into(),
                    ..Default::default()
                })],
                _ => Vec::new(),
            })
        }

        async fn create_or_update(&self, _id: &ResourceId, _desired: &Resource) -> Result<Resource> {
            unimplemented!()
        }

        async fn update(&self, _id: &ResourceId, _patch: &ResourcePatch) -> Result<Resource> {
            unimplemented!()
        }

        async fn delete(&self, _id: &ResourceId) -> Result<()> {
            self.deletes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn one_volume() -> ProjectConfig {
        ProjectConfig {
            general: GeneralConfig {
                subscription_id: None,
                resource_group: "rg".into(),
            },
            accounts: vec![AccountConfig {
                name: "a1".into(),
                location: "eastus".into(),
                capacity_pools: vec![PoolConfig {
                    name: "p1".into(),
                    size: crate::units::bytes_from_tib(4),
                    service_level: ServiceLevel::Standard,
                    volumes: vec![VolumeConfig {
                        name: "v1".into(),
                        creation_token: "v1".into(),
                        usage_threshold: crate::units::TIB,
                        subnet_id: "subnet".into(),
                        export_policies: vec![],
                    }],
                }],
            }],
        }
    }

    #[tokio::test]
    async fn test_listed_resource_without_id_stops_cleanup() {
        let api = IdlessSnapshots::default();

        let err = run_cleanup(&api, &one_volume(), &CleanupSettings::default())
            .await
            .unwrap_err();

        assert!(matches!(err, AnfError::InvalidResourceId(_)));
        assert_eq!(api.deletes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_default_settings() {
        let settings = CleanupSettings::default();
        assert_eq!(settings.account_settle, Duration::from_secs(60));
        assert_eq!(settings.poll, RetryPolicy::default());
    }
}
