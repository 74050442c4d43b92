//! Creation
//!
//! Accounts, then pools, then volumes. Every resource is looked up first and
//! only created when the service doesn't have it, so a run can be repeated.

use super::report_failure;
use crate::config::{AccountConfig, PoolConfig, ProjectConfig, VolumeConfig};
use crate::error::Result;
use crate::output;
use crate::resource::models::{
    CapacityPool, ExportPolicy, NetAppAccount, PoolProperties, Volume, VolumeProperties,
};
use crate::resource::{NetAppApi, Resource, ResourceId};

/// What [`create_or_retrieve`] found
#[derive(Debug, Clone, PartialEq)]
pub enum Converged {
    Created(Resource),
    Existing(Resource),
}

impl Converged {
    pub fn into_resource(self) -> Resource {
        match self {
            Converged::Created(r) | Converged::Existing(r) => r,
        }
    }
}

/// Resources touched by a creation run
#[derive(Debug, Default)]
pub struct CreationReport {
    pub created: Vec<ResourceId>,
    pub existing: Vec<ResourceId>,
}

impl CreationReport {
    fn record(&mut self, id: ResourceId, converged: &Converged) {
        match converged {
            Converged::Created(_) => self.created.push(id),
            Converged::Existing(_) => self.existing.push(id),
        }
    }
}

/// Return the resource at `id`, creating it from `desired` if it doesn't exist
pub async fn create_or_retrieve(
    api: &dyn NetAppApi,
    id: &ResourceId,
    desired: &Resource,
) -> Result<Converged> {
    let kind = id.kind();

    let found = api.get(id).await.map_err(|e| {
        report_failure(format!("An error occurred while looking up {}", id), e)
    })?;

    if let Some(existing) = found {
        tracing::info!("{} already exists", id);
        output::info(&format!(
            "{} already exists, resource id: {}",
            kind,
            existing.display_id()
        ));
        return Ok(Converged::Existing(existing));
    }

    let created = api.create_or_update(id, desired).await.map_err(|e| {
        report_failure(format!("An error occurred while creating {}", id), e)
    })?;

    tracing::info!("{} created", id);
    output::success(&format!(
        "{} successfully created, resource id: {}",
        kind,
        created.display_id()
    ));
    Ok(Converged::Created(created))
}

/// Desired state of an account
pub fn account_body(account: &AccountConfig) -> Resource {
    Resource::Account(NetAppAccount {
        location: account.location.clone(),
        ..Default::default()
    })
}

/// Desired state of a capacity pool
pub fn pool_body(account: &AccountConfig, pool: &PoolConfig) -> Resource {
    Resource::Pool(CapacityPool {
        id: None,
        name: None,
        location: account.location.clone(),
        properties: PoolProperties {
            pool_id: None,
            size: pool.size,
            service_level: pool.service_level,
            provisioning_state: None,
        },
    })
}

/// Desired state of a volume. The pool's service level applies, and a single
/// protocol is advertised based on the first export rule.
pub fn volume_body(account: &AccountConfig, pool: &PoolConfig, volume: &VolumeConfig) -> Resource {
    Resource::Volume(Volume {
        id: None,
        name: None,
        location: account.location.to_lowercase(),
        properties: VolumeProperties {
            file_system_id: None,
            creation_token: volume.creation_token.clone(),
            service_level: Some(pool.service_level),
            usage_threshold: volume.usage_threshold,
            export_policy: Some(ExportPolicy {
                rules: volume.export_rules(),
            }),
            protocol_types: volume.protocol_types(),
            subnet_id: volume.subnet_id.clone(),
            snapshot_id: None,
            provisioning_state: None,
        },
    })
}

/// Create-or-retrieve every configured account, pool and volume
pub async fn run_creation(api: &dyn NetAppApi, config: &ProjectConfig) -> Result<CreationReport> {
    let resource_group = config.resource_group();
    let mut report = CreationReport::default();

    output::info("Creating Azure NetApp Files Account(s)...");
    if config.accounts.is_empty() {
        output::info("No accounts defined in the configuration file");
    }
    for account in &config.accounts {
        let id = ResourceId::account(resource_group, &account.name);
        let converged = create_or_retrieve(api, &id, &account_body(account)).await?;
        report.record(id, &converged);
    }

    output::info("Creating Capacity Pool(s)...");
    for account in &config.accounts {
        if account.capacity_pools.is_empty() {
            output::info(&format!("No capacity pool defined for account {}", account.name));
            continue;
        }
        for pool in &account.capacity_pools {
            let id = ResourceId::pool(resource_group, &account.name, &pool.name);
            let converged = create_or_retrieve(api, &id, &pool_body(account, pool)).await?;
            report.record(id, &converged);
        }
    }

    // Volume operations at the resource provider run serially
    output::info("Creating Volume(s)...");
    for account in &config.accounts {
        for pool in &account.capacity_pools {
            if pool.volumes.is_empty() {
                output::info(&format!(
                    "No volumes defined for Account: {}, Capacity Pool: {}",
                    account.name, pool.name
                ));
                continue;
            }
            for volume in &pool.volumes {
                let id = ResourceId::volume(resource_group, &account.name, &pool.name, &volume.name);
                let converged =
                    create_or_retrieve(api, &id, &volume_body(account, pool, volume)).await?;
                report.record(id, &converged);
            }
        }
    }

    tracing::info!(
        "Creation finished: {} created, {} already present",
        report.created.len(),
        report.existing.len()
    );
    Ok(report)
}
