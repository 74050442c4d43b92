//! Snapshots
//!
//! Takes a snapshot of the first configured volume and provisions a new
//! volume from it in the same pool.

use super::{create_or_retrieve, fetch_required};
use crate::config::ProjectConfig;
use crate::error::{AnfError, Result};
use crate::output;
use crate::resource::models::{Snapshot, Volume, VolumeProperties};
use crate::resource::{NetAppApi, Resource, ResourceId, ResourceKind};
use uuid::Uuid;

/// The snapshot and the volume cloned from it
#[derive(Debug)]
pub struct SnapshotReport {
    pub snapshot: Snapshot,
    pub clone: Volume,
}

/// Body of a volume restored from `snapshot_id`. Everything but the export
/// policy is copied from `source`.
pub fn clone_body(source: &Volume, snapshot_id: &str, name: &str) -> Resource {
    Resource::Volume(Volume {
        id: None,
        name: None,
        location: source.location.clone(),
        properties: VolumeProperties {
            file_system_id: None,
            creation_token: name.to_string(),
            service_level: source.properties.service_level,
            usage_threshold: source.properties.usage_threshold,
            export_policy: None,
            protocol_types: source.properties.protocol_types.clone(),
            subnet_id: source.properties.subnet_id.clone(),
            snapshot_id: Some(snapshot_id.to_string()),
            provisioning_state: None,
        },
    })
}

/// Snapshot the first volume, then clone a new volume from the snapshot
pub async fn run_snapshots(api: &dyn NetAppApi, config: &ProjectConfig) -> Result<SnapshotReport> {
    let (account, pool, volume) = config.first_volume()?;

    output::info("Performing Snapshot operations");
    let snapshot_name = format!("Snapshot-{}", Uuid::new_v4());
    let snapshot_id = ResourceId::snapshot(
        config.resource_group(),
        &account.name,
        &pool.name,
        &volume.name,
        &snapshot_name,
    );
    let desired = Resource::Snapshot(Snapshot {
        location: account.location.clone(),
        ..Default::default()
    });
    let snapshot = create_or_retrieve(api, &snapshot_id, &desired)
        .await?
        .into_resource()
        .into_snapshot()
        .ok_or_else(|| AnfError::InvalidResourceId(snapshot_id.to_string()))?;

    let unique_id = snapshot.properties.snapshot_id.clone().ok_or_else(|| {
        AnfError::OperationFailed {
            status: "Succeeded".to_string(),
            message: format!("{} was created without a snapshotId", snapshot_id),
        }
    })?;

    // Names of the source come from the path the service returned
    let snapshot_path = snapshot.id.as_deref().ok_or_else(|| {
        AnfError::InvalidResourceId(format!("{} has no resource id", snapshot_id))
    })?;
    let source_id = ResourceId::from_path(ResourceKind::Volume, snapshot_path)?;
    let source = fetch_required(api, &source_id)
        .await?
        .into_volume()
        .ok_or_else(|| AnfError::InvalidResourceId(source_id.to_string()))?;

    output::info("Creating new Volume from Snapshot");
    let clone_name = format!("Vol-{}", snapshot_name);
    let names = source_id.names();
    let clone_id = ResourceId::volume(&names[0], &names[1], &names[2], &clone_name);
    let clone = create_or_retrieve(api, &clone_id, &clone_body(&source, &unique_id, &clone_name))
        .await?
        .into_resource()
        .into_volume()
        .ok_or_else(|| AnfError::InvalidResourceId(clone_id.to_string()))?;

    Ok(SnapshotReport { snapshot, clone })
}
