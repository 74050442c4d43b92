//! Updates
//!
//! Resizes the first configured pool and volume in place and appends one
//! export rule to the volume while the policy still has room.

use super::{fetch_required, report_failure};
use crate::config::{ProjectConfig, MAX_EXPORT_RULES};
use crate::error::{AnfError, Result};
use crate::output;
use crate::resource::models::{
    CapacityPool, CapacityPoolPatch, ExportPolicy, ExportPolicyRule, PoolPatchProperties, Volume,
    VolumePatch, VolumePatchProperties,
};
use crate::resource::{NetAppApi, ResourceId, ResourcePatch};
use crate::units::{bytes_from_tib, tib_from_bytes};

/// Targets for the update step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateSettings {
    /// New capacity pool size
    pub pool_size_tib: u64,
    /// New volume quota
    pub volume_size_tib: u64,
    /// Allowed clients of the appended export rule
    pub new_rule_clients: String,
}

impl Default for UpdateSettings {
    fn default() -> Self {
        Self {
            pool_size_tib: 10,
            volume_size_tib: 1,
            new_rule_clients: "10.0.0.4/32".to_string(),
        }
    }
}

/// The pool and volume as the service returned them after patching
#[derive(Debug)]
pub struct UpdateReport {
    pub pool: CapacityPool,
    pub volume: Volume,
}

/// Rules sorted by index with one NFSv3 read-write rule for `clients`
/// appended, or `None` when the policy is already full.
pub fn next_export_rules(
    rules: &[ExportPolicyRule],
    clients: &str,
) -> Option<Vec<ExportPolicyRule>> {
    if rules.len() >= MAX_EXPORT_RULES {
        return None;
    }

    let mut sorted = rules.to_vec();
    sorted.sort_by_key(|r| r.rule_index);
    let next_index = sorted.last().map_or(1, |r| r.rule_index + 1);

    sorted.push(ExportPolicyRule {
        rule_index: next_index,
        unix_read_only: false,
        unix_read_write: true,
        cifs: false,
        nfsv3: true,
        nfsv41: false,
        allowed_clients: clients.to_string(),
    });
    Some(sorted)
}

/// PATCH body resizing `volume`, carrying a new export policy only when a rule
/// could be added
pub fn volume_patch(volume: &Volume, usage_threshold: u64, clients: &str) -> VolumePatch {
    let export_policy =
        next_export_rules(volume.export_rules(), clients).map(|rules| ExportPolicy { rules });

    VolumePatch {
        location: volume.location.clone(),
        properties: VolumePatchProperties {
            usage_threshold,
            export_policy,
        },
    }
}

fn unexpected_kind(id: &ResourceId) -> AnfError {
    AnfError::InvalidResourceId(format!("service returned another kind for {}", id))
}

/// Resize the first pool, then resize the first volume and extend its
/// export policy
pub async fn run_updates(
    api: &dyn NetAppApi,
    config: &ProjectConfig,
    settings: &UpdateSettings,
) -> Result<UpdateReport> {
    let resource_group = config.resource_group();
    let (account, pool_config, volume_config) = config.first_volume()?;

    output::info("Performing size update on a Capacity Pool");
    let pool_id = ResourceId::pool(resource_group, &account.name, &pool_config.name);
    let pool = fetch_required(api, &pool_id)
        .await?
        .into_pool()
        .ok_or_else(|| unexpected_kind(&pool_id))?;
    output::info(&format!(
        "Current Capacity Pool size is: {} TiB",
        tib_from_bytes(pool.properties.size)
    ));

    let patch = ResourcePatch::Pool(CapacityPoolPatch {
        location: pool.location.clone(),
        properties: PoolPatchProperties {
            size: bytes_from_tib(settings.pool_size_tib),
        },
    });
    let pool = api
        .update(&pool_id, &patch)
        .await
        .map_err(|e| report_failure(format!("An error occurred while updating {}", pool_id), e))?
        .into_pool()
        .ok_or_else(|| unexpected_kind(&pool_id))?;
    output::success(&format!(
        "Capacity Pool successfully updated, new size: {} TiB",
        tib_from_bytes(pool.properties.size)
    ));

    output::info("Performing size and export policy update on a Volume");
    let volume_id = ResourceId::volume(
        resource_group,
        &account.name,
        &pool_config.name,
        &volume_config.name,
    );
    let volume = fetch_required(api, &volume_id)
        .await?
        .into_volume()
        .ok_or_else(|| unexpected_kind(&volume_id))?;
    output::info(&format!(
        "Current Volume size is: {} TiB",
        tib_from_bytes(volume.properties.usage_threshold)
    ));

    let volume_patch = volume_patch(
        &volume,
        bytes_from_tib(settings.volume_size_tib),
        &settings.new_rule_clients,
    );
    match &volume_patch.properties.export_policy {
        Some(policy) => tracing::info!(
            "Adding export rule {} to {}",
            policy.rules.last().map_or(0, |r| r.rule_index),
            volume_id
        ),
        None => output::warning(&format!(
            "Volume already has {} export rules, updating size only",
            MAX_EXPORT_RULES
        )),
    }

    let volume = api
        .update(&volume_id, &ResourcePatch::Volume(volume_patch))
        .await
        .map_err(|e| {
            report_failure(format!("An error occurred while updating {}", volume_id), e)
        })?
        .into_volume()
        .ok_or_else(|| unexpected_kind(&volume_id))?;
    output::success(&format!(
        "Volume successfully updated, new size: {} TiB, export rules: {}",
        tib_from_bytes(volume.properties.usage_threshold),
        volume.export_rules().len()
    ));

    Ok(UpdateReport { pool, volume })
}
