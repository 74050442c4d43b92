//! NetApp resource bodies
//!
//! Wire shapes for the `Microsoft.NetApp` ARM resources. The same structs are
//! used as desired state on PUT and as the service's answer on GET, so every
//! server-assigned field is optional.

use super::kind::ResourceKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Capacity pool service tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceLevel {
    Standard,
    Premium,
    Ultra,
}

impl fmt::Display for ServiceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ServiceLevel::Standard => "Standard",
            ServiceLevel::Premium => "Premium",
            ServiceLevel::Ultra => "Ultra",
        };
        f.write_str(name)
    }
}

/// NetApp account
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetAppAccount {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub location: String,
    #[serde(default)]
    pub properties: AccountProperties,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
}

/// Capacity pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacityPool {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub location: String,
    pub properties: PoolProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pool_id: Option<String>,
    /// Provisioned size in bytes
    pub size: u64,
    pub service_level: ServiceLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
}

/// Volume
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Volume {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub location: String,
    pub properties: VolumeProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_system_id: Option<String>,
    pub creation_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_level: Option<ServiceLevel>,
    /// Quota in bytes
    pub usage_threshold: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_policy: Option<ExportPolicy>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub protocol_types: Vec<String>,
    pub subnet_id: String,
    /// Unique id (not the resource path) of the snapshot this volume is cloned from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
}

impl Volume {
    /// Export policy rules, empty when the volume has no policy
    pub fn export_rules(&self) -> &[ExportPolicyRule] {
        self.properties
            .export_policy
            .as_ref()
            .map(|p| p.rules.as_slice())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportPolicy {
    #[serde(default)]
    pub rules: Vec<ExportPolicyRule>,
}

/// One export policy rule. Indices are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportPolicyRule {
    pub rule_index: u32,
    #[serde(default)]
    pub unix_read_only: bool,
    #[serde(default)]
    pub unix_read_write: bool,
    #[serde(default)]
    pub cifs: bool,
    #[serde(default)]
    pub nfsv3: bool,
    #[serde(default)]
    pub nfsv41: bool,
    pub allowed_clients: String,
}

/// Volume snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub location: String,
    #[serde(default)]
    pub properties: SnapshotProperties,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotProperties {
    /// Unique snapshot id, distinct from the resource path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
}

/// Capacity pool PATCH body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapacityPoolPatch {
    pub location: String,
    pub properties: PoolPatchProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolPatchProperties {
    pub size: u64,
}

/// Volume PATCH body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumePatch {
    pub location: String,
    pub properties: VolumePatchProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumePatchProperties {
    pub usage_threshold: u64,
    /// Only sent when the rule list changes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_policy: Option<ExportPolicy>,
}

/// Any NetApp resource, tagged by kind
#[derive(Debug, Clone, PartialEq)]
pub enum Resource {
    Account(NetAppAccount),
    Pool(CapacityPool),
    Volume(Volume),
    Snapshot(Snapshot),
}

impl Resource {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Resource::Account(_) => ResourceKind::Account,
            Resource::Pool(_) => ResourceKind::Pool,
            Resource::Volume(_) => ResourceKind::Volume,
            Resource::Snapshot(_) => ResourceKind::Snapshot,
        }
    }

    /// Full resource path as reported by the service
    pub fn id(&self) -> Option<&str> {
        match self {
            Resource::Account(r) => r.id.as_deref(),
            Resource::Pool(r) => r.id.as_deref(),
            Resource::Volume(r) => r.id.as_deref(),
            Resource::Snapshot(r) => r.id.as_deref(),
        }
    }

    /// Resource id for display, `-` when the service didn't send one
    pub fn display_id(&self) -> &str {
        self.id().unwrap_or("-")
    }

    pub fn into_account(self) -> Option<NetAppAccount> {
        match self {
            Resource::Account(r) => Some(r),
            _ => None,
        }
    }

    pub fn into_pool(self) -> Option<CapacityPool> {
        match self {
            Resource::Pool(r) => Some(r),
            _ => None,
        }
    }

    pub fn into_volume(self) -> Option<Volume> {
        match self {
            Resource::Volume(r) => Some(r),
            _ => None,
        }
    }

    pub fn into_snapshot(self) -> Option<Snapshot> {
        match self {
            Resource::Snapshot(r) => Some(r),
            _ => None,
        }
    }
}

/// PATCH bodies for the kinds that support in-place updates
#[derive(Debug, Clone, PartialEq)]
pub enum ResourcePatch {
    Pool(CapacityPoolPatch),
    Volume(VolumePatch),
}

impl ResourcePatch {
    pub fn kind(&self) -> ResourceKind {
        match self {
            ResourcePatch::Pool(_) => ResourceKind::Pool,
            ResourcePatch::Volume(_) => ResourceKind::Volume,
        }
    }
}
