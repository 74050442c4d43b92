//! Configuration Management
//!
//! The resource hierarchy to provision, read once at startup from
//! `appsettings.json` (or a YAML file with the same shape).

use crate::error::{AnfError, Result};
use crate::resource::models::{ExportPolicyRule, ServiceLevel};
use crate::units::{GIB, TIB};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "appsettings.json";

/// Pool sizes are provisioned in units of this many bytes
pub const POOL_SIZE_UNIT: u64 = TIB;

/// Smallest pool
pub const MIN_POOL_SIZE: u64 = 4 * TIB;

/// Smallest volume quota
pub const MIN_USAGE_THRESHOLD: u64 = 100 * GIB;

/// Largest volume quota
pub const MAX_USAGE_THRESHOLD: u64 = 100 * TIB;

/// Export policies hold at most this many rules
pub const MAX_EXPORT_RULES: usize = 5;

/// Project configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub general: GeneralConfig,
    #[serde(default)]
    pub accounts: Vec<AccountConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralConfig {
    /// Subscription the accounts are deployed to
    #[serde(default)]
    pub subscription_id: Option<String>,
    /// Resource group holding the accounts
    pub resource_group: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountConfig {
    pub name: String,
    pub location: String,
    #[serde(default)]
    pub capacity_pools: Vec<PoolConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolConfig {
    pub name: String,
    /// Size in bytes, whole TiB and at least 4 TiB
    pub size: u64,
    pub service_level: ServiceLevel,
    #[serde(default)]
    pub volumes: Vec<VolumeConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeConfig {
    pub name: String,
    /// Unique file path used for mount targets
    pub creation_token: String,
    /// Quota in bytes, between 100 GiB and 100 TiB
    pub usage_threshold: u64,
    /// Delegated subnet resource id
    pub subnet_id: String,
    #[serde(default)]
    pub export_policies: Vec<ExportPolicyRuleConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportPolicyRuleConfig {
    /// 1-based
    pub rule_index: u32,
    pub allowed_clients: String,
    #[serde(default)]
    pub cifs: bool,
    #[serde(default)]
    pub nfsv3: bool,
    #[serde(default)]
    pub nfsv4: bool,
    #[serde(default)]
    pub unix_read_only: bool,
    #[serde(default)]
    pub unix_read_write: bool,
}

impl From<&ExportPolicyRuleConfig> for ExportPolicyRule {
    fn from(rule: &ExportPolicyRuleConfig) -> Self {
        Self {
            rule_index: rule.rule_index,
            unix_read_only: rule.unix_read_only,
            unix_read_write: rule.unix_read_write,
            cifs: rule.cifs,
            nfsv3: rule.nfsv3,
            nfsv41: rule.nfsv4,
            allowed_clients: rule.allowed_clients.clone(),
        }
    }
}

impl ProjectConfig {
    /// Load and validate the configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(AnfError::Config(format!(
                "Could not find {}. Unable to load project configuration",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );

        let config: ProjectConfig = if is_yaml {
            serde_yaml::from_str(&content)
                .map_err(|e| AnfError::Config(format!("{}: {}", path.display(), e)))?
        } else {
            serde_json::from_str(&content)
                .map_err(|e| AnfError::Config(format!("{}: {}", path.display(), e)))?
        };

        config.validate()?;
        Ok(config)
    }

    /// Check sizes, names and export rules
    pub fn validate(&self) -> Result<()> {
        if self.general.resource_group.trim().is_empty() {
            return Err(AnfError::Config("resourceGroup is empty".to_string()));
        }

        for account in &self.accounts {
            require_name("account", &account.name)?;
            if account.location.trim().is_empty() {
                return Err(AnfError::Config(format!(
                    "account {} has no location",
                    account.name
                )));
            }

            for pool in &account.capacity_pools {
                require_name("capacity pool", &pool.name)?;
                if !is_valid_pool_size(pool.size) {
                    return Err(AnfError::Config(format!(
                        "capacity pool {} size {} must be whole TiB, at least 4 TiB",
                        pool.name, pool.size
                    )));
                }

                for volume in &pool.volumes {
                    require_name("volume", &volume.name)?;
                    volume.validate()?;
                }
            }
        }

        Ok(())
    }

    pub fn resource_group(&self) -> &str {
        &self.general.resource_group
    }

    pub fn first_account(&self) -> Result<&AccountConfig> {
        self.accounts
            .first()
            .ok_or_else(|| AnfError::MissingConfiguration("account".to_string()))
    }

    pub fn first_pool(&self) -> Result<(&AccountConfig, &PoolConfig)> {
        let account = self.first_account()?;
        let pool = account.capacity_pools.first().ok_or_else(|| {
            AnfError::MissingConfiguration(format!("capacity pool in account {}", account.name))
        })?;
        Ok((account, pool))
    }

    pub fn first_volume(&self) -> Result<(&AccountConfig, &PoolConfig, &VolumeConfig)> {
        let (account, pool) = self.first_pool()?;
        let volume = pool.volumes.first().ok_or_else(|| {
            AnfError::MissingConfiguration(format!(
                "volume in capacity pool {}/{}",
                account.name, pool.name
            ))
        })?;
        Ok((account, pool, volume))
    }
}

impl VolumeConfig {
    fn validate(&self) -> Result<()> {
        if !(MIN_USAGE_THRESHOLD..=MAX_USAGE_THRESHOLD).contains(&self.usage_threshold) {
            return Err(AnfError::Config(format!(
                "volume {} usage threshold {} is outside [100 GiB, 100 TiB]",
                self.name, self.usage_threshold
            )));
        }
        if self.creation_token.trim().is_empty() {
            return Err(AnfError::Config(format!(
                "volume {} has no creation token",
                self.name
            )));
        }
        if self.export_policies.len() > MAX_EXPORT_RULES {
            return Err(AnfError::Config(format!(
                "volume {} has {} export rules, at most {} allowed",
                self.name,
                self.export_policies.len(),
                MAX_EXPORT_RULES
            )));
        }

        let mut previous = 0;
        for rule in &self.export_policies {
            if rule.rule_index <= previous {
                return Err(AnfError::Config(format!(
                    "volume {} export rule indices must start at 1 and increase",
                    self.name
                )));
            }
            previous = rule.rule_index;
        }

        Ok(())
    }

    /// Export rules in wire form
    pub fn export_rules(&self) -> Vec<ExportPolicyRule> {
        self.export_policies.iter().map(ExportPolicyRule::from).collect()
    }

    /// The single protocol advertised at creation time, from the first rule
    pub fn protocol_types(&self) -> Vec<String> {
        match self.export_policies.first() {
            Some(rule) if rule.nfsv3 => vec!["NFSv3".to_string()],
            Some(_) => vec!["NFSv4.1".to_string()],
            None => Vec::new(),
        }
    }
}

/// Pool sizes are whole TiB, at least 4 TiB
pub fn is_valid_pool_size(size: u64) -> bool {
    size >= MIN_POOL_SIZE && size % POOL_SIZE_UNIT == 0
}

fn require_name(what: &str, name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(AnfError::Config(format!("{} name is empty", what)));
    }
    Ok(())
}
