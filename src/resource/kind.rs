//! Resource kinds and identities
//!
//! Every NetApp resource is addressed by the resource group followed by the
//! names of its ancestors and itself. The number of names is fixed per kind.

use super::models::Resource;
use super::uri;
use crate::error::{AnfError, Result};
use std::fmt;

/// The four levels of the NetApp hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Account,
    Pool,
    Volume,
    Snapshot,
}

impl ResourceKind {
    /// Number of names (resource group included) that address one resource
    pub fn arity(self) -> usize {
        match self {
            ResourceKind::Account => 2,
            ResourceKind::Pool => 3,
            ResourceKind::Volume => 4,
            ResourceKind::Snapshot => 5,
        }
    }

    /// Collection segment in the resource path
    pub fn segment(self) -> &'static str {
        match self {
            ResourceKind::Account => uri::ACCOUNTS,
            ResourceKind::Pool => uri::CAPACITY_POOLS,
            ResourceKind::Volume => uri::VOLUMES,
            ResourceKind::Snapshot => uri::SNAPSHOTS,
        }
    }

    pub fn parent(self) -> Option<ResourceKind> {
        match self {
            ResourceKind::Account => None,
            ResourceKind::Pool => Some(ResourceKind::Account),
            ResourceKind::Volume => Some(ResourceKind::Pool),
            ResourceKind::Snapshot => Some(ResourceKind::Volume),
        }
    }

    /// Kinds from the root of the hierarchy down to and including `self`
    pub fn lineage(self) -> Vec<ResourceKind> {
        let mut chain = vec![self];
        let mut current = self;
        while let Some(parent) = current.parent() {
            chain.push(parent);
            current = parent;
        }
        chain.reverse();
        chain
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ResourceKind::Account => "Account",
            ResourceKind::Pool => "Capacity Pool",
            ResourceKind::Volume => "Volume",
            ResourceKind::Snapshot => "Snapshot",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Names addressing a single resource: resource group, ancestors, own name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceId {
    kind: ResourceKind,
    names: Vec<String>,
}

impl ResourceId {
    /// Build an id, checking the number of names against the kind
    pub fn new<S: AsRef<str>>(kind: ResourceKind, names: &[S]) -> Result<Self> {
        if names.len() != kind.arity() {
            return Err(AnfError::InvalidResourceId(format!(
                "{} needs {} names, got {}",
                kind,
                kind.arity(),
                names.len()
            )));
        }
        if let Some(blank) = names.iter().position(|n| n.as_ref().trim().is_empty()) {
            return Err(AnfError::InvalidResourceId(format!(
                "{} name at position {} is empty",
                kind, blank
            )));
        }

        Ok(Self {
            kind,
            names: names.iter().map(|n| n.as_ref().to_string()).collect(),
        })
    }

    pub fn account(resource_group: &str, account: &str) -> Self {
        Self::unchecked(ResourceKind::Account, &[resource_group, account])
    }

    pub fn pool(resource_group: &str, account: &str, pool: &str) -> Self {
        Self::unchecked(ResourceKind::Pool, &[resource_group, account, pool])
    }

    pub fn volume(resource_group: &str, account: &str, pool: &str, volume: &str) -> Self {
        Self::unchecked(ResourceKind::Volume, &[resource_group, account, pool, volume])
    }

    pub fn snapshot(
        resource_group: &str,
        account: &str,
        pool: &str,
        volume: &str,
        snapshot: &str,
    ) -> Self {
        Self::unchecked(
            ResourceKind::Snapshot,
            &[resource_group, account, pool, volume, snapshot],
        )
    }

    fn unchecked(kind: ResourceKind, names: &[&str]) -> Self {
        debug_assert_eq!(names.len(), kind.arity());
        Self {
            kind,
            names: names.iter().map(|n| n.to_string()).collect(),
        }
    }

    /// Rebuild an id of `kind` from a full resource path reported by the service
    pub fn from_path(kind: ResourceKind, resource_path: &str) -> Result<Self> {
        let mut names = Vec::with_capacity(kind.arity());

        let group = uri::resource_group(resource_path).ok_or_else(|| {
            AnfError::InvalidResourceId(format!("no resource group in {}", resource_path))
        })?;
        names.push(group);

        for level in kind.lineage() {
            let name = uri::get_resource_value(resource_path, level.segment()).ok_or_else(|| {
                AnfError::InvalidResourceId(format!(
                    "no {} name in {}",
                    level.display_name(),
                    resource_path
                ))
            })?;
            names.push(name);
        }

        Self::new(kind, &names)
    }

    /// Id of the resource described by a service response
    pub fn of(resource: &Resource) -> Result<Self> {
        let path = resource.id().ok_or_else(|| {
            AnfError::InvalidResourceId(format!("{} has no resource id", resource.kind()))
        })?;
        Self::from_path(resource.kind(), path)
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn resource_group(&self) -> &str {
        &self.names[0]
    }

    /// The resource's own name
    pub fn name(&self) -> &str {
        &self.names[self.names.len() - 1]
    }

    /// All names, resource group first
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Id of the enclosing resource, `None` for accounts
    pub fn parent(&self) -> Option<ResourceId> {
        let kind = self.kind.parent()?;
        Some(Self {
            kind,
            names: self.names[..self.names.len() - 1].to_vec(),
        })
    }

    /// Path below the provider, e.g. `netAppAccounts/a/capacityPools/p`
    pub fn provider_path(&self) -> String {
        self.kind
            .lineage()
            .iter()
            .zip(&self.names[1..])
            .map(|(kind, name)| format!("{}/{}", kind.segment(), urlencoding::encode(name)))
            .collect::<Vec<_>>()
            .join("/")
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.names[1..].join("/"))
    }
}
