//! In-memory NetApp service shared by the orchestrator scenarios

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use tanf::config::{
    AccountConfig, ExportPolicyRuleConfig, GeneralConfig, PoolConfig, ProjectConfig, VolumeConfig,
};
use tanf::resource::models::{ExportPolicy, Resource, ResourcePatch, ServiceLevel};
use tanf::resource::{NetAppApi, ResourceId, ResourceKind};
use tanf::units::bytes_from_tib;
use tanf::{AnfError, Result};

pub const SUBSCRIPTION: &str = "sub-1";

/// One recorded call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Get(ResourceId),
    Delete(ResourceId),
}

/// Operations a fault can be injected into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Create,
    Update,
    Delete,
}

/// Every call the orchestrators made, in order
#[derive(Debug, Default)]
pub struct Calls {
    pub creates: Vec<ResourceId>,
    pub updates: Vec<(ResourceId, ResourcePatch)>,
    pub deletes: Vec<ResourceId>,
    pub journal: Vec<Call>,
}

#[derive(Default)]
pub struct FakeNetApp {
    resources: Mutex<BTreeMap<String, (ResourceId, Resource)>>,
    calls: Mutex<Calls>,
    snapshot_counter: Mutex<u32>,
    /// Gets that still see a resource after it was deleted
    linger_gets: u32,
    lingering: Mutex<HashMap<String, (Resource, u32)>>,
    faults: Vec<(Op, ResourceKind)>,
}

fn key(id: &ResourceId) -> String {
    id.names().join("/")
}

fn arm_path(id: &ResourceId) -> String {
    format!(
        "/subscriptions/{}/resourceGroups/{}/providers/Microsoft.NetApp/{}",
        SUBSCRIPTION,
        id.resource_group(),
        id.provider_path()
    )
}

impl FakeNetApp {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deleted resources keep showing up for `gets` more lookups
    pub fn with_lingering_deletes(mut self, gets: u32) -> Self {
        self.linger_gets = gets;
        self
    }

    /// `op` on any resource of `kind` fails with a 500
    pub fn failing(mut self, op: Op, kind: ResourceKind) -> Self {
        self.faults.push((op, kind));
        self
    }

    fn injected_fault(&self, op: Op, id: &ResourceId) -> Result<()> {
        if self.faults.contains(&(op, id.kind())) {
            return Err(AnfError::Api {
                status: 500,
                code: "InternalServerError".into(),
                message: format!("{:?} of {} failed", op, id),
            });
        }
        Ok(())
    }

    pub fn journal(&self) -> Vec<Call> {
        self.calls.lock().unwrap().journal.clone()
    }

    /// Lookups of `id` made after its delete and before the next delete
    pub fn polls_after_delete(&self, id: &ResourceId) -> usize {
        self.journal()
            .iter()
            .skip_while(|call| **call != Call::Delete(id.clone()))
            .skip(1)
            .take_while(|call| !matches!(call, Call::Delete(_)))
            .filter(|call| **call == Call::Get(id.clone()))
            .count()
    }

    pub fn creates(&self) -> Vec<ResourceId> {
        self.calls.lock().unwrap().creates.clone()
    }

    pub fn deletes(&self) -> Vec<ResourceId> {
        self.calls.lock().unwrap().deletes.clone()
    }

    pub fn updates(&self) -> Vec<(ResourceId, ResourcePatch)> {
        self.calls.lock().unwrap().updates.clone()
    }

    pub fn clear_calls(&self) {
        *self.calls.lock().unwrap() = Calls::default();
    }

    pub fn stored(&self, id: &ResourceId) -> Option<Resource> {
        self.resources
            .lock()
            .unwrap()
            .get(&key(id))
            .map(|(_, r)| r.clone())
    }

    pub fn count(&self, kind: ResourceKind) -> usize {
        self.resources
            .lock()
            .unwrap()
            .values()
            .filter(|(id, _)| id.kind() == kind)
            .count()
    }

    /// Seed a resource without recording a create call
    pub fn insert(&self, id: &ResourceId, resource: Resource) {
        let stored = self.assign_server_fields(id, resource);
        self.resources
            .lock()
            .unwrap()
            .insert(key(id), (id.clone(), stored));
    }

    fn assign_server_fields(&self, id: &ResourceId, resource: Resource) -> Resource {
        let path = Some(arm_path(id));
        let name = Some(id.names()[1..].join("/"));
        let succeeded = Some("Succeeded".to_string());

        match resource {
            Resource::Account(mut r) => {
                r.id = path;
                r.name = name;
                r.properties.provisioning_state = succeeded;
                Resource::Account(r)
            }
            Resource::Pool(mut r) => {
                r.id = path;
                r.name = name;
                r.properties.pool_id = Some(format!("pool-{}", id.name()));
                r.properties.provisioning_state = succeeded;
                Resource::Pool(r)
            }
            Resource::Volume(mut r) => {
                r.id = path;
                r.name = name;
                r.properties.file_system_id = Some(format!("fs-{}", id.name()));
                r.properties.provisioning_state = succeeded;
                Resource::Volume(r)
            }
            Resource::Snapshot(mut r) => {
                let mut counter = self.snapshot_counter.lock().unwrap();
                *counter += 1;
                r.id = path;
                r.name = name;
                r.properties.snapshot_id = Some(format!("snapshot-uuid-{}", *counter));
                r.properties.provisioning_state = succeeded;
                Resource::Snapshot(r)
            }
        }
    }
}

#[async_trait]
impl NetAppApi for FakeNetApp {
    async fn get(&self, id: &ResourceId) -> Result<Option<Resource>> {
        self.calls
            .lock()
            .unwrap()
            .journal
            .push(Call::Get(id.clone()));

        let k = key(id);
        let mut lingering = self.lingering.lock().unwrap();
        let visible = match lingering.get_mut(&k) {
            Some((_, remaining)) if *remaining > 0 => {
                *remaining -= 1;
                true
            }
            _ => false,
        };
        if visible {
            return Ok(lingering.get(&k).map(|(r, _)| r.clone()));
        }
        lingering.remove(&k);
        drop(lingering);

        Ok(self.stored(id))
    }

    async fn list(&self, kind: ResourceKind, parents: &[String]) -> Result<Vec<Resource>> {
        let resources = self.resources.lock().unwrap();
        Ok(resources
            .values()
            .filter(|(id, _)| id.kind() == kind && id.names()[..id.names().len() - 1] == *parents)
            .map(|(_, r)| r.clone())
            .collect())
    }

    async fn create_or_update(&self, id: &ResourceId, desired: &Resource) -> Result<Resource> {
        self.injected_fault(Op::Create, id)?;
        if let Some(parent) = id.parent() {
            if self.stored(&parent).is_none() {
                return Err(AnfError::NotFound(parent.to_string()));
            }
        }

        let stored = self.assign_server_fields(id, desired.clone());
        self.resources
            .lock()
            .unwrap()
            .insert(key(id), (id.clone(), stored.clone()));
        self.calls.lock().unwrap().creates.push(id.clone());
        Ok(stored)
    }

    async fn update(&self, id: &ResourceId, patch: &ResourcePatch) -> Result<Resource> {
        self.injected_fault(Op::Update, id)?;
        let mut resources = self.resources.lock().unwrap();
        let (_, current) = resources
            .get_mut(&key(id))
            .ok_or_else(|| AnfError::NotFound(id.to_string()))?;

        match (current, patch) {
            (Resource::Pool(pool), ResourcePatch::Pool(p)) => {
                pool.properties.size = p.properties.size;
            }
            (Resource::Volume(volume), ResourcePatch::Volume(p)) => {
                volume.properties.usage_threshold = p.properties.usage_threshold;
                if let Some(policy) = &p.properties.export_policy {
                    volume.properties.export_policy = Some(ExportPolicy {
                        rules: policy.rules.clone(),
                    });
                }
            }
            _ => return Err(AnfError::InvalidResourceId(id.to_string())),
        }

        let updated = resources
            .get(&key(id))
            .map(|(_, r)| r.clone())
            .ok_or_else(|| AnfError::NotFound(id.to_string()))?;
        self.calls
            .lock()
            .unwrap()
            .updates
            .push((id.clone(), patch.clone()));
        Ok(updated)
    }

    async fn delete(&self, id: &ResourceId) -> Result<()> {
        self.injected_fault(Op::Delete, id)?;
        let mut resources = self.resources.lock().unwrap();
        let prefix = format!("{}/", key(id));
        if resources.keys().any(|k| k.starts_with(&prefix)) {
            return Err(AnfError::Api {
                status: 409,
                code: "CannotDeleteResource".into(),
                message: format!("{} still has children", id),
            });
        }
        if let Some((_, removed)) = resources.remove(&key(id)) {
            if self.linger_gets > 0 {
                self.lingering
                    .lock()
                    .unwrap()
                    .insert(key(id), (removed, self.linger_gets));
            }
        }

        let mut calls = self.calls.lock().unwrap();
        calls.deletes.push(id.clone());
        calls.journal.push(Call::Delete(id.clone()));
        Ok(())
    }
}

pub fn rule(index: u32) -> ExportPolicyRuleConfig {
    ExportPolicyRuleConfig {
        rule_index: index,
        allowed_clients: "0.0.0.0/0".into(),
        cifs: false,
        nfsv3: true,
        nfsv4: false,
        unix_read_only: false,
        unix_read_write: true,
    }
}

/// One account, one 4 TiB Standard pool, one 1 TiB volume with `rules` export rules
pub fn single_volume_config(rules: u32) -> ProjectConfig {
    ProjectConfig {
        general: GeneralConfig {
            subscription_id: Some(SUBSCRIPTION.into()),
            resource_group: "rg".into(),
        },
        accounts: vec![AccountConfig {
            name: "a1".into(),
            location: "EastUS".into(),
            capacity_pools: vec![PoolConfig {
                name: "p1".into(),
                size: bytes_from_tib(4),
                service_level: ServiceLevel::Standard,
                volumes: vec![VolumeConfig {
                    name: "v1".into(),
                    creation_token: "v1-token".into(),
                    usage_threshold: bytes_from_tib(1),
                    subnet_id: "/subscriptions/sub-1/resourceGroups/rg/providers/Microsoft.Network/virtualNetworks/vnet/subnets/anf".into(),
                    export_policies: (1..=rules).map(rule).collect(),
                }],
            }],
        }],
    }
}
