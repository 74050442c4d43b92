//! Resource abstraction layer
//!
//! Everything needed to name, describe and reach NetApp resources.
//!
//! # Architecture
//!
//! - [`uri`] - Pulls account/pool/volume/snapshot names out of resource ids
//! - [`kind`] - Resource kinds and the names that address one resource
//! - [`models`] - Wire shapes of accounts, pools, volumes and snapshots
//! - [`access`] - The [`NetAppApi`] trait and its Resource Manager implementation
//!
//! # Example
//!
//! ```ignore
//! use tanf::resource::{NetAppApi, ResourceId};
//!
//! async fn volume_exists(api: &dyn NetAppApi) -> tanf::Result<bool> {
//!     let id = ResourceId::volume("anf-rg", "acct01", "pool01", "vol01");
//!     Ok(api.get(&id).await?.is_some())
//! }
//! ```

pub mod access;
pub mod kind;
pub mod models;
pub mod uri;

pub use access::{AzureNetAppApi, NetAppApi};
pub use kind::{ResourceId, ResourceKind};
pub use models::{Resource, ResourcePatch};
