//! tanf - Azure NetApp Files lifecycle client
//!
//! Provisions accounts, capacity pools and volumes described in a
//! configuration file, snapshots and clones a volume, resizes resources in
//! place, then tears everything down again.

pub mod azure;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod output;
pub mod poller;
pub mod resource;
pub mod units;

pub use error::{AnfError, Result};

/// Version injected at compile time via TANF_VERSION env var (set by CI/CD),
/// or "dev" for local builds.
pub const VERSION: &str = match option_env!("TANF_VERSION") {
    Some(v) => v,
    None => "dev",
};
