//! Lifecycle orchestrators
//!
//! Each orchestrator walks the configured hierarchy and drives the
//! [`NetAppApi`] one call at a time: top-down to create, bottom-up to delete.
//! The first failed remote call is reported with the resource it concerned
//! and stops the run.
//!
//! - [`creation`] - create-or-retrieve accounts, pools and volumes
//! - [`snapshots`] - snapshot a volume and clone a new volume from it
//! - [`updates`] - resize a pool, resize a volume and add an export rule
//! - [`cleanup`] - delete everything, children first, confirming each delete

pub mod cleanup;
pub mod creation;
pub mod snapshots;
pub mod updates;

use crate::config::ProjectConfig;
use crate::error::{AnfError, Result};
use crate::output;
use crate::resource::{NetAppApi, Resource, ResourceId};
use std::fmt::Display;

pub use cleanup::{run_cleanup, CleanupReport, CleanupSettings};
pub use creation::{create_or_retrieve, run_creation, Converged, CreationReport};
pub use snapshots::{run_snapshots, SnapshotReport};
pub use updates::{run_updates, UpdateReport, UpdateSettings};

/// Settings for a full run
#[derive(Debug, Clone, Default)]
pub struct RunSettings {
    pub updates: UpdateSettings,
    pub cleanup: CleanupSettings,
    /// Leave every resource in place at the end
    pub skip_cleanup: bool,
}

/// Creation, snapshots, updates, then cleanup
pub async fn run_all(
    api: &dyn NetAppApi,
    config: &ProjectConfig,
    settings: &RunSettings,
) -> Result<()> {
    run_creation(api, config).await?;
    run_snapshots(api, config).await?;
    run_updates(api, config, &settings.updates).await?;

    if settings.skip_cleanup {
        output::warning("Skipping cleanup, resources are left in place");
        return Ok(());
    }

    run_cleanup(api, config, &settings.cleanup).await?;
    Ok(())
}

/// Report a failure with what it concerned and hand the error back
pub(crate) fn report_failure(context: impl Display, error: AnfError) -> AnfError {
    tracing::error!("{}: {}", context, error);
    output::error(&format!("{}\nError message: {}", context, error));
    error
}

/// Fetch a resource that must exist
pub(crate) async fn fetch_required(api: &dyn NetAppApi, id: &ResourceId) -> Result<Resource> {
    match api.get(id).await {
        Ok(Some(resource)) => Ok(resource),
        Ok(None) => Err(report_failure(
            format!("An error occurred while getting current {} information", id),
            AnfError::NotFound(id.to_string()),
        )),
        Err(e) => Err(report_failure(
            format!("An error occurred while getting current {} information", id),
            e,
        )),
    }
}
