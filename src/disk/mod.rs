//! Disk lifecycle orchestration on top of a [`DiskApi`].
//!
//! [`DiskOrchestrator`] turns a declarative [`crate::VolumeRequest`] into
//! provider calls. Creation walks an ordered list of category and tier
//! candidates under a fixed idempotency token, reconciles against an
//! existing disk on token conflicts, and caps the number of create calls.
//! Delete and resize retry once on transient provider states. Snapshot
//! listing hides the provider's minimum page size behind a composite token.

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::backend::{DiskApi, ResizeDiskRequest};

mod attempt;
mod classify;
mod create;
mod error;
mod existing;
mod naming;
mod retry;
mod snapshots;
mod token;

#[cfg(test)]
mod tests;

pub use attempt::{CreateAttempt, generate_create_attempts};
pub use classify::{ClassifiedError, ErrorKind, classify};
pub use error::VolumeError;
pub use existing::{ExistingDisk, ExistingDiskMismatch, check_existing_disk};
pub use naming::{is_valid_disk_name, is_valid_snapshot_name};
pub use snapshots::{CLUSTER_TAG_KEY, PageTokenError, SnapshotListing, SnapshotPageToken};
pub use token::{MAX_CLIENT_TOKEN_LEN, client_token};

use retry::retry_on_transient;

/// Disk produced or adopted by [`DiskOrchestrator::create_volume`].
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ProvisionedDisk {
    /// Provider identifier of the disk.
    pub disk_id: String,
    /// Shape the disk was created with, or the shape of the adopted disk.
    pub attempt: CreateAttempt,
}

/// Drives volume lifecycle operations against a [`DiskApi`].
#[derive(Clone, Debug)]
pub struct DiskOrchestrator<A> {
    api: A,
    cluster_id: Option<String>,
}

impl<A: DiskApi> DiskOrchestrator<A> {
    /// Creates an orchestrator over `api`.
    #[must_use]
    pub const fn new(api: A) -> Self {
        Self {
            api,
            cluster_id: None,
        }
    }

    /// Scopes snapshot listings to disks owned by `cluster_id`.
    #[must_use]
    pub fn with_cluster_id(mut self, cluster_id: impl Into<String>) -> Self {
        self.cluster_id = Some(cluster_id.into());
        self
    }

    /// Returns the underlying API client.
    #[must_use]
    pub const fn api(&self) -> &A {
        &self.api
    }

    /// Deletes `disk_id`, retrying once when the provider reports a
    /// transient state.
    ///
    /// # Errors
    ///
    /// Returns [`VolumeError::Api`] with the provider failure unchanged, or
    /// [`VolumeError::Cancelled`] when cancelled before a call.
    pub async fn delete_volume(
        &self,
        disk_id: &str,
        cancel: &CancellationToken,
    ) -> Result<(), VolumeError> {
        retry_on_transient("delete", cancel, || self.api.delete_disk(disk_id, cancel)).await?;
        info!(disk_id, "disk deleted");
        Ok(())
    }

    /// Resizes a disk, retrying once when the provider reports a transient
    /// state.
    ///
    /// # Errors
    ///
    /// Returns [`VolumeError::Api`] with the provider failure unchanged, or
    /// [`VolumeError::Cancelled`] when cancelled before a call.
    pub async fn resize_volume(
        &self,
        request: &ResizeDiskRequest,
        cancel: &CancellationToken,
    ) -> Result<(), VolumeError> {
        retry_on_transient("resize", cancel, || self.api.resize_disk(request, cancel)).await?;
        info!(
            disk_id = %request.disk_id,
            new_size_gb = request.new_size_gb,
            kind = %request.kind,
            "disk resized"
        );
        Ok(())
    }
}
