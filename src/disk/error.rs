//! Error types returned by the volume lifecycle operations.

use thiserror::Error;

use crate::backend::ApiError;
use crate::category::Category;
use crate::volume::RequestError;

use super::existing::ExistingDiskMismatch;
use super::snapshots::PageTokenError;

/// Errors raised by [`super::DiskOrchestrator`] operations.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum VolumeError {
    /// Raised when the request itself is incomplete.
    #[error(transparent)]
    Request(#[from] RequestError),
    /// Raised when the requested size is below every candidate's minimum.
    #[error("requested size {requested_gb} GiB is too small: candidates need at least {minimum_gb} GiB")]
    TooSmall {
        /// Requested size.
        requested_gb: u64,
        /// Smallest minimum among the candidates.
        minimum_gb: u64,
    },
    /// Raised when the requested size exceeds every candidate's maximum.
    #[error("requested size {requested_gb} GiB is too large: candidates allow at most {maximum_gb} GiB")]
    TooLarge {
        /// Requested size.
        requested_gb: u64,
        /// Largest maximum among the candidates.
        maximum_gb: u64,
    },
    /// Raised when an instance-scoped category is requested without an
    /// instance outside a virtual node.
    #[error("disk category {category} requires an instance id (EED requires instance)")]
    InstanceRequired {
        /// Category that needs the instance.
        category: Category,
    },
    /// Raised when no requested category is supported in the placement.
    #[error("unsupported: none of the requested categories [{requested}] is available here")]
    Unsupported {
        /// Comma separated list of the requested categories.
        requested: String,
    },
    /// Raised when the provider rejected every candidate.
    #[error("every candidate was rejected by the provider; last rejection: {last}")]
    AllAttemptsRejected {
        /// The final rejection, unchanged.
        #[source]
        last: ApiError,
    },
    /// Raised when a disk with the volume's name exists but differs from the
    /// request.
    #[error("existing disk {disk_id} does not match the request: {reason}")]
    ExistingMismatch {
        /// Identifier of the existing disk.
        disk_id: String,
        /// First difference found.
        #[source]
        reason: ExistingDiskMismatch,
    },
    /// Raised when several disks share the volume's name.
    #[error("{count} disks are named '{name}'; refusing to pick one")]
    AmbiguousExisting {
        /// Volume name.
        name: String,
        /// Number of disks found.
        count: usize,
    },
    /// Raised when an idempotency conflict recurs after reconciliation.
    #[error("idempotency conflict for '{name}' persisted after reconciliation")]
    ConflictPersisted {
        /// Volume name.
        name: String,
        /// The second conflict, unchanged.
        #[source]
        last: ApiError,
    },
    /// Raised when the create loop hits its call cap before a definitive
    /// outcome.
    #[error("gave up after {calls} create calls without a definitive outcome")]
    AttemptLimitExceeded {
        /// Number of create calls issued.
        calls: usize,
    },
    /// Raised when a snapshot page token cannot be honoured.
    #[error(transparent)]
    InvalidPageToken(#[from] PageTokenError),
    /// Raised when the caller cancelled before the next remote call.
    #[error("operation cancelled")]
    Cancelled,
    /// A fatal provider failure, passed through unchanged.
    #[error(transparent)]
    Api(#[from] ApiError),
}
