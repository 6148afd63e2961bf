//! Block-storage volume lifecycle orchestration for a cloud CSI driver.
//!
//! The crate turns declarative volume requests into calls against the
//! provider's disk API. Creation falls back across disk categories and
//! performance levels under one idempotency token and reconciles with a disk
//! that already exists. Delete and resize ride out transient provider
//! states, and snapshot listing pages through results of any size despite
//! the provider's minimum page size.

pub mod backend;
pub mod category;
pub mod config;
pub mod disk;
pub mod gateway;
pub mod test_support;
pub mod volume;

pub use backend::{
    ApiError, ApiFuture, CreateDiskRequest, CreateDiskResponse, DescribeDisksRequest,
    DescribeSnapshotsRequest, Disk, DiskApi, ResizeDiskRequest, ResizeKind, Snapshot,
    SnapshotPage, Tag,
};
pub use category::{Category, CategoryDesc, ParseCategoryError, PerformanceLevel, SizeRange};
pub use config::{ConfigError, GatewayConfig};
pub use disk::{
    CreateAttempt, DiskOrchestrator, ErrorKind, ExistingDisk, ExistingDiskMismatch,
    PageTokenError, ProvisionedDisk, SnapshotListing, SnapshotPageToken, VolumeError,
};
pub use gateway::{GatewayError, HttpDiskApi};
pub use volume::{RequestError, VolumeRequest, VolumeRequestBuilder};
