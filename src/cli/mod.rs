//! Command-line interface definitions for the `ecs-volumes` binary.
//!
//! This module centralises the clap parser structures so both the main binary
//! and the build script can reuse them when generating the manual page. It
//! must only depend on `clap`.

use clap::{Args, Parser};

/// Top-level CLI for the `ecs-volumes` binary.
#[derive(Debug, Parser)]
#[command(
    name = "ecs-volumes",
    about = "Create, delete, resize, and list snapshots of ECS block-storage disks",
    arg_required_else_help = true
)]
pub(crate) enum Cli {
    /// Provision a disk, falling back across categories.
    #[command(name = "create", about = "Provision a disk, falling back across categories")]
    Create(CreateCommand),
    /// Delete a disk.
    #[command(name = "delete", about = "Delete a disk")]
    Delete(DeleteCommand),
    /// Grow a disk.
    #[command(name = "resize", about = "Grow a disk")]
    Resize(ResizeCommand),
    /// List one page of snapshots taken from a disk.
    #[command(
        name = "list-snapshots",
        about = "List one page of snapshots taken from a disk"
    )]
    ListSnapshots(ListSnapshotsCommand),
}

/// Arguments for `ecs-volumes create`.
#[derive(Debug, Args)]
pub(crate) struct CreateCommand {
    /// Volume name; drives the idempotency token.
    #[arg(long)]
    pub(crate) name: String,
    /// Requested size in GiB.
    #[arg(long, value_name = "GIB")]
    pub(crate) size_gb: u64,
    /// Acceptable categories in preference order, for example
    /// `cloud_essd,cloud_ssd`.
    #[arg(long = "category", value_name = "CATEGORY", value_delimiter = ',', required = true)]
    pub(crate) categories: Vec<String>,
    /// Acceptable performance levels in preference order, for example
    /// `PL1,PL0`.
    #[arg(long = "performance-level", value_name = "LEVEL", value_delimiter = ',')]
    pub(crate) performance_levels: Vec<String>,
    /// Availability zone; defaults to the configured zone.
    #[arg(long, value_name = "ZONE")]
    pub(crate) zone_id: Option<String>,
    /// Instance for instance-scoped categories; defaults to the configured
    /// instance.
    #[arg(long, value_name = "INSTANCE")]
    pub(crate) instance_id: Option<String>,
    /// Allow the disk to attach to several instances.
    #[arg(long)]
    pub(crate) multi_attach: bool,
    /// Tag to apply, as `KEY=VALUE`. May be repeated.
    #[arg(long = "tag", value_name = "KEY=VALUE")]
    pub(crate) tags: Vec<String>,
    /// Restore the disk from this snapshot.
    #[arg(long, value_name = "SNAPSHOT")]
    pub(crate) snapshot_id: Option<String>,
    /// Resource group that owns the disk.
    #[arg(long, value_name = "GROUP")]
    pub(crate) resource_group_id: Option<String>,
}

/// Arguments for `ecs-volumes delete`.
#[derive(Debug, Args)]
pub(crate) struct DeleteCommand {
    /// Disk to delete.
    pub(crate) disk_id: String,
}

/// Arguments for `ecs-volumes resize`.
#[derive(Debug, Args)]
pub(crate) struct ResizeCommand {
    /// Disk to resize.
    pub(crate) disk_id: String,
    /// Target size in GiB.
    #[arg(long, value_name = "GIB")]
    pub(crate) size_gb: u64,
    /// Resize a detached disk instead of resizing online.
    #[arg(long)]
    pub(crate) offline: bool,
}

/// Arguments for `ecs-volumes list-snapshots`.
#[derive(Debug, Args)]
pub(crate) struct ListSnapshotsCommand {
    /// Source disk whose snapshots are listed.
    pub(crate) disk_id: String,
    /// Token returned by the previous page; empty for the first page.
    #[arg(long, value_name = "TOKEN", default_value = "")]
    pub(crate) page_token: String,
    /// Maximum entries on the page; 0 defers to the provider.
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub(crate) max_entries: usize,
}
