//! Remote block-storage API abstraction.
//!
//! The orchestration core never talks HTTP directly. It drives a [`DiskApi`]
//! implementation, which the binary wires to the signing gateway and tests
//! wire to a scripted double.

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::category::{Category, PerformanceLevel};

/// Key/value tag attached to a disk or snapshot.
#[derive(Clone, Debug, Deserialize, Eq, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Tag {
    /// Tag key.
    #[serde(rename = "TagKey")]
    pub key: String,
    /// Tag value.
    #[serde(rename = "TagValue")]
    pub value: String,
}

impl Tag {
    /// Builds a tag from a key and a value.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Parameters of a single create-disk call.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateDiskRequest {
    /// Availability zone.
    pub zone_id: String,
    /// Disk name; only set when it satisfies the provider's naming rules.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk_name: Option<String>,
    /// Requested size in GiB.
    #[serde(rename = "Size")]
    pub size_gb: u64,
    /// Category chosen for this attempt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk_category: Option<Category>,
    /// Performance level chosen for this attempt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance_level: Option<PerformanceLevel>,
    /// Instance the disk is bound to, for instance-scoped categories.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
    /// Source snapshot to restore from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_id: Option<String>,
    /// Idempotency token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_token: Option<String>,
    /// Whether the disk may attach to several instances.
    #[serde(rename = "MultiAttach", serialize_with = "serialize_enabled")]
    pub multi_attach: bool,
    /// Resource group that owns the disk.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_group_id: Option<String>,
    /// Tags applied at creation time.
    #[serde(rename = "Tag", skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
}

fn serialize_enabled<S: serde::Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(if *value { "Enabled" } else { "Disabled" })
}

/// Successful create-disk payload.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct CreateDiskResponse {
    /// Provider-assigned disk identifier.
    pub disk_id: String,
    /// Request identifier for support tickets.
    #[serde(default)]
    pub request_id: String,
}

/// How a resize is applied.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub enum ResizeKind {
    /// Resize while attached and in use.
    #[default]
    #[serde(rename = "online")]
    Online,
    /// Resize a detached disk.
    #[serde(rename = "offline")]
    Offline,
}

impl ResizeKind {
    /// Provider spelling of the resize type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Offline => "offline",
        }
    }
}

impl std::fmt::Display for ResizeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters of a resize-disk call.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResizeDiskRequest {
    /// Disk to resize.
    pub disk_id: String,
    /// Target size in GiB.
    #[serde(rename = "NewSize")]
    pub new_size_gb: u64,
    /// Online or offline resize.
    #[serde(rename = "Type")]
    pub kind: ResizeKind,
}

/// Parameters of a describe-disks call.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeDisksRequest {
    /// Restricts the search to a zone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_id: Option<String>,
    /// JSON-encoded array of disk identifiers, as the provider expects.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk_ids: Option<String>,
    /// Exact disk name to search for.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk_name: Option<String>,
}

impl DescribeDisksRequest {
    /// Builds a request that looks disks up by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`serde_json::Error`] when the identifier list cannot be
    /// encoded.
    pub fn by_ids<S: AsRef<str>>(disk_ids: &[S]) -> Result<Self, serde_json::Error> {
        let ids: Vec<&str> = disk_ids.iter().map(AsRef::as_ref).collect();
        Ok(Self {
            disk_ids: Some(serde_json::to_string(&ids)?),
            ..Self::default()
        })
    }

    /// Builds a request that looks a disk up by its exact name.
    #[must_use]
    pub fn by_name(zone_id: Option<String>, disk_name: impl Into<String>) -> Self {
        Self {
            zone_id,
            disk_name: Some(disk_name.into()),
            ..Self::default()
        }
    }
}

/// Disk as reported by describe-disks.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Disk {
    /// Provider-assigned identifier.
    pub disk_id: String,
    /// Disk name.
    #[serde(default)]
    pub disk_name: String,
    /// Provider category name. Kept as text because the provider may report
    /// categories this crate does not model.
    #[serde(default)]
    pub category: String,
    /// Provider performance level name, empty when not applicable.
    #[serde(default)]
    pub performance_level: String,
    /// Size in GiB.
    #[serde(default)]
    pub size: u64,
    /// `Enabled` or `Disabled`.
    #[serde(default)]
    pub multi_attach: String,
    /// Tags on the disk.
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl Disk {
    /// Returns `true` when multi-attach is enabled on the disk.
    #[must_use]
    pub fn is_multi_attach(&self) -> bool {
        self.multi_attach.eq_ignore_ascii_case("enabled")
    }
}

/// Parameters of a describe-snapshots call.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DescribeSnapshotsRequest {
    /// Source disk whose snapshots are listed.
    pub disk_id: String,
    /// Maximum entries per page. The provider enforces its own minimum.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_results: Option<usize>,
    /// Continuation token from a previous page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
    /// Tag filters applied server side.
    #[serde(rename = "Tag", skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
}

/// Snapshot as reported by describe-snapshots.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Snapshot {
    /// Provider-assigned identifier.
    pub snapshot_id: String,
    /// Snapshot name.
    #[serde(default)]
    pub snapshot_name: String,
    /// Disk the snapshot was taken from.
    #[serde(default)]
    pub source_disk_id: String,
    /// Size of the source disk in GiB.
    #[serde(default)]
    pub source_disk_size: u64,
    /// Creation time in RFC 3339 form.
    #[serde(default)]
    pub creation_time: String,
    /// Provider status (for example `accomplished`).
    #[serde(default)]
    pub status: String,
}

/// One page returned by describe-snapshots.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct SnapshotPage {
    /// Snapshots on this page, in provider order.
    #[serde(default)]
    pub snapshots: Vec<Snapshot>,
    /// Continuation token, empty on the last page.
    #[serde(default)]
    pub next_token: String,
}

/// Structured failure returned by the remote API.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ApiError {
    /// The provider rejected the call.
    #[error("provider returned {code} (HTTP {status}): {message}")]
    Server {
        /// HTTP-like status code.
        status: u16,
        /// Provider error code, for example `IdempotentParameterMismatch`.
        code: String,
        /// Human-readable message from the provider.
        message: String,
        /// Request identifier, when the provider returned one.
        request_id: Option<String>,
    },
    /// The call never produced a provider response.
    #[error("transport error: {message}")]
    Transport {
        /// Description of the transport failure.
        message: String,
    },
    /// The caller cancelled the call before it completed.
    #[error("request cancelled")]
    Cancelled,
}

impl ApiError {
    /// Builds a server error from a status and provider code.
    #[must_use]
    pub fn server(status: u16, code: impl Into<String>) -> Self {
        Self::Server {
            status,
            code: code.into(),
            message: String::new(),
            request_id: None,
        }
    }

    /// Provider error code, when the provider produced one.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Server { code, .. } => Some(code.as_str()),
            Self::Transport { .. } | Self::Cancelled => None,
        }
    }
}

/// Future returned by [`DiskApi`] operations.
pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ApiError>> + Send + 'a>>;

/// Remote block-storage operations consumed by the orchestration core.
///
/// Every call receives the caller's cancellation token; implementations
/// should abandon in-flight work and return [`ApiError::Cancelled`] once it
/// fires.
pub trait DiskApi: Send + Sync {
    /// Creates a disk.
    fn create_disk<'a>(
        &'a self,
        request: &'a CreateDiskRequest,
        cancel: &'a CancellationToken,
    ) -> ApiFuture<'a, CreateDiskResponse>;

    /// Deletes a disk.
    fn delete_disk<'a>(&'a self, disk_id: &'a str, cancel: &'a CancellationToken)
    -> ApiFuture<'a, ()>;

    /// Grows a disk.
    fn resize_disk<'a>(
        &'a self,
        request: &'a ResizeDiskRequest,
        cancel: &'a CancellationToken,
    ) -> ApiFuture<'a, ()>;

    /// Looks disks up by identifier or name.
    fn describe_disks<'a>(
        &'a self,
        request: &'a DescribeDisksRequest,
        cancel: &'a CancellationToken,
    ) -> ApiFuture<'a, Vec<Disk>>;

    /// Lists one page of snapshots for a source disk.
    fn describe_snapshots<'a>(
        &'a self,
        request: &'a DescribeSnapshotsRequest,
        cancel: &'a CancellationToken,
    ) -> ApiFuture<'a, SnapshotPage>;
}

impl<T: DiskApi + ?Sized> DiskApi for std::sync::Arc<T> {
    fn create_disk<'a>(
        &'a self,
        request: &'a CreateDiskRequest,
        cancel: &'a CancellationToken,
    ) -> ApiFuture<'a, CreateDiskResponse> {
        (**self).create_disk(request, cancel)
    }

    fn delete_disk<'a>(
        &'a self,
        disk_id: &'a str,
        cancel: &'a CancellationToken,
    ) -> ApiFuture<'a, ()> {
        (**self).delete_disk(disk_id, cancel)
    }

    fn resize_disk<'a>(
        &'a self,
        request: &'a ResizeDiskRequest,
        cancel: &'a CancellationToken,
    ) -> ApiFuture<'a, ()> {
        (**self).resize_disk(request, cancel)
    }

    fn describe_disks<'a>(
        &'a self,
        request: &'a DescribeDisksRequest,
        cancel: &'a CancellationToken,
    ) -> ApiFuture<'a, Vec<Disk>> {
        (**self).describe_disks(request, cancel)
    }

    fn describe_snapshots<'a>(
        &'a self,
        request: &'a DescribeSnapshotsRequest,
        cancel: &'a CancellationToken,
    ) -> ApiFuture<'a, SnapshotPage> {
        (**self).describe_snapshots(request, cancel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(&["disk-1"], "[\"disk-1\"]")]
    #[case(&["disk-1", "disk-2"], "[\"disk-1\",\"disk-2\"]")]
    #[case(&[], "[]")]
    fn describe_by_ids_encodes_json_array(#[case] ids: &[&str], #[case] expected: &str) {
        let request = DescribeDisksRequest::by_ids(ids).expect("ids should encode");
        assert_eq!(request.disk_ids.as_deref(), Some(expected));
    }

    #[rstest]
    fn create_request_serialises_provider_fields() {
        let request = CreateDiskRequest {
            zone_id: String::from("cn-hangzhou-a"),
            size_gb: 20,
            disk_category: Some(Category::Essd),
            performance_level: Some(PerformanceLevel::Pl0),
            multi_attach: true,
            tags: vec![Tag::new("k1", "v1")],
            ..CreateDiskRequest::default()
        };
        let value = serde_json::to_value(&request).expect("serialise");
        assert_eq!(value["ZoneId"], "cn-hangzhou-a");
        assert_eq!(value["Size"], 20);
        assert_eq!(value["DiskCategory"], "cloud_essd");
        assert_eq!(value["PerformanceLevel"], "PL0");
        assert_eq!(value["MultiAttach"], "Enabled");
        assert_eq!(value["Tag"][0]["TagKey"], "k1");
        assert!(value.get("ClientToken").is_none());
    }

    #[rstest]
    fn disk_reports_multi_attach() {
        let disk: Disk = serde_json::from_str(r#"{"DiskId":"d-1","MultiAttach":"Enabled"}"#)
            .expect("deserialise");
        assert!(disk.is_multi_attach());
        assert!(!Disk::default().is_multi_attach());
    }
}
