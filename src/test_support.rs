//! Test support utilities shared across unit and integration tests.

use std::collections::VecDeque;
use std::future::ready;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio_util::sync::CancellationToken;

use crate::backend::{
    ApiError, ApiFuture, CreateDiskRequest, CreateDiskResponse, DescribeDisksRequest,
    DescribeSnapshotsRequest, Disk, DiskApi, ResizeDiskRequest, Snapshot, SnapshotPage,
};

/// Provider code returned when a call arrives with nothing scripted for it.
pub const UNSCRIPTED_CODE: &str = "Scripted.Unexpected";

/// Records a single call made through [`ScriptedDiskApi`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ApiCall {
    /// A create-disk call with its full parameters.
    Create(CreateDiskRequest),
    /// A delete-disk call.
    Delete(String),
    /// A resize-disk call.
    Resize(ResizeDiskRequest),
    /// A describe-disks call.
    DescribeDisks(DescribeDisksRequest),
    /// A describe-snapshots call.
    DescribeSnapshots(DescribeSnapshotsRequest),
}

/// One queued reply. Behaviour-test contexts must not contain a `Result`.
#[derive(Clone, Debug)]
enum Scripted<T> {
    Ok(T),
    Err(ApiError),
}

impl<T> Scripted<T> {
    fn into_result(self) -> Result<T, ApiError> {
        match self {
            Self::Ok(value) => Ok(value),
            Self::Err(error) => Err(error),
        }
    }
}

impl<T> From<Result<T, ApiError>> for Scripted<T> {
    fn from(outcome: Result<T, ApiError>) -> Self {
        match outcome {
            Ok(value) => Self::Ok(value),
            Err(error) => Self::Err(error),
        }
    }
}

#[derive(Debug, Default)]
struct ScriptState {
    creates: VecDeque<Scripted<CreateDiskResponse>>,
    deletes: VecDeque<Scripted<()>>,
    resizes: VecDeque<Scripted<()>>,
    describes: VecDeque<Scripted<Vec<Disk>>>,
    snapshots: VecDeque<Scripted<SnapshotPage>>,
    catalogue: Option<SnapshotCatalogue>,
    cancel_after: Option<(usize, CancellationToken)>,
    calls: Vec<ApiCall>,
}

/// Scripted [`DiskApi`] that returns pre-seeded outcomes in FIFO order per
/// operation and records every call.
///
/// A call with nothing queued fails with [`UNSCRIPTED_CODE`], which the
/// classifier treats as fatal. A call made with an already-cancelled token
/// fails with [`ApiError::Cancelled`] without consuming the script.
#[derive(Clone, Debug, Default)]
pub struct ScriptedDiskApi {
    state: Arc<Mutex<ScriptState>>,
}

impl ScriptedDiskApi {
    /// Creates a double with nothing scripted.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ScriptState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queues a successful create returning `disk_id`.
    pub fn push_create_ok(&self, disk_id: &str) {
        self.lock().creates.push_back(Scripted::Ok(CreateDiskResponse {
            disk_id: disk_id.to_owned(),
            request_id: String::from("req-create"),
        }));
    }

    /// Queues a failed create with the given provider code.
    pub fn push_create_err(&self, code: &str) {
        self.lock()
            .creates
            .push_back(Scripted::Err(ApiError::server(400, code)));
    }

    /// Queues an arbitrary create failure.
    pub fn push_create_failure(&self, error: ApiError) {
        self.lock().creates.push_back(Scripted::Err(error));
    }

    /// Queues a successful delete.
    pub fn push_delete_ok(&self) {
        self.lock().deletes.push_back(Scripted::Ok(()));
    }

    /// Queues a failed delete.
    pub fn push_delete_err(&self, error: ApiError) {
        self.lock().deletes.push_back(Scripted::Err(error));
    }

    /// Queues a successful resize.
    pub fn push_resize_ok(&self) {
        self.lock().resizes.push_back(Scripted::Ok(()));
    }

    /// Queues a failed resize.
    pub fn push_resize_err(&self, error: ApiError) {
        self.lock().resizes.push_back(Scripted::Err(error));
    }

    /// Queues the disks returned by the next describe-disks call.
    pub fn push_describe(&self, disks: Vec<Disk>) {
        self.lock().describes.push_back(Scripted::Ok(disks));
    }

    /// Queues a failed describe-disks call.
    pub fn push_describe_err(&self, error: ApiError) {
        self.lock().describes.push_back(Scripted::Err(error));
    }

    /// Queues one literal snapshot page.
    pub fn push_snapshot_page(&self, page: SnapshotPage) {
        self.lock().snapshots.push_back(Scripted::Ok(page));
    }

    /// Serves describe-snapshots calls from `catalogue` once the literal
    /// page queue is empty.
    pub fn serve_catalogue(&self, catalogue: SnapshotCatalogue) {
        self.lock().catalogue = Some(catalogue);
    }

    /// Cancels `token` as soon as `calls` remote calls have been recorded.
    pub fn cancel_after_calls(&self, calls: usize, token: CancellationToken) {
        self.lock().cancel_after = Some((calls, token));
    }

    /// Returns a snapshot of all calls recorded so far.
    #[must_use]
    pub fn calls(&self) -> Vec<ApiCall> {
        self.lock().calls.clone()
    }

    /// Returns the create requests recorded so far, in order.
    #[must_use]
    pub fn create_calls(&self) -> Vec<CreateDiskRequest> {
        self.lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                ApiCall::Create(request) => Some(request.clone()),
                _ => None,
            })
            .collect()
    }

    fn record<T>(
        &self,
        call: ApiCall,
        cancel: &CancellationToken,
        next: impl FnOnce(&mut ScriptState) -> Option<Scripted<T>>,
    ) -> Result<T, ApiError> {
        if cancel.is_cancelled() {
            return Err(ApiError::Cancelled);
        }
        let mut state = self.lock();
        state.calls.push(call);
        if let Some((limit, token)) = &state.cancel_after
            && state.calls.len() >= *limit
        {
            token.cancel();
        }
        next(&mut *state).map_or_else(
            || Err(ApiError::server(500, UNSCRIPTED_CODE)),
            Scripted::into_result,
        )
    }
}

impl DiskApi for ScriptedDiskApi {
    fn create_disk<'a>(
        &'a self,
        request: &'a CreateDiskRequest,
        cancel: &'a CancellationToken,
    ) -> ApiFuture<'a, CreateDiskResponse> {
        let outcome = self.record(ApiCall::Create(request.clone()), cancel, |state| {
            state.creates.pop_front()
        });
        Box::pin(ready(outcome))
    }

    fn delete_disk<'a>(
        &'a self,
        disk_id: &'a str,
        cancel: &'a CancellationToken,
    ) -> ApiFuture<'a, ()> {
        let outcome = self.record(ApiCall::Delete(disk_id.to_owned()), cancel, |state| {
            state.deletes.pop_front()
        });
        Box::pin(ready(outcome))
    }

    fn resize_disk<'a>(
        &'a self,
        request: &'a ResizeDiskRequest,
        cancel: &'a CancellationToken,
    ) -> ApiFuture<'a, ()> {
        let outcome = self.record(ApiCall::Resize(request.clone()), cancel, |state| {
            state.resizes.pop_front()
        });
        Box::pin(ready(outcome))
    }

    fn describe_disks<'a>(
        &'a self,
        request: &'a DescribeDisksRequest,
        cancel: &'a CancellationToken,
    ) -> ApiFuture<'a, Vec<Disk>> {
        let outcome = self.record(ApiCall::DescribeDisks(request.clone()), cancel, |state| {
            state.describes.pop_front()
        });
        Box::pin(ready(outcome))
    }

    fn describe_snapshots<'a>(
        &'a self,
        request: &'a DescribeSnapshotsRequest,
        cancel: &'a CancellationToken,
    ) -> ApiFuture<'a, SnapshotPage> {
        let outcome = self.record(
            ApiCall::DescribeSnapshots(request.clone()),
            cancel,
            |state| {
                state.snapshots.pop_front().or_else(|| {
                    state
                        .catalogue
                        .as_ref()
                        .map(|catalogue| catalogue.page(request).into())
                })
            },
        );
        Box::pin(ready(outcome))
    }
}

/// In-memory snapshot listing that paginates like the provider.
///
/// Pages never hold fewer than `min_page` entries, regardless of the
/// requested maximum. Continuations have the form `page-<offset>`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SnapshotCatalogue {
    snapshots: Vec<Snapshot>,
    min_page: usize,
    default_page: usize,
}

impl SnapshotCatalogue {
    /// Catalogue of `total` snapshots named `snap-0` onwards, taken from
    /// `source_disk_id`, with the provider's minimum and default page size
    /// of 10.
    #[must_use]
    pub fn new(source_disk_id: &str, total: usize) -> Self {
        Self {
            snapshots: (0..total)
                .map(|index| snapshot(&format!("snap-{index}"), source_disk_id))
                .collect(),
            min_page: 10,
            default_page: 10,
        }
    }

    /// All snapshots in provider order.
    #[must_use]
    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    /// Serves one page for `request`.
    ///
    /// # Errors
    ///
    /// Returns an `InvalidParameter.NextToken` server error when the
    /// continuation was not produced by this catalogue.
    pub fn page(&self, request: &DescribeSnapshotsRequest) -> Result<SnapshotPage, ApiError> {
        let offset = match request.next_token.as_deref() {
            None | Some("") => 0,
            Some(token) => token
                .strip_prefix("page-")
                .and_then(|offset| offset.parse::<usize>().ok())
                .ok_or_else(|| ApiError::server(400, "InvalidParameter.NextToken"))?,
        };
        let size = request
            .max_results
            .unwrap_or(self.default_page)
            .max(self.min_page);
        let snapshots: Vec<Snapshot> = self
            .snapshots
            .iter()
            .skip(offset)
            .take(size)
            .cloned()
            .collect();
        let end = offset + snapshots.len();
        let next_token = if end < self.snapshots.len() {
            format!("page-{end}")
        } else {
            String::new()
        };
        Ok(SnapshotPage {
            snapshots,
            next_token,
        })
    }
}

/// Builds a completed snapshot taken from `source_disk_id`.
#[must_use]
pub fn snapshot(snapshot_id: &str, source_disk_id: &str) -> Snapshot {
    Snapshot {
        snapshot_id: snapshot_id.to_owned(),
        snapshot_name: snapshot_id.to_owned(),
        source_disk_id: source_disk_id.to_owned(),
        source_disk_size: 20,
        creation_time: String::from("2024-01-01T00:00:00Z"),
        status: String::from("accomplished"),
    }
}

/// Builds a disk as describe-disks would report it.
#[must_use]
pub fn disk(disk_id: &str, category: &str, performance_level: &str, size: u64) -> Disk {
    Disk {
        disk_id: disk_id.to_owned(),
        disk_name: disk_id.to_owned(),
        category: category.to_owned(),
        performance_level: performance_level.to_owned(),
        size,
        multi_attach: String::from("Disabled"),
        tags: Vec::new(),
    }
}
