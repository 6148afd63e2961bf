//! Volume creation: precondition checks and the bounded fallback loop.

use std::collections::BTreeSet;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::backend::{ApiError, CreateDiskRequest, DescribeDisksRequest, DiskApi, Tag};
use crate::category::Category;
use crate::volume::VolumeRequest;

use super::attempt::{CreateAttempt, generate_create_attempts};
use super::classify::{ErrorKind, classify};
use super::existing::{ExistingDisk, check_existing_disk};
use super::naming::is_valid_disk_name;
use super::token::client_token;
use super::{DiskOrchestrator, ProvisionedDisk, VolumeError};

/// Builds the parameters shared by every attempt of one logical request.
pub(crate) fn build_create_disk_request(request: &VolumeRequest) -> CreateDiskRequest {
    CreateDiskRequest {
        zone_id: request.zone_id.clone(),
        disk_name: is_valid_disk_name(&request.name).then(|| request.name.clone()),
        size_gb: request.size_gb,
        snapshot_id: request.snapshot_id.clone(),
        client_token: Some(client_token(&request.name)),
        multi_attach: request.multi_attach,
        resource_group_id: request.resource_group_id.clone(),
        tags: request
            .tags
            .iter()
            .map(|(key, value)| Tag::new(key, value))
            .collect(),
        ..CreateDiskRequest::default()
    }
}

/// Copies `base` and applies the attempt's shape. `base` is left untouched.
pub(crate) fn finalize_create_disk_request(
    base: &CreateDiskRequest,
    attempt: &CreateAttempt,
) -> CreateDiskRequest {
    CreateDiskRequest {
        disk_category: Some(attempt.category),
        performance_level: attempt.performance_level,
        instance_id: attempt.instance_id.clone(),
        ..base.clone()
    }
}

/// Runs every check that needs no network call and returns the attempts to
/// walk, in order.
pub(crate) fn plan_attempts(
    request: &VolumeRequest,
    supported: &BTreeSet<Category>,
) -> Result<Vec<CreateAttempt>, VolumeError> {
    request.validate()?;

    let candidates: Vec<Category> = request
        .categories
        .iter()
        .copied()
        .filter(|category| supported.is_empty() || supported.contains(category))
        .collect();
    if candidates.is_empty() {
        return Err(VolumeError::Unsupported {
            requested: join_categories(&request.categories),
        });
    }

    if !request.virtual_node
        && request.instance_id.is_none()
        && let Some(category) = candidates
            .iter()
            .copied()
            .find(|category| category.desc().requires_instance)
    {
        return Err(VolumeError::InstanceRequired { category });
    }

    let mut attempts = generate_create_attempts(&candidates, &request.performance_levels);
    if !request.virtual_node {
        for attempt in &mut attempts {
            if attempt.category.desc().requires_instance {
                attempt.instance_id.clone_from(&request.instance_id);
            }
        }
    }

    let (fitting, too_small_or_large): (Vec<_>, Vec<_>) =
        attempts.into_iter().partition(|attempt| {
            attempt
                .category
                .desc()
                .size_range(attempt.performance_level)
                .contains(request.size_gb)
        });
    for skipped in &too_small_or_large {
        debug!(attempt = %skipped, size_gb = request.size_gb, "size outside category range; skipping");
    }
    if fitting.is_empty() {
        return Err(size_error(request.size_gb, &too_small_or_large));
    }
    Ok(fitting)
}

fn size_error(requested_gb: u64, rejected: &[CreateAttempt]) -> VolumeError {
    let ranges = rejected
        .iter()
        .map(|attempt| attempt.category.desc().size_range(attempt.performance_level));
    let minimum = ranges
        .clone()
        .filter(|range| range.min_gb > requested_gb)
        .map(|range| range.min_gb)
        .min();
    minimum.map_or_else(
        || VolumeError::TooLarge {
            requested_gb,
            maximum_gb: ranges.map(|range| range.max_gb).max().unwrap_or_default(),
        },
        |minimum_gb| VolumeError::TooSmall {
            requested_gb,
            minimum_gb,
        },
    )
}

fn join_categories(categories: &[Category]) -> String {
    categories
        .iter()
        .map(|category| category.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

/// What the create loop does after a failed call.
enum NextCall {
    /// Issue the same attempt once more.
    Reissue,
    /// Move on to the next candidate.
    Fallback,
    /// Issue the same attempt again without the client token.
    WithoutToken,
}

fn after_transient(
    request: &VolumeRequest,
    attempt: &CreateAttempt,
    already_retried: bool,
    is_last: bool,
    cause: ApiError,
) -> Result<NextCall, VolumeError> {
    if !already_retried {
        info!(name = %request.name, %attempt, error = %cause, "transient provider state; retrying");
        return Ok(NextCall::Reissue);
    }
    if is_last {
        warn!(name = %request.name, %attempt, "transient state persisted on last candidate");
        return Err(VolumeError::Api(cause));
    }
    info!(name = %request.name, %attempt, error = %cause, "transient state persisted; falling back");
    Ok(NextCall::Fallback)
}

fn after_rejection(
    request: &VolumeRequest,
    attempt: &CreateAttempt,
    is_last: bool,
    cause: ApiError,
) -> Result<NextCall, VolumeError> {
    if is_last {
        warn!(name = %request.name, %attempt, "last candidate rejected");
        return Err(VolumeError::AllAttemptsRejected { last: cause });
    }
    info!(name = %request.name, %attempt, error = %cause, "candidate rejected; falling back");
    Ok(NextCall::Fallback)
}

impl<A: DiskApi> DiskOrchestrator<A> {
    /// Provisions a disk for `request`, walking the fallback order until one
    /// attempt succeeds.
    ///
    /// `supported` lists the categories available in the placement; an empty
    /// set trusts the request's list unfiltered. The idempotency token is
    /// derived once and reused across fallback attempts. Each attempt may be
    /// re-issued once after a transient failure; a second transient failure
    /// moves on to the next candidate. Counting first issues only, create
    /// calls are capped at the number of attempts plus one reconciliation
    /// retry.
    ///
    /// # Errors
    ///
    /// Returns [`VolumeError`] when a precondition fails, every candidate is
    /// rejected, reconciliation finds a mismatching or ambiguous disk, the
    /// call cap is reached, the caller cancels, or the provider reports a
    /// fatal failure ([`VolumeError::Api`], unchanged). A transient failure
    /// that persists on the last candidate is also returned unchanged.
    pub async fn create_volume(
        &self,
        request: &VolumeRequest,
        supported: &BTreeSet<Category>,
        cancel: &CancellationToken,
    ) -> Result<ProvisionedDisk, VolumeError> {
        let attempts = plan_attempts(request, supported)?;
        let mut base = build_create_disk_request(request);
        let call_limit = attempts.len() + 1;
        let mut counted = 0;
        let mut issued = 0;
        let mut index = 0;
        let mut reconciled = false;
        let mut reissue = false;
        let mut retried_transient = false;

        while let Some(attempt) = attempts.get(index) {
            if !reissue {
                if counted >= call_limit {
                    warn!(name = %request.name, calls = issued, "create call cap reached");
                    return Err(VolumeError::AttemptLimitExceeded { calls: issued });
                }
                counted += 1;
            }
            reissue = false;
            if cancel.is_cancelled() {
                return Err(VolumeError::Cancelled);
            }
            issued += 1;

            let call = finalize_create_disk_request(&base, attempt);
            debug!(name = %request.name, %attempt, call = issued, "creating disk");
            let failure = match self.api.create_disk(&call, cancel).await {
                Ok(created) => {
                    info!(name = %request.name, disk_id = %created.disk_id, %attempt, "disk created");
                    return Ok(ProvisionedDisk {
                        disk_id: created.disk_id,
                        attempt: attempt.clone(),
                    });
                }
                Err(err) => classify(err, Some(attempt.category)),
            };
            let is_last = index + 1 >= attempts.len();

            let next = match failure.kind {
                ErrorKind::Transient => {
                    after_transient(request, attempt, retried_transient, is_last, failure.cause)?
                }
                ErrorKind::CategoryUnsupported(_) => {
                    after_rejection(request, attempt, is_last, failure.cause)?
                }
                ErrorKind::IdempotencyConflict => {
                    if reconciled || base.client_token.is_none() {
                        return Err(VolumeError::ConflictPersisted {
                            name: request.name.clone(),
                            last: failure.cause,
                        });
                    }
                    reconciled = true;
                    if let Some(existing) = self.reconcile(request, cancel).await? {
                        return Ok(existing);
                    }
                    info!(name = %request.name, "no disk behind the conflict; retrying without client token");
                    NextCall::WithoutToken
                }
                ErrorKind::Fatal => return Err(VolumeError::Api(failure.cause)),
            };

            match next {
                NextCall::Reissue => {
                    retried_transient = true;
                    reissue = true;
                }
                NextCall::Fallback => {
                    index += 1;
                    retried_transient = false;
                }
                NextCall::WithoutToken => {
                    base.client_token = None;
                    retried_transient = false;
                }
            }
        }

        Err(VolumeError::Unsupported {
            requested: join_categories(&request.categories),
        })
    }

    /// Looks for a disk already carrying the volume's name after an
    /// idempotency conflict. `None` means nothing exists yet.
    async fn reconcile(
        &self,
        request: &VolumeRequest,
        cancel: &CancellationToken,
    ) -> Result<Option<ProvisionedDisk>, VolumeError> {
        if cancel.is_cancelled() {
            return Err(VolumeError::Cancelled);
        }
        let lookup = DescribeDisksRequest::by_name(None, &request.name);
        let disks = self.api.describe_disks(&lookup, cancel).await?;
        match disks.as_slice() {
            [] => Ok(None),
            [disk] => {
                let attempt = check_existing_disk(&ExistingDisk::from(disk), request).map_err(
                    |reason| VolumeError::ExistingMismatch {
                        disk_id: disk.disk_id.clone(),
                        reason,
                    },
                )?;
                info!(name = %request.name, disk_id = %disk.disk_id, %attempt, "reusing existing disk");
                Ok(Some(ProvisionedDisk {
                    disk_id: disk.disk_id.clone(),
                    attempt,
                }))
            }
            many => Err(VolumeError::AmbiguousExisting {
                name: request.name.clone(),
                count: many.len(),
            }),
        }
    }
}
