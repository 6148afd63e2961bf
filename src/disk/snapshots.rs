//! Paginated snapshot listing behind a single opaque page token.
//!
//! The provider enforces a minimum page size, so a caller asking for fewer
//! entries still receives a larger remote page. The external token therefore
//! records both the remote continuation and how many entries of that remote
//! page were already handed out: `"<localSkip>@<remoteContinuation>"`. The
//! format is a public contract; callers persist tokens between pages.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::backend::{DescribeSnapshotsRequest, DiskApi, Snapshot, Tag};

use super::{DiskOrchestrator, VolumeError};

/// Tag key that scopes snapshots to a cluster.
pub const CLUSTER_TAG_KEY: &str = "ack.aliyun.com";

const TOKEN_SEPARATOR: char = '@';

/// Decoded form of the external page token.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SnapshotPageToken {
    /// Entries of the remote page already returned to the caller.
    pub local_skip: usize,
    /// Remote continuation; empty for the first remote page.
    pub remote_continuation: String,
}

impl FromStr for SnapshotPageToken {
    type Err = PageTokenError;

    /// Parses an external token. The empty string is the first page; any
    /// other token without a numeric skip prefix is rejected.
    fn from_str(token: &str) -> Result<Self, Self::Err> {
        if token.is_empty() {
            return Ok(Self::default());
        }
        let (skip, continuation) = token
            .split_once(TOKEN_SEPARATOR)
            .ok_or_else(|| PageTokenError::Malformed(token.to_owned()))?;
        let local_skip = skip
            .parse::<usize>()
            .map_err(|_| PageTokenError::Malformed(token.to_owned()))?;
        Ok(Self {
            local_skip,
            remote_continuation: continuation.to_owned(),
        })
    }
}

impl fmt::Display for SnapshotPageToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{TOKEN_SEPARATOR}{}",
            self.local_skip, self.remote_continuation
        )
    }
}

/// Errors raised for page tokens that cannot be honoured.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum PageTokenError {
    /// The token does not have the `<skip>@<continuation>` shape.
    #[error("invalid page token '{0}'")]
    Malformed(String),
    /// The skip consumes the whole remote page, or points past its end.
    #[error("page token skips {skip} entries but the page holds {available}")]
    SkipBeyondPage {
        /// Entries the token asked to skip.
        skip: usize,
        /// Entries on the remote page.
        available: usize,
    },
}

/// One page of snapshots plus the token for the next one.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct SnapshotListing {
    /// Snapshots on this page, in provider order.
    pub snapshots: Vec<Snapshot>,
    /// Token for the next page; empty when there is none.
    pub next_token: String,
}

impl<A: DiskApi> DiskOrchestrator<A> {
    /// Returns one page of snapshots taken from `source_disk_id`.
    ///
    /// `page_token` is empty for the first page and otherwise a token
    /// returned by an earlier call. `max_entries` of zero defers to the
    /// provider's page size.
    ///
    /// # Errors
    ///
    /// Returns [`VolumeError::InvalidPageToken`] for malformed or stale
    /// tokens, [`VolumeError::Cancelled`] when cancelled, and
    /// [`VolumeError::Api`] for provider failures.
    pub async fn list_snapshot_page(
        &self,
        source_disk_id: &str,
        page_token: &str,
        max_entries: usize,
        cancel: &CancellationToken,
    ) -> Result<SnapshotListing, VolumeError> {
        let token = page_token.parse::<SnapshotPageToken>()?;
        let request = DescribeSnapshotsRequest {
            disk_id: source_disk_id.to_owned(),
            max_results: (max_entries > 0).then(|| token.local_skip.saturating_add(max_entries)),
            next_token: (!token.remote_continuation.is_empty())
                .then(|| token.remote_continuation.clone()),
            tags: self
                .cluster_id
                .iter()
                .map(|cluster| Tag::new(CLUSTER_TAG_KEY, cluster))
                .collect(),
        };

        if cancel.is_cancelled() {
            return Err(VolumeError::Cancelled);
        }
        let page = self.api.describe_snapshots(&request, cancel).await?;
        let available = page.snapshots.len();
        if token.local_skip > 0 && token.local_skip >= available {
            return Err(PageTokenError::SkipBeyondPage {
                skip: token.local_skip,
                available,
            }
            .into());
        }
        debug!(
            source_disk_id,
            available,
            skip = token.local_skip,
            "fetched snapshot page"
        );

        let remaining = available - token.local_skip;
        let snapshots = page.snapshots.into_iter().skip(token.local_skip);
        if max_entries > 0 && remaining > max_entries {
            let next = SnapshotPageToken {
                local_skip: token.local_skip + max_entries,
                remote_continuation: token.remote_continuation,
            };
            return Ok(SnapshotListing {
                snapshots: snapshots.take(max_entries).collect(),
                next_token: next.to_string(),
            });
        }

        let next_token = if page.next_token.is_empty() {
            String::new()
        } else {
            SnapshotPageToken {
                local_skip: 0,
                remote_continuation: page.next_token,
            }
            .to_string()
        };
        Ok(SnapshotListing {
            snapshots: snapshots.collect(),
            next_token,
        })
    }
}
