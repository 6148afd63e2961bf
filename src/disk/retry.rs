//! Single-retry policy shared by delete and resize.

use std::future::Future;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::backend::ApiError;

use super::VolumeError;
use super::classify::{ErrorKind, classify};

/// Issues `call`, and issues it once more when the first failure is
/// transient. Every other failure is returned unchanged.
pub(crate) async fn retry_on_transient<T, F, Fut>(
    operation: &'static str,
    cancel: &CancellationToken,
    mut call: F,
) -> Result<T, VolumeError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    if cancel.is_cancelled() {
        return Err(VolumeError::Cancelled);
    }
    let first = match call().await {
        Ok(value) => return Ok(value),
        Err(err) => classify(err, None),
    };
    if first.kind != ErrorKind::Transient {
        return Err(VolumeError::Api(first.cause));
    }
    info!(operation, error = %first.cause, "transient provider state; retrying once");
    if cancel.is_cancelled() {
        return Err(VolumeError::Cancelled);
    }
    call().await.map_err(VolumeError::Api)
}
