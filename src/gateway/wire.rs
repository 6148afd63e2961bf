//! JSON shapes exchanged with the signing gateway.

use serde::{Deserialize, Serialize};

use crate::backend::{ApiError, Disk};

/// Body posted for every action: the action name and region, followed by the
/// action's own parameters at the top level.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(super) struct Envelope<'a, P: Serialize> {
    pub(super) action: &'static str,
    pub(super) region_id: &'a str,
    #[serde(flatten)]
    pub(super) params: &'a P,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(super) struct DeleteDiskParams<'a> {
    pub(super) disk_id: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(super) struct DescribeDisksResponse {
    #[serde(default)]
    pub(super) disks: Vec<Disk>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    request_id: Option<String>,
}

/// Fallback provider code when a failure body cannot be decoded.
pub(super) const UNKNOWN_ERROR_CODE: &str = "UnknownError";

/// Builds an [`ApiError::Server`] from a non-success response.
pub(super) fn parse_error_body(status: u16, body: &str) -> ApiError {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) if !parsed.code.is_empty() => ApiError::Server {
            status,
            code: parsed.code,
            message: parsed.message,
            request_id: parsed.request_id.filter(|id| !id.is_empty()),
        },
        _ => ApiError::Server {
            status,
            code: String::from(UNKNOWN_ERROR_CODE),
            message: body.trim().to_owned(),
            request_id: None,
        },
    }
}
