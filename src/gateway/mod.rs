//! HTTP [`DiskApi`] implementation backed by a signing gateway.
//!
//! The gateway accepts `POST <endpoint>` with a JSON body naming the action
//! and region, signs the call, and relays the provider's answer. Successful
//! answers are the action's JSON payload; failures carry `Code`, `Message`
//! and `RequestId`.

use std::future::Future;

use serde::Serialize;
use serde::de::{DeserializeOwned, IgnoredAny};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::backend::{
    ApiError, ApiFuture, CreateDiskRequest, CreateDiskResponse, DescribeDisksRequest,
    DescribeSnapshotsRequest, Disk, DiskApi, ResizeDiskRequest, SnapshotPage,
};
use crate::config::{ConfigError, GatewayConfig};

mod wire;

use wire::{DeleteDiskParams, DescribeDisksResponse, Envelope, parse_error_body};

/// Errors raised while constructing the gateway client.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Raised when the configuration is incomplete.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Raised when the HTTP client cannot be built.
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// [`DiskApi`] that posts actions to the signing gateway.
#[derive(Clone, Debug)]
pub struct HttpDiskApi {
    client: reqwest::Client,
    endpoint: String,
    region_id: String,
}

impl HttpDiskApi {
    /// Builds a client from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Config`] when the configuration is invalid and
    /// [`GatewayError::Client`] when the HTTP client cannot be built.
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        config.validate()?;
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.trim().to_owned(),
            region_id: config.region_id.trim().to_owned(),
        })
    }

    /// Endpoint the client posts to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn call<P, R>(
        &self,
        action: &'static str,
        params: &P,
        cancel: &CancellationToken,
    ) -> Result<R, ApiError>
    where
        P: Serialize + Sync,
        R: DeserializeOwned,
    {
        let envelope = Envelope {
            action,
            region_id: &self.region_id,
            params,
        };
        debug!(action, endpoint = %self.endpoint, "posting gateway action");
        let exchange = async {
            let response = self
                .client
                .post(&self.endpoint)
                .json(&envelope)
                .send()
                .await
                .map_err(|err| transport(&err))?;
            let status = response.status();
            let body = response.text().await.map_err(|err| transport(&err))?;
            if !status.is_success() {
                return Err(parse_error_body(status.as_u16(), &body));
            }
            serde_json::from_str::<R>(&body).map_err(|err| ApiError::Transport {
                message: format!("malformed {action} response: {err}"),
            })
        };
        race(exchange, cancel).await
    }
}

async fn race<T>(
    exchange: impl Future<Output = Result<T, ApiError>>,
    cancel: &CancellationToken,
) -> Result<T, ApiError> {
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(ApiError::Cancelled),
        outcome = exchange => outcome,
    }
}

fn transport(err: &reqwest::Error) -> ApiError {
    ApiError::Transport {
        message: err.to_string(),
    }
}

impl DiskApi for HttpDiskApi {
    fn create_disk<'a>(
        &'a self,
        request: &'a CreateDiskRequest,
        cancel: &'a CancellationToken,
    ) -> ApiFuture<'a, CreateDiskResponse> {
        Box::pin(self.call("CreateDisk", request, cancel))
    }

    fn delete_disk<'a>(
        &'a self,
        disk_id: &'a str,
        cancel: &'a CancellationToken,
    ) -> ApiFuture<'a, ()> {
        Box::pin(async move {
            let params = DeleteDiskParams { disk_id };
            self.call::<_, IgnoredAny>("DeleteDisk", &params, cancel)
                .await
                .map(|_| ())
        })
    }

    fn resize_disk<'a>(
        &'a self,
        request: &'a ResizeDiskRequest,
        cancel: &'a CancellationToken,
    ) -> ApiFuture<'a, ()> {
        Box::pin(async move {
            self.call::<_, IgnoredAny>("ResizeDisk", request, cancel)
                .await
                .map(|_| ())
        })
    }

    fn describe_disks<'a>(
        &'a self,
        request: &'a DescribeDisksRequest,
        cancel: &'a CancellationToken,
    ) -> ApiFuture<'a, Vec<Disk>> {
        Box::pin(async move {
            self.call::<_, DescribeDisksResponse>("DescribeDisks", request, cancel)
                .await
                .map(|response| response.disks)
        })
    }

    fn describe_snapshots<'a>(
        &'a self,
        request: &'a DescribeSnapshotsRequest,
        cancel: &'a CancellationToken,
    ) -> ApiFuture<'a, SnapshotPage> {
        Box::pin(self.call("DescribeSnapshots", request, cancel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn config() -> GatewayConfig {
        GatewayConfig {
            endpoint: String::from(" http://127.0.0.1:9/ "),
            region_id: String::from("cn-hangzhou"),
            zone_id: None,
            instance_id: None,
            cluster_id: None,
            supported_categories: None,
            virtual_node: false,
            request_timeout_secs: 5,
        }
    }

    #[rstest]
    fn builds_from_valid_config() {
        let api = HttpDiskApi::new(&config()).expect("client should build");
        assert_eq!(api.endpoint(), "http://127.0.0.1:9/");
    }

    #[rstest]
    fn rejects_invalid_config() {
        let invalid = GatewayConfig {
            region_id: String::new(),
            ..config()
        };
        assert!(matches!(
            HttpDiskApi::new(&invalid),
            Err(GatewayError::Config(ConfigError::MissingField(_)))
        ));
    }

    #[tokio::test]
    async fn cancelled_token_short_circuits() {
        let api = HttpDiskApi::new(&config()).expect("client should build");
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = api
            .delete_disk("d-1", &cancel)
            .await
            .expect_err("cancelled call should fail");
        assert_eq!(err, ApiError::Cancelled);
    }
}
