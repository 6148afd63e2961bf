//! Configuration loading via `ortho-config`.

use std::collections::BTreeSet;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

use crate::category::Category;

/// Gateway and placement settings derived from environment variables,
/// configuration files, and defaults.
#[derive(Clone, Debug, Deserialize, OrthoConfig, PartialEq, Eq)]
#[ortho_config(
    prefix = "ECSV",
    discovery(
        app_name = "ecs-volumes",
        env_var = "ECSV_CONFIG_PATH",
        config_file_name = "ecs-volumes.toml",
        dotfile_name = ".ecs-volumes.toml",
        project_file_name = "ecs-volumes.toml"
    )
)]
pub struct GatewayConfig {
    /// Base URL of the signing gateway that fronts the block-storage API.
    pub endpoint: String,
    /// Region the disks live in, for example `cn-hangzhou`.
    pub region_id: String,
    /// Default availability zone for new disks.
    pub zone_id: Option<String>,
    /// Instance the node runs on. Required for instance-scoped categories
    /// unless running on a virtual node.
    pub instance_id: Option<String>,
    /// Cluster that owns the disks; scopes snapshot listings.
    pub cluster_id: Option<String>,
    /// Comma separated categories available in the placement. Unset or empty
    /// trusts each request's list.
    pub supported_categories: Option<String>,
    /// Whether the node is a virtual node.
    #[ortho_config(default = false)]
    pub virtual_node: bool,
    /// Per-request timeout in seconds. Defaults to 30.
    #[ortho_config(default = 30)]
    pub request_timeout_secs: u64,
}

/// Metadata for a configuration field, used to generate actionable error messages.
struct FieldMetadata {
    description: &'static str,
    env_var: &'static str,
    toml_key: &'static str,
}

impl FieldMetadata {
    const fn new(description: &'static str, env_var: &'static str, toml_key: &'static str) -> Self {
        Self {
            description,
            env_var,
            toml_key,
        }
    }
}

impl GatewayConfig {
    fn require_field(value: &str, metadata: &FieldMetadata) -> Result<(), ConfigError> {
        if value.trim().is_empty() {
            return Err(ConfigError::MissingField(format!(
                "missing {}: set {} or add {} to ecs-volumes.toml",
                metadata.description, metadata.env_var, metadata.toml_key
            )));
        }
        Ok(())
    }

    /// Loads configuration without attempting to parse CLI arguments. Values
    /// merge defaults, configuration files, and environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the merge fails.
    pub fn load_without_cli_args() -> Result<Self, ConfigError> {
        Self::load_from_iter([std::ffi::OsString::from("ecs-volumes")])
            .map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Performs semantic validation on required fields. Error messages name
    /// the environment variable and configuration key to set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when a required field is empty,
    /// [`ConfigError::InvalidTimeout`] for a zero timeout, and
    /// [`ConfigError::UnknownCategory`] for an unparsable category list.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Self::require_field(
            &self.endpoint,
            &FieldMetadata::new("gateway endpoint", "ECSV_ENDPOINT", "endpoint"),
        )?;
        Self::require_field(
            &self.region_id,
            &FieldMetadata::new("region", "ECSV_REGION_ID", "region_id"),
        )?;
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        self.supported_categories()?;
        Ok(())
    }

    /// Parses [`Self::supported_categories`] into a set. An unset or blank
    /// list yields the empty set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownCategory`] naming the first entry that is
    /// not a known category.
    pub fn supported_categories(&self) -> Result<BTreeSet<Category>, ConfigError> {
        self.supported_categories
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                entry
                    .parse::<Category>()
                    .map_err(|_| ConfigError::UnknownCategory(entry.to_owned()))
            })
            .collect()
    }

    /// Per-request timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Errors raised during configuration loading and validation.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    /// Indicates a required configuration field is empty or missing.
    #[error("missing configuration field: {0}")]
    MissingField(String),
    /// Raised when the request timeout is zero.
    #[error("request_timeout_secs must be greater than zero (ECSV_REQUEST_TIMEOUT_SECS)")]
    InvalidTimeout,
    /// Raised when the supported category list names an unknown category.
    #[error("unknown disk category '{0}' in ECSV_SUPPORTED_CATEGORIES")]
    UnknownCategory(String),
    /// Surfaces errors from the `ortho-config` loader.
    #[error("configuration parsing failed: {0}")]
    Parse(String),
}

impl From<ortho_config::OrthoError> for ConfigError {
    fn from(value: ortho_config::OrthoError) -> Self {
        Self::Parse(value.to_string())
    }
}
