//! Volume requests handed to the orchestrator by the CSI surface.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::category::{Category, PerformanceLevel};

/// Everything the orchestrator needs to provision one volume.
///
/// Immutable once handed to [`crate::DiskOrchestrator::create_volume`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VolumeRequest {
    /// Volume name chosen by the orchestrator platform. Drives the
    /// idempotency token and the reconciliation lookup.
    pub name: String,
    /// Requested size in GiB.
    pub size_gb: u64,
    /// Acceptable categories in preference order.
    pub categories: Vec<Category>,
    /// Acceptable performance levels in preference order. Empty means "no
    /// preference".
    pub performance_levels: Vec<PerformanceLevel>,
    /// Availability zone.
    pub zone_id: String,
    /// Instance the disk is bound to, for instance-scoped categories.
    pub instance_id: Option<String>,
    /// Set when provisioning for a virtual node, which relaxes the instance
    /// requirement.
    pub virtual_node: bool,
    /// Whether the disk may attach to several instances.
    pub multi_attach: bool,
    /// Tags to apply; keys are unique.
    pub tags: BTreeMap<String, String>,
    /// Source snapshot to restore from.
    pub snapshot_id: Option<String>,
    /// Resource group that owns the disk.
    pub resource_group_id: Option<String>,
}

impl VolumeRequest {
    /// Starts a builder for a [`VolumeRequest`].
    #[must_use]
    pub fn builder() -> VolumeRequestBuilder {
        VolumeRequestBuilder::new()
    }

    /// Validates the request, returning a descriptive error for the first
    /// missing or empty field.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Validation`] naming the offending field.
    pub fn validate(&self) -> Result<(), RequestError> {
        if self.name.is_empty() {
            return Err(RequestError::Validation(String::from("name")));
        }
        if self.size_gb == 0 {
            return Err(RequestError::Validation(String::from("size_gb")));
        }
        if self.zone_id.is_empty() {
            return Err(RequestError::Validation(String::from("zone_id")));
        }
        if self.categories.is_empty() {
            return Err(RequestError::Validation(String::from("categories")));
        }
        Ok(())
    }
}

/// Builder for [`VolumeRequest`] that trims and validates on build.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct VolumeRequestBuilder {
    name: String,
    size_gb: u64,
    categories: Vec<Category>,
    performance_levels: Vec<PerformanceLevel>,
    zone_id: String,
    instance_id: Option<String>,
    virtual_node: bool,
    multi_attach: bool,
    tags: BTreeMap<String, String>,
    snapshot_id: Option<String>,
    resource_group_id: Option<String>,
}

impl VolumeRequestBuilder {
    /// Creates an empty builder; required fields must be populated before
    /// build.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the volume name.
    #[must_use]
    pub fn name(mut self, value: impl Into<String>) -> Self {
        self.name = value.into();
        self
    }

    /// Sets the requested size in GiB.
    #[must_use]
    pub const fn size_gb(mut self, value: u64) -> Self {
        self.size_gb = value;
        self
    }

    /// Sets the acceptable categories in preference order.
    #[must_use]
    pub fn categories(mut self, value: impl IntoIterator<Item = Category>) -> Self {
        self.categories = value.into_iter().collect();
        self
    }

    /// Sets the acceptable performance levels in preference order.
    #[must_use]
    pub fn performance_levels(mut self, value: impl IntoIterator<Item = PerformanceLevel>) -> Self {
        self.performance_levels = value.into_iter().collect();
        self
    }

    /// Sets the availability zone.
    #[must_use]
    pub fn zone_id(mut self, value: impl Into<String>) -> Self {
        self.zone_id = value.into();
        self
    }

    /// Sets the instance the disk is bound to.
    #[must_use]
    pub fn instance_id(mut self, value: Option<String>) -> Self {
        self.instance_id = value;
        self
    }

    /// Marks the request as coming from a virtual node.
    #[must_use]
    pub const fn virtual_node(mut self, value: bool) -> Self {
        self.virtual_node = value;
        self
    }

    /// Enables or disables multi-attach.
    #[must_use]
    pub const fn multi_attach(mut self, value: bool) -> Self {
        self.multi_attach = value;
        self
    }

    /// Adds a tag, replacing any previous value for the key.
    #[must_use]
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Sets the source snapshot.
    #[must_use]
    pub fn snapshot_id(mut self, value: Option<String>) -> Self {
        self.snapshot_id = value;
        self
    }

    /// Sets the owning resource group.
    #[must_use]
    pub fn resource_group_id(mut self, value: Option<String>) -> Self {
        self.resource_group_id = value;
        self
    }

    /// Builds and validates the [`VolumeRequest`], trimming string inputs.
    /// Blank optional values collapse to `None`.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Validation`] when a required field is empty.
    pub fn build(self) -> Result<VolumeRequest, RequestError> {
        let request = VolumeRequest {
            name: self.name.trim().to_owned(),
            size_gb: self.size_gb,
            categories: self.categories,
            performance_levels: self.performance_levels,
            zone_id: self.zone_id.trim().to_owned(),
            instance_id: non_blank(self.instance_id),
            virtual_node: self.virtual_node,
            multi_attach: self.multi_attach,
            tags: self.tags,
            snapshot_id: non_blank(self.snapshot_id),
            resource_group_id: non_blank(self.resource_group_id),
        };
        request.validate()?;
        Ok(request)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_owned())
        .filter(|text| !text.is_empty())
}

/// Errors raised while building a [`VolumeRequest`].
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum RequestError {
    /// Raised when a required field is missing or empty.
    #[error("missing or empty field: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn base() -> VolumeRequestBuilder {
        VolumeRequest::builder()
            .name(" disk-1 ")
            .size_gb(20)
            .zone_id(" cn-hangzhou-a ")
            .categories([Category::Essd])
    }

    #[rstest]
    fn build_trims_fields() {
        let request = base()
            .instance_id(Some(String::from("  ")))
            .snapshot_id(Some(String::from(" s-1 ")))
            .build()
            .expect("request should build");
        assert_eq!(request.name, "disk-1");
        assert_eq!(request.zone_id, "cn-hangzhou-a");
        assert_eq!(request.instance_id, None);
        assert_eq!(request.snapshot_id.as_deref(), Some("s-1"));
    }

    #[rstest]
    #[case("name", base().name(""))]
    #[case("size_gb", base().size_gb(0))]
    #[case("zone_id", base().zone_id(" "))]
    #[case("categories", base().categories(Vec::<Category>::new()))]
    fn build_rejects_missing_fields(#[case] field: &str, #[case] builder: VolumeRequestBuilder) {
        assert_eq!(
            builder.build(),
            Err(RequestError::Validation(field.to_owned()))
        );
    }

    #[rstest]
    fn tags_keep_last_value_per_key() {
        let request = base()
            .tag("k1", "v1")
            .tag("k1", "v2")
            .build()
            .expect("request should build");
        assert_eq!(request.tags.get("k1").map(String::as_str), Some("v2"));
        assert_eq!(request.tags.len(), 1);
    }
}
