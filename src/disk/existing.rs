//! Decides whether a disk that already exists can stand in for a request.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::backend::Disk;
use crate::category::{Category, PerformanceLevel};
use crate::volume::VolumeRequest;

use super::attempt::CreateAttempt;

/// The properties of a remote disk that decide reusability.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ExistingDisk {
    /// Provider category name.
    pub category: String,
    /// Provider performance level name, empty when not applicable.
    pub performance_level: String,
    /// Size in GiB.
    pub size_gb: u64,
    /// Tags on the disk.
    pub tags: BTreeMap<String, String>,
    /// Whether multi-attach is enabled.
    pub multi_attach: bool,
}

impl From<&Disk> for ExistingDisk {
    fn from(disk: &Disk) -> Self {
        Self {
            category: disk.category.clone(),
            performance_level: disk.performance_level.clone(),
            size_gb: disk.size,
            tags: disk
                .tags
                .iter()
                .map(|tag| (tag.key.clone(), tag.value.clone()))
                .collect(),
            multi_attach: disk.is_multi_attach(),
        }
    }
}

/// Reasons an existing disk cannot be reused.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ExistingDiskMismatch {
    /// Sizes differ.
    #[error("size {existing} GiB differs from requested {requested} GiB")]
    Size {
        /// Size of the existing disk.
        existing: u64,
        /// Requested size.
        requested: u64,
    },
    /// The category is not one of the requested candidates.
    #[error("category '{0}' is not among the requested categories")]
    Category(String),
    /// The performance level is not one of the requested levels.
    #[error("performance level '{0}' is not among the requested levels")]
    PerformanceLevel(String),
    /// Multi-attach settings differ.
    #[error("multi-attach is {existing} on the disk but {requested} was requested")]
    MultiAttach {
        /// Setting on the existing disk.
        existing: bool,
        /// Requested setting.
        requested: bool,
    },
    /// A requested tag is absent.
    #[error("tag '{0}' is missing")]
    MissingTag(String),
    /// A requested tag carries another value.
    #[error("tag '{key}' is '{existing}' but '{requested}' was requested")]
    TagValue {
        /// Tag key.
        key: String,
        /// Value on the existing disk.
        existing: String,
        /// Requested value.
        requested: String,
    },
}

/// Checks `existing` against `request`.
///
/// On success the returned attempt carries the existing disk's own category
/// and performance level, so callers record what actually exists. Extra tags
/// on the disk are ignored. Performance levels only matter for categories that
/// have tiers, and only when the request names some.
///
/// # Errors
///
/// Returns the first [`ExistingDiskMismatch`] found.
pub fn check_existing_disk(
    existing: &ExistingDisk,
    request: &VolumeRequest,
) -> Result<CreateAttempt, ExistingDiskMismatch> {
    if existing.size_gb != request.size_gb {
        return Err(ExistingDiskMismatch::Size {
            existing: existing.size_gb,
            requested: request.size_gb,
        });
    }

    let category = existing
        .category
        .parse::<Category>()
        .ok()
        .filter(|category| request.categories.contains(category))
        .ok_or_else(|| ExistingDiskMismatch::Category(existing.category.clone()))?;

    let performance_level = existing_level(existing, category, request)?;

    if existing.multi_attach != request.multi_attach {
        return Err(ExistingDiskMismatch::MultiAttach {
            existing: existing.multi_attach,
            requested: request.multi_attach,
        });
    }

    for (key, requested) in &request.tags {
        match existing.tags.get(key) {
            None => return Err(ExistingDiskMismatch::MissingTag(key.clone())),
            Some(value) if value != requested => {
                return Err(ExistingDiskMismatch::TagValue {
                    key: key.clone(),
                    existing: value.clone(),
                    requested: requested.clone(),
                });
            }
            Some(_) => {}
        }
    }

    Ok(CreateAttempt {
        category,
        performance_level,
        instance_id: None,
    })
}

fn existing_level(
    existing: &ExistingDisk,
    category: Category,
    request: &VolumeRequest,
) -> Result<Option<PerformanceLevel>, ExistingDiskMismatch> {
    if !category.desc().supports_tiers() || existing.performance_level.is_empty() {
        return Ok(None);
    }
    let mismatch = || ExistingDiskMismatch::PerformanceLevel(existing.performance_level.clone());
    let level = existing
        .performance_level
        .parse::<PerformanceLevel>()
        .map_err(|_| mismatch())?;
    if request.performance_levels.is_empty() || request.performance_levels.contains(&level) {
        Ok(Some(level))
    } else {
        Err(mismatch())
    }
}
