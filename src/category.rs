//! Disk categories offered by the provider and their capabilities.
//!
//! Every decision that depends on "what kind of disk is this" consults the
//! read-only [`CategoryDesc`] record attached to each [`Category`], so the
//! attempt generator and the precondition checks share one table.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Inclusive size range, in GiB, accepted by the provider.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SizeRange {
    /// Smallest accepted size.
    pub min_gb: u64,
    /// Largest accepted size.
    pub max_gb: u64,
}

impl SizeRange {
    const fn new(min_gb: u64, max_gb: u64) -> Self {
        Self { min_gb, max_gb }
    }

    /// Returns `true` when `size_gb` lies within the range.
    #[must_use]
    pub const fn contains(self, size_gb: u64) -> bool {
        size_gb >= self.min_gb && size_gb <= self.max_gb
    }
}

/// Performance tier within a category that supports tiers.
#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub enum PerformanceLevel {
    /// Entry tier.
    #[serde(rename = "PL0")]
    Pl0,
    /// Default tier.
    #[serde(rename = "PL1")]
    Pl1,
    /// High throughput tier.
    #[serde(rename = "PL2")]
    Pl2,
    /// Highest throughput tier.
    #[serde(rename = "PL3")]
    Pl3,
}

impl PerformanceLevel {
    /// Provider spelling of the tier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pl0 => "PL0",
            Self::Pl1 => "PL1",
            Self::Pl2 => "PL2",
            Self::Pl3 => "PL3",
        }
    }
}

impl fmt::Display for PerformanceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PerformanceLevel {
    type Err = ParseCategoryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "PL0" => Ok(Self::Pl0),
            "PL1" => Ok(Self::Pl1),
            "PL2" => Ok(Self::Pl2),
            "PL3" => Ok(Self::Pl3),
            other => Err(ParseCategoryError::UnknownPerformanceLevel(other.to_owned())),
        }
    }
}

/// Storage class offered by the provider.
#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub enum Category {
    /// Basic (magnetic) disk.
    #[serde(rename = "cloud")]
    Cloud,
    /// Ultra disk.
    #[serde(rename = "cloud_efficiency")]
    Efficiency,
    /// Standard SSD.
    #[serde(rename = "cloud_ssd")]
    Ssd,
    /// Enhanced SSD with performance levels.
    #[serde(rename = "cloud_essd")]
    Essd,
    /// Enhanced SSD with automatic performance provisioning.
    #[serde(rename = "cloud_auto")]
    EssdAuto,
    /// Entry-level enhanced SSD.
    #[serde(rename = "cloud_essd_entry")]
    EssdEntry,
    /// Elastic ephemeral disk, standard edition. Bound to one instance.
    #[serde(rename = "elastic_ephemeral_disk_standard")]
    EedStandard,
    /// Elastic ephemeral disk, premium edition. Bound to one instance.
    #[serde(rename = "elastic_ephemeral_disk_premium")]
    EedPremium,
}

/// Read-only capability record attached to a [`Category`].
#[derive(Debug, Eq, PartialEq)]
pub struct CategoryDesc {
    /// Provider spelling of the category.
    pub provider_name: &'static str,
    /// Size range accepted when no performance level is selected.
    pub size: SizeRange,
    /// Supported performance levels with their own size ranges. Empty when the
    /// category has no tiers.
    pub performance_levels: &'static [(PerformanceLevel, SizeRange)],
    /// Whether a create must name the instance the disk is bound to.
    pub requires_instance: bool,
}

impl CategoryDesc {
    /// Returns `true` when the category accepts a performance level.
    #[must_use]
    pub const fn supports_tiers(&self) -> bool {
        !self.performance_levels.is_empty()
    }

    /// Size range for the category, narrowed by `level` when given.
    #[must_use]
    pub fn size_range(&self, level: Option<PerformanceLevel>) -> SizeRange {
        level
            .and_then(|wanted| {
                self.performance_levels
                    .iter()
                    .find(|(candidate, _)| *candidate == wanted)
                    .map(|(_, range)| *range)
            })
            .unwrap_or(self.size)
    }
}

const ESSD_LEVELS: &[(PerformanceLevel, SizeRange)] = &[
    (PerformanceLevel::Pl0, SizeRange::new(1, 65_536)),
    (PerformanceLevel::Pl1, SizeRange::new(20, 65_536)),
    (PerformanceLevel::Pl2, SizeRange::new(461, 65_536)),
    (PerformanceLevel::Pl3, SizeRange::new(1_261, 65_536)),
];

const fn untiered(provider_name: &'static str, min_gb: u64, max_gb: u64) -> CategoryDesc {
    CategoryDesc {
        provider_name,
        size: SizeRange::new(min_gb, max_gb),
        performance_levels: &[],
        requires_instance: false,
    }
}

static CLOUD: CategoryDesc = untiered("cloud", 5, 2_000);
static EFFICIENCY: CategoryDesc = untiered("cloud_efficiency", 20, 32_768);
static SSD: CategoryDesc = untiered("cloud_ssd", 20, 32_768);
static ESSD: CategoryDesc = CategoryDesc {
    provider_name: "cloud_essd",
    size: SizeRange::new(1, 65_536),
    performance_levels: ESSD_LEVELS,
    requires_instance: false,
};
static ESSD_AUTO: CategoryDesc = untiered("cloud_auto", 1, 65_536);
static ESSD_ENTRY: CategoryDesc = untiered("cloud_essd_entry", 10, 32_768);
static EED_STANDARD: CategoryDesc = CategoryDesc {
    requires_instance: true,
    ..untiered("elastic_ephemeral_disk_standard", 64, 8_192)
};
static EED_PREMIUM: CategoryDesc = CategoryDesc {
    requires_instance: true,
    ..untiered("elastic_ephemeral_disk_premium", 64, 8_192)
};

impl Category {
    /// Every category known to this crate.
    pub const ALL: [Self; 8] = [
        Self::Cloud,
        Self::Efficiency,
        Self::Ssd,
        Self::Essd,
        Self::EssdAuto,
        Self::EssdEntry,
        Self::EedStandard,
        Self::EedPremium,
    ];

    /// Capability record for the category.
    #[must_use]
    pub const fn desc(self) -> &'static CategoryDesc {
        match self {
            Self::Cloud => &CLOUD,
            Self::Efficiency => &EFFICIENCY,
            Self::Ssd => &SSD,
            Self::Essd => &ESSD,
            Self::EssdAuto => &ESSD_AUTO,
            Self::EssdEntry => &ESSD_ENTRY,
            Self::EedStandard => &EED_STANDARD,
            Self::EedPremium => &EED_PREMIUM,
        }
    }

    /// Provider spelling of the category.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        self.desc().provider_name
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == wanted)
            .ok_or_else(|| ParseCategoryError::UnknownCategory(wanted.to_owned()))
    }
}

/// Errors raised when parsing provider category or tier names.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ParseCategoryError {
    /// Raised for a category name this crate does not know.
    #[error("unknown disk category '{0}'")]
    UnknownCategory(String),
    /// Raised for a performance level name this crate does not know.
    #[error("unknown performance level '{0}'")]
    UnknownPerformanceLevel(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn provider_names_round_trip() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>(), Ok(category));
        }
    }

    #[rstest]
    fn unknown_category_is_rejected() {
        assert_eq!(
            "cloud_regional".parse::<Category>(),
            Err(ParseCategoryError::UnknownCategory(String::from(
                "cloud_regional"
            )))
        );
    }

    #[rstest]
    #[case(Category::Essd, true, false)]
    #[case(Category::EssdEntry, false, false)]
    #[case(Category::EssdAuto, false, false)]
    #[case(Category::EedStandard, false, true)]
    #[case(Category::EedPremium, false, true)]
    fn capability_table(
        #[case] category: Category,
        #[case] tiers: bool,
        #[case] instance: bool,
    ) {
        assert_eq!(category.desc().supports_tiers(), tiers);
        assert_eq!(category.desc().requires_instance, instance);
    }

    #[rstest]
    #[case(None, 1)]
    #[case(Some(PerformanceLevel::Pl1), 20)]
    #[case(Some(PerformanceLevel::Pl3), 1_261)]
    fn essd_size_depends_on_level(#[case] level: Option<PerformanceLevel>, #[case] min: u64) {
        assert_eq!(Category::Essd.desc().size_range(level).min_gb, min);
    }

    #[rstest]
    fn serde_uses_provider_names() {
        let encoded = serde_json::to_string(&Category::EssdAuto).expect("serialise");
        assert_eq!(encoded, "\"cloud_auto\"");
        let level = serde_json::to_string(&PerformanceLevel::Pl2).expect("serialise");
        assert_eq!(level, "\"PL2\"");
    }
}
