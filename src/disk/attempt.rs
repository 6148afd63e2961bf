//! Expansion of a request's candidate categories into ordered create attempts.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::category::{Category, PerformanceLevel};

/// One concrete shape the orchestrator tries to create.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize)]
pub struct CreateAttempt {
    /// Disk category.
    pub category: Category,
    /// Performance level, absent when the category has no tiers or the
    /// caller expressed no preference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance_level: Option<PerformanceLevel>,
    /// Instance the disk is bound to, for instance-scoped categories.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
}

impl CreateAttempt {
    /// Tier-less attempt for `category`.
    #[must_use]
    pub const fn new(category: Category) -> Self {
        Self {
            category,
            performance_level: None,
            instance_id: None,
        }
    }

    /// Attempt for `category` at a specific performance level.
    #[must_use]
    pub const fn with_level(category: Category, level: PerformanceLevel) -> Self {
        Self {
            category,
            performance_level: Some(level),
            instance_id: None,
        }
    }
}

impl fmt::Display for CreateAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.category)?;
        if let Some(level) = self.performance_level {
            write!(f, "/{level}")?;
        }
        Ok(())
    }
}

/// Flattens candidate categories and performance levels into the fallback
/// order.
///
/// Categories keep caller order. A tiered category expands into one attempt
/// per requested level; any other category, or a tiered one requested with
/// no levels, yields a single tier-less attempt. A category or
/// (category, level) pair listed twice is emitted once.
#[must_use]
pub fn generate_create_attempts(
    categories: &[Category],
    levels: &[PerformanceLevel],
) -> Vec<CreateAttempt> {
    let mut seen = BTreeSet::new();
    let mut attempts = Vec::new();
    for &category in categories {
        if !seen.insert(category) {
            continue;
        }
        if category.desc().supports_tiers() && !levels.is_empty() {
            let mut seen_levels = BTreeSet::new();
            attempts.extend(
                levels
                    .iter()
                    .filter(|level| seen_levels.insert(**level))
                    .map(|level| CreateAttempt::with_level(category, *level)),
            );
        } else {
            attempts.push(CreateAttempt::new(category));
        }
    }
    attempts
}
