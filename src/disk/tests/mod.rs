//! Unit tests for disk lifecycle orchestration.

use std::collections::BTreeSet;

use tokio_util::sync::CancellationToken;

use super::DiskOrchestrator;
use crate::category::{Category, PerformanceLevel};
use crate::test_support::ScriptedDiskApi;
use crate::volume::{VolumeRequest, VolumeRequestBuilder};

fn request_builder(categories: &[Category]) -> VolumeRequestBuilder {
    VolumeRequest::builder()
        .name("pv-disk-1")
        .size_gb(20)
        .zone_id("cn-beijing-a")
        .categories(categories.iter().copied())
}

fn request(categories: &[Category], levels: &[PerformanceLevel]) -> VolumeRequest {
    request_builder(categories)
        .performance_levels(levels.iter().copied())
        .build()
        .expect("request should build")
}

fn orchestrator() -> (DiskOrchestrator<ScriptedDiskApi>, ScriptedDiskApi) {
    let api = ScriptedDiskApi::new();
    (DiskOrchestrator::new(api.clone()), api)
}

fn all_supported() -> BTreeSet<Category> {
    BTreeSet::new()
}

fn token() -> CancellationToken {
    CancellationToken::new()
}

mod attempt;
mod naming;
mod token;
