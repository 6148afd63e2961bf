//! BDD scenarios for volume creation.

use rstest_bdd_macros::scenario;

use super::test_helpers::{CreateContext, create_context};

#[scenario(
    path = "tests/features/create_volume.feature",
    name = "First candidate is accepted"
)]
fn scenario_first_candidate(create_context: CreateContext) {
    drop(create_context);
}

#[scenario(
    path = "tests/features/create_volume.feature",
    name = "Rejected category falls back to the next one"
)]
fn scenario_fallback(create_context: CreateContext) {
    drop(create_context);
}

#[scenario(
    path = "tests/features/create_volume.feature",
    name = "Idempotency conflict adopts the existing disk"
)]
fn scenario_conflict_adopts(create_context: CreateContext) {
    drop(create_context);
}

#[scenario(
    path = "tests/features/create_volume.feature",
    name = "Idempotency conflict without a disk retries without a token"
)]
fn scenario_conflict_retries(create_context: CreateContext) {
    drop(create_context);
}

#[scenario(
    path = "tests/features/create_volume.feature",
    name = "Transient failure keeps the reconciliation retry"
)]
fn scenario_transient_then_conflict(create_context: CreateContext) {
    drop(create_context);
}

#[scenario(
    path = "tests/features/create_volume.feature",
    name = "Every candidate is rejected"
)]
fn scenario_all_rejected(create_context: CreateContext) {
    drop(create_context);
}
