//! BDD step definitions for volume creation.

use std::collections::BTreeSet;

use ecs_volumes::test_support::disk;
use ecs_volumes::{Category, DiskOrchestrator, VolumeError, VolumeRequest};
use rstest_bdd_macros::{given, then, when};
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;

use super::test_helpers::{CreateContext, CreateOutcome, CreateTestError};

const ZONE: &str = "cn-hangzhou-i";

#[derive(Debug, thiserror::Error)]
pub enum StepError {
    #[error(transparent)]
    Setup(#[from] CreateTestError),
    #[error("assertion failed: {0}")]
    Assertion(String),
}

#[given("a scripted disk provider")]
fn scripted_provider(create_context: &mut CreateContext) {
    create_context.outcome = None;
}

#[given("the provider accepts the next create as \"{disk_id}\"")]
fn provider_accepts(create_context: &CreateContext, disk_id: String) {
    create_context.api.push_create_ok(&disk_id);
}

#[given("the provider rejects the next create with \"{code}\"")]
fn provider_rejects(create_context: &CreateContext, code: String) {
    create_context.api.push_create_err(&code);
}

#[given("disk \"{disk_id}\" of category \"{category}\" and {size} GiB already carries the name")]
fn disk_exists(create_context: &CreateContext, disk_id: String, category: String, size: u64) {
    create_context
        .api
        .push_describe(vec![disk(&disk_id, &category, "", size)]);
}

#[given("no disk carries the name")]
fn no_disk_exists(create_context: &CreateContext) {
    create_context.api.push_describe(Vec::new());
}

#[when("I create volume \"{name}\" of {size} GiB with categories \"{categories}\"")]
fn create_volume(
    create_context: &mut CreateContext,
    name: String,
    size: u64,
    categories: String,
) -> Result<(), StepError> {
    let runtime = Runtime::new().map_err(|err| StepError::Assertion(err.to_string()))?;
    let requested = categories
        .split(',')
        .map(str::parse::<Category>)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| CreateTestError::Fixture(format!("categories: {err}")))?;
    let request = VolumeRequest::builder()
        .name(name)
        .size_gb(size)
        .categories(requested)
        .zone_id(ZONE)
        .build()
        .map_err(|err| CreateTestError::Fixture(format!("volume request: {err}")))?;

    let orchestrator = DiskOrchestrator::new(create_context.api.clone());
    let outcome = runtime.block_on(orchestrator.create_volume(
        &request,
        &BTreeSet::new(),
        &CancellationToken::new(),
    ));

    create_context.outcome = Some(CreateOutcome::from(outcome));
    Ok(())
}

#[then("the volume is provisioned as \"{disk_id}\" with category \"{category}\"")]
fn provisioned_as(
    create_context: &CreateContext,
    disk_id: String,
    category: String,
) -> Result<(), StepError> {
    let provisioned = match create_context.outcome.as_ref() {
        Some(CreateOutcome::Provisioned(provisioned)) => provisioned,
        other => {
            return Err(StepError::Assertion(format!(
                "expected a provisioned disk, got {other:?}"
            )));
        }
    };
    if provisioned.disk_id != disk_id {
        return Err(StepError::Assertion(format!(
            "expected disk {disk_id}, got {}",
            provisioned.disk_id
        )));
    }
    if provisioned.attempt.category.as_str() != category {
        return Err(StepError::Assertion(format!(
            "expected category {category}, got {}",
            provisioned.attempt.category
        )));
    }
    Ok(())
}

#[then("{count} create calls were issued")]
fn create_calls_issued(create_context: &CreateContext, count: usize) -> Result<(), StepError> {
    let issued = create_context.api.create_calls().len();
    if issued != count {
        return Err(StepError::Assertion(format!(
            "expected {count} create calls, saw {issued}"
        )));
    }
    Ok(())
}

#[then("every create call carried the same client token")]
fn same_token(create_context: &CreateContext) -> Result<(), StepError> {
    let tokens: BTreeSet<_> = create_context
        .api
        .create_calls()
        .into_iter()
        .map(|call| call.client_token)
        .collect();
    if tokens.len() != 1 || tokens.contains(&None) {
        return Err(StepError::Assertion(format!(
            "expected one shared client token, saw {tokens:?}"
        )));
    }
    Ok(())
}

#[then("the last create call carried no client token")]
fn last_call_without_token(create_context: &CreateContext) -> Result<(), StepError> {
    let calls = create_context.api.create_calls();
    let last = calls
        .last()
        .ok_or_else(|| StepError::Assertion(String::from("no create call was issued")))?;
    if last.client_token.is_some() {
        return Err(StepError::Assertion(format!(
            "expected no client token, saw {:?}",
            last.client_token
        )));
    }
    Ok(())
}

#[then("the create fails because every candidate was rejected")]
fn all_rejected(create_context: &CreateContext) -> Result<(), StepError> {
    match create_context.outcome.as_ref() {
        Some(CreateOutcome::Failed(VolumeError::AllAttemptsRejected { last }))
            if last.code() == Some("OperationDenied.NoStock") =>
        {
            Ok(())
        }
        other => Err(StepError::Assertion(format!(
            "expected every candidate to be rejected, got {other:?}"
        ))),
    }
}
