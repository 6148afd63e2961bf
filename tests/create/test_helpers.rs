//! Shared fixtures for volume creation BDD scenarios.

use ecs_volumes::test_support::ScriptedDiskApi;
use ecs_volumes::{ProvisionedDisk, VolumeError};
use rstest::fixture;
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct CreateContext {
    pub api: ScriptedDiskApi,
    pub outcome: Option<CreateOutcome>,
}

#[derive(Clone, Debug)]
pub enum CreateOutcome {
    Provisioned(ProvisionedDisk),
    Failed(VolumeError),
}

impl From<Result<ProvisionedDisk, VolumeError>> for CreateOutcome {
    fn from(result: Result<ProvisionedDisk, VolumeError>) -> Self {
        match result {
            Ok(provisioned) => Self::Provisioned(provisioned),
            Err(err) => Self::Failed(err),
        }
    }
}

#[derive(Clone, Debug, Error)]
pub enum CreateTestError {
    #[error("invalid create fixture: {0}")]
    Fixture(String),
}

#[fixture]
pub fn create_context() -> CreateContext {
    CreateContext {
        api: ScriptedDiskApi::new(),
        outcome: None,
    }
}
