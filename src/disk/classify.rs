//! Interpretation of failed remote calls.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::backend::ApiError;
use crate::category::Category;

/// How the orchestrator reacts to a failed remote call.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// The resource is mid-transition; re-issue the same call.
    Transient,
    /// The provider rejected this category/configuration; fall back to the
    /// next candidate.
    CategoryUnsupported(Category),
    /// A create with the same idempotency token was accepted earlier with a
    /// different shape.
    IdempotencyConflict,
    /// Anything else. Propagated verbatim.
    Fatal,
}

/// A failed remote call together with its classification.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClassifiedError {
    /// Reaction the failure calls for.
    pub kind: ErrorKind,
    /// The failure exactly as the remote API returned it.
    pub cause: ApiError,
}

#[derive(Clone, Copy, Debug)]
enum CodeClass {
    Transient,
    CategoryUnsupported,
    IdempotencyConflict,
}

static ERROR_CODES: LazyLock<HashMap<&'static str, CodeClass>> = LazyLock::new(|| {
    HashMap::from([
        ("IncorrectDiskStatus.Initializing", CodeClass::Transient),
        ("LastOrderProcessing", CodeClass::Transient),
        (
            "InvalidDataDiskSize.ValueNotSupported",
            CodeClass::CategoryUnsupported,
        ),
        (
            "InvalidDataDiskCategory.ValueNotSupported",
            CodeClass::CategoryUnsupported,
        ),
        (
            "InvalidDataDiskCategory.NotSupported",
            CodeClass::CategoryUnsupported,
        ),
        (
            "InvalidDiskCategory.NotSupported",
            CodeClass::CategoryUnsupported,
        ),
        (
            "InvalidDiskCategory.ValueNotSupported",
            CodeClass::CategoryUnsupported,
        ),
        (
            "InvalidPerformanceLevel.Malformed",
            CodeClass::CategoryUnsupported,
        ),
        ("OperationDenied.NoStock", CodeClass::CategoryUnsupported),
        (
            "IdempotentParameterMismatch",
            CodeClass::IdempotencyConflict,
        ),
    ])
});

/// Classifies a failed remote call.
///
/// `attempted` names the category the call tried to create. Without one, a
/// category rejection cannot be acted on and is treated as fatal.
#[must_use]
pub fn classify(cause: ApiError, attempted: Option<Category>) -> ClassifiedError {
    let class = cause.code().and_then(|code| ERROR_CODES.get(code)).copied();
    let kind = match (class, attempted) {
        (Some(CodeClass::Transient), _) => ErrorKind::Transient,
        (Some(CodeClass::CategoryUnsupported), Some(category)) => {
            ErrorKind::CategoryUnsupported(category)
        }
        (Some(CodeClass::IdempotencyConflict), _) => ErrorKind::IdempotencyConflict,
        (Some(CodeClass::CategoryUnsupported), None) | (None, _) => ErrorKind::Fatal,
    };
    ClassifiedError { kind, cause }
}
