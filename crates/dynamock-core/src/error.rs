//! Conversions from internal errors into [`StoreError`].

use dynamock_model::error::StoreError;

use crate::condition::ConditionError;
use crate::statement::StatementError;
use crate::storage::StorageError;

/// Convert a storage error into a validation error.
///
/// Takes `e` by value because this is used as a closure argument to `.map_err()`.
#[must_use]
#[allow(clippy::needless_pass_by_value)]
pub fn storage_error_to_store(e: StorageError) -> StoreError {
    StoreError::validation(e.to_string())
}

/// Convert a condition error into an `UnsupportedOperator` error.
#[must_use]
#[allow(clippy::needless_pass_by_value)]
pub fn condition_error_to_store(e: ConditionError) -> StoreError {
    match e {
        ConditionError::UnsupportedOperator(op) => StoreError::unsupported_operator(&op),
    }
}

/// Convert a statement parse error into a `StatementSyntaxError`.
#[must_use]
pub fn statement_error_to_store(e: StatementError) -> StoreError {
    StoreError::statement_syntax(e.to_string()).with_source(e)
}
