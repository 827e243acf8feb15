//! Translation of `sqlx` failures into application errors.

use tracing::error;
use wqp_core::AppError;

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Maps a failed statement. Transport failures become retryable
/// `StorageUnavailable`, unique violations become `DuplicateKey`.
pub(crate) fn storage_error(error: sqlx::Error, operation: &str) -> AppError {
    if is_unique_violation(&error) {
        return AppError::DuplicateKey(format!("failed to {operation}: {error}"));
    }

    if is_transport_failure(&error) {
        return AppError::StorageUnavailable(format!("failed to {operation}: {error}"));
    }

    AppError::Internal(format!("failed to {operation}: {error}"))
}

/// Maps a failed `COMMIT`. The transaction may or may not have landed.
pub(crate) fn commit_error(error: sqlx::Error, operation: &str) -> AppError {
    error!(operation, %error, "commit failed with unknown outcome");
    AppError::PartialFailure(format!(
        "commit outcome unknown for {operation}: {error}"
    ))
}

/// Returns whether the statement hit a unique constraint.
pub(crate) fn is_unique_violation(error: &sqlx::Error) -> bool {
    sqlstate(error).as_deref() == Some(UNIQUE_VIOLATION)
}

/// Returns whether the statement referenced a missing parent row.
pub(crate) fn is_foreign_key_violation(error: &sqlx::Error) -> bool {
    sqlstate(error).as_deref() == Some(FOREIGN_KEY_VIOLATION)
}

fn is_transport_failure(error: &sqlx::Error) -> bool {
    matches!(
        error,
        sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
    )
}

fn sqlstate(error: &sqlx::Error) -> Option<String> {
    match error {
        sqlx::Error::Database(database_error) => {
            database_error.code().map(|code| code.into_owned())
        }
        _ => None,
    }
}
