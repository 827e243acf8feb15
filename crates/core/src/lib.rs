//! Shared primitives for all Rust crates in WQP.

#![forbid(unsafe_code)]

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type used across WQP crates.
pub type AppResult<T> = Result<T, AppError>;

/// Entity kind named by a dangling reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    /// A user identifier.
    User,
    /// A role identifier or role name.
    Role,
    /// A permission identifier.
    Permission,
}

impl ReferenceKind {
    /// Returns a stable lowercase label.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Role => "role",
            Self::Permission => "permission",
        }
    }
}

impl Display for ReferenceKind {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Write operation collides with a unique key.
    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    /// Write operation names identifiers that do not resolve.
    #[error("invalid reference: unknown {kind} ids [{}]", .ids.join(", "))]
    InvalidReference {
        /// Kind of entity the identifiers were expected to name.
        kind: ReferenceKind,
        /// Offending identifiers, sorted and deduplicated.
        ids: Vec<String>,
    },

    /// Storage backend could not be reached. Safe for the caller to retry.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// A multi-step write could not confirm its atomic boundary.
    #[error("partial failure: {0}")]
    PartialFailure(String),

    /// Caller did not present valid credentials.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Caller is blocked by authorization policy.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Builds an invalid reference error with sorted, deduplicated identifiers.
    #[must_use]
    pub fn invalid_reference<I, S>(kind: ReferenceKind, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ids = ids.into_iter().map(Into::into).collect::<Vec<String>>();
        ids.sort();
        ids.dedup();
        Self::InvalidReference { kind, ids }
    }

    /// Returns whether the caller may retry the same operation unchanged.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StorageUnavailable(_))
    }
}
