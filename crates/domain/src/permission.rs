use std::str::FromStr;

use serde::{Deserialize, Serialize};
use wqp_core::{AppError, AppResult};

const PERMISSION_ID_MAX_LENGTH: usize = 50;

/// Stable permission key such as `data_view`.
///
/// Keys are lowercase ASCII letters, digits, `_` and `.`, and must start with a letter.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PermissionId(String);

impl PermissionId {
    /// Creates a validated permission key.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();

        if value.is_empty() || value.len() > PERMISSION_ID_MAX_LENGTH {
            return Err(AppError::Validation(format!(
                "permission id must be between 1 and {PERMISSION_ID_MAX_LENGTH} characters"
            )));
        }

        let mut chars = value.chars();
        let starts_with_letter = chars.next().is_some_and(|first| first.is_ascii_lowercase());
        let rest_is_valid = chars.all(|character| {
            character.is_ascii_lowercase()
                || character.is_ascii_digit()
                || character == '_'
                || character == '.'
        });

        if !starts_with_letter || !rest_is_valid {
            return Err(AppError::Validation(format!(
                "invalid permission id '{value}'"
            )));
        }

        Ok(Self(value))
    }

    /// Returns the storage value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl FromStr for PermissionId {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::new(value)
    }
}

impl TryFrom<String> for PermissionId {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PermissionId> for String {
    fn from(value: PermissionId) -> Self {
        value.0
    }
}

impl std::fmt::Display for PermissionId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// A grantable permission record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Permission {
    /// Stable key.
    pub id: PermissionId,
    /// Display label.
    pub name: String,
    /// Grouping label.
    pub category: String,
}

impl Permission {
    /// Creates a permission record, rejecting blank labels.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
    ) -> AppResult<Self> {
        let id = PermissionId::new(id)?;
        let name = name.into();
        let category = category.into();

        if name.trim().is_empty() {
            return Err(AppError::Validation(format!(
                "permission '{id}' must have a display name"
            )));
        }

        if category.trim().is_empty() {
            return Err(AppError::Validation(format!(
                "permission '{id}' must have a category"
            )));
        }

        Ok(Self { id, name, category })
    }
}
