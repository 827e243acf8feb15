use std::str::FromStr;

use serde::{Deserialize, Serialize};
use wqp_core::AppError;

/// Decides which role source answers "what can this user do".
///
/// A user carries both a legacy scalar role label and relational role
/// memberships. Nothing keeps the two in sync, so the integrator picks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegacyRolePolicy {
    /// Only relational memberships count. The label is ignored.
    #[default]
    RelationalOnly,
    /// Only grants stored under the label count.
    LegacyLabelOnly,
    /// Relational memberships plus grants stored under the label.
    Union,
}

impl LegacyRolePolicy {
    /// Returns a stable configuration value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RelationalOnly => "relational_only",
            Self::LegacyLabelOnly => "legacy_label_only",
            Self::Union => "union",
        }
    }

    /// Returns whether relational memberships contribute grants.
    #[must_use]
    pub fn uses_memberships(&self) -> bool {
        matches!(self, Self::RelationalOnly | Self::Union)
    }

    /// Returns whether the legacy label contributes grants.
    #[must_use]
    pub fn uses_legacy_label(&self) -> bool {
        matches!(self, Self::LegacyLabelOnly | Self::Union)
    }
}

impl FromStr for LegacyRolePolicy {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "relational_only" => Ok(Self::RelationalOnly),
            "legacy_label_only" => Ok(Self::LegacyLabelOnly),
            "union" => Ok(Self::Union),
            other => Err(AppError::Validation(format!(
                "unknown legacy role policy '{other}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::LegacyRolePolicy;

    #[test]
    fn policy_roundtrips_configuration_value() {
        for policy in [
            LegacyRolePolicy::RelationalOnly,
            LegacyRolePolicy::LegacyLabelOnly,
            LegacyRolePolicy::Union,
        ] {
            assert_eq!(LegacyRolePolicy::from_str(policy.as_str()).ok(), Some(policy));
        }
    }

    #[test]
    fn union_uses_both_sources() {
        assert!(LegacyRolePolicy::Union.uses_memberships());
        assert!(LegacyRolePolicy::Union.uses_legacy_label());
        assert!(!LegacyRolePolicy::RelationalOnly.uses_legacy_label());
        assert!(!LegacyRolePolicy::LegacyLabelOnly.uses_memberships());
    }

    #[test]
    fn unknown_policy_is_rejected() {
        assert!(LegacyRolePolicy::from_str("scalar").is_err());
    }
}
