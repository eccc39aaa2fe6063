//! ABAC policy records.
//!
//! A policy pairs one condition tree with an effect, scoped to the
//! resources and actions it applies to. Policies are read fresh on every
//! decision — they change decision semantics structurally, so they are
//! never cached the way permission sets are.

use agora_types::PolicyId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::condition::Condition;

// ============================================================================
// Effect
// ============================================================================

/// The effect of a matching policy: allow or deny access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Effect {
    /// Grant access.
    Allow,
    /// Deny access.
    Deny,
}

impl Default for Effect {
    /// Defaults to `Deny` (safe default: deny unless explicitly allowed).
    fn default() -> Self {
        Self::Deny
    }
}

// ============================================================================
// Policy
// ============================================================================

/// Error type for policy construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    /// `resources` and `actions` must be non-empty.
    #[error("policy '{0}' must name at least one resource and one action")]
    EmptyScope(String),

    /// A policy with the same unique name already exists.
    #[error("duplicate policy name '{0}'")]
    DuplicateName(String),
}

/// A named ABAC rule.
///
/// `resources` and `actions` are ordered lists of strings and may contain
/// the wildcard `"*"`. Both are non-empty, enforced at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    pub id: PolicyId,
    pub name: String,
    pub description: String,
    pub conditions: Condition,
    pub effect: Effect,
    pub resources: Vec<String>,
    pub actions: Vec<String>,
}

impl Policy {
    /// Creates a policy, rejecting an empty resource or action scope.
    pub fn new(
        id: PolicyId,
        name: impl Into<String>,
        description: impl Into<String>,
        conditions: Condition,
        effect: Effect,
        resources: Vec<String>,
        actions: Vec<String>,
    ) -> Result<Self, PolicyError> {
        let name = name.into();
        if resources.is_empty() || actions.is_empty() {
            return Err(PolicyError::EmptyScope(name));
        }
        Ok(Self {
            id,
            name,
            description: description.into(),
            conditions,
            effect,
            resources,
            actions,
        })
    }

    /// Returns whether this policy applies to the `(action, resource)` pair.
    ///
    /// Applicable iff `resources` contains the resource or `"*"`, and
    /// `actions` contains the action or `"*"`.
    pub fn applies_to(&self, action: &str, resource: &str) -> bool {
        let resource_match = self
            .resources
            .iter()
            .any(|r| r == resource || r == "*");
        let action_match = self.actions.iter().any(|a| a == action || a == "*");
        resource_match && action_match
    }
}

// ============================================================================
// Tests
// ============================================================================
