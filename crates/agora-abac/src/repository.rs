//! Policy storage collaborator.
//!
//! The PDP reads the full policy set on every decision through the
//! [`PolicyRepository`] trait. The contract is correctness, not an index:
//! no filtering is pushed to storage, and the returned order must be stable
//! across calls because first-match-wins resolution makes it load-bearing.

use std::sync::RwLock;

use agora_types::PolicyId;

use crate::policy::{Policy, PolicyError};

/// Read-only supplier of the current policy set.
pub trait PolicyRepository: Send + Sync {
    /// Returns all policies in a stable, deterministic order.
    fn policies(&self) -> Vec<Policy>;
}

/// In-memory [`PolicyRepository`] preserving insertion order.
///
/// Administrative CRUD lives here; decisions only ever read.
#[derive(Debug, Default)]
pub struct InMemoryPolicyRepository {
    policies: RwLock<Vec<Policy>>,
}

impl InMemoryPolicyRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a policy, rejecting a duplicate name.
    pub fn add(&self, policy: Policy) -> Result<(), PolicyError> {
        let mut policies = self.policies.write().expect("policy lock poisoned");
        if policies.iter().any(|p| p.name == policy.name) {
            return Err(PolicyError::DuplicateName(policy.name));
        }
        policies.push(policy);
        Ok(())
    }

    /// Removes the policy with the given id. No-op if absent.
    ///
    /// The relative order of the remaining policies is preserved.
    pub fn remove(&self, id: PolicyId) {
        let mut policies = self.policies.write().expect("policy lock poisoned");
        policies.retain(|p| p.id != id);
    }
}

impl PolicyRepository for InMemoryPolicyRepository {
    fn policies(&self) -> Vec<Policy> {
        self.policies.read().expect("policy lock poisoned").clone()
    }
}
