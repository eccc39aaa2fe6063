//! The policy decision point.
//!
//! Resolution is first-match-wins over the repository's stable order:
//! the first applicable policy whose condition evaluates true determines
//! the outcome, and a `DENY` listed after a matching `ALLOW` is never
//! reached. Default posture is deny — no applicable policy, or no matching
//! condition, denies.

use std::sync::Arc;

use agora_types::Subject;
use serde_json::Value;
use tracing::{debug, warn};

use crate::context::EvaluationContext;
use crate::evaluator::evaluate;
use crate::policy::Effect;
use crate::repository::PolicyRepository;

/// Decides allow/deny for `(subject, action, resource, context)` requests.
///
/// Stateless apart from the repository handle; safe to call from many
/// requests in parallel.
#[derive(Clone)]
pub struct PolicyDecisionPoint {
    repository: Arc<dyn PolicyRepository>,
}

impl PolicyDecisionPoint {
    /// Creates a PDP over the given repository.
    pub fn new(repository: Arc<dyn PolicyRepository>) -> Self {
        Self { repository }
    }

    /// Evaluates the request against the current policy set.
    ///
    /// Never fails: the condition evaluator is total, so a defective policy
    /// can at worst not match. Worst case is deny.
    pub fn decide(
        &self,
        subject: &Subject,
        action: &str,
        resource: &str,
        request_context: Value,
    ) -> bool {
        let policies = self.repository.policies();
        let applicable: Vec<_> = policies
            .iter()
            .filter(|policy| policy.applies_to(action, resource))
            .collect();

        if applicable.is_empty() {
            warn!(
                subject = %subject.id,
                action,
                resource,
                "no applicable policy, denying by default"
            );
            return false;
        }

        let ctx = EvaluationContext::new(subject, request_context);

        for policy in applicable {
            if evaluate(&policy.conditions, &ctx) {
                let allowed = policy.effect == Effect::Allow;
                if allowed {
                    debug!(
                        subject = %subject.id,
                        action,
                        resource,
                        policy = %policy.name,
                        "policy matched, allowing"
                    );
                } else {
                    warn!(
                        subject = %subject.id,
                        action,
                        resource,
                        policy = %policy.name,
                        "policy matched, denying"
                    );
                }
                return allowed;
            }
        }

        warn!(
            subject = %subject.id,
            action,
            resource,
            "no policy condition matched, denying"
        );
        false
    }
}

// ============================================================================
// Tests
// ============================================================================
