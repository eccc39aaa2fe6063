//! # agora-authz: the authorization facade
//!
//! The two decision entry points request-handling middleware calls:
//!
//! - [`Authorizer::authorize_by_permissions`] — coarse RBAC: does the
//!   subject hold every required permission code? Served through the
//!   read-through permission cache.
//! - [`Authorizer::authorize_by_policy`] — fine ABAC: does a policy allow
//!   this `(action, resource, context)` request? Always evaluated fresh.
//!
//! The entry points are deliberately independent — they protect different
//! kinds of endpoints and are not composed into a single call.
//!
//! Authentication is a precondition enforced upstream, but the facade never
//! silently authorizes an anonymous caller: a missing subject is
//! [`AuthzError::Unauthenticated`], which callers treat as deny.
//!
//! ## Examples
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use agora_abac::{InMemoryPolicyRepository, PolicyDecisionPoint};
//! use agora_authz::Authorizer;
//! use agora_rbac::clock::SystemClock;
//! use agora_rbac::{InMemoryCacheStore, InMemoryDirectory, PermissionAggregator, PermissionCache};
//! use agora_types::{Subject, UserId};
//!
//! let directory = Arc::new(InMemoryDirectory::new());
//! let perm = directory.create_permission("product:create", "Create product", "")?;
//! let seller = directory.create_role("seller", "Marketplace seller")?;
//! directory.add_permission_to_role(seller, perm)?;
//! let alice = UserId::from("alice");
//! directory.assign_role(&alice, seller)?;
//!
//! let cache = PermissionCache::new(
//!     PermissionAggregator::new(directory),
//!     Arc::new(InMemoryCacheStore::new(Arc::new(SystemClock))),
//!     Duration::from_secs(3600),
//! );
//! let pdp = PolicyDecisionPoint::new(Arc::new(InMemoryPolicyRepository::new()));
//! let authz = Authorizer::new(cache, pdp);
//!
//! let subject = Subject::new("alice", "alice@example.com").with_role("seller");
//! assert!(authz.authorize_by_permissions(Some(&subject), &["product:create".into()])?);
//! # Ok::<(), agora_authz::AuthzError>(())
//! ```

use std::collections::BTreeSet;

use agora_abac::PolicyDecisionPoint;
use agora_rbac::{DirectoryError, PermissionCache};
use agora_types::{PermissionCode, Subject, UserId};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

/// Error type for facade decisions.
///
/// Only these surface to callers; every anomaly inside condition evaluation
/// is absorbed into a deny outcome downstream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthzError {
    /// No subject was resolved for the request. Callers treat this as deny.
    #[error("no authenticated subject")]
    Unauthenticated,

    /// A referenced user/role/permission does not exist — a caller bug,
    /// not an authorization outcome.
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

/// Result type for facade decisions.
pub type Result<T> = std::result::Result<T, AuthzError>;

/// The authorization decision facade.
///
/// Constructed once per process and shared by reference across request
/// handlers; both engines are safe for concurrent use.
#[derive(Clone)]
pub struct Authorizer {
    cache: PermissionCache,
    pdp: PolicyDecisionPoint,
}

impl Authorizer {
    /// Creates a facade over the permission cache and the PDP.
    pub fn new(cache: PermissionCache, pdp: PolicyDecisionPoint) -> Self {
        Self { cache, pdp }
    }

    /// Coarse RBAC check: the subject must hold every code in `required`.
    ///
    /// An empty `required` list means "no restriction" and allows. A missing
    /// subject is [`AuthzError::Unauthenticated`], never a silent allow.
    pub fn authorize_by_permissions(
        &self,
        subject: Option<&Subject>,
        required: &[PermissionCode],
    ) -> Result<bool> {
        let Some(subject) = subject else {
            warn!("permission check without authenticated subject");
            return Err(AuthzError::Unauthenticated);
        };
        if required.is_empty() {
            return Ok(true);
        }
        Ok(self.cache.has_all_permissions(&subject.id, required)?)
    }

    /// Fine ABAC check: first-match-wins policy decision for the request.
    pub fn authorize_by_policy(
        &self,
        subject: Option<&Subject>,
        action: &str,
        resource: &str,
        request_context: Value,
    ) -> Result<bool> {
        let Some(subject) = subject else {
            warn!(action, resource, "policy check without authenticated subject");
            return Err(AuthzError::Unauthenticated);
        };
        Ok(self.pdp.decide(subject, action, resource, request_context))
    }

    /// Evicts the user's cached permission set.
    ///
    /// Role/permission mutation flows call this for every affected user;
    /// logout calls it so a stale session cannot outlive its grants.
    pub fn invalidate_user_permissions(&self, user: &UserId) {
        self.cache.invalidate(user);
    }

    /// Evicts and eagerly recomputes the user's permission set, so a
    /// freshly issued session reflects current permissions immediately.
    pub fn refresh_user_permissions(&self, user: &UserId) -> Result<BTreeSet<PermissionCode>> {
        Ok(self.cache.refresh(user)?)
    }
}
