//! Effective permission computation.
//!
//! A user's effective permission set is the union of the permission codes
//! granted by each role the user holds. The computation is a deterministic
//! function of directory state, which is what makes the cache's idempotent
//! double-write behavior safe under concurrent misses.

use std::collections::BTreeSet;
use std::sync::Arc;

use agora_types::{PermissionCode, UserId};

use crate::directory::{Result, RoleDirectory};

/// Computes effective permission sets with an explicit two-hop lookup:
/// user → role ids, role ids → permission codes.
#[derive(Clone)]
pub struct PermissionAggregator {
    directory: Arc<dyn RoleDirectory>,
}

impl PermissionAggregator {
    /// Creates an aggregator over the given directory.
    pub fn new(directory: Arc<dyn RoleDirectory>) -> Self {
        Self { directory }
    }

    /// Returns the union of permission codes reachable from the user's roles.
    ///
    /// Duplicates across roles collapse; a user with no roles gets the empty
    /// set, which is not an error. Only an unknown user id fails, with
    /// [`crate::DirectoryError::UserNotFound`] propagated from the directory.
    pub fn compute_permissions(&self, user: &UserId) -> Result<BTreeSet<PermissionCode>> {
        let mut codes = BTreeSet::new();
        for role in self.directory.user_roles(user)? {
            codes.extend(self.directory.role_permission_codes(role)?);
        }
        Ok(codes)
    }
}

// ============================================================================
// Tests
// ============================================================================
