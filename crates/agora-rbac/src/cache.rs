//! Read-through permission cache.
//!
//! Sits in front of the aggregator and serves effective permission sets
//! from a key/value store with per-entry TTL. The cache is a performance
//! artifact over a deterministic computation, never a source of truth.
//!
//! State machine per key:
//!
//! ```text
//! ABSENT ──compute──▶ PRESENT(ttl) ──invalidate / expiry──▶ ABSENT
//! ```
//!
//! Reads never reset the TTL (no sliding expiration). Two concurrent misses
//! for the same user may both compute and both write; the write is
//! idempotent, so the race costs duplicated work only.
//!
//! If the store itself fails, the cache degrades to recompute-without-store:
//! treat as a miss, answer from the aggregator, skip the write. It never
//! fails open.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use agora_types::{PermissionCode, UserId};
use thiserror::Error;
use tracing::{debug, warn};

use crate::aggregator::PermissionAggregator;
use crate::clock::Clock;
use crate::directory;

/// Error type for cache store operations.
///
/// Store failures never surface to decision callers; the cache absorbs them
/// and recomputes from the aggregator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    /// The backing store is unreachable or rejected the operation.
    #[error("cache store unavailable: {0}")]
    Unavailable(String),
}

/// Key/value store with per-entry TTL, addressed by opaque string keys.
///
/// Matches the subset of a Redis-style contract the cache needs: get,
/// set-with-expiry, delete. Values are opaque strings (the cache stores
/// JSON arrays of permission codes).
pub trait CacheStore: Send + Sync {
    /// Returns the live value for `key`, or `None` if absent or expired.
    fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Stores `value` under `key`, expiring after `ttl`.
    fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    /// Deletes the entry for `key`. No-op if absent.
    fn delete(&self, key: &str) -> Result<(), CacheError>;
}

// ============================================================================
// InMemoryCacheStore
// ============================================================================

/// In-memory [`CacheStore`] with store-side expiry, like Redis `SETEX`.
///
/// Expiry is checked lazily on read against the injected clock; expired
/// entries behave exactly like absent ones.
pub struct InMemoryCacheStore {
    clock: Arc<dyn Clock>,
    entries: RwLock<HashMap<String, StoredEntry>>,
}

struct StoredEntry {
    value: String,
    expires_at_ms: u64,
}

impl InMemoryCacheStore {
    /// Creates an empty store reading time from `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl CacheStore for InMemoryCacheStore {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let now = self.clock.now_ms();
        let entries = self.entries.read().expect("cache store lock poisoned");
        Ok(entries
            .get(key)
            .filter(|entry| entry.expires_at_ms > now)
            .map(|entry| entry.value.clone()))
    }

    fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let expires_at_ms = self
            .clock
            .now_ms()
            .saturating_add(u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX));
        let mut entries = self.entries.write().expect("cache store lock poisoned");
        entries.insert(
            key.to_string(),
            StoredEntry {
                value: value.to_string(),
                expires_at_ms,
            },
        );
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut entries = self.entries.write().expect("cache store lock poisoned");
        entries.remove(key);
        Ok(())
    }
}

// ============================================================================
// PermissionCache
// ============================================================================

/// Default TTL for cached permission sets.
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Read-through cache over the permission aggregator.
///
/// Constructed once per process and shared by reference; holds no hidden
/// static state. The TTL is fixed at construction and counts from write
/// time.
#[derive(Clone)]
pub struct PermissionCache {
    aggregator: PermissionAggregator,
    store: Arc<dyn CacheStore>,
    ttl: Duration,
}

impl PermissionCache {
    /// Creates a cache over `aggregator` backed by `store`.
    pub fn new(aggregator: PermissionAggregator, store: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        Self {
            aggregator,
            store,
            ttl,
        }
    }

    fn key(user: &UserId) -> String {
        format!("user_permissions:{user}")
    }

    /// Returns the user's effective permission codes.
    ///
    /// Cache hit returns the stored set; miss computes via the aggregator,
    /// stores the result with the configured TTL, and returns it. Store
    /// failures (and undecodable entries) are treated as misses.
    pub fn get_user_permissions(
        &self,
        user: &UserId,
    ) -> directory::Result<BTreeSet<PermissionCode>> {
        let key = Self::key(user);

        match self.store.get(&key) {
            Ok(Some(raw)) => match serde_json::from_str::<BTreeSet<PermissionCode>>(&raw) {
                Ok(codes) => {
                    debug!(user = %user, "permission cache hit");
                    return Ok(codes);
                }
                Err(error) => {
                    warn!(user = %user, %error, "undecodable cache entry, recomputing");
                }
            },
            Ok(None) => {}
            Err(error) => {
                warn!(user = %user, %error, "cache store unavailable, recomputing");
                // Fail closed to recompute: answer from the aggregator and
                // skip the write while the store is down.
                return self.aggregator.compute_permissions(user);
            }
        }

        let codes = self.aggregator.compute_permissions(user)?;
        match serde_json::to_string(&codes) {
            Ok(raw) => {
                if let Err(error) = self.store.set_with_ttl(&key, &raw, self.ttl) {
                    warn!(user = %user, %error, "cache store write failed");
                }
            }
            Err(error) => warn!(user = %user, %error, "cache entry serialization failed"),
        }
        Ok(codes)
    }

    /// Returns whether the user holds the given permission code.
    pub fn has_permission(&self, user: &UserId, code: &PermissionCode) -> directory::Result<bool> {
        Ok(self.get_user_permissions(user)?.contains(code))
    }

    /// Returns whether the user holds every code in `required`.
    ///
    /// An empty `required` list trivially returns `true`.
    pub fn has_all_permissions(
        &self,
        user: &UserId,
        required: &[PermissionCode],
    ) -> directory::Result<bool> {
        if required.is_empty() {
            return Ok(true);
        }
        let held = self.get_user_permissions(user)?;
        Ok(required.iter().all(|code| held.contains(code)))
    }

    /// Unconditionally evicts the user's cache entry. No-op if absent.
    pub fn invalidate(&self, user: &UserId) {
        if let Err(error) = self.store.delete(&Self::key(user)) {
            warn!(user = %user, %error, "cache invalidation failed");
        }
    }

    /// Invalidates and eagerly repopulates the user's entry, so a freshly
    /// issued session reflects current permissions immediately.
    pub fn refresh(&self, user: &UserId) -> directory::Result<BTreeSet<PermissionCode>> {
        self.invalidate(user);
        self.get_user_permissions(user)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::directory::{InMemoryDirectory, Result as DirResult, RoleDirectory};
    use agora_types::RoleId;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Directory wrapper that counts aggregator lookups, so tests can
    /// observe whether a read was served from cache or recomputed.
    struct CountingDirectory {
        inner: Arc<InMemoryDirectory>,
        lookups: AtomicUsize,
    }

    impl CountingDirectory {
        fn new(inner: Arc<InMemoryDirectory>) -> Self {
            Self {
                inner,
                lookups: AtomicUsize::new(0),
            }
        }

        fn lookups(&self) -> usize {
            self.lookups.load(Ordering::SeqCst)
        }
    }

    impl RoleDirectory for CountingDirectory {
        fn user_roles(&self, user: &UserId) -> DirResult<std::collections::BTreeSet<RoleId>> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.inner.user_roles(user)
        }

        fn role_permission_codes(
            &self,
            role: RoleId,
        ) -> DirResult<BTreeSet<PermissionCode>> {
            self.inner.role_permission_codes(role)
        }
    }

    /// Store that always fails, standing in for an unreachable backend.
    struct DownStore;

    impl CacheStore for DownStore {
        fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
            Err(CacheError::Unavailable("connection refused".into()))
        }

        fn set_with_ttl(&self, _: &str, _: &str, _: Duration) -> Result<(), CacheError> {
            Err(CacheError::Unavailable("connection refused".into()))
        }

        fn delete(&self, _key: &str) -> Result<(), CacheError> {
            Err(CacheError::Unavailable("connection refused".into()))
        }
    }

    fn seeded_directory() -> (Arc<InMemoryDirectory>, UserId) {
        let directory = Arc::new(InMemoryDirectory::new());
        let perm = directory
            .create_permission("product:create", "Create product", "")
            .expect("perm");
        let role = directory.create_role("seller", "").expect("role");
        directory.add_permission_to_role(role, perm).expect("grant");
        let user = UserId::from("alice");
        directory.assign_role(&user, role).expect("assign");
        (directory, user)
    }

    fn cache_with_counter(
        ttl: Duration,
        clock: Arc<ManualClock>,
    ) -> (PermissionCache, Arc<CountingDirectory>, UserId) {
        let (directory, user) = seeded_directory();
        let counting = Arc::new(CountingDirectory::new(directory));
        let store = Arc::new(InMemoryCacheStore::new(clock));
        let cache = PermissionCache::new(
            PermissionAggregator::new(counting.clone()),
            store,
            ttl,
        );
        (cache, counting, user)
    }

    #[test]
    fn read_through_hits_after_first_miss() {
        let clock = Arc::new(ManualClock::starting_at(0));
        let (cache, counting, user) = cache_with_counter(DEFAULT_TTL, clock);

        let first = cache.get_user_permissions(&user).expect("first read");
        assert!(first.contains(&"product:create".into()));
        assert_eq!(counting.lookups(), 1);

        let second = cache.get_user_permissions(&user).expect("second read");
        assert_eq!(second, first);
        // Served from cache, no second aggregator call
        assert_eq!(counting.lookups(), 1);
    }

    #[test]
    fn invalidate_forces_recompute() {
        let clock = Arc::new(ManualClock::starting_at(0));
        let (cache, counting, user) = cache_with_counter(DEFAULT_TTL, clock);

        cache.get_user_permissions(&user).expect("warm");
        assert_eq!(counting.lookups(), 1);

        cache.invalidate(&user);
        cache.get_user_permissions(&user).expect("after invalidate");
        assert_eq!(counting.lookups(), 2);

        // Invalidating an absent entry is a no-op
        cache.invalidate(&UserId::from("nobody"));
    }

    #[test]
    fn ttl_expiry_forces_recompute() {
        let clock = Arc::new(ManualClock::starting_at(0));
        let (cache, counting, user) =
            cache_with_counter(Duration::from_secs(3600), clock.clone());

        cache.get_user_permissions(&user).expect("warm");
        clock.advance_ms(3_600_001);
        cache.get_user_permissions(&user).expect("after expiry");
        assert_eq!(counting.lookups(), 2);
    }

    #[test]
    fn reads_do_not_slide_expiration() {
        let clock = Arc::new(ManualClock::starting_at(0));
        let (cache, counting, user) =
            cache_with_counter(Duration::from_secs(3600), clock.clone());

        cache.get_user_permissions(&user).expect("warm");

        // Read repeatedly just before expiry; the TTL must still count from
        // the original write.
        clock.advance_ms(3_000_000);
        cache.get_user_permissions(&user).expect("near expiry");
        assert_eq!(counting.lookups(), 1);

        clock.advance_ms(700_000); // 3700s after the write
        cache.get_user_permissions(&user).expect("past expiry");
        assert_eq!(counting.lookups(), 2);
    }

    #[test]
    fn empty_required_codes_is_trivially_true() {
        let clock = Arc::new(ManualClock::starting_at(0));
        let (cache, counting, user) = cache_with_counter(DEFAULT_TTL, clock);

        assert!(cache.has_all_permissions(&user, &[]).expect("empty"));
        // No lookup needed for the empty requirement
        assert_eq!(counting.lookups(), 0);
    }

    #[test]
    fn has_all_requires_every_code() {
        let clock = Arc::new(ManualClock::starting_at(0));
        let (cache, _, user) = cache_with_counter(DEFAULT_TTL, clock);

        assert!(
            cache
                .has_all_permissions(&user, &["product:create".into()])
                .expect("single")
        );
        assert!(
            !cache
                .has_all_permissions(&user, &["product:create".into(), "shop:delete".into()])
                .expect("pair")
        );
    }

    #[test]
    fn refresh_eagerly_repopulates() {
        let (directory, user) = seeded_directory();
        let counting = Arc::new(CountingDirectory::new(directory.clone()));
        let clock = Arc::new(ManualClock::starting_at(0));
        let store = Arc::new(InMemoryCacheStore::new(clock));
        let cache = PermissionCache::new(
            PermissionAggregator::new(counting.clone()),
            store,
            DEFAULT_TTL,
        );

        cache.get_user_permissions(&user).expect("warm");

        // Mutation upstream: grant a new permission to the seller role
        let read = directory
            .create_permission("order:read", "Read orders", "")
            .expect("perm");
        let role = directory.role_by_name("seller").expect("role");
        directory.add_permission_to_role(role, read).expect("grant");

        let refreshed = cache.refresh(&user).expect("refresh");
        assert!(refreshed.contains(&"order:read".into()));

        // The refreshed entry serves subsequent reads
        let lookups_after_refresh = counting.lookups();
        cache.get_user_permissions(&user).expect("cached");
        assert_eq!(counting.lookups(), lookups_after_refresh);
    }

    #[test]
    fn store_outage_degrades_to_recompute() {
        let (directory, user) = seeded_directory();
        let counting = Arc::new(CountingDirectory::new(directory));
        let cache = PermissionCache::new(
            PermissionAggregator::new(counting.clone()),
            Arc::new(DownStore),
            DEFAULT_TTL,
        );

        // Every read recomputes while the store is down; answers stay correct
        let codes = cache.get_user_permissions(&user).expect("first");
        assert!(codes.contains(&"product:create".into()));
        cache.get_user_permissions(&user).expect("second");
        assert_eq!(counting.lookups(), 2);

        // Invalidation against a down store must not panic
        cache.invalidate(&user);
    }

    #[test]
    fn undecodable_entry_is_treated_as_miss() {
        let (directory, user) = seeded_directory();
        let counting = Arc::new(CountingDirectory::new(directory));
        let clock = Arc::new(ManualClock::starting_at(0));
        let store = Arc::new(InMemoryCacheStore::new(clock));
        store
            .set_with_ttl("user_permissions:alice", "not json", DEFAULT_TTL)
            .expect("poison");

        let cache = PermissionCache::new(
            PermissionAggregator::new(counting.clone()),
            store,
            DEFAULT_TTL,
        );
        let codes = cache.get_user_permissions(&user).expect("read");
        assert!(codes.contains(&"product:create".into()));
        assert_eq!(counting.lookups(), 1);
    }
}
