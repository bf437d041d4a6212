use crate::models::Role;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// CACHE_DURATION
///
/// The validity window of a cached role lookup, and simultaneously the sweep
/// interval. Sweep frequency equal to TTL is a deliberate trade-off between
/// staleness window and sweep overhead; it is a fixed constant, not tunable at
/// call sites.
pub const CACHE_DURATION: Duration = Duration::from_secs(5 * 60);

/// RoleCacheEntry
///
/// One cached role lookup. An entry is valid for exactly the cache TTL from
/// `cached_at`; expired entries are never returned and are purged by the sweep.
#[derive(Debug, Clone, Copy)]
struct RoleCacheEntry {
    role: Role,
    cached_at: Instant,
}

/// RoleCache
///
/// Process-wide cache of role lookups, keyed by user id, shared across all
/// concurrent requests to avoid redundant calls to the external profile store.
///
/// This is an explicitly constructed, injectable object (held as
/// `Arc<RoleCache>` in the application state) rather than an ambient singleton,
/// so tests can drive time deterministically through the `*_at` variants and
/// inspect eviction directly.
///
/// Concurrency: the underlying map provides atomic per-key operations, so
/// lookups and the periodic sweep may interleave freely. Eviction racing a read
/// yields a miss on one side, never a panic, and no entry older than the TTL is
/// ever returned.
pub struct RoleCache {
    entries: DashMap<Uuid, RoleCacheEntry>,
    ttl: Duration,
}

impl Default for RoleCache {
    fn default() -> Self {
        Self::new()
    }
}

impl RoleCache {
    /// Creates a cache with the canonical 5-minute TTL.
    pub fn new() -> Self {
        Self::with_ttl(CACHE_DURATION)
    }

    /// Creates a cache with an explicit TTL. Production code uses `new`; this
    /// constructor exists so tests can exercise expiry without waiting.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// get
    ///
    /// Returns the cached role if an unexpired entry exists, else `None` —
    /// a miss means the caller must perform a fresh lookup and then `put`.
    pub fn get(&self, user_id: &Uuid) -> Option<Role> {
        self.get_at(user_id, Instant::now())
    }

    /// get_at
    ///
    /// Clock-explicit variant of `get`; `now` is injected so tests can assert
    /// expiry deterministically.
    pub fn get_at(&self, user_id: &Uuid, now: Instant) -> Option<Role> {
        let entry = self.entries.get(user_id)?;
        // An entry at exactly the TTL boundary is already stale.
        if now.duration_since(entry.cached_at) >= self.ttl {
            return None;
        }
        Some(entry.role)
    }

    /// put
    ///
    /// Inserts or overwrites the entry for `user_id`, stamped with the current time.
    pub fn put(&self, user_id: Uuid, role: Role) {
        self.put_at(user_id, role, Instant::now());
    }

    /// Clock-explicit variant of `put`.
    pub fn put_at(&self, user_id: Uuid, role: Role, now: Instant) {
        self.entries.insert(
            user_id,
            RoleCacheEntry {
                role,
                cached_at: now,
            },
        );
    }

    /// sweep
    ///
    /// Evicts every entry whose age exceeds the TTL. This bounds memory growth
    /// under unbounded distinct user ids; entries younger than the TTL are
    /// never removed.
    pub fn sweep(&self) {
        self.sweep_at(Instant::now());
    }

    /// Clock-explicit variant of `sweep`.
    pub fn sweep_at(&self, now: Instant) {
        self.entries
            .retain(|_, entry| now.duration_since(entry.cached_at) < self.ttl);
    }

    /// Number of live entries, expired or not. Exposed for sweep assertions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// spawn_sweeper
///
/// Starts the background sweep task: a fixed wall-clock interval equal to the
/// TTL, independent of request traffic. The task holds a weak-free `Arc` and
/// runs for the life of the process; it is torn down only on process exit.
pub fn spawn_sweeper(cache: Arc<RoleCache>) -> tokio::task::JoinHandle<()> {
    let period = cache.ttl();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        // The first tick fires immediately; skip it so the initial sweep runs
        // one full period after startup.
        interval.tick().await;
        loop {
            interval.tick().await;
            cache.sweep();
            tracing::debug!("role cache swept, {} entries remain", cache.len());
        }
    })
}
