//! Process-local explanation cache, owned by the resolver.
//!
//! Entries are written once per key (first resolution wins) and, under the
//! default [`NeverEvict`] policy, live for the lifetime of the process. That
//! means the map grows with the number of distinct (interest, concept) pairs
//! ever requested; [`ExplanationCache::len`] exposes the current size. The
//! [`Clock`] and [`EvictionPolicy`] seams exist so a bounded policy can be
//! swapped in and tested without touching the resolver.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

use crate::explain::{Explanation, ExplanationRequest};

// ── Key ───────────────────────────────────────────────────────────────────────

/// Composite cache key. Two separate fields, so `("a:b", "c")` and
/// `("a", "b:c")` never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    interest: String,
    concept: String,
}

impl CacheKey {
    pub fn new(interest: &str, concept: &str) -> Self {
        Self {
            interest: interest.trim().to_string(),
            concept: concept.trim().to_string(),
        }
    }
}

impl From<&ExplanationRequest> for CacheKey {
    fn from(req: &ExplanationRequest) -> Self {
        Self::new(&req.interest, &req.concept)
    }
}

// For logs only; not used for lookup.
impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}/{:?}", self.interest, self.concept)
    }
}

// ── Seams ─────────────────────────────────────────────────────────────────────

pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Decides whether a stored entry is still servable.
pub trait EvictionPolicy: Send + Sync + fmt::Debug {
    fn is_expired(&self, inserted_at: Instant, now: Instant) -> bool;
}

/// Keep everything forever.
#[derive(Debug, Default)]
pub struct NeverEvict;

impl EvictionPolicy for NeverEvict {
    fn is_expired(&self, _inserted_at: Instant, _now: Instant) -> bool {
        false
    }
}

/// Drop entries older than the given age; they are removed lazily on access.
#[derive(Debug)]
pub struct ExpireAfter(pub Duration);

impl EvictionPolicy for ExpireAfter {
    fn is_expired(&self, inserted_at: Instant, now: Instant) -> bool {
        now.saturating_duration_since(inserted_at) >= self.0
    }
}

// ── Cache ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct Entry {
    value: Explanation,
    inserted_at: Instant,
}

#[derive(Debug)]
pub struct ExplanationCache {
    entries: RwLock<HashMap<CacheKey, Entry>>,
    clock: Arc<dyn Clock>,
    policy: Arc<dyn EvictionPolicy>,
}

impl Default for ExplanationCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ExplanationCache {
    /// Empty cache with the system clock and no eviction.
    pub fn new() -> Self {
        Self::with_policy(Arc::new(SystemClock), Arc::new(NeverEvict))
    }

    pub fn with_policy(clock: Arc<dyn Clock>, policy: Arc<dyn EvictionPolicy>) -> Self {
        Self { entries: RwLock::new(HashMap::new()), clock, policy }
    }

    /// Return the stored value for `key`, if present and not expired.
    pub fn get(&self, key: &CacheKey) -> Option<Explanation> {
        let now = self.clock.now();
        {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            match entries.get(key) {
                None => return None,
                Some(e) if !self.policy.is_expired(e.inserted_at, now) => {
                    return Some(e.value.clone());
                }
                Some(_) => {}
            }
        }
        // Expired: drop it so the next resolution can write a fresh entry.
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries
            .get(key)
            .is_some_and(|e| self.policy.is_expired(e.inserted_at, now))
        {
            entries.remove(key);
        }
        None
    }

    /// Store `value` unless a live entry already exists. Returns whichever
    /// value ends up stored, so the first writer wins.
    pub fn insert(&self, key: CacheKey, value: Explanation) -> Explanation {
        self.get_or_insert_with(key, move || value)
    }

    /// Return the live entry for `key`, or store and return `make()`.
    /// `make` runs under the write lock and must not block.
    pub fn get_or_insert_with(&self, key: CacheKey, make: impl FnOnce() -> Explanation) -> Explanation {
        let now = self.clock.now();
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(e) = entries.get(&key) {
            if !self.policy.is_expired(e.inserted_at, now) {
                return e.value.clone();
            }
        }
        let value = make();
        entries.insert(key, Entry { value: value.clone(), inserted_at: now });
        value
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.get(key).is_some()
    }

    /// Number of stored entries, including expired ones not yet removed.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
