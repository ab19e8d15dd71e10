//! TTL+LRU validation cache (§4.D).
//!
//! Grounded on the teacher's `MemoryBudgetCache` (`lru::LruCache` guarded by
//! `parking_lot::Mutex`, with a metrics struct), retargeted from byte-budget
//! partition eviction to entry-count + TTL eviction of `ValidationVerdict`s.

use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use lru::LruCache;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Outcome of a single structural validation, cached by key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationVerdict {
    pub found: Option<bool>,
    pub confidence: f64,
    pub reason: String,
    pub suggestions: Vec<String>,
}

impl ValidationVerdict {
    pub fn new(found: bool, confidence: f64, reason: impl Into<String>) -> Self {
        Self {
            found: Some(found),
            confidence: confidence.clamp(0.0, 1.0),
            reason: reason.into(),
            suggestions: Vec::new(),
        }
    }

    pub fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions = suggestions;
        self
    }

    /// A neutral verdict for dependency failures (§7): confidence 0.5,
    /// `found` unknown.
    pub fn neutral(reason: impl Into<String>) -> Self {
        Self {
            found: None,
            confidence: 0.5,
            reason: reason.into(),
            suggestions: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    verdict: ValidationVerdict,
    inserted_at: Instant,
    last_used_at: Instant,
}

/// Cache statistics, exposed for health reporting. Counters saturate rather
/// than wrap so they never go negative under contention.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions_ttl: u64,
    pub evictions_lru: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

struct State {
    entries: LruCache<String, Entry>,
    stats: CacheStats,
}

/// TTL+LRU cache of validation verdicts.
///
/// `get` evicts (and counts as a TTL eviction) any entry older than `ttl`.
/// `put` evicts the least-recently-used entry when at capacity, with ties
/// broken by insertion order (the `lru` crate's internal list is already
/// ordered this way).
pub struct ValidationCache {
    ttl: Duration,
    state: Mutex<State>,
}

impl ValidationCache {
    pub fn new(max_entries: usize, ttl: Duration) -> Self {
        let cap = NonZeroUsize::new(max_entries.max(1)).unwrap();
        Self {
            ttl,
            state: Mutex::new(State {
                entries: LruCache::new(cap),
                stats: CacheStats::default(),
            }),
        }
    }

    pub fn get(&self, key: &str) -> Option<ValidationVerdict> {
        let mut state = self.state.lock();
        let now = Instant::now();
        let expired = match state.entries.peek(key) {
            Some(entry) => now.duration_since(entry.inserted_at) > self.ttl,
            None => {
                state.stats.misses += 1;
                return None;
            }
        };

        if expired {
            state.entries.pop(key);
            state.stats.misses += 1;
            state.stats.evictions_ttl += 1;
            return None;
        }

        let verdict = {
            let entry = state.entries.get_mut(key).expect("checked present above");
            entry.last_used_at = now;
            entry.verdict.clone()
        };
        state.stats.hits += 1;
        Some(verdict)
    }

    pub fn put(&self, key: String, verdict: ValidationVerdict) {
        let mut state = self.state.lock();
        let now = Instant::now();
        if state.entries.len() == state.entries.cap().get() && !state.entries.contains(&key) {
            state.stats.evictions_lru += 1;
        }
        state.entries.put(
            key,
            Entry {
                verdict,
                inserted_at: now,
                last_used_at: now,
            },
        );
    }

    pub fn invalidate(&self, key: &str) {
        self.state.lock().entries.pop(key);
    }

    pub fn stats(&self) -> CacheStats {
        self.state.lock().stats.clone()
    }

    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn put_then_get_returns_the_verdict() {
        let cache = ValidationCache::new(4, Duration::from_secs(60));
        let verdict = ValidationVerdict::new(true, 0.9, "ok");
        cache.put("k".to_string(), verdict.clone());
        assert_eq!(cache.get("k"), Some(verdict));
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn entry_expires_after_ttl() {
        let cache = ValidationCache::new(4, Duration::from_millis(10));
        cache.put("k".to_string(), ValidationVerdict::new(true, 0.9, "ok"));
        thread::sleep(Duration::from_millis(30));
        assert_eq!(cache.get("k"), None);
        assert_eq!(cache.stats().evictions_ttl, 1);
    }

    #[test]
    fn lru_eviction_at_capacity() {
        let cache = ValidationCache::new(2, Duration::from_secs(60));
        cache.put("a".to_string(), ValidationVerdict::new(true, 0.9, "a"));
        cache.put("b".to_string(), ValidationVerdict::new(true, 0.9, "b"));
        // touch "a" so "b" becomes the least-recently-used entry
        cache.get("a");
        cache.put("c".to_string(), ValidationVerdict::new(true, 0.9, "c"));

        assert!(cache.get("b").is_none());
        assert!(cache.get("a").is_some());
        assert!(cache.get("c").is_some());
        assert_eq!(cache.stats().evictions_lru, 1);
    }

    #[test]
    fn invalidate_removes_entry() {
        let cache = ValidationCache::new(4, Duration::from_secs(60));
        cache.put("k".to_string(), ValidationVerdict::new(true, 0.9, "ok"));
        cache.invalidate("k");
        assert!(cache.get("k").is_none());
    }

    #[test]
    fn stats_never_go_negative_under_concurrent_access() {
        let cache = std::sync::Arc::new(ValidationCache::new(16, Duration::from_secs(60)));
        let mut handles = Vec::new();
        for i in 0..8 {
            let cache = cache.clone();
            handles.push(thread::spawn(move || {
                for j in 0..50 {
                    let key = format!("k{}", (i * 50 + j) % 16);
                    cache.put(key.clone(), ValidationVerdict::new(true, 0.9, "ok"));
                    cache.get(&key);
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        let stats = cache.stats();
        assert!(stats.hits > 0);
    }
}
