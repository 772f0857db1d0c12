//! Time-boxed in-memory store for reference data.
//!
//! A [`TimedCache`] is an ordinary value: whoever needs to share it passes
//! it by reference (the client wraps it in `Arc<RwLock<_>>`). Entries expire
//! purely by elapsed time; writes elsewhere never invalidate them. All
//! methods take `now` explicitly so expiry is testable without sleeping.

use std::time::{Duration, Instant};

/// How long the datacall list stays fresh.
pub const DATACALL_CACHE_TTL: Duration = Duration::from_secs(10 * 60);

#[derive(Debug, Clone)]
struct Entry<T> {
    value: T,
    stored_at: Instant,
}

/// Single-value cache with a fixed time-to-live.
#[derive(Debug, Clone)]
pub struct TimedCache<T> {
    ttl: Duration,
    entry: Option<Entry<T>>,
}

impl<T> TimedCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entry: None }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The cached value, if one is stored and still fresh at `now`.
    pub fn get(&self, now: Instant) -> Option<&T> {
        if self.is_expired(now) {
            return None;
        }
        self.entry.as_ref().map(|e| &e.value)
    }

    /// Store `value` as fresh from `now`.
    pub fn set(&mut self, value: T, now: Instant) {
        self.entry = Some(Entry {
            value,
            stored_at: now,
        });
    }

    /// True when empty or when `ttl` has elapsed since the last `set`.
    pub fn is_expired(&self, now: Instant) -> bool {
        match &self.entry {
            Some(entry) => now.saturating_duration_since(entry.stored_at) >= self.ttl,
            None => true,
        }
    }

    pub fn clear(&mut self) {
        self.entry = None;
    }
}

impl<T> Default for TimedCache<T> {
    fn default() -> Self {
        Self::new(DATACALL_CACHE_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_cache_is_expired() {
        let cache: TimedCache<u32> = TimedCache::default();
        let now = Instant::now();
        assert!(cache.is_expired(now));
        assert_eq!(cache.get(now), None);
    }

    #[test]
    fn value_is_fresh_until_ttl() {
        let mut cache = TimedCache::new(Duration::from_secs(600));
        let t0 = Instant::now();
        cache.set(vec![1, 2, 3], t0);

        assert_eq!(cache.get(t0 + Duration::from_secs(599)), Some(&vec![1, 2, 3]));
        assert!(cache.is_expired(t0 + Duration::from_secs(600)));
        assert_eq!(cache.get(t0 + Duration::from_secs(601)), None);
    }

    #[test]
    fn set_refreshes_timestamp() {
        let mut cache = TimedCache::new(Duration::from_secs(10));
        let t0 = Instant::now();
        cache.set("a", t0);
        cache.set("b", t0 + Duration::from_secs(8));
        assert_eq!(cache.get(t0 + Duration::from_secs(15)), Some(&"b"));
    }

    #[test]
    fn clear_drops_value() {
        let mut cache = TimedCache::new(Duration::from_secs(10));
        let t0 = Instant::now();
        cache.set(1, t0);
        cache.clear();
        assert!(cache.is_expired(t0));
    }

    #[test]
    fn default_ttl_is_ten_minutes() {
        let cache: TimedCache<()> = TimedCache::default();
        assert_eq!(cache.ttl(), Duration::from_secs(600));
    }
}
