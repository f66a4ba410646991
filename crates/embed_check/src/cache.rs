use std::sync::Arc;
use std::time::{Duration, Instant};

use scc::hash_map::Entry;

use crate::probe::ImageOutcome;

/// Source of time for cache expiry, replaceable in tests
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[derive(Debug, Clone)]
struct CachedOutcome {
    outcome: ImageOutcome,
    stored: Instant,
}

/// Memoized image probe outcomes, keyed by the exact URL string.
///
/// Outcomes are stored regardless of label, so the same URL used as an icon and as an
/// image shares one entry. Concurrent probes of the same URL may both miss, in which case
/// the last one to finish wins.
pub struct ProbeCache {
    map: scc::HashMap<String, CachedOutcome>,
    ttl: Option<Duration>,
    clock: Arc<dyn Clock>,
}

impl Default for ProbeCache {
    fn default() -> Self {
        ProbeCache::new()
    }
}

impl ProbeCache {
    /// Cache whose entries never expire
    pub fn new() -> Self {
        ProbeCache::with_clock(None, Arc::new(SystemClock))
    }

    pub fn with_ttl(ttl: Option<Duration>) -> Self {
        ProbeCache::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Option<Duration>, clock: Arc<dyn Clock>) -> Self {
        ProbeCache {
            map: scc::HashMap::new(),
            ttl,
            clock,
        }
    }

    pub fn from_config(config: &config::probe::Probe) -> Self {
        ProbeCache::with_ttl(config.ttl())
    }

    #[inline]
    fn is_fresh(&self, stored: Instant, now: Instant) -> bool {
        match self.ttl {
            Some(ttl) => now.saturating_duration_since(stored) < ttl,
            None => true,
        }
    }

    pub async fn get(&self, url: &str) -> Option<ImageOutcome> {
        let now = self.clock.now();

        let cached = self.map.read_async(url, |_, cached| cached.clone()).await?;

        if self.is_fresh(cached.stored, now) {
            return Some(cached.outcome);
        }

        log::trace!("Cached outcome for {url} expired");

        // only remove the entry just read, not a fresher one written since
        self.map.remove_if_async(url, |entry| entry.stored == cached.stored).await;

        None
    }

    pub async fn insert(&self, url: &str, outcome: ImageOutcome) {
        let cached = CachedOutcome {
            outcome,
            stored: self.clock.now(),
        };

        match self.map.entry_async(url.to_owned()).await {
            Entry::Occupied(mut occupied) => *occupied.get_mut() = cached,
            Entry::Vacant(vacant) => {
                vacant.insert_entry(cached);
            }
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub async fn clear(&self) {
        self.map.clear_async().await;
    }

    /// Drops every expired entry
    pub async fn cleanup(&self) {
        if self.ttl.is_none() {
            return;
        }

        let now = self.clock.now();

        self.map.retain_async(|_, cached| self.is_fresh(cached.stored, now)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicU64, Ordering};

    /// Clock that only moves when told to
    struct FakeClock {
        base: Instant,
        offset_ms: AtomicU64,
    }

    impl FakeClock {
        fn new() -> Arc<FakeClock> {
            Arc::new(FakeClock {
                base: Instant::now(),
                offset_ms: AtomicU64::new(0),
            })
        }

        fn advance(&self, by: Duration) {
            self.offset_ms.fetch_add(by.as_millis() as u64, Ordering::SeqCst);
        }
    }

    impl Clock for FakeClock {
        fn now(&self) -> Instant {
            self.base + Duration::from_millis(self.offset_ms.load(Ordering::SeqCst))
        }
    }

    #[tokio::test]
    async fn test_never_expires_by_default() {
        let clock = FakeClock::new();
        let cache = ProbeCache::with_clock(None, clock.clone());

        cache.insert("https://example.com/a.png", ImageOutcome::Ok).await;
        clock.advance(Duration::from_secs(60 * 60 * 24 * 365));

        assert_eq!(cache.get("https://example.com/a.png").await, Some(ImageOutcome::Ok));
        assert_eq!(cache.get("https://example.com/b.png").await, None);
    }

    #[tokio::test]
    async fn test_ttl_expiry() {
        let clock = FakeClock::new();
        let cache = ProbeCache::with_clock(Some(Duration::from_secs(30)), clock.clone());

        cache.insert("https://example.com/a.png", ImageOutcome::NotAnImage).await;

        clock.advance(Duration::from_secs(29));
        assert_eq!(cache.get("https://example.com/a.png").await, Some(ImageOutcome::NotAnImage));

        clock.advance(Duration::from_secs(1));
        assert_eq!(cache.get("https://example.com/a.png").await, None);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_last_writer_wins() {
        let cache = ProbeCache::new();

        cache.insert("https://example.com/a.png", ImageOutcome::Unreachable).await;
        cache.insert("https://example.com/a.png", ImageOutcome::Ok).await;

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("https://example.com/a.png").await, Some(ImageOutcome::Ok));
    }

    #[tokio::test]
    async fn test_cleanup() {
        let clock = FakeClock::new();
        let cache = ProbeCache::with_clock(Some(Duration::from_secs(10)), clock.clone());

        cache.insert("https://example.com/old.png", ImageOutcome::Ok).await;
        clock.advance(Duration::from_secs(8));
        cache.insert("https://example.com/new.png", ImageOutcome::Ok).await;
        clock.advance(Duration::from_secs(5));

        cache.cleanup().await;

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("https://example.com/new.png").await, Some(ImageOutcome::Ok));
    }
}
