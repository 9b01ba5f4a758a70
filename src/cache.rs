use std::time::{Duration, Instant};

/// Default time-to-live for cached snapshots.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Time source, injectable so expiry is testable.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Holds the last-fetched value with a TTL. Explicitly passed around rather
/// than living in a module global; last write wins.
pub struct SnapshotCache<T, C: Clock = SystemClock> {
    entry: Option<(T, Instant)>,
    ttl: Duration,
    clock: C,
}

impl<T: Clone> SnapshotCache<T, SystemClock> {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, SystemClock)
    }
}

impl<T: Clone> Default for SnapshotCache<T, SystemClock> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl<T: Clone, C: Clock> SnapshotCache<T, C> {
    pub fn with_clock(ttl: Duration, clock: C) -> Self {
        Self {
            entry: None,
            ttl,
            clock,
        }
    }

    /// Returns the cached value unless it has expired.
    pub fn get(&self) -> Option<T> {
        let (value, stored_at) = self.entry.as_ref()?;
        if self.clock.now().duration_since(*stored_at) < self.ttl {
            Some(value.clone())
        } else {
            None
        }
    }

    pub fn set(&mut self, value: T) {
        self.entry = Some((value, self.clock.now()));
    }

    /// Drop the cached value, forcing the next read to miss. Used by manual
    /// refresh.
    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Clock advanced by hand from tests.
    struct ManualClock {
        start: Instant,
        offset: Cell<Duration>,
    }

    impl ManualClock {
        fn new() -> Self {
            Self {
                start: Instant::now(),
                offset: Cell::new(Duration::ZERO),
            }
        }

        fn advance(&self, by: Duration) {
            self.offset.set(self.offset.get() + by);
        }
    }

    impl Clock for &ManualClock {
        fn now(&self) -> Instant {
            self.start + self.offset.get()
        }
    }

    #[test]
    fn empty_cache_misses() {
        let cache: SnapshotCache<String> = SnapshotCache::default();
        assert!(cache.get().is_none());
    }

    #[test]
    fn fresh_value_hits_until_ttl() {
        let clock = ManualClock::new();
        let mut cache = SnapshotCache::with_clock(Duration::from_secs(300), &clock);
        cache.set("profile".to_string());

        assert_eq!(cache.get().as_deref(), Some("profile"));
        clock.advance(Duration::from_secs(299));
        assert_eq!(cache.get().as_deref(), Some("profile"));
        clock.advance(Duration::from_secs(2));
        assert!(cache.get().is_none());
    }

    #[test]
    fn invalidate_forces_a_miss() {
        let clock = ManualClock::new();
        let mut cache = SnapshotCache::with_clock(Duration::from_secs(300), &clock);
        cache.set(1u32);
        cache.invalidate();
        assert!(cache.get().is_none());
    }

    #[test]
    fn last_write_wins() {
        let clock = ManualClock::new();
        let mut cache = SnapshotCache::with_clock(Duration::from_secs(300), &clock);
        cache.set(1u32);
        clock.advance(Duration::from_secs(200));
        cache.set(2u32);
        // the second write resets the TTL window
        clock.advance(Duration::from_secs(200));
        assert_eq!(cache.get(), Some(2));
    }
}
