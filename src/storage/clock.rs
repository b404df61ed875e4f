//! Time source and id generation
//!
//! Entries take their id and timestamp from the injected clock, so tests can
//! pin time and the store never reaches for ambient state.

use chrono::Utc;
use std::cell::Cell;

/// Source of the current instant in Unix milliseconds
pub trait Clock {
    fn now_millis(&self) -> i64;
}

/// Wall-clock time
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Manually driven clock for tests and replays
#[derive(Debug, Default)]
pub struct FixedClock {
    now: Cell<i64>,
}

impl FixedClock {
    pub fn new(now: i64) -> Self {
        Self { now: Cell::new(now) }
    }

    pub fn set(&self, now: i64) {
        self.now.set(now);
    }

    pub fn advance(&self, millis: i64) {
        self.now.set(self.now.get() + millis);
    }
}

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for std::rc::Rc<C> {
    fn now_millis(&self) -> i64 {
        (**self).now_millis()
    }
}

/// Time-based ids that stay strictly increasing within a session
///
/// An id is the creation millisecond rendered as decimal, bumped past the
/// last issued id when two saves land in the same millisecond or the clock
/// steps backwards.
#[derive(Debug, Default, Clone)]
pub struct IdGenerator {
    last: i64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure future ids sort after every id in `existing`
    pub fn observe<'a>(&mut self, existing: impl IntoIterator<Item = &'a str>) {
        for id in existing {
            if let Ok(n) = id.parse::<i64>() {
                self.last = self.last.max(n);
            }
        }
    }

    pub fn next_id(&mut self, now_millis: i64) -> String {
        let id = now_millis.max(self.last + 1);
        self.last = id;
        id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock() {
        let clock = FixedClock::new(1_000);
        assert_eq!(clock.now_millis(), 1_000);
        clock.advance(500);
        assert_eq!(clock.now_millis(), 1_500);
        clock.set(10);
        assert_eq!(clock.now_millis(), 10);
    }

    #[test]
    fn test_system_clock_is_recent() {
        // 2020-01-01T00:00:00Z
        assert!(SystemClock.now_millis() > 1_577_836_800_000);
    }

    #[test]
    fn test_ids_are_strictly_increasing() {
        let mut ids = IdGenerator::new();
        assert_eq!(ids.next_id(1_000), "1000");
        assert_eq!(ids.next_id(1_000), "1001");
        assert_eq!(ids.next_id(999), "1002");
        assert_eq!(ids.next_id(5_000), "5000");
    }

    #[test]
    fn test_observe_existing_ids() {
        let mut ids = IdGenerator::new();
        ids.observe(["1712345678901", "not-a-number", "17"]);
        assert_eq!(ids.next_id(1_000), "1712345678902");
    }
}
