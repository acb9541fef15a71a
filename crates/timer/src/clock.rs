//! Injected clock (spec.md §4.3, §5; SPEC_FULL.md §C.1).
//!
//! Every timestamp the timer service produces or compares against comes
//! from a `Clock`, never directly from `SystemTime`/`Instant`, so a test can
//! swap in a deterministic counter without the service knowing the
//! difference.

use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

/// Supplies milliseconds-since-epoch. Implementations must be cheap and
/// side-effect-free beyond reading the current time.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> u64;
}

/// Wall-clock time, suitable for signing timestamps sent to clients
/// (spec.md §5 "Clock").
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock before epoch")
            .as_millis() as u64
    }
}

/// A deterministic counter a test can advance explicitly. Cloning shares
/// the same counter (`Arc<AtomicU64>`), so a test can hold one handle and
/// pass clones of the underlying `Clock` trait object to every collaborator
/// under test.
#[derive(Debug, Clone)]
pub struct TestClock(Arc<AtomicU64>);

impl TestClock {
    pub fn new(start_ms: u64) -> Self {
        Self(Arc::new(AtomicU64::new(start_ms)))
    }

    pub fn set(&self, ms: u64) {
        self.0.store(ms, Ordering::SeqCst);
    }

    pub fn advance(&self, delta_ms: u64) {
        self.0.fetch_add(delta_ms, Ordering::SeqCst);
    }
}

impl Clock for TestClock {
    fn now_ms(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_advances() {
        let clock = TestClock::new(1_000);
        assert_eq!(clock.now_ms(), 1_000);
        clock.advance(500);
        assert_eq!(clock.now_ms(), 1_500);
        clock.set(0);
        assert_eq!(clock.now_ms(), 0);
    }
}
