//! Per-match, per-type timer service (spec.md §4.3, component C4).
//!
//! One record exists per `(matchId, timerType)`. Every transition below is
//! total and explicitly enumerated — attempting to complete a PAUSED,
//! COMPLETED, or TIMEOUT record is a no-op that reports failure rather than
//! panicking or silently corrupting the record. The service consults no
//! clock of its own; every timestamp comes from the injected [`Clock`].

mod clock;

pub use clock::Clock;
pub use clock::SystemClock;
pub use clock::TestClock;
pub use fbf_core::TimerType;

use fbf_core::GRACE_PERIOD_MS;
use fbf_core::MatchId;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

/// The lifecycle state of one timer record (spec.md §4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Running,
    Paused,
    Completed,
    Timeout,
}

/// Invoked exactly once when a timer fires past its grace period. Plain and
/// synchronous by design — a caller that needs to do async work (applying a
/// timeout's side effects through `fbf-match`) spawns its own task inside
/// the closure; the timer service itself performs no I/O and awaits
/// nothing, keeping it as clock-free and blocking-free as `fbf-rules`.
pub type TimeoutCallback = Arc<dyn Fn() + Send + Sync>;

struct Record {
    state: TimerState,
    start_time: u64,
    timeout_ms: u64,
    paused_remaining_ms: Option<u64>,
    callback: TimeoutCallback,
    /// Bumped on every replace/pause/resume/complete so a watcher task
    /// spawned by `schedule` for a since-superseded record is a provable
    /// no-op when it eventually wakes, instead of firing a stale timeout
    /// (spec.md §5 "Cancellation": "cancelling a timer reliably prevents
    /// its callback from firing").
    generation: u64,
}

#[derive(Hash, PartialEq, Eq, Clone)]
struct Key(MatchId, TimerType);

/// Per-`(matchId, timerType)` timer records, per spec.md §4.3. Pure
/// bookkeeping: starting, pausing, resuming, completing, and cancelling a
/// timer never blocks and never spawns anything. Real-time, self-driven
/// firing is a separate, additive concern — see [`TimerService::schedule`].
pub struct TimerService {
    clock: Arc<dyn Clock>,
    records: Mutex<HashMap<Key, Record>>,
}

impl TimerService {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            records: Mutex::new(HashMap::new()),
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    fn start(&self, match_id: &MatchId, timer_type: TimerType, callback: TimeoutCallback) -> u64 {
        let start_time = self.clock.now_ms();
        let timeout_ms = timer_type.default_timeout_ms();
        let mut records = self.records.lock().unwrap();
        let key = Key(match_id.clone(), timer_type);
        let generation = records.get(&key).map(|r| r.generation + 1).unwrap_or(0);
        records.insert(
            key,
            Record {
                state: TimerState::Running,
                start_time,
                timeout_ms,
                paused_remaining_ms: None,
                callback,
                generation,
            },
        );
        log::debug!("[timer {}] {:?} started, timeout {}ms", match_id, timer_type, timeout_ms);
        start_time
    }

    /// Replaces any existing ACTION record and returns the new start time
    /// (spec.md §4.3 "replacing any existing record of that type").
    pub fn start_action_timer(&self, match_id: &MatchId, callback: TimeoutCallback) -> u64 {
        self.start(match_id, TimerType::Action, callback)
    }

    pub fn start_death_choice_timer(&self, match_id: &MatchId, callback: TimeoutCallback) -> u64 {
        self.start(match_id, TimerType::DeathChoice, callback)
    }

    pub fn start_draft_timer(&self, match_id: &MatchId, callback: TimeoutCallback) -> u64 {
        self.start(match_id, TimerType::Draft, callback)
    }

    /// RUNNING -> PAUSED, capturing the remaining time. Returns -1 if the
    /// ACTION record is absent or not RUNNING (spec.md §4.3).
    pub fn pause_action_timer(&self, match_id: &MatchId) -> i64 {
        let mut records = self.records.lock().unwrap();
        let key = Key(match_id.clone(), TimerType::Action);
        let now = self.clock.now_ms();
        match records.get_mut(&key) {
            Some(record) if record.state == TimerState::Running => {
                let remaining = (record.start_time + record.timeout_ms).saturating_sub(now);
                record.state = TimerState::Paused;
                record.paused_remaining_ms = Some(remaining);
                record.generation += 1;
                log::debug!("[timer {}] ACTION paused, {}ms remaining", match_id, remaining);
                remaining as i64
            }
            _ => -1,
        }
    }

    /// PAUSED -> RUNNING. `reset = true` opens a fresh full-length window;
    /// `reset = false` resumes with the captured remaining time (spec.md
    /// §4.3). Returns `false` if the ACTION record is absent or not PAUSED.
    pub fn resume_action_timer(&self, match_id: &MatchId, reset: bool) -> bool {
        let mut records = self.records.lock().unwrap();
        let key = Key(match_id.clone(), TimerType::Action);
        let now = self.clock.now_ms();
        match records.get_mut(&key) {
            Some(record) if record.state == TimerState::Paused => {
                record.start_time = now;
                record.timeout_ms = if reset {
                    TimerType::Action.default_timeout_ms()
                } else {
                    record.paused_remaining_ms.unwrap_or(0)
                };
                record.paused_remaining_ms = None;
                record.state = TimerState::Running;
                record.generation += 1;
                log::debug!(
                    "[timer {}] ACTION resumed (reset={}), timeout now {}ms",
                    match_id,
                    reset,
                    record.timeout_ms
                );
                true
            }
            _ => false,
        }
    }

    /// RUNNING -> COMPLETED. Returns `true` only if the record was RUNNING
    /// (spec.md §4.3 "Transitions are total and explicitly enumerated").
    pub fn complete_timer(&self, match_id: &MatchId, timer_type: TimerType) -> bool {
        let mut records = self.records.lock().unwrap();
        let key = Key(match_id.clone(), timer_type);
        match records.get_mut(&key) {
            Some(record) if record.state == TimerState::Running => {
                record.state = TimerState::Completed;
                record.generation += 1;
                true
            }
            _ => false,
        }
    }

    /// Drops the record entirely. A no-op if absent (spec.md §5
    /// "Cancellation": "`cancelTimer` on an absent record is a no-op").
    pub fn cancel_timer(&self, match_id: &MatchId, timer_type: TimerType) {
        self.records
            .lock()
            .unwrap()
            .remove(&Key(match_id.clone(), timer_type));
    }

    pub fn get_remaining_time(&self, match_id: &MatchId, timer_type: TimerType) -> i64 {
        let records = self.records.lock().unwrap();
        let now = self.clock.now_ms();
        match records.get(&Key(match_id.clone(), timer_type)) {
            Some(record) if record.state == TimerState::Running => {
                (record.start_time + record.timeout_ms).saturating_sub(now) as i64
            }
            Some(record) if record.state == TimerState::Paused => {
                record.paused_remaining_ms.unwrap_or(0) as i64
            }
            _ => -1,
        }
    }

    pub fn get_start_time(&self, match_id: &MatchId, timer_type: TimerType) -> Option<u64> {
        self.records
            .lock()
            .unwrap()
            .get(&Key(match_id.clone(), timer_type))
            .map(|r| r.start_time)
    }

    pub fn get_timeout_ms(&self, match_id: &MatchId, timer_type: TimerType) -> Option<u64> {
        self.records
            .lock()
            .unwrap()
            .get(&Key(match_id.clone(), timer_type))
            .map(|r| r.timeout_ms)
    }

    pub fn get_timer_state(&self, match_id: &MatchId, timer_type: TimerType) -> Option<TimerState> {
        self.records
            .lock()
            .unwrap()
            .get(&Key(match_id.clone(), timer_type))
            .map(|r| r.state)
    }

    /// `now ∈ (start + timeout, start + timeout + GRACE_PERIOD_MS]`
    /// (spec.md §4.3 "Grace period").
    pub fn is_within_grace_period(&self, match_id: &MatchId, timer_type: TimerType) -> bool {
        let records = self.records.lock().unwrap();
        let Some(record) = records.get(&Key(match_id.clone(), timer_type)) else {
            return false;
        };
        let now = self.clock.now_ms();
        let expiry = record.start_time + record.timeout_ms;
        now > expiry && now <= expiry + GRACE_PERIOD_MS
    }

    /// Fires the callback if the record is RUNNING and now is past its
    /// grace window, transitioning it to TIMEOUT. Returns whether it fired.
    /// Tests drive this directly after advancing a [`TestClock`] instead of
    /// waiting on [`TimerService::schedule`]'s real sleep (spec.md §4.3
    /// "the scheduler does not advance automatically — callbacks are
    /// observable only via explicit simulation").
    pub fn fire_if_due(&self, match_id: &MatchId, timer_type: TimerType) -> bool {
        let callback = {
            let mut records = self.records.lock().unwrap();
            let key = Key(match_id.clone(), timer_type);
            let now = self.clock.now_ms();
            match records.get_mut(&key) {
                Some(record) if record.state == TimerState::Running => {
                    let expiry = record.start_time + record.timeout_ms + GRACE_PERIOD_MS;
                    if now <= expiry {
                        None
                    } else {
                        record.state = TimerState::Timeout;
                        record.generation += 1;
                        Some(record.callback.clone())
                    }
                }
                _ => None,
            }
        };
        match callback {
            Some(cb) => {
                log::info!("[timer {}] {:?} fired past grace", match_id, timer_type);
                cb();
                true
            }
            None => false,
        }
    }

    /// Production-only convenience: spawns a background task that sleeps
    /// for the record's full window plus grace, then calls [`Self::fire_if_due`].
    /// The generation captured at spawn time makes this a no-op if the
    /// record has since been paused, resumed, completed, cancelled, or
    /// replaced (spec.md §4.3 "Scheduling of timeout firing is the
    /// service's concern").
    pub fn schedule(self: &Arc<Self>, match_id: MatchId, timer_type: TimerType) {
        let generation = {
            let records = self.records.lock().unwrap();
            match records.get(&Key(match_id.clone(), timer_type)) {
                Some(record) => record.generation,
                None => return,
            }
        };
        let timeout_ms = self
            .get_timeout_ms(&match_id, timer_type)
            .unwrap_or_else(|| timer_type.default_timeout_ms());
        let service = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(timeout_ms + GRACE_PERIOD_MS)).await;
            let still_current = service
                .records
                .lock()
                .unwrap()
                .get(&Key(match_id.clone(), timer_type))
                .map(|r| r.generation == generation)
                .unwrap_or(false);
            if still_current {
                service.fire_if_due(&match_id, timer_type);
            } else {
                log::debug!(
                    "[timer {}] {:?} wake superseded (generation {} stale), skipping",
                    match_id,
                    timer_type,
                    generation
                );
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;
    use std::sync::atomic::Ordering;

    fn service(start_ms: u64) -> (TimerService, TestClock) {
        let clock = TestClock::new(start_ms);
        (TimerService::new(Arc::new(clock.clone())), clock)
    }

    fn noop_callback() -> TimeoutCallback {
        Arc::new(|| {})
    }

    #[test]
    fn start_action_timer_reports_start_time_and_running_state() {
        let (svc, _clock) = service(1_000);
        let id = MatchId::new("m1");
        let start = svc.start_action_timer(&id, noop_callback());
        assert_eq!(start, 1_000);
        assert_eq!(svc.get_timer_state(&id, TimerType::Action), Some(TimerState::Running));
        assert_eq!(svc.get_timeout_ms(&id, TimerType::Action), Some(10_000));
    }

    #[test]
    fn starting_again_replaces_the_existing_record() {
        let (svc, clock) = service(0);
        let id = MatchId::new("m1");
        svc.start_action_timer(&id, noop_callback());
        clock.advance(5_000);
        let restart = svc.start_action_timer(&id, noop_callback());
        assert_eq!(restart, 5_000);
        assert_eq!(svc.get_remaining_time(&id, TimerType::Action), 10_000);
    }

    #[test]
    fn remaining_time_counts_down_while_running() {
        let (svc, clock) = service(0);
        let id = MatchId::new("m1");
        svc.start_action_timer(&id, noop_callback());
        clock.advance(4_000);
        assert_eq!(svc.get_remaining_time(&id, TimerType::Action), 6_000);
    }

    #[test]
    fn pause_then_resume_without_reset_keeps_captured_remaining() {
        let (svc, clock) = service(0);
        let id = MatchId::new("m1");
        svc.start_action_timer(&id, noop_callback());
        clock.advance(3_000);
        let remaining = svc.pause_action_timer(&id);
        assert_eq!(remaining, 7_000);
        assert_eq!(svc.get_timer_state(&id, TimerType::Action), Some(TimerState::Paused));
        assert_eq!(svc.get_remaining_time(&id, TimerType::Action), 7_000);

        clock.advance(1_000);
        assert!(svc.resume_action_timer(&id, false));
        assert_eq!(svc.get_timer_state(&id, TimerType::Action), Some(TimerState::Running));
        assert_eq!(svc.get_remaining_time(&id, TimerType::Action), 7_000);
    }

    #[test]
    fn resume_with_reset_opens_a_fresh_window() {
        let (svc, clock) = service(0);
        let id = MatchId::new("m1");
        svc.start_action_timer(&id, noop_callback());
        clock.advance(9_000);
        svc.pause_action_timer(&id);
        clock.advance(2_000);
        assert!(svc.resume_action_timer(&id, true));
        assert_eq!(svc.get_remaining_time(&id, TimerType::Action), 10_000);
    }

    #[test]
    fn pause_not_running_returns_negative_one() {
        let (svc, _clock) = service(0);
        let id = MatchId::new("m1");
        assert_eq!(svc.pause_action_timer(&id), -1);
    }

    #[test]
    fn complete_only_succeeds_from_running() {
        let (svc, _clock) = service(0);
        let id = MatchId::new("m1");
        svc.start_action_timer(&id, noop_callback());
        assert!(svc.complete_timer(&id, TimerType::Action));
        assert!(!svc.complete_timer(&id, TimerType::Action));
        assert_eq!(svc.get_timer_state(&id, TimerType::Action), Some(TimerState::Completed));
    }

    #[test]
    fn cancel_on_absent_record_is_a_noop() {
        let (svc, _clock) = service(0);
        let id = MatchId::new("m1");
        svc.cancel_timer(&id, TimerType::Action);
        assert_eq!(svc.get_timer_state(&id, TimerType::Action), None);
    }

    #[test]
    fn grace_boundary_accepts_up_to_inclusive_and_rejects_after() {
        let (svc, clock) = service(0);
        let id = MatchId::new("m1");
        svc.start_action_timer(&id, noop_callback());
        clock.set(10_500);
        assert!(svc.is_within_grace_period(&id, TimerType::Action));
        clock.set(10_501);
        assert!(!svc.is_within_grace_period(&id, TimerType::Action));
    }

    #[test]
    fn fire_if_due_invokes_callback_exactly_once_past_grace() {
        let (svc, clock) = service(0);
        let id = MatchId::new("m1");
        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();
        svc.start_action_timer(&id, Arc::new(move || flag.store(true, Ordering::SeqCst)));

        clock.set(10_500);
        assert!(!svc.fire_if_due(&id, TimerType::Action));
        assert!(!fired.load(Ordering::SeqCst));

        clock.set(10_501);
        assert!(svc.fire_if_due(&id, TimerType::Action));
        assert!(fired.load(Ordering::SeqCst));
        assert_eq!(svc.get_timer_state(&id, TimerType::Action), Some(TimerState::Timeout));

        assert!(!svc.fire_if_due(&id, TimerType::Action));
    }

    #[test]
    fn completed_timer_never_fires() {
        let (svc, clock) = service(0);
        let id = MatchId::new("m1");
        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();
        svc.start_action_timer(&id, Arc::new(move || flag.store(true, Ordering::SeqCst)));
        svc.complete_timer(&id, TimerType::Action);
        clock.set(20_000);
        assert!(!svc.fire_if_due(&id, TimerType::Action));
        assert!(!fired.load(Ordering::SeqCst));
    }
}
