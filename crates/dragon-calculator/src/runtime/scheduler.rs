//! Host timers
//!
//! A [`Scheduler`] arms intervals and one-shot timeouts that deliver a
//! [`QuizEvent`] when they fire. [`TimerGuard`] owns one armed timer and
//! cancels it when dropped. [`MockScheduler`] is a manual clock for tests
//! and native demos.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::quiz::QuizEvent;

/// Handle of an armed timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(pub u64);

/// Timer backend
pub trait Scheduler {
    /// Fires `event` every `period_ms` until cancelled
    fn set_interval(&self, period_ms: u64, event: QuizEvent) -> TimerId;

    /// Fires `event` once after `delay_ms`
    fn set_timeout(&self, delay_ms: u64, event: QuizEvent) -> TimerId;

    /// Disarms a timer; unknown or already fired ids are ignored
    fn cancel(&self, id: TimerId);
}

/// Cancels its timer on drop
#[derive(Debug)]
pub struct TimerGuard<S: Scheduler> {
    scheduler: S,
    id: TimerId,
}

impl<S: Scheduler> TimerGuard<S> {
    /// Takes ownership of an armed timer
    pub const fn new(scheduler: S, id: TimerId) -> Self {
        Self { scheduler, id }
    }

    /// The guarded timer
    #[must_use]
    pub const fn id(&self) -> TimerId {
        self.id
    }
}

impl<S: Scheduler> Drop for TimerGuard<S> {
    fn drop(&mut self) {
        self.scheduler.cancel(self.id);
    }
}

#[derive(Debug, Clone, Copy)]
struct MockTimer {
    due_ms: u64,
    period_ms: Option<u64>,
    event: QuizEvent,
}

#[derive(Debug, Default)]
struct MockState {
    now_ms: u64,
    next_id: u64,
    timers: BTreeMap<TimerId, MockTimer>,
    fired: u64,
}

/// Deterministic scheduler driven by [`MockScheduler::pop_due`].
///
/// Clones share the same clock and timer table.
#[derive(Debug, Clone, Default)]
pub struct MockScheduler {
    state: Rc<RefCell<MockState>>,
}

impl MockScheduler {
    /// Clock at zero with no timers
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current mock time
    #[must_use]
    pub fn now_ms(&self) -> u64 {
        self.state.borrow().now_ms
    }

    /// Number of armed timers
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.state.borrow().timers.len()
    }

    /// Returns true if `id` is still armed
    #[must_use]
    pub fn is_active(&self, id: TimerId) -> bool {
        self.state.borrow().timers.contains_key(&id)
    }

    /// Number of armed repeating timers
    #[must_use]
    pub fn interval_count(&self) -> usize {
        self.state
            .borrow()
            .timers
            .values()
            .filter(|t| t.period_ms.is_some())
            .count()
    }

    /// Total timer firings so far
    #[must_use]
    pub fn fired_count(&self) -> u64 {
        self.state.borrow().fired
    }

    /// Fires the earliest timer due at or before `deadline_ms`.
    ///
    /// The clock moves to the firing time. Intervals are re-armed one period
    /// later. Returns `None` (and moves the clock to the deadline) when
    /// nothing is due.
    pub fn pop_due(&self, deadline_ms: u64) -> Option<QuizEvent> {
        let mut state = self.state.borrow_mut();
        let next = state
            .timers
            .iter()
            .filter(|(_, t)| t.due_ms <= deadline_ms)
            .min_by_key(|(id, t)| (t.due_ms, **id))
            .map(|(id, t)| (*id, *t));

        let Some((id, timer)) = next else {
            state.now_ms = state.now_ms.max(deadline_ms);
            return None;
        };

        state.now_ms = state.now_ms.max(timer.due_ms);
        state.fired += 1;
        match timer.period_ms {
            Some(period) => {
                if let Some(t) = state.timers.get_mut(&id) {
                    t.due_ms += period.max(1);
                }
            }
            None => {
                state.timers.remove(&id);
            }
        }
        Some(timer.event)
    }

    fn arm(&self, delay_ms: u64, period_ms: Option<u64>, event: QuizEvent) -> TimerId {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        let id = TimerId(state.next_id);
        let due_ms = state.now_ms + delay_ms;
        state.timers.insert(
            id,
            MockTimer {
                due_ms,
                period_ms,
                event,
            },
        );
        id
    }
}

impl Scheduler for MockScheduler {
    fn set_interval(&self, period_ms: u64, event: QuizEvent) -> TimerId {
        self.arm(period_ms.max(1), Some(period_ms), event)
    }

    fn set_timeout(&self, delay_ms: u64, event: QuizEvent) -> TimerId {
        self.arm(delay_ms, None, event)
    }

    fn cancel(&self, id: TimerId) {
        self.state.borrow_mut().timers.remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_fires_once() {
        let sched = MockScheduler::new();
        sched.set_timeout(800, QuizEvent::Close);
        assert_eq!(sched.pop_due(799), None);
        assert_eq!(sched.now_ms(), 799);
        assert_eq!(sched.pop_due(800), Some(QuizEvent::Close));
        assert_eq!(sched.pop_due(10_000), None);
        assert_eq!(sched.active_count(), 0);
    }

    #[test]
    fn test_interval_repeats() {
        let sched = MockScheduler::new();
        sched.set_interval(1000, QuizEvent::DeleteDigit);
        let mut fired = 0;
        while sched.pop_due(3500).is_some() {
            fired += 1;
        }
        assert_eq!(fired, 3);
        assert_eq!(sched.now_ms(), 3500);
        assert_eq!(sched.interval_count(), 1);
    }

    #[test]
    fn test_firing_order_by_due_time() {
        let sched = MockScheduler::new();
        sched.set_timeout(300, QuizEvent::Retry);
        sched.set_timeout(100, QuizEvent::NextLevel);
        assert_eq!(sched.pop_due(1000), Some(QuizEvent::NextLevel));
        assert_eq!(sched.now_ms(), 100);
        assert_eq!(sched.pop_due(1000), Some(QuizEvent::Retry));
    }

    #[test]
    fn test_guard_cancels_on_drop() {
        let sched = MockScheduler::new();
        let id = sched.set_interval(1000, QuizEvent::DeleteDigit);
        {
            let _guard = TimerGuard::new(sched.clone(), id);
            assert!(sched.is_active(id));
        }
        assert!(!sched.is_active(id));
        assert_eq!(sched.pop_due(5000), None);
    }

    #[test]
    fn test_cancel_unknown_is_noop() {
        let sched = MockScheduler::new();
        sched.cancel(TimerId(42));
        assert_eq!(sched.active_count(), 0);
    }
}
