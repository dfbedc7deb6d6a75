//! Deferred and periodic callbacks for a single-threaded event loop.
//!
//! The scheduler doesn't own a clock.
//! Whoever drives it passes in the time elapsed since the loop started,
//! which in the application is wall-clock time
//! and in tests is whatever the test wants it to be.

use std::{collections::BTreeMap, time::Duration};

/// Identifies a scheduled timer so it can be cancelled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

#[derive(Clone, Debug)]
struct Timer<E> {
    handle: TimerHandle,
    event: E,
    /// Repeating timers are re-armed with this interval after firing.
    period: Option<Duration>,
}

/// A queue of timers that produce events of type `E` when they come due.
///
/// Events that are due at the same time come out in the order
/// they were scheduled in.
#[derive(Clone, Debug)]
pub struct Scheduler<E> {
    // keyed by due time, then by a sequence number for stable ordering
    queue: BTreeMap<(Duration, u64), Timer<E>>,
    next_seq: u64,
    next_handle: u64,
}

impl<E> Default for Scheduler<E> {
    fn default() -> Self {
        Self {
            queue: BTreeMap::new(),
            next_seq: 0,
            next_handle: 0,
        }
    }
}

impl<E: Clone> Scheduler<E> {
    /// Create an empty scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire `event` once, `delay` after `now`.
    pub fn schedule_once(&mut self, now: Duration, delay: Duration, event: E) -> TimerHandle {
        self.insert(now + delay, event, None)
    }

    /// Fire `event` every `interval`, starting `interval` after `now`,
    /// until the timer is cancelled.
    pub fn schedule_repeating(
        &mut self,
        now: Duration,
        interval: Duration,
        event: E,
    ) -> TimerHandle {
        self.insert(now + interval, event, Some(interval))
    }

    fn insert(&mut self, due: Duration, event: E, period: Option<Duration>) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        let seq = self.bump_seq();
        self.queue.insert(
            (due, seq),
            Timer {
                handle,
                event,
                period,
            },
        );
        handle
    }

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    /// Cancel a timer so it never fires again.
    ///
    /// Returns `false` if the timer had already fired (for one-shot timers)
    /// or had already been cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let key = self
            .queue
            .iter()
            .find(|(_, timer)| timer.handle == handle)
            .map(|(key, _)| *key);
        match key {
            Some(key) => self.queue.remove(&key).is_some(),
            None => false,
        }
    }

    /// Whether the timer is still waiting to fire.
    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.queue.values().any(|timer| timer.handle == handle)
    }

    /// Number of timers waiting to fire.
    #[inline]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Time at which the next timer comes due, if any.
    pub fn next_due(&self) -> Option<Duration> {
        self.queue.keys().next().map(|(due, _)| *due)
    }

    /// Collect the events of every timer due at or before `now`.
    ///
    /// Repeating timers are re-armed one interval after `now`,
    /// so a late poll fires them once rather than once per missed interval.
    pub fn poll(&mut self, now: Duration) -> Vec<E> {
        let mut fired = Vec::new();
        let mut rearmed = Vec::new();
        while let Some(entry) = self.queue.first_entry() {
            if entry.key().0 > now {
                break;
            }
            let timer = entry.remove();
            fired.push(timer.event.clone());
            if let Some(period) = timer.period {
                rearmed.push((now + period, timer));
            }
        }
        // re-insert after the loop so zero-length periods can't spin forever
        for (due, timer) in rearmed {
            let seq = self.bump_seq();
            self.queue.insert((due, seq), timer);
        }
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn one_shot_fires_once_when_due() {
        let mut sched = Scheduler::new();
        let h = sched.schedule_once(ms(0), ms(1000), "tick");
        assert!(sched.poll(ms(999)).is_empty());
        assert!(sched.is_pending(h));
        assert_eq!(sched.poll(ms(1000)), vec!["tick"]);
        assert!(!sched.is_pending(h));
        assert!(sched.poll(ms(5000)).is_empty());
    }

    #[test]
    fn events_come_out_in_due_then_scheduling_order() {
        let mut sched = Scheduler::new();
        sched.schedule_once(ms(0), ms(30), 'c');
        sched.schedule_once(ms(0), ms(10), 'a');
        sched.schedule_once(ms(0), ms(30), 'd');
        sched.schedule_once(ms(5), ms(5), 'b');
        assert_eq!(sched.next_due(), Some(ms(10)));
        assert_eq!(sched.poll(ms(100)), vec!['a', 'b', 'c', 'd']);
        assert_eq!(sched.next_due(), None);
    }

    #[test]
    fn cancelled_timers_never_fire() {
        let mut sched = Scheduler::new();
        let keep = sched.schedule_once(ms(0), ms(10), 1);
        let dropped = sched.schedule_repeating(ms(0), ms(10), 2);
        assert!(sched.cancel(dropped));
        assert!(!sched.cancel(dropped));
        assert_eq!(sched.poll(ms(50)), vec![1]);
        // already fired
        assert!(!sched.cancel(keep));
        assert_eq!(sched.pending(), 0);
    }

    #[test]
    fn repeating_timer_rearms_from_poll_time() {
        let mut sched = Scheduler::new();
        let h = sched.schedule_repeating(ms(0), ms(50), ());
        assert_eq!(sched.poll(ms(50)).len(), 1);
        assert_eq!(sched.next_due(), Some(ms(100)));
        // a late poll fires once and pushes the next firing back
        assert_eq!(sched.poll(ms(230)).len(), 1);
        assert_eq!(sched.next_due(), Some(ms(280)));
        assert!(sched.is_pending(h));
        assert_eq!(sched.pending(), 1);
    }

    #[test]
    fn zero_period_does_not_spin() {
        let mut sched = Scheduler::new();
        sched.schedule_repeating(ms(0), Duration::ZERO, ());
        assert_eq!(sched.poll(ms(0)).len(), 1);
        assert_eq!(sched.poll(ms(0)).len(), 1);
    }
}
