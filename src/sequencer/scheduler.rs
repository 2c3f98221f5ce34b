//! Single-slot delayed action.
//!
//! The scheduler owns no thread. The runtime asks it how long it may block
//! (`time_until_due`) and collects the action once its deadline has passed
//! (`take_due`), so firing always happens on the runtime thread.

use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug)]
struct Armed<A> {
    action: A,
    deadline: Instant,
}

#[derive(Debug)]
pub struct Scheduler<A> {
    slot: Option<Armed<A>>,
    armed_total: u64,
    fired_total: u64,
}

impl<A> Default for Scheduler<A> {
    fn default() -> Self {
        Self {
            slot: None,
            armed_total: 0,
            fired_total: 0,
        }
    }
}

impl<A> Scheduler<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm `action` to fire `delay` after `now`, returning whatever was
    /// armed before (it will never fire).
    pub fn schedule(&mut self, action: A, delay: Duration, now: Instant) -> Option<A> {
        self.armed_total += 1;
        let replaced = self.slot.replace(Armed {
            action,
            deadline: now + delay,
        });
        if replaced.is_some() {
            debug!("Replaced pending scheduled action");
        }
        replaced.map(|armed| armed.action)
    }

    pub fn cancel(&mut self) -> Option<A> {
        self.slot.take().map(|armed| armed.action)
    }

    pub fn is_armed(&self) -> bool {
        self.slot.is_some()
    }

    pub fn pending(&self) -> Option<&A> {
        self.slot.as_ref().map(|armed| &armed.action)
    }

    /// `None` when nothing is armed; zero when the action is already due.
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.slot
            .as_ref()
            .map(|armed| armed.deadline.saturating_duration_since(now))
    }

    /// Hand out the armed action if its deadline has passed. Each armed
    /// action is handed out at most once.
    pub fn take_due(&mut self, now: Instant) -> Option<A> {
        let due = self.slot.as_ref().is_some_and(|armed| armed.deadline <= now);
        if !due {
            return None;
        }
        self.fired_total += 1;
        self.slot.take().map(|armed| armed.action)
    }

    pub fn armed_total(&self) -> u64 {
        self.armed_total
    }

    pub fn fired_total(&self) -> u64 {
        self.fired_total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_after_deadline() {
        let start = Instant::now();
        let mut scheduler = Scheduler::new();
        scheduler.schedule("advance", Duration::from_millis(3_000), start);

        assert_eq!(scheduler.take_due(start + Duration::from_millis(2_999)), None);
        assert_eq!(
            scheduler.time_until_due(start + Duration::from_millis(1_000)),
            Some(Duration::from_millis(2_000))
        );
        assert_eq!(
            scheduler.take_due(start + Duration::from_millis(3_000)),
            Some("advance")
        );
        assert_eq!(scheduler.take_due(start + Duration::from_secs(10)), None);
        assert_eq!(scheduler.fired_total(), 1);
    }

    #[test]
    fn arming_replaces_previous_action() {
        let start = Instant::now();
        let mut scheduler = Scheduler::new();
        scheduler.schedule("advance", Duration::from_millis(3_000), start);
        let replaced = scheduler.schedule("finish", Duration::from_millis(2_000), start);

        assert_eq!(replaced, Some("advance"));
        assert_eq!(scheduler.pending(), Some(&"finish"));
        assert_eq!(
            scheduler.take_due(start + Duration::from_secs(5)),
            Some("finish")
        );
        assert!(!scheduler.is_armed());
        assert_eq!(scheduler.armed_total(), 2);
    }

    #[test]
    fn cancel_is_a_noop_when_idle() {
        let mut scheduler: Scheduler<u8> = Scheduler::new();
        assert_eq!(scheduler.cancel(), None);
        assert_eq!(scheduler.time_until_due(Instant::now()), None);

        let now = Instant::now();
        scheduler.schedule(7, Duration::ZERO, now);
        assert_eq!(scheduler.cancel(), Some(7));
        assert_eq!(scheduler.take_due(now + Duration::from_secs(1)), None);
    }
}
