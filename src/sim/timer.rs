/// Single-slot spawn timer.
///
/// Holds at most one pending deadline. Arming replaces whatever was
/// pending, so duplicate spawns are impossible by construction.
/// Time is a `Duration` since the session clock origin.

use std::time::Duration;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
struct Pending {
    due: Duration,
    delay: Duration,
}

#[derive(Clone, Debug, Default)]
pub struct SpawnTimer {
    slot: Option<Pending>,
}

impl SpawnTimer {
    pub fn new() -> Self {
        SpawnTimer { slot: None }
    }

    /// Cancel any pending deadline and arm a new one at `now + delay`.
    pub fn arm(&mut self, now: Duration, delay: Duration) {
        self.slot = Some(Pending { due: now + delay, delay });
    }

    /// Drop the pending deadline. Idempotent.
    pub fn cancel(&mut self) {
        self.slot = None;
    }

    pub fn is_pending(&self) -> bool {
        self.slot.is_some()
    }

    /// 0 or 1.
    pub fn pending_count(&self) -> usize {
        usize::from(self.slot.is_some())
    }

    /// Delay the pending deadline was armed with.
    pub fn pending_delay(&self) -> Option<Duration> {
        self.slot.map(|p| p.delay)
    }

    pub fn due_at(&self) -> Option<Duration> {
        self.slot.map(|p| p.due)
    }

    /// If the deadline has passed, clear the slot and report that it fired.
    pub fn fire_if_due(&mut self, now: Duration) -> bool {
        match self.slot {
            Some(p) if now >= p.due => {
                self.slot = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn rearming_replaces_previous_deadline() {
        let mut t = SpawnTimer::new();
        t.arm(ms(0), ms(1000));
        t.arm(ms(200), ms(0));
        assert_eq!(t.pending_count(), 1);
        assert_eq!(t.due_at(), Some(ms(200)));
        assert_eq!(t.pending_delay(), Some(ms(0)));
    }

    #[test]
    fn fires_once_at_deadline() {
        let mut t = SpawnTimer::new();
        t.arm(ms(100), ms(500));
        assert!(!t.fire_if_due(ms(599)));
        assert!(t.fire_if_due(ms(600)));
        assert!(!t.is_pending());
        assert!(!t.fire_if_due(ms(10_000)));
    }

    #[test]
    fn cancel_is_idempotent() {
        let mut t = SpawnTimer::new();
        t.cancel();
        t.arm(ms(0), ms(10));
        t.cancel();
        t.cancel();
        assert_eq!(t.pending_count(), 0);
        assert!(!t.fire_if_due(ms(50)));
    }
}
