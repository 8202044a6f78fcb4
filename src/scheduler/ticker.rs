use std::time::{Duration, Instant};

/// Fixed-cadence wake-up for the lookahead loop, driven by the host timer.
///
/// Late wake-ups are not made up for: after a stall the next tick is simply
/// one interval after the late one. The lookahead loop does its own catch-up.
#[derive(Clone, Debug)]
pub struct Ticker {
    interval: Duration,
    next: Instant,
}

impl Ticker {
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            next: now,
        }
    }

    // true (and rearms) when the tick is due
    pub fn poll(&mut self, now: Instant) -> bool {
        if now < self.next {
            return false;
        }
        self.next += self.interval;
        if self.next <= now {
            self.next = now + self.interval;
        }
        true
    }

    pub fn until_next(&self, now: Instant) -> Duration {
        self.next.saturating_duration_since(now)
    }
}
