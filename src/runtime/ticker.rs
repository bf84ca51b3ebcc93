use std::time::{Duration, Instant};

/// Deadline-based periodic task for the cooperative event loop.
///
/// The loop asks every ticker how long it may block for input
/// ([`Ticker::until_due`]) and fires the ones whose deadline has passed
/// ([`Ticker::poll`]). Missed ticks collapse into one.
#[derive(Debug, Clone)]
pub struct Ticker {
    every: Duration,
    next_due: Instant,
}

impl Ticker {
    pub fn new(every: Duration, now: Instant) -> Self {
        let every = every.max(Duration::from_millis(1));
        Self {
            every,
            next_due: now + every,
        }
    }

    pub fn poll(&mut self, now: Instant) -> bool {
        if now < self.next_due {
            return false;
        }
        self.next_due = now + self.every;
        true
    }

    pub fn until_due(&self, now: Instant) -> Duration {
        self.next_due.saturating_duration_since(now)
    }
}
