use tokio::time::{Duration, Instant};

/// Enforces a minimum interval between two uses of a resource. The
/// status poll and the mode-change dispatch each own one.
pub struct Throttle {
    interval: Duration,
    last: Option<Instant>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Throttle {
            interval,
            last: None,
        }
    }

    /// Returns `true` if nothing has been stamped yet or the interval
    /// has elapsed since the last stamp.
    pub fn is_ready(&self, now: Instant) -> bool {
        match self.last {
            None => true,
            Some(last) => last
                .checked_add(self.interval)
                .map_or(false, |next| now >= next),
        }
    }

    pub fn stamp(&mut self, now: Instant) {
        self.last = Some(now)
    }

    /// Stamps and returns `true` if the resource may be used now.
    pub fn try_acquire(&mut self, now: Instant) -> bool {
        if self.is_ready(now) {
            self.stamp(now);
            true
        } else {
            false
        }
    }
}
