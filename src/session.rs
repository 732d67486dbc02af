use std::time::{Duration, Instant};

pub const SESSION_TIMEOUT: Duration = Duration::from_secs(15 * 60);

/// Rolling inactivity timer. Any user activity pushes the deadline out by
/// the full timeout; on expiry the app signs the session out.
#[derive(Debug, Clone)]
pub struct IdleTimer {
    deadline: Instant,
}

impl IdleTimer {
    pub fn new(now: Instant) -> Self {
        Self {
            deadline: now + SESSION_TIMEOUT,
        }
    }

    pub fn note_activity(&mut self, now: Instant) {
        self.deadline = now + SESSION_TIMEOUT;
    }

    pub fn expired(&self, now: Instant) -> bool {
        now >= self.deadline
    }

    /// Time until expiry; drives the quiescent-frame wake-up so the timeout
    /// fires even when nothing else is repainting.
    pub fn remaining(&self, now: Instant) -> Duration {
        self.deadline.saturating_duration_since(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expires_after_fifteen_minutes_of_silence() {
        let t0 = Instant::now();
        let timer = IdleTimer::new(t0);

        assert!(!timer.expired(t0 + SESSION_TIMEOUT - Duration::from_secs(1)));
        assert!(timer.expired(t0 + SESSION_TIMEOUT));
    }

    #[test]
    fn activity_rolls_the_deadline_forward() {
        let t0 = Instant::now();
        let mut timer = IdleTimer::new(t0);

        let t1 = t0 + Duration::from_secs(10 * 60);
        timer.note_activity(t1);

        assert!(!timer.expired(t0 + SESSION_TIMEOUT));
        assert!(timer.expired(t1 + SESSION_TIMEOUT));
    }

    #[test]
    fn remaining_counts_down_to_zero_and_saturates() {
        let t0 = Instant::now();
        let timer = IdleTimer::new(t0);

        assert_eq!(timer.remaining(t0), SESSION_TIMEOUT);
        assert_eq!(
            timer.remaining(t0 + Duration::from_secs(60)),
            SESSION_TIMEOUT - Duration::from_secs(60)
        );
        assert_eq!(timer.remaining(t0 + SESSION_TIMEOUT), Duration::ZERO);
        assert_eq!(
            timer.remaining(t0 + SESSION_TIMEOUT + Duration::from_secs(5)),
            Duration::ZERO
        );
    }
}
