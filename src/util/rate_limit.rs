//! Rate limiting utilities

use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Rate limiter type alias
pub type Limiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Create a rate limiter with the specified requests per second
pub fn create_limiter(requests_per_second: u32) -> Arc<Limiter> {
    let quota = Quota::per_second(NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN));
    Arc::new(RateLimiter::direct(quota))
}

/// Outcome of checking one inbound message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputCheck {
    /// Allowed; `dropped` counts messages rejected since the last allowed one
    Allowed { dropped: u32 },
    /// First message rejected in a burst
    BurstStarted,
    /// Rejected while a burst is already under way
    Dropped,
}

/// Per-connection limiter for inbound WebSocket messages
#[derive(Clone)]
pub struct ConnectionRateLimiter {
    input_limiter: Arc<Limiter>,
    dropped: u32,
}

impl ConnectionRateLimiter {
    pub fn new(messages_per_second: u32) -> Self {
        Self {
            input_limiter: create_limiter(messages_per_second),
            dropped: 0,
        }
    }

    /// Check an inbound message and track how many were dropped in a row
    pub fn check_input(&mut self) -> InputCheck {
        if self.input_limiter.check().is_ok() {
            let dropped = std::mem::take(&mut self.dropped);
            return InputCheck::Allowed { dropped };
        }

        self.dropped = self.dropped.saturating_add(1);
        if self.dropped == 1 {
            InputCheck::BurstStarted
        } else {
            InputCheck::Dropped
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_beyond_quota_is_rejected() {
        let mut limiter = ConnectionRateLimiter::new(3);
        for _ in 0..3 {
            assert_eq!(limiter.check_input(), InputCheck::Allowed { dropped: 0 });
        }
        assert_eq!(limiter.check_input(), InputCheck::BurstStarted);
    }

    #[test]
    fn burst_is_reported_once_then_counted() {
        let mut limiter = ConnectionRateLimiter::new(1);
        assert_eq!(limiter.check_input(), InputCheck::Allowed { dropped: 0 });
        assert_eq!(limiter.check_input(), InputCheck::BurstStarted);
        for _ in 0..50 {
            assert_eq!(limiter.check_input(), InputCheck::Dropped);
        }
        assert_eq!(limiter.dropped, 51);
    }

    #[test]
    fn allowed_message_ends_the_burst() {
        let mut limiter = ConnectionRateLimiter::new(1);
        limiter.check_input();
        limiter.dropped = 7;
        // Fresh quota so the next message gets through
        limiter.input_limiter = create_limiter(1);
        assert_eq!(limiter.check_input(), InputCheck::Allowed { dropped: 7 });
        assert_eq!(limiter.check_input(), InputCheck::BurstStarted);
    }

    #[test]
    fn zero_rate_still_allows_one() {
        let mut limiter = ConnectionRateLimiter::new(0);
        assert_eq!(limiter.check_input(), InputCheck::Allowed { dropped: 0 });
    }
}
