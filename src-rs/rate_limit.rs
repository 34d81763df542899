use std::{
    collections::{HashMap, VecDeque},
    time::{Duration, Instant},
};

use parking_lot::Mutex;

/// Sliding-window request limiter keyed by caller identity.
///
/// Every call is recorded, including rejected ones, so a caller that keeps
/// retrying at the window boundary stays throttled instead of slipping back
/// under the limit as old entries expire.
#[derive(Debug)]
pub struct SlidingWindowLimiter {
    window: Duration,
    max_requests: usize,
    buckets: Mutex<HashMap<String, VecDeque<Instant>>>,
}

impl SlidingWindowLimiter {
    pub fn new(window: Duration, max_requests: usize) -> Self {
        Self {
            window,
            max_requests,
            buckets: Mutex::new(HashMap::new()),
        }
    }

    /// Record a request under `key` and return whether it is allowed.
    pub fn check_and_record(&self, key: &str) -> bool {
        self.check_and_record_at(key, Instant::now())
    }

    /// Explicit-time variant of [`check_and_record`](Self::check_and_record).
    /// Timestamps must be non-decreasing per key.
    pub fn check_and_record_at(&self, key: &str, now: Instant) -> bool {
        let cutoff = now.checked_sub(self.window).unwrap_or(now);

        let mut buckets = self.buckets.lock();
        let bucket = buckets.entry(key.to_string()).or_default();

        while let Some(front) = bucket.front().copied() {
            if front <= cutoff {
                bucket.pop_front();
            } else {
                break;
            }
        }

        let accepted = bucket.len() < self.max_requests;
        bucket.push_back(now);
        accepted
    }

    /// Forget all recorded requests for `key`, so the next call is accepted
    /// regardless of prior rejections.
    pub fn reset(&self, key: &str) {
        self.buckets.lock().remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(base: Instant, secs: u64) -> Instant {
        base + Duration::from_secs(secs)
    }

    #[test]
    fn first_call_for_a_fresh_key_is_accepted() {
        let limiter = SlidingWindowLimiter::new(Duration::from_secs(60), 1);
        assert!(limiter.check_and_record("visitor"));
    }

    #[test]
    fn zero_limit_rejects_every_call() {
        let limiter = SlidingWindowLimiter::new(Duration::from_secs(60), 0);
        assert!(!limiter.check_and_record("visitor"));
        assert!(!limiter.check_and_record("visitor"));
    }

    #[test]
    fn accepts_exactly_limit_calls_per_window() {
        let limiter = SlidingWindowLimiter::new(Duration::from_secs(60), 3);
        let base = Instant::now();

        for i in 0..3 {
            assert!(limiter.check_and_record_at("visitor", at(base, i)));
        }
        assert!(!limiter.check_and_record_at("visitor", at(base, 3)));
    }

    #[test]
    fn rejected_calls_still_count_toward_the_window() {
        let limiter = SlidingWindowLimiter::new(Duration::from_secs(60), 2);
        let base = Instant::now();

        assert!(limiter.check_and_record_at("visitor", at(base, 0)));
        assert!(limiter.check_and_record_at("visitor", at(base, 1)));
        assert!(!limiter.check_and_record_at("visitor", at(base, 2)));
        // The rejection above was recorded, so 3 of the last 4 timestamps
        // are still inside the window.
        assert!(!limiter.check_and_record_at("visitor", at(base, 3)));
    }

    #[test]
    fn capacity_frees_as_timestamps_age_out() {
        let limiter = SlidingWindowLimiter::new(Duration::from_secs(60), 3);
        let base = Instant::now();

        assert!(limiter.check_and_record_at("visitor", at(base, 0)));
        assert!(limiter.check_and_record_at("visitor", at(base, 10)));
        assert!(limiter.check_and_record_at("visitor", at(base, 20)));

        // The call at t=0 has aged out, freeing exactly one slot.
        assert!(limiter.check_and_record_at("visitor", at(base, 61)));
        assert!(!limiter.check_and_record_at("visitor", at(base, 62)));
    }

    #[test]
    fn keys_are_tracked_independently() {
        let limiter = SlidingWindowLimiter::new(Duration::from_secs(60), 1);
        let base = Instant::now();

        assert!(limiter.check_and_record_at("203.0.113.7", at(base, 0)));
        assert!(!limiter.check_and_record_at("203.0.113.7", at(base, 1)));
        assert!(limiter.check_and_record_at("203.0.113.8", at(base, 1)));
    }

    #[test]
    fn reset_clears_rejection_history() {
        let limiter = SlidingWindowLimiter::new(Duration::from_secs(60), 1);
        let base = Instant::now();

        assert!(limiter.check_and_record_at("203.0.113.7", at(base, 0)));
        assert!(!limiter.check_and_record_at("203.0.113.7", at(base, 1)));

        limiter.reset("203.0.113.7");
        assert!(limiter.check_and_record_at("203.0.113.7", at(base, 2)));
    }
}
