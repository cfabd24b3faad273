//! Daily-suggestion limiter (spec §4.9): caps how many new candidates a
//! user is served in each rolling `refreshIntervalHours` window.
//!
//! State lives in an in-process `Mutex<HashMap<...>>` keyed by user id, all
//! mutations serialized by a single mutex per spec §5. This is
//! intentionally non-persistent: a process restart resets every user's
//! counter immediately. See DESIGN.md for why that's acceptable here.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone, Copy)]
struct UserCounter {
    last_reset: DateTime<Utc>,
    shown_today: u32,
}

/// Outcome of asking the limiter whether another suggestion may be shown.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LimiterStatus {
    pub shown_today: u32,
    pub max: u32,
    pub remaining: u32,
    pub last_reset_date: DateTime<Utc>,
    pub next_reset_date: DateTime<Utc>,
    pub queue_exhausted: bool,
}

/// Result of [`DailySuggestionLimiter::check_and_increment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckResult {
    pub allowed: bool,
    pub remaining: u32,
}

pub struct DailySuggestionLimiter {
    max_daily_suggestions: u32,
    premium_max_daily_suggestions: u32,
    refresh_interval_hours: i64,
    counters: Mutex<HashMap<i64, UserCounter>>,
}

pub const DEFAULT_MAX_DAILY_SUGGESTIONS: u32 = 50;
pub const DEFAULT_PREMIUM_MAX_DAILY_SUGGESTIONS: u32 = 150;
pub const DEFAULT_REFRESH_INTERVAL_HOURS: i64 = 24;

impl DailySuggestionLimiter {
    pub fn new(max_daily_suggestions: u32, premium_max_daily_suggestions: u32, refresh_interval_hours: i64) -> Self {
        Self {
            max_daily_suggestions,
            premium_max_daily_suggestions,
            refresh_interval_hours,
            counters: Mutex::new(HashMap::new()),
        }
    }

    fn max_for(&self, is_premium: bool) -> u32 {
        if is_premium {
            self.premium_max_daily_suggestions
        } else {
            self.max_daily_suggestions
        }
    }

    fn reset_if_elapsed(&self, counter: &mut UserCounter, now: DateTime<Utc>) {
        if now - counter.last_reset >= Duration::hours(self.refresh_interval_hours) {
            counter.last_reset = now;
            counter.shown_today = 0;
        }
    }

    fn counter_for(&self, counters: &mut HashMap<i64, UserCounter>, user_id: i64, now: DateTime<Utc>) -> UserCounter {
        let counter = counters.entry(user_id).or_insert(UserCounter {
            last_reset: now,
            shown_today: 0,
        });
        self.reset_if_elapsed(counter, now);
        *counter
    }

    /// Current status for a user without mutating the counter.
    pub fn status(&self, user_id: i64, is_premium: bool, now: DateTime<Utc>) -> LimiterStatus {
        let mut counters = self.counters.lock().expect("limiter mutex poisoned");
        let counter = self.counter_for(&mut counters, user_id, now);
        let max = self.max_for(is_premium);
        let remaining = max.saturating_sub(counter.shown_today);

        LimiterStatus {
            shown_today: counter.shown_today,
            max,
            remaining,
            last_reset_date: counter.last_reset,
            next_reset_date: counter.last_reset + Duration::hours(self.refresh_interval_hours),
            queue_exhausted: remaining == 0,
        }
    }

    /// Reset-if-elapsed, then increment by one if budget remains.
    pub fn check_and_increment(&self, user_id: i64, is_premium: bool, now: DateTime<Utc>) -> CheckResult {
        let mut counters = self.counters.lock().expect("limiter mutex poisoned");
        let max = self.max_for(is_premium);
        let counter = counters.entry(user_id).or_insert(UserCounter {
            last_reset: now,
            shown_today: 0,
        });
        self.reset_if_elapsed(counter, now);

        if counter.shown_today < max {
            counter.shown_today += 1;
            CheckResult {
                allowed: true,
                remaining: max - counter.shown_today,
            }
        } else {
            CheckResult {
                allowed: false,
                remaining: 0,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn limiter() -> DailySuggestionLimiter {
        DailySuggestionLimiter::new(3, 5, 24)
    }

    #[test]
    fn grants_up_to_max_then_disallows() {
        let limiter = limiter();
        let now = at(2026, 1, 1);
        assert!(limiter.check_and_increment(1, false, now).allowed);
        assert!(limiter.check_and_increment(1, false, now).allowed);
        assert!(limiter.check_and_increment(1, false, now).allowed);
        let result = limiter.check_and_increment(1, false, now);
        assert!(!result.allowed);
        assert_eq!(result.remaining, 0);
    }

    #[test]
    fn premium_users_get_higher_cap() {
        let limiter = limiter();
        let now = at(2026, 1, 1);
        for _ in 0..5 {
            assert!(limiter.check_and_increment(1, true, now).allowed);
        }
        assert!(!limiter.check_and_increment(1, true, now).allowed);
    }

    #[test]
    fn status_reflects_remaining_without_mutating() {
        let limiter = limiter();
        let now = at(2026, 1, 1);
        limiter.check_and_increment(1, false, now);
        limiter.check_and_increment(1, false, now);
        let status = limiter.status(1, false, now);
        assert_eq!(status.shown_today, 2);
        assert_eq!(status.remaining, 1);
        assert!(!status.queue_exhausted);
        let status2 = limiter.status(1, false, now);
        assert_eq!(status2.shown_today, 2);
    }

    #[test]
    fn resets_after_refresh_interval_elapses() {
        let limiter = limiter();
        let day1 = at(2026, 1, 1);
        let day2 = day1 + Duration::hours(25);
        for _ in 0..3 {
            limiter.check_and_increment(1, false, day1);
        }
        assert_eq!(limiter.status(1, false, day1).remaining, 0);
        assert_eq!(limiter.status(1, false, day2).remaining, 3);
    }

    #[test]
    fn does_not_reset_before_interval_elapses() {
        let limiter = limiter();
        let day1 = at(2026, 1, 1);
        let same_day_later = day1 + Duration::hours(5);
        limiter.check_and_increment(1, false, day1);
        assert_eq!(limiter.status(1, false, same_day_later).shown_today, 1);
    }

    #[test]
    fn counters_are_independent_per_user() {
        let limiter = limiter();
        let now = at(2026, 1, 1);
        for _ in 0..3 {
            limiter.check_and_increment(1, false, now);
        }
        assert_eq!(limiter.status(2, false, now).remaining, 3);
    }
}
