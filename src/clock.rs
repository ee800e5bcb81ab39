//! # Clock / TimeZone Adapter
//!
//! Everything that needs "now" reads it through [`Clock`], so the window engine and the
//! scheduler can be driven by simulated time in tests ([`ManualClock`]).
//!
//! [`localize`] is the single place where a civil (wall-clock) time in the reference
//! timezone becomes an absolute instant.

use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use std::sync::{Arc, Mutex, PoisonError};

/// Source of the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time of the host.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same instant, so a test can keep one handle and hand another to the
/// system under test.
#[derive(Clone, Debug)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn set(&self, at: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = at;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Converts a civil time in `tz` to an absolute instant.
///
/// Ambiguous times (clocks turned back) resolve to the earlier instant. Times that do not
/// exist (clocks turned forward) move to the first valid wall-clock minute after the gap.
pub fn localize(tz: Tz, local: NaiveDateTime) -> DateTime<Utc> {
    let mut candidate = local;
    // No zone skips more than a day.
    for _ in 0..(24 * 60) {
        match tz.from_local_datetime(&candidate) {
            LocalResult::Single(at) => return at.with_timezone(&Utc),
            LocalResult::Ambiguous(earliest, _) => return earliest.with_timezone(&Utc),
            LocalResult::None => candidate += Duration::minutes(1),
        }
    }
    Utc.from_utc_datetime(&local)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use chrono_tz::Europe::Amsterdam;

    fn civil(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.from_utc_datetime(&civil(y, m, d, h, min))
    }

    #[test]
    fn summer_and_winter_offsets() {
        assert_eq!(localize(Amsterdam, civil(2026, 10, 23, 11, 0)), utc(2026, 10, 23, 9, 0));
        assert_eq!(localize(Amsterdam, civil(2026, 10, 30, 11, 0)), utc(2026, 10, 30, 10, 0));
    }

    #[test]
    fn ambiguous_time_takes_earliest_instant() {
        // 2026-10-25 02:30 happens twice in Amsterdam.
        assert_eq!(localize(Amsterdam, civil(2026, 10, 25, 2, 30)), utc(2026, 10, 25, 0, 30));
    }

    #[test]
    fn skipped_time_moves_past_the_gap() {
        // 2027-03-28 02:00-03:00 does not exist in Amsterdam.
        assert_eq!(localize(Amsterdam, civil(2027, 3, 28, 2, 30)), utc(2027, 3, 28, 1, 0));
    }

    #[test]
    fn manual_clock_is_shared_between_clones() {
        let clock = ManualClock::new(utc(2026, 10, 16, 9, 0));
        let handle = clock.clone();
        handle.advance(Duration::minutes(5));
        assert_eq!(clock.now(), utc(2026, 10, 16, 9, 5));
        clock.set(utc(2026, 10, 17, 0, 0));
        assert_eq!(handle.now(), utc(2026, 10, 17, 0, 0));
    }
}
