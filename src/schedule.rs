//! The weekly cycle: a base instant (order day + order time, in the reference timezone) and
//! the offsets at which the cycle closes, resets and clears.
//!
//! All arithmetic happens on civil dates and times and is converted to an instant last, so
//! a daylight-saving change never moves "Friday 11:00" to 10:00 or 12:00.

use crate::clock::localize;
use chrono::{DateTime, Datelike, Days, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc, Weekday};
use chrono_tz::Tz;

#[derive(Clone, Debug, PartialEq)]
pub struct CycleSchedule {
    pub order_day: Weekday,
    pub order_time: NaiveTime,
    pub close_offset: Duration,
    pub reset_offset: Duration,
    pub clear_offset: Duration,
    pub tz: Tz,
}

impl Default for CycleSchedule {
    fn default() -> Self {
        Self {
            order_day: Weekday::Fri,
            order_time: NaiveTime::from_hms_opt(11, 0, 0).unwrap_or_default(),
            close_offset: Duration::hours(1),
            reset_offset: Duration::hours(3),
            clear_offset: Duration::hours(4),
            tz: chrono_tz::Europe::Amsterdam,
        }
    }
}

impl CycleSchedule {
    /// Civil time in the reference timezone.
    pub fn local(&self, at: DateTime<Utc>) -> NaiveDateTime {
        at.with_timezone(&self.tz).naive_local()
    }

    pub fn in_zone(&self, at: DateTime<Utc>) -> DateTime<Tz> {
        at.with_timezone(&self.tz)
    }

    /// The base instant of a cycle whose order day falls on `date`.
    pub fn opening_on(&self, date: NaiveDate) -> DateTime<Utc> {
        self.fire_on(date, Duration::zero())
    }

    /// `date` at the order time plus the close offset.
    pub fn close_on(&self, date: NaiveDate) -> DateTime<Utc> {
        self.fire_on(date, self.close_offset)
    }

    /// `date` at the order time plus `offset`, measured in wall-clock time.
    pub fn fire_on(&self, date: NaiveDate, offset: Duration) -> DateTime<Utc> {
        localize(self.tz, date.and_time(self.order_time) + offset)
    }

    /// The first order day on or after `from`; with `include_from == false` an order day
    /// equal to `from` is skipped in favour of the one a week later.
    pub fn next_order_date(&self, from: NaiveDate, include_from: bool) -> NaiveDate {
        let target = self.order_day.num_days_from_monday();
        let current = from.weekday().num_days_from_monday();
        let mut ahead = (target + 7 - current) % 7;
        if ahead == 0 && !include_from {
            ahead = 7;
        }
        from + Days::new(u64::from(ahead))
    }

    /// The first instant strictly after `after` at which a trigger with `offset` fires.
    ///
    /// Used both for the initial registration and to re-derive the following week's fire
    /// instant once a trigger has run.
    pub fn next_fire(&self, offset: Duration, after: DateTime<Utc>) -> DateTime<Utc> {
        let today = self.local(after).date();
        let lookback = u64::try_from(offset.num_days().max(0)).unwrap_or(0) + 7;
        let mut base = self.next_order_date(today - Days::new(lookback), true);
        loop {
            let fire = self.fire_on(base, offset);
            if fire > after {
                return fire;
            }
            base = base + Days::new(7);
        }
    }
}
