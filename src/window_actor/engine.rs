//! # Order Window Engine
//!
//! Answers "is ordering open now, when does it open next, and what is the deadline".
//!
//! The engine is a plain value: it never reads a clock, every operation is handed `now`.
//! Its only mutable state is [`WindowState`], and the only way to change that is through
//! the operations below. The [`WindowActor`](super::WindowActor) serializes access.

use crate::schedule::CycleSchedule;
use chrono::{DateTime, Datelike, Duration, Utc};

/// Overrides of the weekly window. Both expire lazily, on the first query past them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WindowState {
    /// Opening of the next cycle, set by a reset.
    pub next_cycle_start: Option<DateTime<Utc>>,
    /// End of a manual reopen.
    pub manual_reopen_until: Option<DateTime<Utc>>,
}

/// Why ordering is open, if it is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Availability {
    Closed,
    OpenManually,
    OpenWeekly,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowStatus {
    pub availability: Availability,
    pub next_opening: Option<DateTime<Utc>>,
    pub deadline: Option<DateTime<Utc>>,
}

impl WindowStatus {
    pub fn is_open(&self) -> bool {
        self.availability != Availability::Closed
    }

    fn closed(next_opening: Option<DateTime<Utc>>, deadline: DateTime<Utc>) -> Self {
        Self {
            availability: Availability::Closed,
            next_opening,
            deadline: Some(deadline),
        }
    }
}

#[derive(Clone, Debug)]
pub struct OrderWindow {
    schedule: CycleSchedule,
    grace: Duration,
    state: WindowState,
}

impl OrderWindow {
    pub fn new(schedule: CycleSchedule, grace: Duration) -> Self {
        Self {
            schedule,
            grace,
            state: WindowState::default(),
        }
    }

    pub fn state(&self) -> &WindowState {
        &self.state
    }

    pub fn status(&mut self, now: DateTime<Utc>) -> WindowStatus {
        if let Some(until) = self.state.manual_reopen_until {
            if now < until {
                return WindowStatus {
                    availability: Availability::OpenManually,
                    next_opening: self.state.next_cycle_start,
                    deadline: Some(until),
                };
            }
            self.state.manual_reopen_until = None;
        }

        if let Some(start) = self.state.next_cycle_start {
            if now < start {
                let start_date = self.schedule.local(start).date();
                return WindowStatus::closed(Some(start), self.schedule.close_on(start_date));
            }
            self.state.next_cycle_start = None;
        }

        let local = self.schedule.local(now);
        let today = local.date();
        let close_today = self.schedule.close_on(today);
        if now >= close_today {
            return WindowStatus::closed(None, close_today);
        }

        if today.weekday() == self.schedule.order_day && local.time() >= self.schedule.order_time {
            return WindowStatus {
                availability: Availability::OpenWeekly,
                next_opening: None,
                deadline: Some(close_today),
            };
        }

        let next_date = self.schedule.next_order_date(today, true);
        WindowStatus::closed(
            Some(self.schedule.opening_on(next_date)),
            self.schedule.close_on(next_date),
        )
    }

    /// Forces ordering open for the grace period; returns when that ends.
    pub fn manually_reopen(&mut self, now: DateTime<Utc>) -> DateTime<Utc> {
        let until = now + self.grace;
        self.state.manual_reopen_until = Some(until);
        until
    }

    /// Ends a manual reopen right away.
    pub fn close_ordering(&mut self) {
        self.state.manual_reopen_until = None;
    }

    /// Schedules the next cycle on the first order day after today, never today itself.
    pub fn reset_cycle(&mut self, now: DateTime<Utc>) -> DateTime<Utc> {
        let today = self.schedule.local(now).date();
        let start = self
            .schedule
            .opening_on(self.schedule.next_order_date(today, false));
        self.state.next_cycle_start = Some(start);
        start
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn window() -> OrderWindow {
        OrderWindow::new(CycleSchedule::default(), Duration::minutes(30))
    }

    // Friday 2026-10-16, 11:00 in Amsterdam (CEST).
    fn order_time() -> DateTime<Utc> {
        utc(2026, 10, 16, 9, 0)
    }

    #[test]
    fn weekly_cycle_end_to_end() {
        let mut window = window();
        let deadline = utc(2026, 10, 16, 10, 0);

        let at_open = window.status(order_time());
        assert_eq!(at_open.availability, Availability::OpenWeekly);
        assert_eq!(at_open.next_opening, None);
        assert_eq!(at_open.deadline, Some(deadline));

        assert_eq!(window.status(order_time() + Duration::minutes(1)), at_open);

        let after_close = window.status(deadline + Duration::minutes(1));
        assert!(!after_close.is_open());
        assert_eq!(after_close.next_opening, None);
        assert_eq!(after_close.deadline, Some(deadline));

        let reset_at = utc(2026, 10, 16, 12, 0);
        window.reset_cycle(reset_at);
        let after_reset = window.status(reset_at);
        assert!(!after_reset.is_open());
        assert_eq!(after_reset.next_opening, Some(utc(2026, 10, 23, 9, 0)));
        assert_eq!(after_reset.deadline, Some(utc(2026, 10, 23, 10, 0)));
    }

    #[test]
    fn closed_before_order_time_points_at_today() {
        let mut window = window();
        let status = window.status(utc(2026, 10, 16, 6, 0));
        assert!(!status.is_open());
        assert_eq!(status.next_opening, Some(order_time()));
        assert_eq!(status.deadline, Some(utc(2026, 10, 16, 10, 0)));
    }

    #[test]
    fn weekday_morning_points_at_friday() {
        let mut window = window();
        // Tuesday 08:00 local.
        let status = window.status(utc(2026, 10, 20, 6, 0));
        assert_eq!(status.availability, Availability::Closed);
        assert_eq!(status.next_opening, Some(utc(2026, 10, 23, 9, 0)));
    }

    #[test]
    fn manual_reopen_lasts_exactly_the_grace_period() {
        let mut window = window();
        let now = utc(2026, 10, 20, 14, 0);
        assert!(!window.status(now).is_open());

        let until = window.manually_reopen(now);
        assert_eq!(until, now + Duration::minutes(30));

        for minute in [0, 10, 29] {
            let status = window.status(now + Duration::minutes(minute));
            assert_eq!(status.availability, Availability::OpenManually);
            assert_eq!(status.deadline, Some(until));
        }

        let expired = window.status(until);
        assert!(!expired.is_open());
        assert_eq!(window.state().manual_reopen_until, None);
    }

    #[test]
    fn manual_reopen_during_weekly_window_reports_one_reason() {
        let mut window = window();
        window.manually_reopen(order_time());
        let status = window.status(order_time() + Duration::minutes(5));
        assert_eq!(status.availability, Availability::OpenManually);

        let later = window.status(order_time() + Duration::minutes(45));
        assert_eq!(later.availability, Availability::OpenWeekly);
    }

    #[test]
    fn close_ordering_cancels_manual_reopen() {
        let mut window = window();
        let now = utc(2026, 10, 20, 14, 0);
        window.manually_reopen(now);
        window.close_ordering();
        assert!(!window.status(now + Duration::minutes(1)).is_open());
    }

    #[test]
    fn reset_on_order_day_skips_to_next_week() {
        let mut window = window();
        // Before the order time on the order day itself.
        let start = window.reset_cycle(utc(2026, 10, 16, 5, 0));
        assert_eq!(start, utc(2026, 10, 23, 9, 0));

        // Thursday resets to the next day.
        let start = window.reset_cycle(utc(2026, 10, 22, 12, 0));
        assert_eq!(start, utc(2026, 10, 23, 9, 0));
    }

    #[test]
    fn reset_keeps_wall_clock_over_dst_change() {
        let mut window = window();
        let start = window.reset_cycle(utc(2026, 10, 23, 12, 0));
        // 2026-10-30 is after the switch to CET.
        assert_eq!(start, utc(2026, 10, 30, 10, 0));
    }

    #[test]
    fn reset_override_expires_when_reached() {
        let mut window = window();
        window.reset_cycle(utc(2026, 10, 16, 12, 0));
        let status = window.status(utc(2026, 10, 23, 9, 0));
        assert_eq!(status.availability, Availability::OpenWeekly);
        assert_eq!(window.state().next_cycle_start, None);
    }

    #[test]
    fn reset_never_lands_on_or_before_now() {
        let mut window = window();
        let mut now = utc(2026, 10, 12, 0, 0);
        while now < utc(2026, 11, 2, 0, 0) {
            assert!(window.reset_cycle(now) > now);
            now += Duration::minutes(97);
        }
    }
}
