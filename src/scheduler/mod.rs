//! # Cycle Scheduler
//!
//! Fires the four effects of a cycle at fixed offsets from the weekly base instant:
//!
//! | Trigger | Offset | Effect |
//! |---|---|---|
//! | [`Trigger::OpenCycle`] | 0 | invite every eligible member |
//! | [`Trigger::CloseCycle`] | close | publish the consolidated report |
//! | [`Trigger::ResetCycle`] | reset | schedule the next cycle on the window |
//! | [`Trigger::ClearStore`] | clear | delete all orders, end any manual reopen |
//!
//! The scheduler only computes the first fire instants and hands one [`Job`] per trigger to
//! a [`TriggerSource`]; delivering the triggers week after week is the source's job.

pub mod jobs;
pub mod tokio_source;

pub use jobs::{CycleJobs, SchedulerError};
pub use tokio_source::TokioTriggerSource;

use crate::schedule::CycleSchedule;
use chrono::{DateTime, Duration, Utc};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::info;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Trigger {
    OpenCycle,
    CloseCycle,
    ResetCycle,
    ClearStore,
}

impl Trigger {
    /// In firing order.
    pub const ALL: [Trigger; 4] = [
        Trigger::OpenCycle,
        Trigger::CloseCycle,
        Trigger::ResetCycle,
        Trigger::ClearStore,
    ];

    /// Distance from the base instant, in wall-clock time.
    pub fn offset(&self, schedule: &CycleSchedule) -> Duration {
        match self {
            Trigger::OpenCycle => Duration::zero(),
            Trigger::CloseCycle => schedule.close_offset,
            Trigger::ResetCycle => schedule.reset_offset,
            Trigger::ClearStore => schedule.clear_offset,
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Trigger::OpenCycle => "open-cycle",
            Trigger::CloseCycle => "close-cycle",
            Trigger::ResetCycle => "reset-cycle",
            Trigger::ClearStore => "clear-store",
        };
        f.write_str(name)
    }
}

pub type JobFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// One scheduled effect. Called once per firing.
pub type Job = Arc<dyn Fn() -> JobFuture + Send + Sync>;

/// Something that calls a job at `first_fire` and then weekly at the same wall-clock time.
pub trait TriggerSource: Send + Sync {
    fn register(&self, trigger: Trigger, first_fire: DateTime<Utc>, job: Job);
}

pub struct CycleScheduler {
    schedule: CycleSchedule,
    jobs: CycleJobs,
}

impl CycleScheduler {
    pub fn new(schedule: CycleSchedule, jobs: CycleJobs) -> Self {
        Self { schedule, jobs }
    }

    /// The first instant strictly after `now` at which each trigger fires.
    pub fn first_fires(&self, now: DateTime<Utc>) -> Vec<(Trigger, DateTime<Utc>)> {
        Trigger::ALL
            .iter()
            .map(|trigger| (*trigger, self.schedule.next_fire(trigger.offset(&self.schedule), now)))
            .collect()
    }

    /// Hands all four jobs to `source`. Call once, at startup.
    pub fn register(&self, source: &dyn TriggerSource, now: DateTime<Utc>) {
        for (trigger, at) in self.first_fires(now) {
            info!(%trigger, at = %self.schedule.in_zone(at), "Registering trigger");
            source.register(trigger, at, self.jobs.job(trigger));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::Mutex;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn noop() -> Job {
        Arc::new(|| -> JobFuture { Box::pin(async {}) })
    }

    #[derive(Default)]
    struct RecordingSource {
        registered: Mutex<Vec<(Trigger, DateTime<Utc>)>>,
    }

    impl TriggerSource for RecordingSource {
        fn register(&self, trigger: Trigger, first_fire: DateTime<Utc>, _job: Job) {
            self.registered.lock().unwrap().push((trigger, first_fire));
        }
    }

    fn scheduler() -> CycleScheduler {
        let jobs = CycleJobs {
            open: noop(),
            close: noop(),
            reset: noop(),
            clear: noop(),
        };
        CycleScheduler::new(CycleSchedule::default(), jobs)
    }

    #[test]
    fn before_the_base_instant_all_fire_today() {
        let source = RecordingSource::default();
        // Friday 10:30 in Amsterdam.
        scheduler().register(&source, utc(2026, 10, 16, 8, 30));
        assert_eq!(
            *source.registered.lock().unwrap(),
            vec![
                (Trigger::OpenCycle, utc(2026, 10, 16, 9, 0)),
                (Trigger::CloseCycle, utc(2026, 10, 16, 10, 0)),
                (Trigger::ResetCycle, utc(2026, 10, 16, 12, 0)),
                (Trigger::ClearStore, utc(2026, 10, 16, 13, 0)),
            ]
        );
    }

    #[test]
    fn mid_cycle_start_keeps_the_remaining_steps() {
        // Friday 12:30 in Amsterdam: open and close have passed.
        let fires = scheduler().first_fires(utc(2026, 10, 16, 10, 30));
        assert_eq!(
            fires,
            vec![
                (Trigger::OpenCycle, utc(2026, 10, 23, 9, 0)),
                (Trigger::CloseCycle, utc(2026, 10, 23, 10, 0)),
                (Trigger::ResetCycle, utc(2026, 10, 16, 12, 0)),
                (Trigger::ClearStore, utc(2026, 10, 16, 13, 0)),
            ]
        );
    }

    #[test]
    fn offsets_follow_the_schedule() {
        let schedule = CycleSchedule::default();
        let offsets: Vec<i64> = Trigger::ALL
            .iter()
            .map(|trigger| trigger.offset(&schedule).num_minutes())
            .collect();
        assert_eq!(offsets, vec![0, 60, 180, 240]);
        assert_eq!(Trigger::ClearStore.to_string(), "clear-store");
    }
}
