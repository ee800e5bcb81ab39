//! In-process trigger source: one Tokio task per trigger.

use super::{Job, Trigger, TriggerSource};
use crate::clock::Clock;
use crate::schedule::CycleSchedule;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Sleeps until each fire instant, runs the job, and re-derives the next weekly instant in
/// civil time. Must be used from within a Tokio runtime.
pub struct TokioTriggerSource {
    schedule: CycleSchedule,
    clock: Arc<dyn Clock>,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl TokioTriggerSource {
    pub fn new(schedule: CycleSchedule, clock: Arc<dyn Clock>) -> Self {
        Self {
            schedule,
            clock,
            handles: Mutex::new(Vec::new()),
        }
    }

    /// Stops every trigger loop. A job that is running is cancelled mid-way.
    pub async fn shutdown(&self) {
        let handles = std::mem::take(&mut *self.handles.lock().unwrap_or_else(PoisonError::into_inner));
        for handle in &handles {
            handle.abort();
        }
        for handle in handles {
            if let Err(e) = handle.await {
                if e.is_panic() {
                    error!("Trigger task failed: {:?}", e);
                }
            }
        }
        info!("Triggers stopped");
    }
}

impl TriggerSource for TokioTriggerSource {
    fn register(&self, trigger: Trigger, first_fire: chrono::DateTime<chrono::Utc>, job: Job) {
        let schedule = self.schedule.clone();
        let clock = self.clock.clone();
        let offset = trigger.offset(&schedule);

        let handle = tokio::spawn(async move {
            let mut fire = first_fire;
            loop {
                let wait = (fire - clock.now()).to_std().unwrap_or_default();
                debug!(%trigger, at = %schedule.in_zone(fire), "Trigger armed");
                tokio::time::sleep(wait).await;

                info!(%trigger, "Trigger fired");
                job().await;

                // Never fire twice for the same week, even if the job overran.
                fire = schedule.next_fire(offset, fire.max(clock.now()));
            }
        });

        self.handles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::scheduler::JobFuture;
    use chrono::{Duration, TimeZone, Utc};
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_job_runs_at_its_fire_instant() {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 10, 16, 9, 0, 0).unwrap());
        let source = TokioTriggerSource::new(CycleSchedule::default(), Arc::new(clock.clone()));

        let (tx, mut rx) = mpsc::unbounded_channel();
        let job: Job = Arc::new(move || -> JobFuture {
            let tx = tx.clone();
            Box::pin(async move {
                let _ = tx.send(Trigger::OpenCycle);
            })
        });
        source.register(Trigger::OpenCycle, clock.now() + Duration::milliseconds(20), job);

        let fired = tokio::time::timeout(std::time::Duration::from_secs(5), rx.recv())
            .await
            .expect("trigger fired in time");
        assert_eq!(fired, Some(Trigger::OpenCycle));

        source.shutdown().await;
        // The job, and with it the sender, went away with the task.
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_past_fire_instant_runs_immediately_once() {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 10, 16, 9, 30, 0).unwrap());
        let source = TokioTriggerSource::new(CycleSchedule::default(), Arc::new(clock.clone()));

        let (tx, mut rx) = mpsc::unbounded_channel();
        let job: Job = Arc::new(move || -> JobFuture {
            let tx = tx.clone();
            Box::pin(async move {
                let _ = tx.send(());
            })
        });
        source.register(Trigger::OpenCycle, clock.now() - Duration::minutes(30), job);

        tokio::time::timeout(std::time::Duration::from_secs(5), rx.recv())
            .await
            .expect("trigger fired in time");
        // The next firing is a week away.
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert!(rx.try_recv().is_err());
        source.shutdown().await;
    }
}
