//! The four scheduled effects, each as a typed closure over exactly what it needs.

use super::{Job, JobFuture, Trigger};
use crate::aggregator::{build_report, OrderReport};
use crate::clients::WindowClient;
use crate::clock::Clock;
use crate::gateway::{ChannelId, GatewayError, MessagingGateway, OutboundMessage};
use crate::model::MenuCatalog;
use crate::order_store::{OrderStore, StoreError};
use crate::schedule::CycleSchedule;
use crate::window_actor::WindowError;
use chrono::DateTime;
use chrono_tz::Tz;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SchedulerError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Window(#[from] WindowError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// One job per trigger.
#[derive(Clone)]
pub struct CycleJobs {
    pub open: Job,
    pub close: Job,
    pub reset: Job,
    pub clear: Job,
}

impl CycleJobs {
    pub fn job(&self, trigger: Trigger) -> Job {
        match trigger {
            Trigger::OpenCycle => self.open.clone(),
            Trigger::CloseCycle => self.close.clone(),
            Trigger::ResetCycle => self.reset.clone(),
            Trigger::ClearStore => self.clear.clone(),
        }
    }
}

// =============================================================================
// EFFECTS
// =============================================================================

/// Sends the invitation to every eligible member, pausing `delay` between sends.
///
/// A failed send is logged and skipped; returns how many invitations went out.
pub async fn invite_all(
    gateway: &dyn MessagingGateway,
    closes_at: DateTime<Tz>,
    delay: Duration,
) -> Result<usize, SchedulerError> {
    let members = gateway.list_eligible_users().await?;
    let mut sent = 0;
    for (n, member) in members.iter().enumerate() {
        if n > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        match gateway
            .send_direct(&member.id, OutboundMessage::Invitation { closes_at })
            .await
        {
            Ok(_) => sent += 1,
            Err(e) => warn!(user = %member.id, error = %e, "Invitation not delivered"),
        }
    }
    Ok(sent)
}

/// Posts the labelled report of every stored order to `channel`.
pub async fn publish_report(
    store: &dyn OrderStore,
    menu: &dyn MenuCatalog,
    gateway: &dyn MessagingGateway,
    channel: &ChannelId,
) -> Result<OrderReport, SchedulerError> {
    let orders = store.load_all().await?;
    let report = build_report(&orders).labelled(menu);
    gateway
        .send_to_channel(channel, OutboundMessage::Report(report.clone()))
        .await?;
    Ok(report)
}

/// Deletes every order, then ends any manual reopen, even when the delete failed.
pub async fn clear_cycle(store: &dyn OrderStore, window: &WindowClient) -> Result<usize, SchedulerError> {
    let cleared = store.clear_all().await;
    window.close_ordering().await?;
    Ok(cleared?)
}

// =============================================================================
// JOBS
// =============================================================================

pub fn broadcast_invitation(
    gateway: Arc<dyn MessagingGateway>,
    clock: Arc<dyn Clock>,
    schedule: CycleSchedule,
    delay: Duration,
) -> Job {
    Arc::new(move || -> JobFuture {
        let gateway = gateway.clone();
        let now = clock.now();
        let closes_at = schedule.in_zone(schedule.close_on(schedule.local(now).date()));
        Box::pin(async move {
            match invite_all(gateway.as_ref(), closes_at, delay).await {
                Ok(sent) => info!(sent, "Invitations sent"),
                Err(e) => error!(error = %e, "Invitation broadcast failed"),
            }
        })
    })
}

pub fn report_job(
    store: Arc<dyn OrderStore>,
    menu: Arc<dyn MenuCatalog>,
    gateway: Arc<dyn MessagingGateway>,
    channel: ChannelId,
) -> Job {
    Arc::new(move || -> JobFuture {
        let store = store.clone();
        let menu = menu.clone();
        let gateway = gateway.clone();
        let channel = channel.clone();
        Box::pin(async move {
            match publish_report(store.as_ref(), menu.as_ref(), gateway.as_ref(), &channel).await {
                Ok(report) => info!(%channel, total = report.total_items(), "Report published"),
                Err(e) => error!(%channel, error = %e, "Report not published"),
            }
        })
    })
}

pub fn reset_job(window: WindowClient) -> Job {
    Arc::new(move || -> JobFuture {
        let window = window.clone();
        Box::pin(async move {
            match window.reset_cycle().await {
                Ok(start) => info!(next_cycle_start = %start, "Cycle reset"),
                Err(e) => error!(error = %e, "Cycle reset failed"),
            }
        })
    })
}

pub fn clear_job(store: Arc<dyn OrderStore>, window: WindowClient) -> Job {
    Arc::new(move || -> JobFuture {
        let store = store.clone();
        let window = window.clone();
        Box::pin(async move {
            match clear_cycle(store.as_ref(), &window).await {
                Ok(cleared) => info!(cleared, "Orders cleared"),
                Err(e) => error!(error = %e, "Clearing orders failed"),
            }
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::OrderStoreClient;
    use crate::clock::ManualClock;
    use crate::framework::{mock::MockClient, FrameworkError};
    use crate::gateway::{Member, RecordingGateway, Sent};
    use crate::model::{Order, OrderItem, StaticMenu, UserId};
    use crate::{order_store, window_actor};
    use chrono::{TimeZone, Utc};

    fn friday_open() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 9, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_invitations_skip_ineligible_and_failed_members() {
        let gateway = Arc::new(RecordingGateway::new());
        gateway.set_members(vec![
            Member::person("U1", "alice"),
            Member { is_bot: true, ..Member::person("B1", "deploybot") },
            Member::person("USLACKBOT", "slackbot"),
            Member::person("U2", "bob"),
        ]);
        let clock = ManualClock::new(friday_open());
        let job = broadcast_invitation(
            gateway.clone(),
            Arc::new(clock),
            CycleSchedule::default(),
            Duration::from_millis(1),
        );
        job().await;

        let schedule = CycleSchedule::default();
        let closes_at = schedule.in_zone(Utc.with_ymd_and_hms(2026, 10, 16, 10, 0, 0).unwrap());
        let invited: Vec<UserId> = gateway
            .sent()
            .into_iter()
            .map(|sent| match sent {
                Sent::Direct { user, message } => {
                    assert_eq!(message, OutboundMessage::Invitation { closes_at });
                    user
                }
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(invited, vec![UserId::new("U1"), UserId::new("U2")]);

        gateway.fail_deliveries(true);
        assert_eq!(invite_all(gateway.as_ref(), closes_at, Duration::ZERO).await, Ok(0));
    }

    #[tokio::test]
    async fn test_report_goes_to_the_report_channel() {
        let (actor, store) = order_store::new(8);
        tokio::spawn(actor.run(()));
        let mut order = Order::new(UserId::new("U1"), "Alice");
        order.replace_items(vec![OrderItem::selected("dranken", "cola", "Cola")]);
        order.answer_current(3).unwrap();
        order.advance();
        store.save(order).await.unwrap();

        let gateway = RecordingGateway::new();
        let menu = StaticMenu::embedded().unwrap();
        let channel = ChannelId::new("friet-bestelling");
        let report = publish_report(&store, &menu, &gateway, &channel).await.unwrap();

        assert_eq!(report.total_items(), 3);
        assert_eq!(gateway.posted_to(&channel), vec![OutboundMessage::Report(report)]);
    }

    #[tokio::test]
    async fn test_clear_closes_ordering_even_when_the_store_fails() {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 10, 20, 14, 0, 0).unwrap());
        let (actor, window) = window_actor::new(
            CycleSchedule::default(),
            chrono::Duration::minutes(30),
            Arc::new(clock),
            4,
        );
        tokio::spawn(actor.run());

        let mut mock = MockClient::<Order>::new();
        mock.expect_clear().return_ok(2);
        mock.expect_clear().return_err(FrameworkError::ActorClosed);
        let store = OrderStoreClient::new(mock.client());

        window.manually_reopen().await.unwrap();
        assert_eq!(clear_cycle(&store, &window).await, Ok(2));
        assert!(!window.status().await.unwrap().is_open());

        window.manually_reopen().await.unwrap();
        let result = clear_cycle(&store, &window).await;
        assert!(matches!(result, Err(SchedulerError::Store(StoreError::Unavailable(_)))));
        assert!(!window.status().await.unwrap().is_open());
        mock.verify();
    }
}
