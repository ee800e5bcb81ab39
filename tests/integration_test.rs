use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Europe::Amsterdam;
use frietbot::clock::{Clock, ManualClock};
use frietbot::config::Settings;
use frietbot::conversation::{ReplyOutcome, Selection, SubmissionResponse};
use frietbot::gateway::{ChannelId, Member, OutboundMessage, RecordingGateway};
use frietbot::lifecycle::FrietSystem;
use frietbot::model::{StaticMenu, UserId};
use frietbot::order_store::OrderStore;
use frietbot::scheduler::{Job, Trigger, TriggerSource};
use std::sync::{Arc, Mutex};

fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

/// Keeps the registered jobs so the test can fire them by hand.
#[derive(Default)]
struct HandCrankedTriggers {
    registered: Mutex<Vec<(Trigger, DateTime<Utc>, Job)>>,
}

impl TriggerSource for HandCrankedTriggers {
    fn register(&self, trigger: Trigger, first_fire: DateTime<Utc>, job: Job) {
        self.registered.lock().unwrap().push((trigger, first_fire, job));
    }
}

impl HandCrankedTriggers {
    /// Moves the clock to the trigger's instant and runs its job.
    async fn fire(&self, clock: &ManualClock, trigger: Trigger) -> DateTime<Utc> {
        let (at, job) = {
            let registered = self.registered.lock().unwrap();
            let (_, at, job) = registered
                .iter()
                .find(|(t, _, _)| *t == trigger)
                .expect("trigger registered");
            (*at, job.clone())
        };
        clock.set(at);
        job().await;
        at
    }

    fn clear(&self) {
        self.registered.lock().unwrap().clear();
    }
}

async fn order(system: &FrietSystem, user: &str, name: &str, picks: &[(&str, &str, &str)]) {
    let user = UserId::new(user);
    let dm = ChannelId::new(format!("D{user}"));
    let selections: Vec<Selection> = picks.iter().map(|(c, id, _)| Selection::new(*c, *id)).collect();
    assert_eq!(
        system.conversation.on_selection_submitted(&user, name, &selections).await,
        SubmissionResponse::Accepted
    );
    for (_, _, quantity) in picks {
        let outcome = system.conversation.on_quantity_reply(&user, &dm, quantity).await;
        assert!(matches!(outcome, ReplyOutcome::Prompted | ReplyOutcome::Completed));
    }
}

/// One full week: invite, order, report, reset, clear.
#[tokio::test]
async fn test_full_cycle_integration() {
    // Friday 10:00 in Amsterdam, an hour before ordering opens.
    let clock = ManualClock::new(utc(2026, 10, 16, 8, 0));
    let gateway = Arc::new(RecordingGateway::new());
    gateway.set_members(vec![
        Member::person("U1", "alice"),
        Member::person("U2", "bob"),
        Member { is_bot: true, ..Member::person("B1", "frietbot") },
        Member { deleted: true, ..Member::person("U3", "carol") },
    ]);
    let settings = Settings::default();
    let system = FrietSystem::start(
        &settings,
        Arc::new(StaticMenu::embedded().unwrap()),
        Arc::new(clock.clone()),
        gateway.clone(),
    );

    let before = system.window_client.status().await.unwrap();
    assert!(!before.is_open());
    assert_eq!(before.next_opening, Some(utc(2026, 10, 16, 9, 0)));

    let triggers = HandCrankedTriggers::default();
    system.scheduler().register(&triggers, clock.now());

    // Open: invitations to the eligible members only.
    triggers.fire(&clock, Trigger::OpenCycle).await;
    let invitation = OutboundMessage::Invitation {
        closes_at: Amsterdam.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap(),
    };
    assert_eq!(gateway.direct_to(&UserId::new("U1")), vec![invitation.clone()]);
    assert_eq!(gateway.direct_to(&UserId::new("U2")), vec![invitation]);
    assert!(gateway.direct_to(&UserId::new("U3")).is_empty());

    let open = system.window_client.status().await.unwrap();
    assert!(open.is_open());
    assert_eq!(open.next_opening, None);
    assert_eq!(open.deadline, Some(utc(2026, 10, 16, 10, 0)));

    order(&system, "U1", "Alice", &[("dranken", "cola", "2")]).await;
    order(&system, "U2", "Bob", &[("dranken", "cola", "1"), ("friet", "friet", "1")]).await;

    // Close: the report lands in the report channel.
    triggers.fire(&clock, Trigger::CloseCycle).await;
    let reports = gateway.posted_to(&settings.report_channel);
    let [OutboundMessage::Report(report)] = reports.as_slice() else {
        panic!("expected one report, got {reports:?}");
    };
    assert_eq!(
        report.to_string(),
        "This week's order:\n\n*Dranken*\n• 3x Cola\n\n*Friet*\n• 1x Friet\n\nTotal items: 4"
    );

    let closed = system.window_client.status().await.unwrap();
    assert!(!closed.is_open());
    assert_eq!(closed.next_opening, None);
    assert_eq!(closed.deadline, Some(utc(2026, 10, 16, 10, 0)));

    let late = system
        .conversation
        .on_selection_submitted(&UserId::new("U1"), "Alice", &[Selection::new("friet", "friet")])
        .await;
    assert_eq!(late, SubmissionResponse::Closed);

    // Reset: next week's opening is scheduled.
    triggers.fire(&clock, Trigger::ResetCycle).await;
    let reset = system.window_client.status().await.unwrap();
    assert!(!reset.is_open());
    assert_eq!(reset.next_opening, Some(utc(2026, 10, 23, 9, 0)));
    assert_eq!(reset.deadline, Some(utc(2026, 10, 23, 10, 0)));

    // Clear: the store is emptied.
    assert_eq!(system.store_client.load_all().await.unwrap().len(), 2);
    triggers.fire(&clock, Trigger::ClearStore).await;
    assert!(system.store_client.load_all().await.unwrap().is_empty());

    // The jobs hold clients; release them before shutting down.
    triggers.clear();
    system.shutdown().await.expect("clean shutdown");
}

#[tokio::test]
async fn test_manual_reopen_then_clear_closes_again() {
    // Wednesday 15:00 in Amsterdam.
    let clock = ManualClock::new(utc(2026, 10, 21, 13, 0));
    let system = FrietSystem::start(
        &Settings::default(),
        Arc::new(StaticMenu::embedded().unwrap()),
        Arc::new(clock.clone()),
        Arc::new(RecordingGateway::new()),
    );

    let until = system.window_client.manually_reopen().await.unwrap();
    assert_eq!(until, utc(2026, 10, 21, 13, 30));
    order(&system, "U1", "Alice", &[("snacks", "kroket", "4")]).await;

    let triggers = HandCrankedTriggers::default();
    system.scheduler().register(&triggers, clock.now());
    let cleared_at = triggers.fire(&clock, Trigger::ClearStore).await;
    assert_eq!(cleared_at, utc(2026, 10, 23, 13, 0));

    clock.set(utc(2026, 10, 21, 13, 10));
    assert!(!system.window_client.status().await.unwrap().is_open());
    assert!(system.store_client.load_all().await.unwrap().is_empty());

    triggers.clear();
    system.shutdown().await.expect("clean shutdown");
}
