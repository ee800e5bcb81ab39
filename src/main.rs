use frietbot::clock::{Clock, SystemClock};
use frietbot::config::Settings;
use frietbot::gateway::LogGateway;
use frietbot::lifecycle::{setup_tracing, FrietSystem};
use frietbot::model::{MenuCatalog, StaticMenu};
use frietbot::scheduler::TokioTriggerSource;
use std::sync::Arc;
use tracing::{error, info, Instrument};

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let settings = Settings::from_env().map_err(|e| {
        error!(error = %e, "Invalid configuration");
        e.to_string()
    })?;
    let menu = StaticMenu::embedded().map_err(|e| format!("Invalid menu: {e}"))?;

    info!(
        categories = menu.all_categories().len(),
        members = settings.members.len(),
        "Starting frietbot"
    );

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let gateway = Arc::new(LogGateway::new(settings.members.clone()));
    let system = FrietSystem::start(&settings, Arc::new(menu), clock.clone(), gateway);

    let triggers = TokioTriggerSource::new(settings.schedule.clone(), clock.clone());
    let span = tracing::info_span!("scheduler");
    async {
        system.scheduler().register(&triggers, clock.now());
    }
    .instrument(span)
    .await;

    match system.window_client.status().await {
        Ok(status) => info!(open = status.is_open(), next_opening = ?status.next_opening, "Order window"),
        Err(e) => error!(error = %e, "Order window unavailable"),
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Could not listen for Ctrl-C");
    }

    triggers.shutdown().await;
    system.shutdown().await?;

    info!("Frietbot stopped");
    Ok(())
}
