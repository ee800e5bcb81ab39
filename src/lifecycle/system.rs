use crate::clients::{OrderStoreClient, WindowClient};
use crate::clock::Clock;
use crate::commands::StatusCommands;
use crate::config::Settings;
use crate::conversation::ConversationEngine;
use crate::gateway::{ChannelId, MessagingGateway};
use crate::model::MenuCatalog;
use crate::order_store::{self, OrderStore};
use crate::schedule::CycleSchedule;
use crate::scheduler::{jobs, CycleJobs, CycleScheduler};
use crate::window_actor;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// The running bot: both actors plus the engines wired to them.
pub struct FrietSystem {
    /// Client for the order window actor.
    pub window_client: WindowClient,

    /// Client for the order store actor.
    pub store_client: OrderStoreClient,

    pub conversation: ConversationEngine,

    pub commands: StatusCommands,

    schedule: CycleSchedule,
    report_channel: ChannelId,
    broadcast_delay: Duration,
    menu: Arc<dyn MenuCatalog>,
    clock: Arc<dyn Clock>,
    gateway: Arc<dyn MessagingGateway>,

    /// Task handles of the running actors.
    handles: Vec<JoinHandle<()>>,
}

impl FrietSystem {
    /// Spawns the actors and wires the engines. Must be called inside a Tokio runtime.
    pub fn start(
        settings: &Settings,
        menu: Arc<dyn MenuCatalog>,
        clock: Arc<dyn Clock>,
        gateway: Arc<dyn MessagingGateway>,
    ) -> Self {
        // 1. Create actors
        let (window_actor, window_client) = window_actor::new(
            settings.schedule.clone(),
            settings.manual_reopen,
            clock.clone(),
            settings.actor_buffer,
        );
        let (store_actor, store_client) = order_store::new(settings.actor_buffer);

        // 2. Start them
        let window_handle = tokio::spawn(window_actor.run());
        let store_handle = tokio::spawn(store_actor.run(()));

        // 3. Wire the engines
        let store: Arc<dyn OrderStore> = Arc::new(store_client.clone());
        let conversation = ConversationEngine::new(
            window_client.clone(),
            store.clone(),
            menu.clone(),
            gateway.clone(),
            settings.schedule.tz,
        );
        let commands = StatusCommands::new(store, menu.clone(), gateway.clone());

        info!(
            order_day = %settings.schedule.order_day,
            order_time = %settings.schedule.order_time,
            tz = %settings.schedule.tz,
            "System started"
        );

        Self {
            window_client,
            store_client,
            conversation,
            commands,
            schedule: settings.schedule.clone(),
            report_channel: settings.report_channel.clone(),
            broadcast_delay: settings.broadcast_delay,
            menu,
            clock,
            gateway,
            handles: vec![window_handle, store_handle],
        }
    }

    /// The cycle scheduler with one job per trigger, each closing over only what it uses.
    pub fn scheduler(&self) -> CycleScheduler {
        let store: Arc<dyn OrderStore> = Arc::new(self.store_client.clone());
        let jobs = CycleJobs {
            open: jobs::broadcast_invitation(
                self.gateway.clone(),
                self.clock.clone(),
                self.schedule.clone(),
                self.broadcast_delay,
            ),
            close: jobs::report_job(
                store.clone(),
                self.menu.clone(),
                self.gateway.clone(),
                self.report_channel.clone(),
            ),
            reset: jobs::reset_job(self.window_client.clone()),
            clear: jobs::clear_job(store, self.window_client.clone()),
        };
        CycleScheduler::new(self.schedule.clone(), jobs)
    }

    /// Drops every client and waits for the actors to finish.
    ///
    /// Anything else still holding a client (a registered trigger, a cloned engine) keeps
    /// its actor alive, so stop those first.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down system...");

        // Close the channels by dropping every client
        drop(self.conversation);
        drop(self.commands);
        drop(self.window_client);
        drop(self.store_client);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(format!("Actor task failed: {:?}", e));
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
