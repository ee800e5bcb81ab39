use super::engine::{OrderWindow, WindowStatus};
use crate::clients::WindowClient;
use crate::clock::Clock;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

#[derive(Debug)]
pub enum WindowRequest {
    Status {
        respond_to: oneshot::Sender<WindowStatus>,
    },
    Reopen {
        respond_to: oneshot::Sender<DateTime<Utc>>,
    },
    Close {
        respond_to: oneshot::Sender<()>,
    },
    Reset {
        respond_to: oneshot::Sender<DateTime<Utc>>,
    },
}

/// Sole owner of the [`OrderWindow`].
///
/// The clock is read inside the loop, so "now" and the state it is compared against always
/// belong to the same request.
pub struct WindowActor {
    receiver: mpsc::Receiver<WindowRequest>,
    window: OrderWindow,
    clock: Arc<dyn Clock>,
}

impl WindowActor {
    pub fn new(window: OrderWindow, clock: Arc<dyn Clock>, buffer_size: usize) -> (Self, WindowClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            window,
            clock,
        };
        (actor, WindowClient::new(sender))
    }

    pub async fn run(mut self) {
        info!("Window actor started");

        while let Some(msg) = self.receiver.recv().await {
            let now = self.clock.now();
            match msg {
                WindowRequest::Status { respond_to } => {
                    let status = self.window.status(now);
                    debug!(%now, ?status, "Status");
                    let _ = respond_to.send(status);
                }
                WindowRequest::Reopen { respond_to } => {
                    let until = self.window.manually_reopen(now);
                    info!(%until, "Ordering reopened manually");
                    let _ = respond_to.send(until);
                }
                WindowRequest::Close { respond_to } => {
                    self.window.close_ordering();
                    info!("Ordering closed");
                    let _ = respond_to.send(());
                }
                WindowRequest::Reset { respond_to } => {
                    let start = self.window.reset_cycle(now);
                    info!(next_cycle_start = %start, "Cycle reset");
                    let _ = respond_to.send(start);
                }
            }
        }

        info!(state = ?self.window.state(), "Shutdown");
    }
}
