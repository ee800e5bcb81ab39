use crate::window_actor::{WindowError, WindowRequest, WindowStatus};
use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, instrument};

/// Client for interacting with the window actor.
#[derive(Clone)]
pub struct WindowClient {
    sender: mpsc::Sender<WindowRequest>,
}

impl WindowClient {
    pub fn new(sender: mpsc::Sender<WindowRequest>) -> Self {
        Self { sender }
    }

    async fn request<R>(
        &self,
        make: impl FnOnce(oneshot::Sender<R>) -> WindowRequest,
    ) -> Result<R, WindowError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(make(respond_to))
            .await
            .map_err(|_| WindowError::ActorClosed)?;
        response.await.map_err(|_| WindowError::ActorDropped)
    }

    pub async fn status(&self) -> Result<WindowStatus, WindowError> {
        self.request(|respond_to| WindowRequest::Status { respond_to }).await
    }

    /// Opens ordering for the grace period; returns when it closes again.
    #[instrument(skip(self))]
    pub async fn manually_reopen(&self) -> Result<DateTime<Utc>, WindowError> {
        debug!("Sending request");
        self.request(|respond_to| WindowRequest::Reopen { respond_to }).await
    }

    #[instrument(skip(self))]
    pub async fn close_ordering(&self) -> Result<(), WindowError> {
        debug!("Sending request");
        self.request(|respond_to| WindowRequest::Close { respond_to }).await
    }

    /// Schedules the next cycle; returns its opening instant.
    #[instrument(skip(self))]
    pub async fn reset_cycle(&self) -> Result<DateTime<Utc>, WindowError> {
        debug!("Sending request");
        self.request(|respond_to| WindowRequest::Reset { respond_to }).await
    }
}
