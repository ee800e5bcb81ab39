//! # Messaging Gateway
//!
//! The boundary to the chat platform. The core decides *what* to say
//! ([`OutboundMessage`]) and *where*; delivering it, rendering it and receiving events is
//! the gateway's job.
//!
//! Two implementations ship with the crate: [`LogGateway`] writes every message to the
//! log, [`RecordingGateway`] keeps them in memory for assertions.

pub mod log;
pub mod message;
pub mod recording;

pub use log::LogGateway;
pub use message::*;
pub use recording::{RecordingGateway, Sent};

use crate::model::{MenuItem, UserId};
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// A conversation on the platform: a public channel or a direct-message channel.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ChannelId(String);

impl ChannelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Direct-message channel ids start with `D`.
    pub fn is_direct(&self) -> bool {
        self.0.starts_with('D')
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A message that was posted and can be edited or deleted later.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageRef {
    pub channel: ChannelId,
    pub ts: String,
}

/// Short-lived token that allows opening a form in response to a user action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TriggerId(pub String);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Member {
    pub id: UserId,
    pub name: String,
    pub is_bot: bool,
    pub deleted: bool,
}

impl Member {
    /// Name of the platform's own system account.
    pub const SYSTEM_ACCOUNT: &'static str = "slackbot";

    pub fn person(id: &str, name: &str) -> Self {
        Self {
            id: UserId::new(id),
            name: name.to_string(),
            is_bot: false,
            deleted: false,
        }
    }

    /// Whether this member gets the weekly invitation.
    pub fn is_eligible(&self) -> bool {
        !self.is_bot && !self.deleted && !self.name.eq_ignore_ascii_case(Self::SYSTEM_ACCOUNT)
    }
}

/// The item selection form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormSpec {
    pub callback_id: String,
    pub title: String,
    pub submit: String,
    pub blocks: Vec<FormBlock>,
}

/// One optional multi-select of a [`FormSpec`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormBlock {
    pub block_id: String,
    pub action_id: String,
    pub label: String,
    pub options: Vec<MenuItem>,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum GatewayError {
    /// The platform refused or lost the message.
    #[error("Delivery failed: {0}")]
    Delivery(String),

    #[error("Messaging platform unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait MessagingGateway: Send + Sync {
    async fn send_direct(&self, user: &UserId, message: OutboundMessage) -> Result<MessageRef, GatewayError>;

    async fn send_to_channel(&self, channel: &ChannelId, message: OutboundMessage) -> Result<MessageRef, GatewayError>;

    async fn update_message(&self, target: &MessageRef, message: OutboundMessage) -> Result<(), GatewayError>;

    async fn delete_message(&self, target: &MessageRef) -> Result<(), GatewayError>;

    async fn open_form(&self, trigger: &TriggerId, form: FormSpec) -> Result<(), GatewayError>;

    /// Every member of the workspace, bots and deactivated accounts included.
    async fn list_members(&self) -> Result<Vec<Member>, GatewayError>;

    async fn list_eligible_users(&self) -> Result<Vec<Member>, GatewayError> {
        Ok(self
            .list_members()
            .await?
            .into_iter()
            .filter(Member::is_eligible)
            .collect())
    }
}
