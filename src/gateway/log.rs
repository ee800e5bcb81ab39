//! Gateway that writes every outbound message to the log.
//!
//! Used by the binary when no chat transport is attached. Its roster is the `members` list of
//! the settings file, so without one the weekly invitation reaches nobody.

use super::{
    ChannelId, FormSpec, GatewayError, Member, MessageRef, MessagingGateway, OutboundMessage,
    TriggerId,
};
use crate::model::UserId;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

#[derive(Debug)]
pub struct LogGateway {
    members: Vec<Member>,
    next_ts: AtomicU64,
}

impl LogGateway {
    pub fn new(members: Vec<Member>) -> Self {
        Self {
            members,
            next_ts: AtomicU64::new(0),
        }
    }

    fn next_ref(&self, channel: ChannelId) -> MessageRef {
        let ts = self.next_ts.fetch_add(1, Ordering::Relaxed) + 1;
        MessageRef {
            channel,
            ts: ts.to_string(),
        }
    }
}

#[async_trait]
impl MessagingGateway for LogGateway {
    async fn send_direct(&self, user: &UserId, message: OutboundMessage) -> Result<MessageRef, GatewayError> {
        info!(%user, %message, "Direct message");
        Ok(self.next_ref(ChannelId::new(format!("D{user}"))))
    }

    async fn send_to_channel(&self, channel: &ChannelId, message: OutboundMessage) -> Result<MessageRef, GatewayError> {
        info!(%channel, %message, "Channel message");
        Ok(self.next_ref(channel.clone()))
    }

    async fn update_message(&self, target: &MessageRef, message: OutboundMessage) -> Result<(), GatewayError> {
        info!(channel = %target.channel, ts = %target.ts, %message, "Message updated");
        Ok(())
    }

    async fn delete_message(&self, target: &MessageRef) -> Result<(), GatewayError> {
        info!(channel = %target.channel, ts = %target.ts, "Message deleted");
        Ok(())
    }

    async fn open_form(&self, trigger: &TriggerId, form: FormSpec) -> Result<(), GatewayError> {
        info!(trigger = %trigger.0, blocks = form.blocks.len(), "Form opened");
        Ok(())
    }

    async fn list_members(&self) -> Result<Vec<Member>, GatewayError> {
        Ok(self.members.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_roster_comes_from_construction() {
        assert!(LogGateway::new(Vec::new()).list_eligible_users().await.unwrap().is_empty());

        let gateway = LogGateway::new(vec![Member::person("U1", "alice"), Member::person("U2", "bob")]);
        let eligible = gateway.list_eligible_users().await.unwrap();
        assert_eq!(eligible.len(), 2);

        let first = gateway.send_direct(&eligible[0].id, OutboundMessage::InvalidQuantity).await.unwrap();
        let second = gateway.send_direct(&eligible[1].id, OutboundMessage::InvalidQuantity).await.unwrap();
        assert_eq!(first.channel, ChannelId::new("DU1"));
        assert_ne!(first.ts, second.ts);
    }
}
