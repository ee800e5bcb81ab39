//! In-memory gateway that records everything it is asked to do.

use super::{
    ChannelId, FormSpec, GatewayError, Member, MessageRef, MessagingGateway, OutboundMessage,
    TriggerId,
};
use crate::model::UserId;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

/// One recorded gateway call.
#[derive(Clone, Debug, PartialEq)]
pub enum Sent {
    Direct { user: UserId, message: OutboundMessage },
    Channel { channel: ChannelId, message: OutboundMessage },
    Update { target: MessageRef, message: OutboundMessage },
    Delete { target: MessageRef },
    Form { trigger: TriggerId, form: FormSpec },
}

#[derive(Debug, Default)]
pub struct RecordingGateway {
    sent: Mutex<Vec<Sent>>,
    members: Mutex<Vec<Member>>,
    next_ts: AtomicU64,
    failing: AtomicBool,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_members(&self, members: Vec<Member>) {
        *self.members.lock().unwrap_or_else(PoisonError::into_inner) = members;
    }

    /// While set, every delivery fails with [`GatewayError::Delivery`].
    pub fn fail_deliveries(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Everything recorded so far.
    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Everything recorded so far, clearing the record.
    pub fn take(&self) -> Vec<Sent> {
        std::mem::take(&mut *self.sent.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// The messages sent directly to `user`, in order.
    pub fn direct_to(&self, user: &UserId) -> Vec<OutboundMessage> {
        self.sent()
            .into_iter()
            .filter_map(|sent| match sent {
                Sent::Direct { user: to, message } if &to == user => Some(message),
                _ => None,
            })
            .collect()
    }

    /// The messages posted to `channel`, in order.
    pub fn posted_to(&self, channel: &ChannelId) -> Vec<OutboundMessage> {
        self.sent()
            .into_iter()
            .filter_map(|sent| match sent {
                Sent::Channel { channel: to, message } if &to == channel => Some(message),
                _ => None,
            })
            .collect()
    }

    fn record(&self, sent: Sent) -> Result<(), GatewayError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(GatewayError::Delivery("delivery disabled".to_string()));
        }
        self.sent.lock().unwrap_or_else(PoisonError::into_inner).push(sent);
        Ok(())
    }

    fn next_ref(&self, channel: ChannelId) -> MessageRef {
        let ts = self.next_ts.fetch_add(1, Ordering::SeqCst) + 1;
        MessageRef {
            channel,
            ts: format!("{ts}.000100"),
        }
    }
}

#[async_trait]
impl MessagingGateway for RecordingGateway {
    async fn send_direct(&self, user: &UserId, message: OutboundMessage) -> Result<MessageRef, GatewayError> {
        self.record(Sent::Direct { user: user.clone(), message })?;
        Ok(self.next_ref(ChannelId::new(format!("D{user}"))))
    }

    async fn send_to_channel(&self, channel: &ChannelId, message: OutboundMessage) -> Result<MessageRef, GatewayError> {
        self.record(Sent::Channel { channel: channel.clone(), message })?;
        Ok(self.next_ref(channel.clone()))
    }

    async fn update_message(&self, target: &MessageRef, message: OutboundMessage) -> Result<(), GatewayError> {
        self.record(Sent::Update { target: target.clone(), message })
    }

    async fn delete_message(&self, target: &MessageRef) -> Result<(), GatewayError> {
        self.record(Sent::Delete { target: target.clone() })
    }

    async fn open_form(&self, trigger: &TriggerId, form: FormSpec) -> Result<(), GatewayError> {
        self.record(Sent::Form { trigger: trigger.clone(), form })
    }

    async fn list_members(&self) -> Result<Vec<Member>, GatewayError> {
        Ok(self.members.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }
}
