//! Error types for the conversation engine.

use crate::gateway::{GatewayError, Notice};
use crate::model::{ItemKey, OrderError};
use crate::order_store::StoreError;
use crate::window_actor::WindowError;
use thiserror::Error;

/// Why a conversation turn was cut short.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConversationError {
    /// The order would break one of its invariants.
    #[error("Invalid order change: {0}")]
    Validation(String),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Item not found: {0}")]
    ItemNotFound(ItemKey),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Window(#[from] WindowError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl From<OrderError> for ConversationError {
    fn from(e: OrderError) -> Self {
        match e {
            OrderError::ItemNotFound(key) | OrderError::DanglingFocus(key) => {
                ConversationError::ItemNotFound(key)
            }
            other => ConversationError::Validation(other.to_string()),
        }
    }
}

impl ConversationError {
    /// What the user gets told.
    pub fn notice(&self) -> Notice {
        match self {
            ConversationError::Validation(_) | ConversationError::ItemNotFound(_) => Notice::StartOver,
            ConversationError::OrderNotFound(_) => Notice::OrderNotFound,
            ConversationError::Store(_) | ConversationError::Window(_) | ConversationError::Gateway(_) => {
                Notice::TryLater
            }
        }
    }
}
