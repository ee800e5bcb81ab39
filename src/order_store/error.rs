//! Error types for the order store.

use crate::framework::FrameworkError;
use thiserror::Error;

/// Errors that can occur while reading or writing orders.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    /// The store could not be reached.
    #[error("Order store unavailable: {0}")]
    Unavailable(String),

    /// The store refused the order (it breaks an order invariant).
    #[error("Order rejected: {0}")]
    Rejected(String),
}

impl From<FrameworkError> for StoreError {
    fn from(e: FrameworkError) -> Self {
        match e {
            FrameworkError::Rejected(reason) => StoreError::Rejected(reason),
            other => StoreError::Unavailable(other.to_string()),
        }
    }
}
