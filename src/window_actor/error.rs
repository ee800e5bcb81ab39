//! Error types for the window actor.

use thiserror::Error;

/// The window engine itself never fails; only reaching it can.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum WindowError {
    #[error("Window actor closed")]
    ActorClosed,

    #[error("Window actor dropped the response")]
    ActorDropped,
}
