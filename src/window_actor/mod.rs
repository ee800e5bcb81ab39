//! Order window: the engine and the actor that owns it.

pub mod actor;
pub mod engine;
pub mod error;

pub use actor::{WindowActor, WindowRequest};
pub use engine::{Availability, OrderWindow, WindowState, WindowStatus};
pub use error::*;

use crate::clients::WindowClient;
use crate::clock::Clock;
use crate::schedule::CycleSchedule;
use chrono::Duration;
use std::sync::Arc;

/// Creates a new window actor and its client.
pub fn new(
    schedule: CycleSchedule,
    grace: Duration,
    clock: Arc<dyn Clock>,
    buffer_size: usize,
) -> (WindowActor, WindowClient) {
    WindowActor::new(OrderWindow::new(schedule, grace), clock, buffer_size)
}
