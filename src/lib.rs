//! # Frietbot
//!
//! > **The weekly friet order, run as a handful of actors.**
//!
//! Once a week, at the order day and time, everybody in the workspace is invited to order.
//! Each participant picks items in a form and is then asked, one item at a time, how many
//! they want. An hour later the orders are folded into one consolidated report; a few hours
//! after that the next cycle is scheduled and the store is cleared.
//!
//! ## 🏗️ Architecture
//!
//! State that is shared between concurrent requests lives in an actor: one Tokio task that
//! owns the state and processes requests one at a time.
//!
//! - [`window_actor`]: owns the [`OrderWindow`](window_actor::OrderWindow), which answers
//!   "is ordering open, when does it open next, when does it close".
//! - [`order_store`]: a [`ResourceActor`](framework::ResourceActor) over
//!   [`Order`](model::Order)s keyed by user, so every save is an atomic per-user upsert.
//!
//! Around them:
//!
//! - [`conversation`]: the selection → quantity → summary dialogue, gated on the window.
//! - [`aggregator`] and [`commands`]: the consolidated report and the status queries.
//! - [`scheduler`]: the four weekly triggers (open, close, reset, clear).
//! - [`gateway`]: the boundary to the chat platform.
//! - [`lifecycle`]: starts, wires and stops everything ([`FrietSystem`](lifecycle::FrietSystem)).
//!
//! ## 🧭 Time
//!
//! Every instant is a `DateTime<Utc>`; every schedule rule ("Friday 11:00") is evaluated in
//! the configured civil timezone through [`schedule::CycleSchedule`], so daylight-saving
//! changes keep the wall-clock meaning. "Now" always comes from a [`clock::Clock`].
//!
//! ## 🚀 Running
//!
//! ```bash
//! FRIETBOT_CONFIG=frietbot.example.yaml RUST_LOG=info cargo run
//! ```

pub mod aggregator;
pub mod clients;
pub mod clock;
pub mod commands;
pub mod config;
pub mod conversation;
pub mod framework;
pub mod gateway;
pub mod lifecycle;
pub mod model;
pub mod order_store;
pub mod schedule;
pub mod scheduler;
pub mod window_actor;
