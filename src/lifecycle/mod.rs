//! # System Lifecycle & Orchestration
//!
//! [`FrietSystem`] creates the two actors (order window, order store), wires the engines
//! that talk to them, and shuts everything down again:
//!
//! ```rust,ignore
//! let system = FrietSystem::start(&settings, menu, clock.clone(), gateway);
//! let triggers = TokioTriggerSource::new(settings.schedule.clone(), clock.clone());
//! system.scheduler().register(&triggers, clock.now());
//! // ... serve events through system.conversation / system.commands ...
//! triggers.shutdown().await;
//! system.shutdown().await?;
//! ```
//!
//! Every engine holds clones of the actor clients. An actor stops once the last clone is
//! gone, so triggers (whose jobs hold clones too) must be stopped before
//! [`FrietSystem::shutdown`] waits for the actors.

pub mod system;
pub mod tracing;

pub use self::system::FrietSystem;
pub use self::tracing::setup_tracing;
