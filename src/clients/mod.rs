//! Type-safe wrappers around the actors' channels.

pub mod actor_client;
pub mod order_store_client;
pub mod window_client;

pub use actor_client::ActorClient;
pub use order_store_client::*;
pub use window_client::*;
