//! # Observability & Tracing
//!
//! [`setup_tracing`] installs the global subscriber: compact lines without module paths,
//! levels taken from `RUST_LOG`.
//!
//! ```bash
//! RUST_LOG=info cargo run                      # lifecycle, stored orders, triggers
//! RUST_LOG=debug cargo run                     # every request, full payloads
//! RUST_LOG=frietbot::conversation=debug cargo run
//! ```
//!
//! Handlers open a span carrying the user, order or item they work on, so a failing turn
//! reads like:
//!
//! ```text
//! ERROR on_quantity_reply{user=U123 channel=D123}: Conversation turn failed error=Order store unavailable: Actor closed
//! ```

pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false) // spans carry the context
        .compact()
        .init();
}
