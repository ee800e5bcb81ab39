//! Pure data: orders and the menu they are built from.

pub mod menu;
pub mod order;

pub use menu::*;
pub use order::*;
