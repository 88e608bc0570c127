//! Refund requests: pending until decided exactly once.

mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;
