//! Delivery lifecycle: processing -> in-transit -> delivered, or processing -> cancelled.

mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;
