//! Purchase records: one per checkout, owning a delivery and an invoice.

pub mod entity;
pub mod error;

pub use error::*;
