//! Product-specific domain logic: the inventory ledger.
//!
//! `Product::quantity_in_stock` is mutated only by the actions in this module.

mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;
