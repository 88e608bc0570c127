//! Invoices are written once per purchase and never rewritten.

pub mod entity;
pub mod error;

pub use error::*;
