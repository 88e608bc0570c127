//! Customer records backing the user directory.

pub mod entity;
pub mod error;

pub use error::*;
