//! System orchestration, startup, and shutdown logic.

pub mod error;
pub mod store_system;
pub mod tracing;

pub use self::tracing::*;
pub use error::*;
pub use store_system::*;
