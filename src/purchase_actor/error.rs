use thiserror::Error;

use crate::domain::PurchaseStatus;

/// Errors that can occur during purchase record operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PurchaseError {
    #[error("Purchase not found: {0}")]
    NotFound(String),
    #[error("Purchase validation error: {0}")]
    ValidationError(String),
    #[error("Illegal purchase status change: {from} -> {to}")]
    IllegalStatus { from: PurchaseStatus, to: PurchaseStatus },
    #[error("Purchase {0} is already linked")]
    AlreadyLinked(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

crate::impl_from_framework_error!(PurchaseError);
