use thiserror::Error;

use crate::domain::DeliveryStatus;

/// Errors that can occur during delivery record operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DeliveryError {
    #[error("Delivery not found: {0}")]
    NotFound(String),
    #[error("Invalid delivery address: missing {0}")]
    InvalidAddress(String),
    #[error("Illegal delivery transition: {from} -> {to}")]
    IllegalTransition { from: DeliveryStatus, to: DeliveryStatus },
    #[error("Delivery is {0} and can no longer be cancelled")]
    NotCancellable(DeliveryStatus),
    #[error("Delivery validation error: {0}")]
    ValidationError(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

crate::impl_from_framework_error!(DeliveryError);
