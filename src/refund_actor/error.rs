use thiserror::Error;

use crate::domain::RefundStatus;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum RefundError {
    #[error("Refund request not found: {0}")]
    NotFound(String),
    #[error("Refund request {id} already {status}")]
    AlreadyProcessed { id: String, status: RefundStatus },
    #[error("Refund validation error: {0}")]
    ValidationError(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

crate::impl_from_framework_error!(RefundError);
