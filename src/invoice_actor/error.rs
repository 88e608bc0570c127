use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum InvoiceError {
    #[error("Invoice not found: {0}")]
    NotFound(String),
    #[error("Invoice validation error: {0}")]
    ValidationError(String),
    #[error("Invoice {0} is immutable")]
    Immutable(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

crate::impl_from_framework_error!(InvoiceError);
