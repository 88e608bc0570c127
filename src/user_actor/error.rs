use thiserror::Error;

/// Failures of the user directory.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum UserError {
    #[error("No such customer: {0}")]
    NotFound(String),
    #[error("Invalid customer record: {0}")]
    ValidationError(String),
    #[error("User directory unreachable: {0}")]
    ActorCommunicationError(String),
}

crate::impl_from_framework_error!(UserError);
