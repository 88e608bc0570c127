use thiserror::Error;

/// Errors that can occur during inventory ledger operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProductError {
    #[error("Product not found: {0}")]
    NotFound(String),
    #[error("Insufficient stock for {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: String,
        requested: u32,
        available: u32,
    },
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(u32),
    #[error("Stock overflow for {product_id}: {current} + {added}")]
    StockOverflow {
        product_id: String,
        current: u32,
        added: u32,
    },
    #[error("Product validation error: {0}")]
    ValidationError(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl ProductError {
    /// True when the ledger may or may not have applied the request.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::ActorCommunicationError(_))
    }
}

crate::impl_from_framework_error!(ProductError);
