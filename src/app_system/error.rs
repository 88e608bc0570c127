use thiserror::Error;

use crate::delivery_actor::DeliveryError;
use crate::domain::{DeliveryStatus, RefundStatus};

/// Coarse failure classes shared by every workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or missing input; storage was never touched.
    Validation,
    /// A referenced entity does not exist.
    NotFound,
    /// The caller may not act on this entity.
    Forbidden,
    /// Insufficient stock, illegal transition, or an already decided request.
    Conflict,
    /// Storage or a collaborator failed or timed out.
    DependencyFailure,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation_error",
            Self::NotFound => "not_found",
            Self::Forbidden => "forbidden",
            Self::Conflict => "conflict",
            Self::DependencyFailure => "dependency_failure",
        }
    }
}

/// Implemented by every workflow error so callers can tell "nothing happened"
/// apart from "something was attempted and undone".
pub trait Classify {
    fn kind(&self) -> ErrorKind;

    /// True when side effects were applied and then compensated in the same request.
    fn rolled_back(&self) -> bool {
        false
    }
}

// =============================================================================
// Checkout
// =============================================================================

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CheckoutError {
    #[error("Invalid shipping address: missing {0}")]
    InvalidAddress(String),
    #[error("Cart is empty")]
    EmptyCart,
    #[error("Invalid quantity {quantity} for product {product_id}")]
    InvalidQuantity { product_id: String, quantity: u32 },
    #[error("User not found: {0}")]
    UserNotFound(String),
    #[error("Product not found: {product_id}")]
    ProductNotFound { product_id: String, rolled_back: bool },
    #[error("Insufficient stock for {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: String,
        requested: u32,
        available: u32,
        rolled_back: bool,
    },
    #[error("Inventory ledger unavailable: {message}")]
    LedgerUnavailable { message: String, rolled_back: bool },
    #[error("Purchase records could not be written: {message}")]
    RecordCreation { message: String, rolled_back: bool },
    #[error("User directory unavailable: {0}")]
    DirectoryUnavailable(String),
}

impl CheckoutError {
    /// Mark a failure as having released reservations granted in this request.
    pub fn with_rollback(self, released: bool) -> Self {
        match self {
            Self::ProductNotFound { product_id, .. } => Self::ProductNotFound {
                product_id,
                rolled_back: released,
            },
            Self::InsufficientStock {
                product_id,
                requested,
                available,
                ..
            } => Self::InsufficientStock {
                product_id,
                requested,
                available,
                rolled_back: released,
            },
            Self::LedgerUnavailable { message, .. } => Self::LedgerUnavailable {
                message,
                rolled_back: released,
            },
            Self::RecordCreation { message, .. } => Self::RecordCreation {
                message,
                rolled_back: released,
            },
            other => other,
        }
    }
}

impl Classify for CheckoutError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidAddress(_) | Self::EmptyCart | Self::InvalidQuantity { .. } => ErrorKind::Validation,
            Self::UserNotFound(_) => ErrorKind::NotFound,
            // A missing product is reported like insufficient stock: the cart
            // asked for something the ledger cannot supply.
            Self::ProductNotFound { .. } | Self::InsufficientStock { .. } => ErrorKind::Conflict,
            Self::LedgerUnavailable { .. } | Self::RecordCreation { .. } | Self::DirectoryUnavailable(_) => {
                ErrorKind::DependencyFailure
            }
        }
    }

    fn rolled_back(&self) -> bool {
        match self {
            Self::ProductNotFound { rolled_back, .. }
            | Self::InsufficientStock { rolled_back, .. }
            | Self::LedgerUnavailable { rolled_back, .. }
            | Self::RecordCreation { rolled_back, .. } => *rolled_back,
            _ => false,
        }
    }
}

// =============================================================================
// Delivery
// =============================================================================

#[derive(Debug, Clone, Error, PartialEq)]
pub enum DeliveryWorkflowError {
    #[error("Delivery not found: {0}")]
    DeliveryNotFound(String),
    #[error("Order {order_id} does not own delivery {delivery_id}")]
    OrderMismatch { delivery_id: String, order_id: String },
    #[error("Illegal delivery transition: {from} -> {to}")]
    IllegalTransition { from: DeliveryStatus, to: DeliveryStatus },
    #[error("Delivery is {0} and can no longer be cancelled")]
    NotCancellable(DeliveryStatus),
    #[error("Cancelled, but restock failed for: {}", .0.join(", "))]
    RestockIncomplete(Vec<String>),
    #[error("Delivery store unavailable: {0}")]
    StoreUnavailable(String),
}

impl From<DeliveryError> for DeliveryWorkflowError {
    fn from(err: DeliveryError) -> Self {
        match err {
            DeliveryError::NotFound(id) => Self::DeliveryNotFound(id),
            DeliveryError::IllegalTransition { from, to } => Self::IllegalTransition { from, to },
            DeliveryError::NotCancellable(status) => Self::NotCancellable(status),
            other => Self::StoreUnavailable(other.to_string()),
        }
    }
}

impl Classify for DeliveryWorkflowError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::DeliveryNotFound(_) | Self::OrderMismatch { .. } => ErrorKind::NotFound,
            Self::IllegalTransition { .. } | Self::NotCancellable(_) => ErrorKind::Conflict,
            Self::RestockIncomplete(_) | Self::StoreUnavailable(_) => ErrorKind::DependencyFailure,
        }
    }
}

// =============================================================================
// Refund
// =============================================================================

#[derive(Debug, Clone, Error, PartialEq)]
pub enum RefundWorkflowError {
    #[error("Invalid refund quantity: {0}")]
    InvalidQuantity(String),
    #[error("Delivery not found: {0}")]
    DeliveryNotFound(String),
    #[error("User {user_id} does not own delivery {delivery_id}")]
    NotOwner { delivery_id: String, user_id: String },
    #[error("Delivery is {0}, refunds need a delivered order")]
    NotDelivered(DeliveryStatus),
    #[error("Invoice not found for delivery {0}")]
    InvoiceNotFound(String),
    #[error("Product {0} is not on the invoice")]
    NotInvoiced(String),
    #[error("Product not found: {0}")]
    ProductNotFound(String),
    #[error("Refund window closed")]
    RefundWindowClosed,
    #[error("A refund request for {product_id} on {delivery_id} is already pending")]
    RefundPending { delivery_id: String, product_id: String },
    #[error("No refund request for {product_id} on {delivery_id}")]
    RefundNotFound { delivery_id: String, product_id: String },
    #[error("Refund request {id} already {status}")]
    AlreadyProcessed { id: String, status: RefundStatus },
    #[error("Refund approved, but restock failed: {0}")]
    RestockFailed(String),
    #[error("Refund store unavailable: {0}")]
    StoreUnavailable(String),
}

impl Classify for RefundWorkflowError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidQuantity(_) | Self::NotInvoiced(_) => ErrorKind::Validation,
            Self::DeliveryNotFound(_)
            | Self::InvoiceNotFound(_)
            | Self::ProductNotFound(_)
            | Self::RefundNotFound { .. } => ErrorKind::NotFound,
            Self::NotOwner { .. } => ErrorKind::Forbidden,
            Self::NotDelivered(_)
            | Self::RefundWindowClosed
            | Self::RefundPending { .. }
            | Self::AlreadyProcessed { .. } => ErrorKind::Conflict,
            Self::RestockFailed(_) | Self::StoreUnavailable(_) => ErrorKind::DependencyFailure,
        }
    }
}

// =============================================================================
// Purchase administration
// =============================================================================

#[derive(Debug, Clone, Error, PartialEq)]
pub enum PurchaseAdminError {
    #[error("Purchase not found: {0}")]
    PurchaseNotFound(String),
    #[error("Purchase {purchase_id} has an active delivery ({status})")]
    ActiveDelivery { purchase_id: String, status: DeliveryStatus },
    #[error("Purchase {0} has a pending refund request")]
    PendingRefund(String),
    #[error("Purchase store unavailable: {0}")]
    StoreUnavailable(String),
}

impl Classify for PurchaseAdminError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::PurchaseNotFound(_) => ErrorKind::NotFound,
            Self::ActiveDelivery { .. } | Self::PendingRefund(_) => ErrorKind::Conflict,
            Self::StoreUnavailable(_) => ErrorKind::DependencyFailure,
        }
    }
}
