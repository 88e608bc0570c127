//! Typed clients over the resource actors, and the workflows built on them.

#[macro_use]
mod macros;

mod delivery_client;
mod invoice_client;
mod product_client;
mod purchase_client;
mod refund_client;
mod reservations;
mod user_client;

pub use delivery_client::DeliveryClient;
pub use invoice_client::InvoiceClient;
pub use product_client::ProductClient;
pub use purchase_client::PurchaseClient;
pub use refund_client::RefundClient;
pub use user_client::UserClient;
