//! Order fulfillment and inventory consistency for a storefront.
//!
//! Every stored record lives in its own [`actor_framework::ResourceActor`];
//! the workflows in [`clients`] orchestrate them.

pub mod actor_framework;
pub mod api;
pub mod app_system;
pub mod clients;
pub mod config;
pub mod domain;
pub mod invoice_document;
pub mod notify;
pub mod simulation;

pub mod delivery_actor;
pub mod invoice_actor;
pub mod product_actor;
pub mod purchase_actor;
pub mod refund_actor;
pub mod user_actor;

#[cfg(test)]
mod mock_framework;
