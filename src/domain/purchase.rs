use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One requested cart entry as supplied by the cart owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: String,
    pub quantity: u32,
}

impl CartLine {
    pub fn new(product_id: impl Into<String>, quantity: u32) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
        }
    }
}

/// A purchased line, captured at checkout. `price` is a snapshot and never
/// follows later catalog changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub product_id: String,
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
}

impl LineItem {
    pub fn total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseStatus {
    /// Stock is held and dependent records are being written.
    Reserved,
    /// Delivery and invoice exist; the stock decrement is permanent.
    Confirmed,
}

impl fmt::Display for PurchaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reserved => write!(f, "reserved"),
            Self::Confirmed => write!(f, "confirmed"),
        }
    }
}

/// One checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    pub id: String,
    pub user_id: String,
    pub items: Vec<LineItem>,
    pub status: PurchaseStatus,
    pub purchase_date: DateTime<Utc>,
    /// Ledger reference under which this checkout reserved stock.
    pub checkout_ref: String,
    pub delivery_id: Option<String>,
    pub invoice_id: Option<String>,
}

impl Purchase {
    pub fn line(&self, product_id: &str) -> Option<&LineItem> {
        self.items.iter().find(|item| item.product_id == product_id)
    }
}

/// Parameters for creating a new purchase.
#[derive(Debug, Clone)]
pub struct PurchaseCreate {
    pub user_id: String,
    pub items: Vec<LineItem>,
    pub checkout_ref: String,
}

/// Links and confirmation written once dependents exist.
#[derive(Debug, Clone, Default)]
pub struct PurchasePatch {
    pub status: Option<PurchaseStatus>,
    pub delivery_id: Option<String>,
    pub invoice_id: Option<String>,
}
