use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::LineItem;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceLine {
    pub product_id: String,
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
    pub total: Decimal,
}

impl From<&LineItem> for InvoiceLine {
    fn from(item: &LineItem) -> Self {
        Self {
            product_id: item.product_id.clone(),
            name: item.name.clone(),
            price: item.price,
            quantity: item.quantity,
            total: item.total(),
        }
    }
}

/// Immutable billing record of one purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: String,
    pub purchase_id: String,
    pub delivery_id: String,
    pub user_id: String,
    pub products: Vec<InvoiceLine>,
    pub total_amount: Decimal,
    pub file_path: String,
    pub file_hash: String,
    pub created_at: DateTime<Utc>,
}

impl Invoice {
    pub fn line(&self, product_id: &str) -> Option<&InvoiceLine> {
        self.products.iter().find(|line| line.product_id == product_id)
    }
}

/// Parameters for creating an invoice. Totals are derived on creation.
#[derive(Debug, Clone)]
pub struct InvoiceCreate {
    pub purchase_id: String,
    pub delivery_id: String,
    pub user_id: String,
    pub products: Vec<InvoiceLine>,
    pub file_path: String,
    pub file_hash: String,
}
