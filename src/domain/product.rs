use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::round_money;

/// Represents a product in the inventory.
///
/// `quantity_in_stock` is only ever changed through the ledger actions in
/// [`crate::product_actor::ProductAction`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: Decimal,
    pub quantity_in_stock: u32,
    pub discount: Option<Discount>,
    /// Audit journal of every stock mutation, oldest first.
    pub movements: Vec<StockMovement>,
}

/// A time-limited percentage discount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discount {
    pub percentage: Decimal,
    pub valid_until: DateTime<Utc>,
}

impl Discount {
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        now <= self.valid_until
    }
}

/// Payload for creating a new product.
#[derive(Debug, Clone)]
pub struct ProductCreate {
    pub name: String,
    pub price: Decimal,
    pub quantity_in_stock: u32,
    pub discount: Option<Discount>,
}

/// Catalog maintenance patch. Stock is deliberately absent: stock moves through
/// the ledger so every change lands in the journal.
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub discount: Option<Option<Discount>>,
}

impl Product {
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: Decimal, quantity_in_stock: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            quantity_in_stock,
            discount: None,
            movements: Vec::new(),
        }
    }

    /// Discount percentage in force at `now`, zero when none applies.
    pub fn discount_percentage_at(&self, now: DateTime<Utc>) -> Decimal {
        self.discount
            .as_ref()
            .filter(|discount| discount.is_active_at(now))
            .map_or(Decimal::ZERO, |discount| discount.percentage)
    }

    /// Unit price after any discount active at `now`.
    pub fn effective_price_at(&self, now: DateTime<Utc>) -> Decimal {
        let pct = self.discount_percentage_at(now);
        round_money(self.price * (Decimal::ONE_HUNDRED - pct) / Decimal::ONE_HUNDRED)
    }

    /// Quantity reserved under `reference` that has not been released yet.
    pub fn outstanding_reservation(&self, reference: &str) -> u32 {
        let (reserved, released) = self
            .movements
            .iter()
            .filter(|movement| movement.reference == reference)
            .fold((0u64, 0u64), |(reserved, released), movement| match movement.kind {
                MovementKind::Reserve => (reserved + u64::from(movement.quantity), released),
                MovementKind::Release => (reserved, released + u64::from(movement.quantity)),
                MovementKind::Restock(_) => (reserved, released),
            });
        u32::try_from(reserved.saturating_sub(released)).unwrap_or(u32::MAX)
    }
}

/// Why stock came back into the warehouse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestockReason {
    Refund,
    Cancellation,
    ManualCorrection,
}

impl fmt::Display for RestockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Refund => write!(f, "refund"),
            Self::Cancellation => write!(f, "cancellation"),
            Self::ManualCorrection => write!(f, "manual_correction"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    Reserve,
    Release,
    Restock(RestockReason),
}

/// One journal line of the inventory ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockMovement {
    pub kind: MovementKind,
    pub quantity: u32,
    pub reference: String,
    pub at: DateTime<Utc>,
}
