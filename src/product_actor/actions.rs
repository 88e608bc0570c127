use rust_decimal::Decimal;

use crate::domain::RestockReason;

/// Ledger actions for Product entities.
///
/// Every variant runs to completion inside the product actor, so the check and
/// the write of a reservation can never interleave with another request.
/// None of them are idempotent: sending the same action twice applies it twice.
#[derive(Debug, Clone)]
pub enum ProductAction {
    /// Checks the current stock level without modifying it.
    CheckStock,
    /// Decrements stock if at least `quantity` is on hand.
    ///
    /// # Errors
    /// Fails without touching stock if the requested amount exceeds what is available.
    Reserve { quantity: u32, reference: String },
    /// Gives back stock previously reserved under `reference`.
    Release { quantity: u32, reference: String },
    /// Releases whatever the journal still shows as reserved under `reference`.
    ReleaseOutstanding { reference: String },
    /// Returns stock to the shelf after a cancellation, refund, or manual count.
    Restock {
        quantity: u32,
        reason: RestockReason,
        reference: String,
    },
}

/// Results from ProductActions - variants match 1:1 with ProductAction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductActionResult {
    /// Current stock level
    CheckStock(u32),
    /// Snapshot taken at the moment of the reservation
    Reserve(Reservation),
    /// Stock after the release
    Release(u32),
    /// Quantity that was released (zero when nothing was outstanding)
    ReleaseOutstanding(u32),
    /// Stock after the restock
    Restock(u32),
}

/// What a successful reservation saw: the stock left over and the line
/// snapshot (name and discounted unit price) for the purchase record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    pub remaining: u32,
    pub name: String,
    pub unit_price: Decimal,
}
