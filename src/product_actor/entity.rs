use chrono::Utc;
use rust_decimal::Decimal;

use super::actions::{ProductAction, ProductActionResult, Reservation};
use super::error::ProductError;
use crate::actor_framework::Entity;
use crate::domain::{Discount, MovementKind, Product, ProductCreate, ProductPatch, StockMovement};

impl Entity for Product {
    type Id = String;
    type CreateParams = ProductCreate;
    type Patch = ProductPatch;
    type Action = ProductAction;
    type ActionResult = ProductActionResult;
    type Error = ProductError;

    fn id(&self) -> &String {
        &self.id
    }

    /// Creates a new Product from creation parameters.
    ///
    /// The opening stock is journaled as a manual correction so the ledger
    /// always explains the current level.
    fn from_create_params(id: String, params: ProductCreate) -> Result<Self, ProductError> {
        if params.name.trim().is_empty() {
            return Err(ProductError::ValidationError("name required".to_string()));
        }
        if params.price < Decimal::ZERO {
            return Err(ProductError::ValidationError("price must not be negative".to_string()));
        }
        check_discount(params.discount.as_ref())?;
        let mut product = Product::new(id, params.name, params.price, 0);
        product.discount = params.discount;
        if params.quantity_in_stock > 0 {
            product.restock(
                params.quantity_in_stock,
                crate::domain::RestockReason::ManualCorrection,
                "opening-stock",
            )?;
        }
        Ok(product)
    }

    /// Updates name, price, or discount. Stock is not patchable.
    fn on_update(&mut self, patch: ProductPatch) -> Result<(), ProductError> {
        if let Some(price) = patch.price {
            if price < Decimal::ZERO {
                return Err(ProductError::ValidationError("price must not be negative".to_string()));
            }
            self.price = price;
        }
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(discount) = patch.discount {
            check_discount(discount.as_ref())?;
            self.discount = discount;
        }
        Ok(())
    }

    /// Handles ledger actions.
    ///
    /// # Errors
    /// Returns an error, with stock unchanged, for zero quantities, reservations
    /// beyond available stock, and increments that would overflow.
    fn handle_action(&mut self, action: ProductAction) -> Result<ProductActionResult, ProductError> {
        match action {
            ProductAction::CheckStock => Ok(ProductActionResult::CheckStock(self.quantity_in_stock)),
            ProductAction::Reserve { quantity, reference } => {
                if quantity == 0 {
                    return Err(ProductError::InvalidQuantity(quantity));
                }
                if self.quantity_in_stock < quantity {
                    return Err(ProductError::InsufficientStock {
                        product_id: self.id.clone(),
                        requested: quantity,
                        available: self.quantity_in_stock,
                    });
                }
                self.quantity_in_stock -= quantity;
                self.record(MovementKind::Reserve, quantity, reference);
                Ok(ProductActionResult::Reserve(Reservation {
                    remaining: self.quantity_in_stock,
                    name: self.name.clone(),
                    unit_price: self.effective_price_at(Utc::now()),
                }))
            }
            ProductAction::Release { quantity, reference } => {
                self.increment(MovementKind::Release, quantity, reference)?;
                Ok(ProductActionResult::Release(self.quantity_in_stock))
            }
            ProductAction::ReleaseOutstanding { reference } => {
                let outstanding = self.outstanding_reservation(&reference);
                if outstanding > 0 {
                    self.increment(MovementKind::Release, outstanding, reference)?;
                }
                Ok(ProductActionResult::ReleaseOutstanding(outstanding))
            }
            ProductAction::Restock {
                quantity,
                reason,
                reference,
            } => {
                self.restock(quantity, reason, reference)?;
                Ok(ProductActionResult::Restock(self.quantity_in_stock))
            }
        }
    }
}

impl Product {
    fn restock(
        &mut self,
        quantity: u32,
        reason: crate::domain::RestockReason,
        reference: impl Into<String>,
    ) -> Result<(), ProductError> {
        self.increment(MovementKind::Restock(reason), quantity, reference.into())
    }

    fn increment(&mut self, kind: MovementKind, quantity: u32, reference: String) -> Result<(), ProductError> {
        if quantity == 0 {
            return Err(ProductError::InvalidQuantity(quantity));
        }
        self.quantity_in_stock =
            self.quantity_in_stock
                .checked_add(quantity)
                .ok_or_else(|| ProductError::StockOverflow {
                    product_id: self.id.clone(),
                    current: self.quantity_in_stock,
                    added: quantity,
                })?;
        self.record(kind, quantity, reference);
        Ok(())
    }

    fn record(&mut self, kind: MovementKind, quantity: u32, reference: String) {
        self.movements.push(StockMovement {
            kind,
            quantity,
            reference,
            at: Utc::now(),
        });
    }
}

/// A discount outside 0..=100 percent would price the product below zero.
fn check_discount(discount: Option<&Discount>) -> Result<(), ProductError> {
    match discount {
        Some(discount) if discount.percentage < Decimal::ZERO || discount.percentage > Decimal::ONE_HUNDRED => Err(
            ProductError::ValidationError(format!("discount must be 0-100%, got {}%", discount.percentage)),
        ),
        _ => Ok(()),
    }
}
