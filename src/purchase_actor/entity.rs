use chrono::Utc;

use super::error::PurchaseError;
use crate::actor_framework::Entity;
use crate::domain::{Purchase, PurchaseCreate, PurchasePatch, PurchaseStatus};

impl Entity for Purchase {
    type Id = String;
    type CreateParams = PurchaseCreate;
    type Patch = PurchasePatch;
    type Action = ();
    type ActionResult = ();
    type Error = PurchaseError;

    fn id(&self) -> &String {
        &self.id
    }

    /// Creates a new Purchase from creation parameters.
    ///
    /// # Notes
    /// The purchase starts `Reserved` and is dated now. Line prices are taken
    /// as given and are never patched afterwards.
    fn from_create_params(id: String, params: PurchaseCreate) -> Result<Self, PurchaseError> {
        if params.items.is_empty() {
            return Err(PurchaseError::ValidationError("at least one line item required".to_string()));
        }
        if let Some(item) = params.items.iter().find(|item| item.quantity == 0) {
            return Err(PurchaseError::ValidationError(format!(
                "zero quantity for {}",
                item.product_id
            )));
        }
        Ok(Self {
            id,
            user_id: params.user_id,
            items: params.items,
            status: PurchaseStatus::Reserved,
            purchase_date: Utc::now(),
            checkout_ref: params.checkout_ref,
            delivery_id: None,
            invoice_id: None,
        })
    }

    /// Links dependents and confirms. Links are write-once and confirmation
    /// requires both of them.
    fn on_update(&mut self, patch: PurchasePatch) -> Result<(), PurchaseError> {
        if let Some(delivery_id) = patch.delivery_id {
            if self.delivery_id.is_some() {
                return Err(PurchaseError::AlreadyLinked(self.id.clone()));
            }
            self.delivery_id = Some(delivery_id);
        }
        if let Some(invoice_id) = patch.invoice_id {
            if self.invoice_id.is_some() {
                return Err(PurchaseError::AlreadyLinked(self.id.clone()));
            }
            self.invoice_id = Some(invoice_id);
        }
        if let Some(status) = patch.status {
            let legal = self.status == PurchaseStatus::Reserved && status == PurchaseStatus::Confirmed;
            if !legal {
                return Err(PurchaseError::IllegalStatus {
                    from: self.status,
                    to: status,
                });
            }
            if self.delivery_id.is_none() || self.invoice_id.is_none() {
                return Err(PurchaseError::ValidationError(
                    "cannot confirm without delivery and invoice".to_string(),
                ));
            }
            self.status = status;
        }
        Ok(())
    }

    fn handle_action(&mut self, _action: ()) -> Result<(), PurchaseError> {
        Ok(())
    }
}
