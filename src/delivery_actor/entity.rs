use chrono::Utc;

use super::actions::{DeliveryAction, DeliveryActionResult};
use super::error::DeliveryError;
use crate::actor_framework::Entity;
use crate::domain::{Delivery, DeliveryCreate, DeliveryStatus};

impl Entity for Delivery {
    type Id = String;
    type CreateParams = DeliveryCreate;
    type Patch = ();
    type Action = DeliveryAction;
    type ActionResult = DeliveryActionResult;
    type Error = DeliveryError;

    fn id(&self) -> &String {
        &self.id
    }

    fn from_create_params(id: String, params: DeliveryCreate) -> Result<Self, DeliveryError> {
        let address = params
            .delivery_address
            .validate()
            .map_err(|field| DeliveryError::InvalidAddress(field.to_string()))?;
        if params.items.is_empty() {
            return Err(DeliveryError::ValidationError("at least one line item required".to_string()));
        }
        Ok(Delivery::new(id, params.purchase_id, params.user_id, params.items, address))
    }

    /// Deliveries change only through transitions.
    fn on_update(&mut self, _patch: ()) -> Result<(), DeliveryError> {
        Err(DeliveryError::ValidationError(
            "deliveries change only through status transitions".to_string(),
        ))
    }

    fn handle_action(&mut self, action: DeliveryAction) -> Result<DeliveryActionResult, DeliveryError> {
        match action {
            DeliveryAction::Transition(to) => {
                let from = self.status;
                if !from.can_transition_to(to) {
                    if to == DeliveryStatus::Cancelled {
                        return Err(DeliveryError::NotCancellable(from));
                    }
                    return Err(DeliveryError::IllegalTransition { from, to });
                }
                let now = Utc::now();
                self.status = to;
                self.updated_at = now;
                if to == DeliveryStatus::Delivered {
                    self.delivered_at = Some(now);
                }
                Ok(DeliveryActionResult::Transition {
                    from,
                    delivery: Box::new(self.clone()),
                })
            }
        }
    }
}
