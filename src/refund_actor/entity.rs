use chrono::Utc;
use rust_decimal::Decimal;

use super::actions::{RefundAction, RefundActionResult};
use super::error::RefundError;
use crate::actor_framework::Entity;
use crate::domain::{RefundRequest, RefundRequestCreate, RefundStatus};

impl Entity for RefundRequest {
    type Id = String;
    type CreateParams = RefundRequestCreate;
    type Patch = ();
    type Action = RefundAction;
    type ActionResult = RefundActionResult;
    type Error = RefundError;

    fn id(&self) -> &String {
        &self.id
    }

    fn from_create_params(id: String, params: RefundRequestCreate) -> Result<Self, RefundError> {
        if params.quantity == 0 {
            return Err(RefundError::ValidationError("quantity must be positive".to_string()));
        }
        if params.refund_amount < Decimal::ZERO {
            return Err(RefundError::ValidationError("refund amount must not be negative".to_string()));
        }
        Ok(Self {
            id,
            purchase_id: params.purchase_id,
            delivery_id: params.delivery_id,
            invoice_id: params.invoice_id,
            user_id: params.user_id,
            product_id: params.product_id,
            quantity: params.quantity,
            status: RefundStatus::Pending,
            refund_amount: params.refund_amount,
            requested_at: Utc::now(),
            decided_at: None,
        })
    }

    fn on_update(&mut self, _patch: ()) -> Result<(), RefundError> {
        Err(RefundError::ValidationError(
            "refund requests change only through decisions".to_string(),
        ))
    }

    fn handle_action(&mut self, action: RefundAction) -> Result<RefundActionResult, RefundError> {
        match action {
            RefundAction::Decide(decision) => {
                if self.status != RefundStatus::Pending {
                    return Err(RefundError::AlreadyProcessed {
                        id: self.id.clone(),
                        status: self.status,
                    });
                }
                self.status = decision.into();
                self.decided_at = Some(Utc::now());
                Ok(RefundActionResult::Decide(Box::new(self.clone())))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RefundDecision;

    #[test]
    fn decided_exactly_once() {
        let mut request = RefundRequest::from_create_params(
            "refund_1".to_string(),
            RefundRequestCreate {
                purchase_id: "purchase_1".to_string(),
                delivery_id: "delivery_1".to_string(),
                invoice_id: "invoice_1".to_string(),
                user_id: "user_1".to_string(),
                product_id: "product_1".to_string(),
                quantity: 1,
                refund_amount: Decimal::from(100),
            },
        )
        .unwrap();

        let RefundActionResult::Decide(decided) =
            request.handle_action(RefundAction::Decide(RefundDecision::Rejected)).unwrap();
        assert_eq!(decided.status, RefundStatus::Rejected);
        assert!(decided.decided_at.is_some());

        let again = request.handle_action(RefundAction::Decide(RefundDecision::Approved));
        assert!(matches!(
            again,
            Err(RefundError::AlreadyProcessed {
                status: RefundStatus::Rejected,
                ..
            })
        ));
        assert_eq!(request.status, RefundStatus::Rejected);
    }
}
