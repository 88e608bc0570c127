use crate::domain::{Delivery, DeliveryStatus};

#[derive(Debug, Clone)]
pub enum DeliveryAction {
    /// Move to `to` if the state machine allows it from the current status.
    Transition(DeliveryStatus),
}

#[derive(Debug, Clone)]
pub enum DeliveryActionResult {
    Transition {
        from: DeliveryStatus,
        delivery: Box<Delivery>,
    },
}
