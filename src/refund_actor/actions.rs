use crate::domain::{RefundDecision, RefundRequest};

#[derive(Debug, Clone)]
pub enum RefundAction {
    /// Settle a pending request. Fails once the request has been decided.
    Decide(RefundDecision),
}

#[derive(Debug, Clone)]
pub enum RefundActionResult {
    Decide(Box<RefundRequest>),
}
