use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::round_money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefundStatus {
    Pending,
    Approved,
    Rejected,
}

impl fmt::Display for RefundStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Approved => write!(f, "approved"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

/// The evaluator's verdict on a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefundDecision {
    Approved,
    Rejected,
}

impl From<RefundDecision> for RefundStatus {
    fn from(decision: RefundDecision) -> Self {
        match decision {
            RefundDecision::Approved => Self::Approved,
            RefundDecision::Rejected => Self::Rejected,
        }
    }
}

impl FromStr for RefundDecision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(format!("unknown refund decision: {other}")),
        }
    }
}

/// Return state of one purchased line, derived from its refund requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnStatus {
    NoReturn,
    ReturnReq,
    Approved,
    Rejected,
}

impl ReturnStatus {
    /// Collapse the requests of one line into the status shown to the customer.
    /// A pending request wins, then the most recent decision.
    pub fn from_requests<'a>(requests: impl IntoIterator<Item = &'a RefundRequest>) -> Self {
        let mut latest: Option<&RefundRequest> = None;
        for request in requests {
            if request.status == RefundStatus::Pending {
                return Self::ReturnReq;
            }
            if latest.map_or(true, |current| request.requested_at > current.requested_at) {
                latest = Some(request);
            }
        }
        match latest.map(|request| request.status) {
            None => Self::NoReturn,
            Some(RefundStatus::Approved) => Self::Approved,
            Some(RefundStatus::Rejected) => Self::Rejected,
            Some(RefundStatus::Pending) => Self::ReturnReq,
        }
    }
}

/// A customer's request to return part of a delivered line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundRequest {
    pub id: String,
    pub purchase_id: String,
    pub delivery_id: String,
    pub invoice_id: String,
    pub user_id: String,
    pub product_id: String,
    pub quantity: u32,
    pub status: RefundStatus,
    pub refund_amount: Decimal,
    pub requested_at: DateTime<Utc>,
    pub decided_at: Option<DateTime<Utc>>,
}

/// Parameters for opening a refund request.
#[derive(Debug, Clone)]
pub struct RefundRequestCreate {
    pub purchase_id: String,
    pub delivery_id: String,
    pub invoice_id: String,
    pub user_id: String,
    pub product_id: String,
    pub quantity: u32,
    pub refund_amount: Decimal,
}

/// `price × (1 − discount/100) × quantity`, rounded to cents.
pub fn refund_amount(invoice_price: Decimal, discount_percentage: Decimal, quantity: u32) -> Decimal {
    round_money(
        invoice_price * (Decimal::ONE_HUNDRED - discount_percentage) / Decimal::ONE_HUNDRED
            * Decimal::from(quantity),
    )
}
