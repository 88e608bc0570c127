use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::LineItem;

/// Where a purchase ships to. All five fields are required; a missing field
/// deserializes as blank so [`DeliveryAddress::validate`] can name it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeliveryAddress {
    pub full_name: String,
    pub phone_num: String,
    pub address: String,
    pub country: String,
    pub postal_code: String,
}

impl DeliveryAddress {
    /// Trims every field and returns the name of the first blank one.
    pub fn validate(&self) -> Result<Self, &'static str> {
        let fields = [
            ("fullName", &self.full_name),
            ("phoneNum", &self.phone_num),
            ("address", &self.address),
            ("country", &self.country),
            ("postalCode", &self.postal_code),
        ];
        if let Some((name, _)) = fields.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(*name);
        }
        Ok(Self {
            full_name: self.full_name.trim().to_string(),
            phone_num: self.phone_num.trim().to_string(),
            address: self.address.trim().to_string(),
            country: self.country.trim().to_string(),
            postal_code: self.postal_code.trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeliveryStatus {
    Processing,
    InTransit,
    Delivered,
    Cancelled,
}

impl DeliveryStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Forward successor on the shipping path, if any.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Processing => Some(Self::InTransit),
            Self::InTransit => Some(Self::Delivered),
            Self::Delivered | Self::Cancelled => None,
        }
    }

    /// Whether `self -> to` is a legal transition.
    pub fn can_transition_to(self, to: Self) -> bool {
        match to {
            Self::Cancelled => self == Self::Processing,
            _ => self.next() == Some(to),
        }
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Processing => write!(f, "processing"),
            Self::InTransit => write!(f, "in-transit"),
            Self::Delivered => write!(f, "delivered"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl FromStr for DeliveryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "processing" => Ok(Self::Processing),
            "in-transit" => Ok(Self::InTransit),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(format!("unknown delivery status: {other}")),
        }
    }
}

/// Shipment of one confirmed purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delivery {
    pub id: String,
    pub purchase_id: String,
    pub user_id: String,
    items: Vec<LineItem>,
    pub delivery_address: DeliveryAddress,
    pub status: DeliveryStatus,
    total_price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub delivered_at: Option<DateTime<Utc>>,
}

impl Delivery {
    pub fn new(
        id: impl Into<String>,
        purchase_id: impl Into<String>,
        user_id: impl Into<String>,
        items: Vec<LineItem>,
        delivery_address: DeliveryAddress,
    ) -> Self {
        let now = Utc::now();
        let mut delivery = Self {
            id: id.into(),
            purchase_id: purchase_id.into(),
            user_id: user_id.into(),
            items: Vec::new(),
            delivery_address,
            status: DeliveryStatus::Processing,
            total_price: Decimal::ZERO,
            created_at: now,
            updated_at: now,
            delivered_at: None,
        };
        delivery.set_items(items);
        delivery
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Derived from the items.
    pub fn total_price(&self) -> Decimal {
        self.total_price
    }

    fn set_items(&mut self, items: Vec<LineItem>) {
        self.total_price = items.iter().map(LineItem::total).sum();
        self.items = items;
    }
}

/// Parameters for creating a new delivery.
#[derive(Debug, Clone)]
pub struct DeliveryCreate {
    pub purchase_id: String,
    pub user_id: String,
    pub items: Vec<LineItem>,
    pub delivery_address: DeliveryAddress,
}
