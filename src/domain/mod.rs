pub mod delivery;
pub mod invoice;
pub mod product;
pub mod purchase;
pub mod refund;
pub mod user;

pub use delivery::*;
pub use invoice::*;
pub use product::*;
pub use purchase::*;
pub use refund::*;
pub use user::*;

use rust_decimal::Decimal;

/// Round a money amount to cents.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp(2)
}
