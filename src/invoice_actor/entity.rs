use chrono::Utc;
use rust_decimal::Decimal;

use super::error::InvoiceError;
use crate::actor_framework::Entity;
use crate::domain::{Invoice, InvoiceCreate};

impl Entity for Invoice {
    type Id = String;
    type CreateParams = InvoiceCreate;
    type Patch = ();
    type Action = ();
    type ActionResult = ();
    type Error = InvoiceError;

    fn id(&self) -> &String {
        &self.id
    }

    /// Line totals and `total_amount` are recomputed here from price and
    /// quantity rather than trusted from the caller.
    fn from_create_params(id: String, params: InvoiceCreate) -> Result<Self, InvoiceError> {
        if params.products.is_empty() {
            return Err(InvoiceError::ValidationError("at least one line required".to_string()));
        }
        if params.file_hash.is_empty() || params.file_path.is_empty() {
            return Err(InvoiceError::ValidationError("rendered document required".to_string()));
        }
        let products: Vec<_> = params
            .products
            .into_iter()
            .map(|mut line| {
                line.total = line.price * Decimal::from(line.quantity);
                line
            })
            .collect();
        let total_amount = products.iter().map(|line| line.total).sum();
        Ok(Self {
            id,
            purchase_id: params.purchase_id,
            delivery_id: params.delivery_id,
            user_id: params.user_id,
            products,
            total_amount,
            file_path: params.file_path,
            file_hash: params.file_hash,
            created_at: Utc::now(),
        })
    }

    fn on_update(&mut self, _patch: ()) -> Result<(), InvoiceError> {
        Err(InvoiceError::Immutable(self.id.clone()))
    }

    fn handle_action(&mut self, _action: ()) -> Result<(), InvoiceError> {
        Err(InvoiceError::Immutable(self.id.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::InvoiceLine;

    fn line(product_id: &str, cents: i64, quantity: u32) -> InvoiceLine {
        InvoiceLine {
            product_id: product_id.to_string(),
            name: product_id.to_uppercase(),
            price: Decimal::new(cents, 2),
            quantity,
            total: Decimal::ZERO,
        }
    }

    #[test]
    fn totals_are_derived() {
        let mut invoice = Invoice::from_create_params(
            "invoice_1".to_string(),
            InvoiceCreate {
                purchase_id: "purchase_1".to_string(),
                delivery_id: "delivery_1".to_string(),
                user_id: "user_1".to_string(),
                products: vec![line("lamp", 1999, 2), line("desk", 25000, 1)],
                file_path: "invoices/abc.txt".to_string(),
                file_hash: "abc".to_string(),
            },
        )
        .unwrap();

        assert_eq!(invoice.products[0].total, Decimal::new(3998, 2));
        assert_eq!(invoice.total_amount, Decimal::new(28998, 2));
        assert_eq!(invoice.on_update(()), Err(InvoiceError::Immutable("invoice_1".to_string())));
    }
}
