use tracing::{error, warn};

use super::ProductClient;

/// Stock held by one in-flight checkout, all under the same ledger reference.
///
/// Call [`commit`](Self::commit) once the purchase is confirmed. Dropping the
/// value without committing (an early return, a panic, or a cancelled request
/// future) hands every reservation back to the ledger from a background task.
pub struct CheckoutReservations {
    products: ProductClient,
    reference: String,
    granted: Vec<(String, u32)>,
    uncertain: Vec<String>,
    armed: bool,
}

impl CheckoutReservations {
    pub fn new(products: ProductClient, reference: String) -> Self {
        Self {
            products,
            reference,
            granted: Vec::new(),
            uncertain: Vec::new(),
            armed: true,
        }
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn granted(&mut self, product_id: String, quantity: u32) {
        self.granted.push((product_id, quantity));
    }

    /// The ledger did not answer; whatever it applied is released by reference.
    pub fn uncertain(&mut self, product_id: String) {
        self.uncertain.push(product_id);
    }

    pub fn commit(mut self) {
        self.armed = false;
    }

    /// Release everything now. True when any stock actually went back.
    pub async fn rollback(mut self) -> bool {
        self.armed = false;
        let granted = std::mem::take(&mut self.granted);
        let uncertain = std::mem::take(&mut self.uncertain);
        release_all(&self.products, &self.reference, granted, uncertain).await
    }
}

impl Drop for CheckoutReservations {
    fn drop(&mut self) {
        if !self.armed || (self.granted.is_empty() && self.uncertain.is_empty()) {
            return;
        }
        let products = self.products.clone();
        let reference = std::mem::take(&mut self.reference);
        let granted = std::mem::take(&mut self.granted);
        let uncertain = std::mem::take(&mut self.uncertain);

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                warn!(checkout_ref = %reference, "Checkout abandoned; releasing reservations");
                handle.spawn(async move {
                    release_all(&products, &reference, granted, uncertain).await;
                });
            }
            Err(_) => {
                error!(checkout_ref = %reference, "Checkout abandoned outside a runtime; stock leaked");
            }
        }
    }
}

async fn release_all(
    products: &ProductClient,
    reference: &str,
    granted: Vec<(String, u32)>,
    uncertain: Vec<String>,
) -> bool {
    let mut released_any = false;

    for (product_id, quantity) in granted {
        match products
            .release(product_id.clone(), quantity, reference.to_string())
            .await
        {
            Ok(_) => released_any = true,
            Err(e) => error!(%product_id, quantity, checkout_ref = %reference, error = %e, "Release failed; stock leaked"),
        }
    }

    for product_id in uncertain {
        match products
            .release_outstanding(product_id.clone(), reference.to_string())
            .await
        {
            Ok(0) => {}
            Ok(_) => released_any = true,
            Err(e) => error!(%product_id, checkout_ref = %reference, error = %e, "Release failed; stock leaked"),
        }
    }

    released_any
}
