use std::fmt::Display;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{error, info, instrument, warn, Instrument, Span};
use uuid::Uuid;

use super::reservations::CheckoutReservations;
use super::{DeliveryClient, InvoiceClient, ProductClient, UserClient};
use crate::actor_framework::{FrameworkError, ResourceClient};
use crate::app_system::{CheckoutError, PurchaseAdminError};
use crate::domain::{
    CartLine, Delivery, DeliveryAddress, DeliveryCreate, DeliveryStatus, InvoiceCreate, InvoiceLine, LineItem,
    Purchase, PurchaseCreate, PurchasePatch, PurchaseStatus, RefundRequest, RefundStatus,
};
use crate::delivery_actor::DeliveryError;
use crate::invoice_actor::InvoiceError;
use crate::invoice_document::{InvoiceDocuments, RenderedDocument};
use crate::notify::{notify_best_effort, Notifier};
use crate::product_actor::ProductError;
use crate::purchase_actor::PurchaseError;
use crate::refund_actor::RefundError;

/// Client for the checkout workflow.
///
/// Orchestrates the user directory, the inventory ledger, and the purchase,
/// delivery, and invoice records. Either every record is written and the
/// purchase is `Confirmed`, or every reservation made by the request is
/// released again.
#[derive(Clone)]
pub struct PurchaseClient {
    inner: ResourceClient<Purchase>,
    users: UserClient,
    products: ProductClient,
    deliveries: DeliveryClient,
    invoices: InvoiceClient,
    refunds: ResourceClient<RefundRequest>,
    documents: InvoiceDocuments,
    notifier: Arc<dyn Notifier>,
}

/// Ids of records created so far by one checkout, for cleanup on failure.
#[derive(Debug, Default)]
struct WrittenRecords {
    purchase_id: Option<String>,
    delivery_id: Option<String>,
    document: Option<PathBuf>,
    invoice_id: Option<String>,
}

impl PurchaseClient {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        inner: ResourceClient<Purchase>,
        users: UserClient,
        products: ProductClient,
        deliveries: DeliveryClient,
        invoices: InvoiceClient,
        refunds: ResourceClient<RefundRequest>,
        documents: InvoiceDocuments,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            inner,
            users,
            products,
            deliveries,
            invoices,
            refunds,
            documents,
            notifier,
        }
    }

    /// Turn a paid cart into a confirmed purchase with a delivery and an invoice.
    ///
    /// Stock is reserved line by line in cart order. The first line that
    /// cannot be reserved stops the checkout and releases what was already
    /// reserved. The invoice email is sent after confirmation and its failure
    /// is only logged.
    ///
    /// The workflow runs on its own task: dropping the returned future (a
    /// client hanging up) does not stop it half way, it still either
    /// confirms or rolls back.
    #[instrument(skip(self, cart, address), fields(lines = cart.len()))]
    pub async fn confirm_payment(
        &self,
        user_id: String,
        cart: Vec<CartLine>,
        address: DeliveryAddress,
    ) -> Result<Delivery, CheckoutError> {
        let workflow = self.clone();
        let task = tokio::spawn(
            async move { workflow.checkout(user_id, cart, address).await }.instrument(Span::current()),
        );
        match task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(error = %e, "Checkout task failed");
                Err(CheckoutError::RecordCreation {
                    message: e.to_string(),
                    rolled_back: false,
                })
            }
        }
    }

    async fn checkout(
        self,
        user_id: String,
        cart: Vec<CartLine>,
        address: DeliveryAddress,
    ) -> Result<Delivery, CheckoutError> {
        info!("Processing checkout (Client Side)");

        // Step 1: Validate the request itself
        let address = address
            .validate()
            .map_err(|field| CheckoutError::InvalidAddress(field.to_string()))?;
        let cart = consolidate_cart(cart)?;

        // Step 2: Validate user
        let email = match self.users.email(user_id.clone()).await {
            Ok(Some(email)) => email,
            Ok(None) => {
                warn!("User not found");
                return Err(CheckoutError::UserNotFound(user_id));
            }
            Err(e) => {
                error!(error = %e, "User validation failed");
                return Err(CheckoutError::DirectoryUnavailable(e.to_string()));
            }
        };

        // Step 3: Reserve stock
        let mut reservations = CheckoutReservations::new(self.products.clone(), Uuid::new_v4().to_string());
        let mut items = Vec::with_capacity(cart.len());
        for line in cart {
            let reserved = self
                .products
                .reserve(line.product_id.clone(), line.quantity, reservations.reference().to_string())
                .await;
            match reserved {
                Ok(reservation) => {
                    reservations.granted(line.product_id.clone(), line.quantity);
                    items.push(LineItem {
                        product_id: line.product_id,
                        name: reservation.name,
                        price: reservation.unit_price,
                        quantity: line.quantity,
                    });
                }
                Err(e) => {
                    if e.is_transport() {
                        reservations.uncertain(line.product_id.clone());
                    }
                    let failure = reservation_failure(&line, e);
                    warn!(product_id = %line.product_id, error = %failure, "Stock reservation failed");
                    let released = reservations.rollback().await;
                    return Err(failure.with_rollback(released));
                }
            }
        }
        info!(checkout_ref = %reservations.reference(), "Stock reserved successfully");

        // Step 4: Write purchase, delivery, and invoice
        let mut written = WrittenRecords::default();
        let outcome = self
            .write_records(&user_id, items, address, reservations.reference(), &mut written)
            .await;

        match outcome {
            Ok((delivery, document)) => {
                reservations.commit();
                info!(
                    purchase_id = %delivery.purchase_id,
                    delivery_id = %delivery.id,
                    total = %delivery.total_price(),
                    "Checkout confirmed"
                );

                // Step 5: Send the invoice
                let body = String::from_utf8_lossy(&document.bytes);
                notify_best_effort(self.notifier.as_ref(), &email, "Your invoice", &body).await;
                Ok(delivery)
            }
            Err(failure) => {
                error!(error = %failure, "Record creation failed; rolling back");
                self.discard(written).await;
                let released = reservations.rollback().await;
                Err(failure.with_rollback(released))
            }
        }
    }

    /// Single-line checkout.
    #[instrument(skip(self, address))]
    pub async fn add_to_purchase_history(
        &self,
        user_id: String,
        line: CartLine,
        address: DeliveryAddress,
    ) -> Result<Delivery, CheckoutError> {
        self.confirm_payment(user_id, vec![line], address).await
    }

    /// All purchases of `user_id`, newest first.
    #[instrument(skip(self))]
    pub async fn purchase_history(&self, user_id: String) -> Result<Vec<Purchase>, PurchaseError> {
        let mut purchases: Vec<Purchase> = self
            .inner
            .list()
            .await?
            .into_iter()
            .filter(|purchase| purchase.user_id == user_id)
            .collect();
        purchases.sort_by(|a, b| b.purchase_date.cmp(&a.purchase_date).then_with(|| b.id.cmp(&a.id)));
        Ok(purchases)
    }

    /// Delete a purchase together with its delivery, invoice, and refund requests.
    ///
    /// # Errors
    /// Refused while the delivery is still moving or a refund is undecided.
    #[instrument(skip(self))]
    pub async fn delete_purchase(&self, purchase_id: String) -> Result<(), PurchaseAdminError> {
        let purchase = self
            .inner
            .get(purchase_id.clone())
            .await
            .map_err(unavailable)?
            .ok_or_else(|| PurchaseAdminError::PurchaseNotFound(purchase_id.clone()))?;

        if let Some(delivery_id) = &purchase.delivery_id {
            let delivery = self
                .deliveries
                .get_delivery(delivery_id.clone())
                .await
                .map_err(unavailable)?;
            if let Some(delivery) = delivery {
                if matches!(delivery.status, DeliveryStatus::Processing | DeliveryStatus::InTransit) {
                    return Err(PurchaseAdminError::ActiveDelivery {
                        purchase_id,
                        status: delivery.status,
                    });
                }
            }
        }

        let refunds: Vec<RefundRequest> = self
            .refunds
            .list()
            .await
            .map_err(|e| unavailable(RefundError::from(e)))?
            .into_iter()
            .filter(|refund| refund.purchase_id == purchase_id)
            .collect();
        if refunds.iter().any(|refund| refund.status == RefundStatus::Pending) {
            return Err(PurchaseAdminError::PendingRefund(purchase_id));
        }

        for refund in refunds {
            ignore_missing(self.refunds.delete(refund.id).await).map_err(unavailable)?;
        }
        if let Some(invoice_id) = purchase.invoice_id {
            self.invoices
                .delete_invoice_record(invoice_id)
                .await
                .or_else(|e| match e {
                    InvoiceError::NotFound(_) => Ok(()),
                    other => Err(other),
                })
                .map_err(unavailable)?;
        }
        if let Some(delivery_id) = purchase.delivery_id {
            self.deliveries
                .delete_delivery_record(delivery_id)
                .await
                .or_else(|e| match e {
                    DeliveryError::NotFound(_) => Ok(()),
                    other => Err(other),
                })
                .map_err(unavailable)?;
        }
        self.inner.delete(purchase_id).await.map_err(unavailable)?;

        info!("Purchase deleted with dependents");
        Ok(())
    }

    async fn write_records(
        &self,
        user_id: &str,
        items: Vec<LineItem>,
        address: DeliveryAddress,
        checkout_ref: &str,
        written: &mut WrittenRecords,
    ) -> Result<(Delivery, RenderedDocument), CheckoutError> {
        let purchase_id = self
            .inner
            .create(PurchaseCreate {
                user_id: user_id.to_string(),
                items: items.clone(),
                checkout_ref: checkout_ref.to_string(),
            })
            .await
            .map_err(record_failure)?;
        written.purchase_id = Some(purchase_id.clone());

        let delivery_id = self
            .deliveries
            .create_delivery(DeliveryCreate {
                purchase_id: purchase_id.clone(),
                user_id: user_id.to_string(),
                items,
                delivery_address: address,
            })
            .await
            .map_err(record_failure)?;
        written.delivery_id = Some(delivery_id.clone());

        let purchase = self
            .inner
            .update(
                purchase_id.clone(),
                PurchasePatch {
                    delivery_id: Some(delivery_id.clone()),
                    ..Default::default()
                },
            )
            .await
            .map_err(record_failure)?;

        let lines: Vec<InvoiceLine> = purchase.items.iter().map(InvoiceLine::from).collect();
        let (document, stored) = self
            .documents
            .publish(&purchase, &lines)
            .await
            .map_err(record_failure)?;
        written.document = Some(stored.path.clone());

        let invoice_id = self
            .invoices
            .create_invoice(InvoiceCreate {
                purchase_id: purchase_id.clone(),
                delivery_id: delivery_id.clone(),
                user_id: user_id.to_string(),
                products: lines,
                file_path: stored.path.display().to_string(),
                file_hash: stored.hash,
            })
            .await
            .map_err(record_failure)?;
        written.invoice_id = Some(invoice_id.clone());

        self.inner
            .update(
                purchase_id,
                PurchasePatch {
                    status: Some(PurchaseStatus::Confirmed),
                    invoice_id: Some(invoice_id),
                    ..Default::default()
                },
            )
            .await
            .map_err(record_failure)?;

        let delivery = self
            .deliveries
            .get_delivery(delivery_id.clone())
            .await
            .map_err(record_failure)?
            .ok_or_else(|| record_failure(format!("delivery {delivery_id} disappeared")))?;

        Ok((delivery, document))
    }

    /// Best-effort removal of records written by a failed checkout.
    async fn discard(&self, written: WrittenRecords) {
        if let Some(id) = written.invoice_id {
            if let Err(e) = self.invoices.delete_invoice_record(id.clone()).await {
                warn!(invoice_id = %id, error = %e, "Could not discard invoice");
            }
        }
        if let Some(path) = written.document {
            if let Err(e) = self.documents.discard(&path).await {
                warn!(path = %path.display(), error = %e, "Could not discard invoice document");
            }
        }
        if let Some(id) = written.delivery_id {
            if let Err(e) = self.deliveries.delete_delivery_record(id.clone()).await {
                warn!(delivery_id = %id, error = %e, "Could not discard delivery");
            }
        }
        if let Some(id) = written.purchase_id {
            if let Err(e) = self.inner.delete(id.clone()).await {
                warn!(purchase_id = %id, error = %e, "Could not discard purchase");
            }
        }
    }
}

impl_client_get!(PurchaseClient, Purchase, PurchaseError, purchase);

/// Rejects empty carts and zero quantities, and merges repeated products into
/// one line at the position of their first appearance.
fn consolidate_cart(cart: Vec<CartLine>) -> Result<Vec<CartLine>, CheckoutError> {
    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }
    let mut merged: Vec<CartLine> = Vec::with_capacity(cart.len());
    for line in cart {
        if line.quantity == 0 {
            return Err(CheckoutError::InvalidQuantity {
                product_id: line.product_id,
                quantity: 0,
            });
        }
        match merged.iter_mut().find(|existing| existing.product_id == line.product_id) {
            Some(existing) => {
                existing.quantity = existing
                    .quantity
                    .checked_add(line.quantity)
                    .ok_or(CheckoutError::InvalidQuantity {
                        product_id: line.product_id,
                        quantity: u32::MAX,
                    })?;
            }
            None => merged.push(line),
        }
    }
    Ok(merged)
}

fn reservation_failure(line: &CartLine, err: ProductError) -> CheckoutError {
    match err {
        ProductError::InsufficientStock {
            product_id,
            requested,
            available,
        } => CheckoutError::InsufficientStock {
            product_id,
            requested,
            available,
            rolled_back: false,
        },
        ProductError::NotFound(product_id) => CheckoutError::ProductNotFound {
            product_id,
            rolled_back: false,
        },
        ProductError::InvalidQuantity(quantity) => CheckoutError::InvalidQuantity {
            product_id: line.product_id.clone(),
            quantity,
        },
        other => CheckoutError::LedgerUnavailable {
            message: other.to_string(),
            rolled_back: false,
        },
    }
}

fn record_failure(err: impl Display) -> CheckoutError {
    CheckoutError::RecordCreation {
        message: err.to_string(),
        rolled_back: false,
    }
}

fn unavailable(err: impl Display) -> PurchaseAdminError {
    PurchaseAdminError::StoreUnavailable(err.to_string())
}

fn ignore_missing<E>(result: Result<(), FrameworkError<E>>) -> Result<(), FrameworkError<E>> {
    match result {
        Err(FrameworkError::NotFound(_)) => Ok(()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cart_duplicates_are_merged_in_first_seen_order() {
        let cart = vec![CartLine::new("b", 1), CartLine::new("a", 2), CartLine::new("b", 3)];
        assert_eq!(
            consolidate_cart(cart).unwrap(),
            vec![CartLine::new("b", 4), CartLine::new("a", 2)]
        );
    }

    #[test]
    fn cart_validation() {
        assert_eq!(consolidate_cart(vec![]), Err(CheckoutError::EmptyCart));
        assert_eq!(
            consolidate_cart(vec![CartLine::new("a", 1), CartLine::new("b", 0)]),
            Err(CheckoutError::InvalidQuantity {
                product_id: "b".to_string(),
                quantity: 0,
            })
        );
        assert!(consolidate_cart(vec![CartLine::new("a", u32::MAX), CartLine::new("a", 1)]).is_err());
    }

    #[test]
    fn ledger_errors_become_checkout_errors() {
        let line = CartLine::new("product_1", 5);
        let err = reservation_failure(
            &line,
            ProductError::InsufficientStock {
                product_id: "product_1".to_string(),
                requested: 5,
                available: 2,
            },
        );
        assert!(matches!(err, CheckoutError::InsufficientStock { available: 2, .. }));

        let err = reservation_failure(&line, ProductError::ActorCommunicationError("Actor closed".to_string()));
        assert!(matches!(err, CheckoutError::LedgerUnavailable { .. }));
    }
}
