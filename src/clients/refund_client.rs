use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

use super::{DeliveryClient, InvoiceClient, ProductClient, PurchaseClient, UserClient};
use crate::actor_framework::ResourceClient;
use crate::app_system::RefundWorkflowError;
use crate::config::RefundPolicy;
use crate::domain::{
    refund_amount, DeliveryStatus, RefundDecision, RefundRequest, RefundRequestCreate, RefundStatus, RestockReason,
    ReturnStatus,
};
use crate::notify::{notify_best_effort, Notifier};
use crate::refund_actor::{RefundAction, RefundActionResult, RefundError};

/// Client for the refund workflow.
///
/// A request is opened against a delivered line and decided exactly once.
/// Approval is the only decision with side effects: the quantity goes back
/// to stock and the customer is told.
#[derive(Clone)]
pub struct RefundClient {
    inner: ResourceClient<RefundRequest>,
    deliveries: DeliveryClient,
    purchases: PurchaseClient,
    invoices: InvoiceClient,
    products: ProductClient,
    users: UserClient,
    notifier: Arc<dyn Notifier>,
    policy: RefundPolicy,
    // Serializes the "no pending request yet" check with the create that follows it.
    admission: Arc<Mutex<()>>,
}

impl RefundClient {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        inner: ResourceClient<RefundRequest>,
        deliveries: DeliveryClient,
        purchases: PurchaseClient,
        invoices: InvoiceClient,
        products: ProductClient,
        users: UserClient,
        notifier: Arc<dyn Notifier>,
        policy: RefundPolicy,
    ) -> Self {
        Self {
            inner,
            deliveries,
            purchases,
            invoices,
            products,
            users,
            notifier,
            policy,
            admission: Arc::new(Mutex::new(())),
        }
    }

    /// Open a pending refund request for part of a delivered line.
    ///
    /// # Errors
    /// `NotOwner` when `user_id` did not place the order, `NotDelivered` before
    /// delivery, `NotInvoiced` for a product missing from the invoice, and
    /// `InvalidQuantity` when the request plus earlier approved returns would
    /// exceed the invoiced quantity.
    #[instrument(skip(self))]
    pub async fn create_refund_request(
        &self,
        delivery_id: String,
        product_id: String,
        quantity: u32,
        user_id: String,
    ) -> Result<RefundRequest, RefundWorkflowError> {
        info!("Processing refund request");
        if quantity == 0 {
            return Err(RefundWorkflowError::InvalidQuantity("quantity must be positive".to_string()));
        }

        // Step 1: Delivery must exist, belong to the caller, and be delivered
        let delivery = self
            .deliveries
            .get_delivery(delivery_id.clone())
            .await
            .map_err(unavailable)?
            .ok_or_else(|| RefundWorkflowError::DeliveryNotFound(delivery_id.clone()))?;
        if delivery.user_id != user_id {
            warn!("Refund requested by a user who does not own the delivery");
            return Err(RefundWorkflowError::NotOwner { delivery_id, user_id });
        }
        if delivery.status != DeliveryStatus::Delivered {
            return Err(RefundWorkflowError::NotDelivered(delivery.status));
        }

        // Step 2: Find the invoice line
        let purchase = self
            .purchases
            .get_purchase(delivery.purchase_id.clone())
            .await
            .map_err(unavailable)?
            .ok_or_else(|| RefundWorkflowError::InvoiceNotFound(delivery_id.clone()))?;
        let invoice_id = purchase
            .invoice_id
            .clone()
            .ok_or_else(|| RefundWorkflowError::InvoiceNotFound(delivery_id.clone()))?;
        let invoice = self
            .invoices
            .get_invoice(invoice_id.clone())
            .await
            .map_err(unavailable)?
            .ok_or_else(|| RefundWorkflowError::InvoiceNotFound(delivery_id.clone()))?;
        let line = invoice
            .line(&product_id)
            .ok_or_else(|| RefundWorkflowError::NotInvoiced(product_id.clone()))?;

        // Step 3: Refund window
        let now = Utc::now();
        let open = self
            .policy
            .anchor_date(purchase.purchase_date, delivery.delivered_at)
            .is_some_and(|anchor| self.policy.is_open(anchor, now));
        if !open {
            return Err(RefundWorkflowError::RefundWindowClosed);
        }

        // Step 4: Price with the discount in force today
        let product = self
            .products
            .get_product(product_id.clone())
            .await
            .map_err(unavailable)?
            .ok_or_else(|| RefundWorkflowError::ProductNotFound(product_id.clone()))?;
        let amount = refund_amount(line.price, product.discount_percentage_at(now), quantity);

        // Step 5: Quantity check and create, without a competing request in between
        let _admitted = self.admission.lock().await;
        let existing = self.line_requests(&delivery_id, &product_id).await?;
        if existing.iter().any(|request| request.status == RefundStatus::Pending) {
            return Err(RefundWorkflowError::RefundPending { delivery_id, product_id });
        }
        let already_returned: u32 = existing
            .iter()
            .filter(|request| request.status == RefundStatus::Approved)
            .map(|request| request.quantity)
            .sum();
        if already_returned.saturating_add(quantity) > line.quantity {
            return Err(RefundWorkflowError::InvalidQuantity(format!(
                "requested {quantity}, invoiced {}, already returned {already_returned}",
                line.quantity
            )));
        }

        let id = self
            .inner
            .create(RefundRequestCreate {
                purchase_id: purchase.id,
                delivery_id,
                invoice_id,
                user_id,
                product_id,
                quantity,
                refund_amount: amount,
            })
            .await
            .map_err(|e| unavailable(RefundError::from(e)))?;
        let request = self
            .inner
            .get(id.clone())
            .await
            .map_err(|e| unavailable(RefundError::from(e)))?
            .ok_or_else(|| RefundWorkflowError::StoreUnavailable(format!("refund {id} disappeared")))?;

        info!(refund_id = %request.id, amount = %request.refund_amount, "Refund request opened");
        Ok(request)
    }

    /// Decide the pending request for one line.
    ///
    /// The status flip happens first and only once; the restock that follows
    /// an approval is keyed by the refund id.
    #[instrument(skip(self))]
    pub async fn evaluate_refund(
        &self,
        delivery_id: String,
        product_id: String,
        quantity: u32,
        decision: RefundDecision,
    ) -> Result<RefundRequest, RefundWorkflowError> {
        info!("Evaluating refund");
        self.deliveries
            .get_delivery(delivery_id.clone())
            .await
            .map_err(unavailable)?
            .ok_or_else(|| RefundWorkflowError::DeliveryNotFound(delivery_id.clone()))?;

        let requests = self.line_requests(&delivery_id, &product_id).await?;
        let pending = match requests.iter().find(|request| request.status == RefundStatus::Pending) {
            Some(pending) => pending,
            None => {
                return Err(match requests.iter().max_by_key(|request| request.requested_at) {
                    Some(latest) => RefundWorkflowError::AlreadyProcessed {
                        id: latest.id.clone(),
                        status: latest.status,
                    },
                    None => RefundWorkflowError::RefundNotFound { delivery_id, product_id },
                })
            }
        };
        if pending.quantity != quantity {
            return Err(RefundWorkflowError::InvalidQuantity(format!(
                "pending request is for {}, evaluation is for {quantity}",
                pending.quantity
            )));
        }

        // Step 1: Flip the status (exactly once)
        let decided = self.decide(pending.id.clone(), decision).await?;
        info!(refund_id = %decided.id, status = %decided.status, "Refund decided");
        if decided.status != RefundStatus::Approved {
            return Ok(decided);
        }

        // Step 2: Return the stock
        let restocked = self
            .products
            .restock(
                decided.product_id.clone(),
                decided.quantity,
                RestockReason::Refund,
                decided.id.clone(),
            )
            .await;
        if let Err(e) = restocked {
            error!(refund_id = %decided.id, error = %e, "Refund approved but restock failed; needs manual correction");
            return Err(RefundWorkflowError::RestockFailed(format!("refund {}: {e}", decided.id)));
        }

        // Step 3: Tell the customer
        match self.users.email(decided.user_id.clone()).await {
            Ok(Some(email)) => {
                let body = format!(
                    "Your return of {} x {} was approved. {} will be refunded.",
                    decided.quantity, decided.product_id, decided.refund_amount
                );
                notify_best_effort(self.notifier.as_ref(), &email, "Refund approved", &body).await;
            }
            Ok(None) => warn!(user_id = %decided.user_id, "No email on file; refund notice skipped"),
            Err(e) => warn!(error = %e, "User lookup failed; refund notice skipped"),
        }

        Ok(decided)
    }

    /// Requests filed against `delivery_id`, oldest first.
    #[instrument(skip(self))]
    pub async fn refunds_for_delivery(&self, delivery_id: String) -> Result<Vec<RefundRequest>, RefundError> {
        let mut requests: Vec<RefundRequest> = self
            .inner
            .list()
            .await?
            .into_iter()
            .filter(|request| request.delivery_id == delivery_id)
            .collect();
        requests.sort_by_key(|request| request.requested_at);
        Ok(requests)
    }

    /// Return status of one purchased line, derived from its refund requests.
    #[instrument(skip(self))]
    pub async fn line_return_status(&self, purchase_id: String, product_id: String) -> Result<ReturnStatus, RefundError> {
        let requests = self.inner.list().await?;
        Ok(ReturnStatus::from_requests(requests.iter().filter(|request| {
            request.purchase_id == purchase_id && request.product_id == product_id
        })))
    }

    async fn line_requests(&self, delivery_id: &str, product_id: &str) -> Result<Vec<RefundRequest>, RefundWorkflowError> {
        debug!("Sending request");
        let requests = self
            .inner
            .list()
            .await
            .map_err(|e| unavailable(RefundError::from(e)))?;
        Ok(requests
            .into_iter()
            .filter(|request| request.delivery_id == delivery_id && request.product_id == product_id)
            .collect())
    }

    async fn decide(&self, id: String, decision: RefundDecision) -> Result<RefundRequest, RefundWorkflowError> {
        debug!("Sending request");
        match self.inner.perform_action(id, RefundAction::Decide(decision)).await {
            Ok(RefundActionResult::Decide(request)) => Ok(*request),
            Err(e) => Err(match RefundError::from(e) {
                RefundError::AlreadyProcessed { id, status } => RefundWorkflowError::AlreadyProcessed { id, status },
                RefundError::NotFound(_) => RefundWorkflowError::StoreUnavailable("refund request vanished".to_string()),
                other => unavailable(other),
            }),
        }
    }
}

fn unavailable(err: impl std::fmt::Display) -> RefundWorkflowError {
    RefundWorkflowError::StoreUnavailable(err.to_string())
}
