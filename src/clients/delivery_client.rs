use tracing::{debug, error, info, instrument, warn};

use super::ProductClient;
use crate::actor_framework::ResourceClient;
use crate::app_system::DeliveryWorkflowError;
use crate::delivery_actor::{DeliveryAction, DeliveryActionResult, DeliveryError};
use crate::domain::{Delivery, DeliveryCreate, DeliveryStatus, RestockReason};

/// Client for the delivery state machine.
///
/// Status changes are applied inside the delivery actor, so two concurrent
/// requests for the same delivery cannot both win. Cancellation returns every
/// line to stock.
#[derive(Clone)]
pub struct DeliveryClient {
    inner: ResourceClient<Delivery>,
    products: ProductClient,
}

impl DeliveryClient {
    pub fn new(inner: ResourceClient<Delivery>, products: ProductClient) -> Self {
        Self { inner, products }
    }

    #[instrument(skip(self, params), fields(purchase_id = %params.purchase_id))]
    pub async fn create_delivery(&self, params: DeliveryCreate) -> Result<String, DeliveryError> {
        debug!("Sending request");
        self.inner.create(params).await.map_err(DeliveryError::from)
    }

    /// Deliveries of `user_id`, newest first.
    #[instrument(skip(self))]
    pub async fn deliveries_for_user(&self, user_id: String) -> Result<Vec<Delivery>, DeliveryError> {
        let mut deliveries: Vec<Delivery> = self
            .inner
            .list()
            .await?
            .into_iter()
            .filter(|delivery| delivery.user_id == user_id)
            .collect();
        deliveries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(deliveries)
    }

    /// Move a delivery to `status`. Asking for `Cancelled` runs the full
    /// cancellation, including the restock.
    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        delivery_id: String,
        status: DeliveryStatus,
    ) -> Result<Delivery, DeliveryWorkflowError> {
        if status == DeliveryStatus::Cancelled {
            return self.cancel(delivery_id).await;
        }
        let (from, delivery) = self.transition(delivery_id, status).await?;
        info!(%from, to = %delivery.status, "Delivery status updated");
        Ok(delivery)
    }

    /// Cancel on behalf of the order that owns the delivery.
    ///
    /// # Errors
    /// `OrderMismatch` when `order_id` is not the delivery's purchase;
    /// `NotCancellable` once the delivery has left processing.
    #[instrument(skip(self))]
    pub async fn cancel_order(&self, delivery_id: String, order_id: String) -> Result<Delivery, DeliveryWorkflowError> {
        let delivery = self
            .inner
            .get(delivery_id.clone())
            .await
            .map_err(DeliveryError::from)?
            .ok_or_else(|| DeliveryWorkflowError::DeliveryNotFound(delivery_id.clone()))?;

        if delivery.purchase_id != order_id {
            warn!("Cancellation for an order that does not own the delivery");
            return Err(DeliveryWorkflowError::OrderMismatch { delivery_id, order_id });
        }
        self.cancel(delivery_id).await
    }

    async fn cancel(&self, delivery_id: String) -> Result<Delivery, DeliveryWorkflowError> {
        // The status flip is the commit point: only the request that wins it restocks.
        let (_, delivery) = self.transition(delivery_id.clone(), DeliveryStatus::Cancelled).await?;
        info!("Delivery cancelled; restocking");

        let mut failed = Vec::new();
        for item in delivery.items() {
            let restocked = self
                .products
                .restock(
                    item.product_id.clone(),
                    item.quantity,
                    RestockReason::Cancellation,
                    delivery_id.clone(),
                )
                .await;
            if let Err(e) = restocked {
                error!(product_id = %item.product_id, quantity = item.quantity, error = %e, "Restock after cancellation failed");
                failed.push(item.product_id.clone());
            }
        }

        if failed.is_empty() {
            Ok(delivery)
        } else {
            Err(DeliveryWorkflowError::RestockIncomplete(failed))
        }
    }

    async fn transition(
        &self,
        delivery_id: String,
        to: DeliveryStatus,
    ) -> Result<(DeliveryStatus, Delivery), DeliveryWorkflowError> {
        debug!("Sending request");
        let result = self
            .inner
            .perform_action(delivery_id, DeliveryAction::Transition(to))
            .await
            .map_err(DeliveryError::from)?;
        match result {
            DeliveryActionResult::Transition { from, delivery } => Ok((from, *delivery)),
        }
    }
}

impl_client_get!(DeliveryClient, Delivery, DeliveryError, delivery);
impl_client_list!(DeliveryClient, Delivery, DeliveryError, deliveries);
impl_client_delete!(DeliveryClient, DeliveryError, delivery);
