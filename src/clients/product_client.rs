use tracing::{debug, instrument};

use crate::actor_framework::ResourceClient;
use crate::domain::{Product, ProductCreate, ProductPatch, RestockReason};
use crate::product_actor::{ProductAction, ProductActionResult, ProductError, Reservation};

/// Client for the inventory ledger.
///
/// Every stock mutation is a single actor message, so the check and the write
/// of a reservation happen in one step. None of the mutations are idempotent:
/// a timed-out call must not be blindly retried.
#[derive(Clone)]
pub struct ProductClient {
    inner: ResourceClient<Product>,
}

impl_basic_client!(ProductClient, Product, ProductError, product);

impl ProductClient {
    #[instrument(skip(self))]
    pub async fn create_product(&self, params: ProductCreate) -> Result<String, ProductError> {
        debug!("Sending request");
        self.inner.create(params).await.map_err(ProductError::from)
    }

    /// Catalog maintenance (name, price, discount). Stock cannot be patched.
    #[instrument(skip(self))]
    pub async fn update_product(&self, id: String, patch: ProductPatch) -> Result<Product, ProductError> {
        debug!("Sending request");
        self.inner.update(id, patch).await.map_err(ProductError::from)
    }

    #[instrument(skip(self))]
    pub async fn check_stock(&self, id: String) -> Result<u32, ProductError> {
        debug!("Sending request");
        match self.inner.perform_action(id, ProductAction::CheckStock).await? {
            ProductActionResult::CheckStock(level) => Ok(level),
            other => Err(unexpected(other)),
        }
    }

    /// Take `quantity` off the shelf if, and only if, that much is on hand.
    ///
    /// # Errors
    /// `InsufficientStock` leaves stock untouched. A transport error means the
    /// reservation may or may not have been applied; recover with
    /// [`release_outstanding`](Self::release_outstanding).
    #[instrument(skip(self))]
    pub async fn reserve(&self, id: String, quantity: u32, reference: String) -> Result<Reservation, ProductError> {
        debug!("Sending request");
        match self
            .inner
            .perform_action(id, ProductAction::Reserve { quantity, reference })
            .await?
        {
            ProductActionResult::Reserve(reservation) => Ok(reservation),
            other => Err(unexpected(other)),
        }
    }

    /// Undo a reservation made under `reference`. Returns the new stock level.
    #[instrument(skip(self))]
    pub async fn release(&self, id: String, quantity: u32, reference: String) -> Result<u32, ProductError> {
        debug!("Sending request");
        match self
            .inner
            .perform_action(id, ProductAction::Release { quantity, reference })
            .await?
        {
            ProductActionResult::Release(level) => Ok(level),
            other => Err(unexpected(other)),
        }
    }

    /// Release whatever the journal still holds under `reference`. Returns the
    /// quantity released. Safe to call when unsure whether a reservation landed.
    #[instrument(skip(self))]
    pub async fn release_outstanding(&self, id: String, reference: String) -> Result<u32, ProductError> {
        debug!("Sending request");
        match self
            .inner
            .perform_action(id, ProductAction::ReleaseOutstanding { reference })
            .await?
        {
            ProductActionResult::ReleaseOutstanding(released) => Ok(released),
            other => Err(unexpected(other)),
        }
    }

    #[instrument(skip(self))]
    pub async fn restock(
        &self,
        id: String,
        quantity: u32,
        reason: RestockReason,
        reference: String,
    ) -> Result<u32, ProductError> {
        debug!("Sending request");
        match self
            .inner
            .perform_action(
                id,
                ProductAction::Restock {
                    quantity,
                    reason,
                    reference,
                },
            )
            .await?
        {
            ProductActionResult::Restock(level) => Ok(level),
            other => Err(unexpected(other)),
        }
    }
}

fn unexpected(result: ProductActionResult) -> ProductError {
    ProductError::ActorCommunicationError(format!("Unexpected result: {result:?}"))
}
