use tracing::{debug, instrument};

use crate::actor_framework::ResourceClient;
use crate::domain::{Invoice, InvoiceCreate};
use crate::invoice_actor::InvoiceError;

/// Client for invoice records. Invoices are write-once.
#[derive(Clone)]
pub struct InvoiceClient {
    inner: ResourceClient<Invoice>,
}

impl_basic_client!(InvoiceClient, Invoice, InvoiceError, invoice);
impl_client_delete!(InvoiceClient, InvoiceError, invoice);

impl InvoiceClient {
    #[instrument(skip(self, params), fields(purchase_id = %params.purchase_id))]
    pub async fn create_invoice(&self, params: InvoiceCreate) -> Result<String, InvoiceError> {
        debug!("Sending request");
        self.inner.create(params).await.map_err(InvoiceError::from)
    }
}
