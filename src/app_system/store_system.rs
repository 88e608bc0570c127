use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{error, info};

use crate::actor_framework::{Entity, ResourceActor, ResourceClient};
use crate::clients::{DeliveryClient, InvoiceClient, ProductClient, PurchaseClient, RefundClient, UserClient};
use crate::config::StoreConfig;
use crate::domain::{Delivery, Invoice, Product, Purchase, RefundRequest, User};
use crate::invoice_document::{InvoiceArchive, InvoiceDocuments, InvoiceRenderer, TextInvoiceRenderer};
use crate::notify::{LogNotifier, Notifier};
use crate::simulation::run_delivery_simulator;

/// The application system that owns every resource actor.
///
/// Responsible for starting up actors, wiring the workflow clients together,
/// and handling shutdown.
pub struct StoreSystem {
    pub product_client: ProductClient,
    pub user_client: UserClient,
    pub purchase_client: PurchaseClient,
    pub delivery_client: DeliveryClient,
    pub refund_client: RefundClient,
    handles: Vec<tokio::task::JoinHandle<()>>,
    simulator: Option<tokio::task::JoinHandle<()>>,
}

impl StoreSystem {
    /// Start with the log notifier and the plain-text invoice renderer.
    pub fn new(config: &StoreConfig) -> Self {
        let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier::new(config.notify_from.clone()));
        Self::with_collaborators(config, notifier, Arc::new(TextInvoiceRenderer))
    }

    pub fn with_collaborators(
        config: &StoreConfig,
        notifier: Arc<dyn Notifier>,
        renderer: Arc<dyn InvoiceRenderer>,
    ) -> Self {
        let mut handles = Vec::new();

        // 1. Leaf stores
        let product_client = ProductClient::new(spawn_store::<Product>(config, "product", &mut handles));
        let user_client = UserClient::new(spawn_store::<User>(config, "user", &mut handles));
        let invoice_client = InvoiceClient::new(spawn_store::<Invoice>(config, "invoice", &mut handles));
        let refund_store = spawn_store::<RefundRequest>(config, "refund", &mut handles);

        // 2. Delivery state machine (restocks through the ledger)
        let delivery_client = DeliveryClient::new(
            spawn_store::<Delivery>(config, "delivery", &mut handles),
            product_client.clone(),
        );

        // 3. Checkout workflow
        let documents = InvoiceDocuments::new(renderer, InvoiceArchive::new(config.invoice_dir.clone()));
        let purchase_client = PurchaseClient::new(
            spawn_store::<Purchase>(config, "purchase", &mut handles),
            user_client.clone(),
            product_client.clone(),
            delivery_client.clone(),
            invoice_client.clone(),
            refund_store.clone(),
            documents,
            notifier.clone(),
        );

        // 4. Refund workflow
        let refund_client = RefundClient::new(
            refund_store,
            delivery_client.clone(),
            purchase_client.clone(),
            invoice_client,
            product_client.clone(),
            user_client.clone(),
            notifier,
            config.refund_policy,
        );

        let simulator = config
            .delivery_simulation
            .map(|interval| tokio::spawn(run_delivery_simulator(delivery_client.clone(), interval)));

        info!(
            actors = handles.len(),
            simulator = simulator.is_some(),
            invoice_dir = %config.invoice_dir.display(),
            "Store system started"
        );

        Self {
            product_client,
            user_client,
            purchase_client,
            delivery_client,
            refund_client,
            handles,
            simulator,
        }
    }

    /// Stop the simulator, drop every client (closing the actor channels),
    /// and wait for the actors to drain.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down system...");

        if let Some(simulator) = self.simulator {
            simulator.abort();
            let _ = simulator.await;
        }

        drop(self.refund_client);
        drop(self.purchase_client);
        drop(self.delivery_client);
        drop(self.user_client);
        drop(self.product_client);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!(error = ?e, "Actor task failed");
                return Err(format!("Actor task failed: {e:?}"));
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}

/// Spawn one resource actor with ids `<prefix>_1`, `<prefix>_2`, ...
fn spawn_store<T>(
    config: &StoreConfig,
    prefix: &'static str,
    handles: &mut Vec<tokio::task::JoinHandle<()>>,
) -> ResourceClient<T>
where
    T: Entity<Id = String>,
{
    let counter = Arc::new(AtomicU64::new(1));
    let next_id = move || format!("{prefix}_{}", counter.fetch_add(1, Ordering::SeqCst));
    // tokio panics on a zero-capacity channel
    let (actor, client) = ResourceActor::<T>::new(config.mailbox_size.max(1), config.storage_timeout, next_id);
    handles.push(tokio::spawn(actor.run()));
    client
}
