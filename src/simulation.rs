//! Background task that walks open deliveries through their lifecycle.
//!
//! Stands in for a carrier integration: every tick, each processing delivery
//! goes in-transit and each in-transit delivery is delivered. It uses the same
//! client as the HTTP routes, so a delivery cancelled between ticks is simply
//! skipped.

use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use crate::app_system::DeliveryWorkflowError;
use crate::clients::DeliveryClient;

pub async fn run_delivery_simulator(deliveries: DeliveryClient, interval: Duration) {
    info!(interval_secs = interval.as_secs(), "Delivery simulator started");
    let mut interval_timer = tokio::time::interval(interval);
    // The first tick fires immediately; skip it so fresh orders stay processing for a full period.
    interval_timer.tick().await;

    loop {
        interval_timer.tick().await;
        advance_deliveries(&deliveries).await;
    }
}

/// One simulator step. Returns how many deliveries moved.
pub async fn advance_deliveries(deliveries: &DeliveryClient) -> usize {
    let start = Instant::now();
    let open = match deliveries.list_deliveries().await {
        Ok(all) => all,
        Err(e) => {
            error!(error = %e, "Delivery simulator could not list deliveries");
            return 0;
        }
    };

    let mut moved = 0;
    for delivery in open {
        let Some(next) = delivery.status.next() else {
            continue;
        };
        match deliveries.update_status(delivery.id.clone(), next).await {
            Ok(_) => moved += 1,
            // Lost a race with a cancellation or a manual update.
            Err(DeliveryWorkflowError::IllegalTransition { .. } | DeliveryWorkflowError::NotCancellable(_)) => {
                debug!(delivery_id = %delivery.id, "Delivery changed underneath the simulator");
            }
            Err(e) => warn!(delivery_id = %delivery.id, error = %e, "Simulated transition failed"),
        }
    }

    debug!(moved, duration_ms = start.elapsed().as_millis(), "Delivery simulator tick");
    moved
}
