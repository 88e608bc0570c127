use rust_decimal::Decimal;
use tracing::{error, info, Instrument};

use storefront_fulfillment::api::{self, AppState};
use storefront_fulfillment::app_system::{setup_tracing, StoreSystem};
use storefront_fulfillment::config::StoreConfig;
use storefront_fulfillment::domain::{ProductCreate, UserCreate};

#[tokio::main]
async fn main() -> Result<(), String> {
    // Setup tracing once for the entire application
    setup_tracing();

    let config = StoreConfig::from_env().map_err(|e| e.to_string())?;
    info!(addr = %config.socket_addr(), "Starting storefront fulfillment service");

    // Create the entire store system (starts all actors)
    let system = StoreSystem::new(&config);

    let span = tracing::info_span!("seed");
    async {
        seed_demo_catalog(&system).await;
    }
    .instrument(span)
    .await;

    let listener = tokio::net::TcpListener::bind(config.socket_addr())
        .await
        .map_err(|e| format!("bind {}: {e}", config.socket_addr()))?;
    info!(addr = %config.socket_addr(), "Listening");

    let app = api::router(AppState::from_system(&system));
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!(error = %e, "Server error");
    }

    // Shutdown system gracefully
    system.shutdown().await?;

    info!("Application completed successfully");
    Ok(())
}

/// A customer and two products so the API can be exercised right away.
async fn seed_demo_catalog(system: &StoreSystem) {
    let user = UserCreate {
        name: "Alice".to_string(),
        email: "alice@example.com".to_string(),
    };
    match system.user_client.create_user(user).await {
        Ok(user_id) => info!(%user_id, "Demo user created"),
        Err(e) => error!(error = %e, "Demo user creation failed"),
    }

    for (name, price, stock) in [("Desk Lamp", Decimal::new(4999, 2), 25), ("Oak Desk", Decimal::from(350), 5)] {
        let product = ProductCreate {
            name: name.to_string(),
            price,
            quantity_in_stock: stock,
            discount: None,
        };
        match system.product_client.create_product(product).await {
            Ok(product_id) => info!(%product_id, name, stock, "Demo product created"),
            Err(e) => error!(error = %e, name, "Demo product creation failed"),
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Could not listen for ctrl-c; running until killed");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
