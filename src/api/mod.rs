//! HTTP surface over the workflow clients.

mod error;
mod routes;

use axum::{
    routing::{get, patch, post},
    Router,
};

pub use error::ApiError;

use crate::app_system::StoreSystem;
use crate::clients::{DeliveryClient, PurchaseClient, RefundClient};

/// Shared handler state: cheap clones of the workflow clients.
#[derive(Clone)]
pub struct AppState {
    pub purchases: PurchaseClient,
    pub deliveries: DeliveryClient,
    pub refunds: RefundClient,
}

impl AppState {
    pub fn from_system(system: &StoreSystem) -> Self {
        Self {
            purchases: system.purchase_client.clone(),
            deliveries: system.delivery_client.clone(),
            refunds: system.refund_client.clone(),
        }
    }
}

/// Build the API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/purchases/confirm-payment", post(routes::confirm_payment))
        .route(
            "/api/purchases/{id}",
            get(routes::get_purchase).delete(routes::delete_purchase),
        )
        .route("/api/users/{user_id}/purchases", get(routes::purchase_history))
        .route("/api/users/{user_id}/deliveries", get(routes::user_deliveries))
        .route("/api/deliveries/{id}", get(routes::get_delivery))
        .route("/api/deliveries/{id}/status", patch(routes::update_delivery_status))
        .route("/api/deliveries/{id}/cancel", patch(routes::cancel_order))
        .route("/api/refunds", post(routes::create_refund_request))
        .route("/api/refunds/evaluate", post(routes::evaluate_refund))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use rust_decimal::Decimal;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::StoreConfig;
    use crate::domain::{ProductCreate, UserCreate};
    use crate::invoice_document::TextInvoiceRenderer;
    use crate::notify::testing::RecordingNotifier;

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(body.map_or_else(Body::empty, |body| Body::from(body.to_string())))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    fn address() -> Value {
        json!({
            "fullName": "Ada Lovelace",
            "phoneNum": "555-0100",
            "address": "12 Analytical St",
            "country": "UK",
            "postalCode": "N1 9GU"
        })
    }

    async fn seeded() -> (Router, StoreSystem, String, String, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig {
            invoice_dir: dir.path().to_path_buf(),
            ..StoreConfig::default()
        };
        let system = StoreSystem::with_collaborators(
            &config,
            Arc::new(RecordingNotifier::default()),
            Arc::new(TextInvoiceRenderer),
        );
        let user_id = system
            .user_client
            .create_user(UserCreate {
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
            })
            .await
            .unwrap();
        let product_id = system
            .product_client
            .create_product(ProductCreate {
                name: "Lamp".to_string(),
                price: Decimal::from(100),
                quantity_in_stock: 10,
                discount: None,
            })
            .await
            .unwrap();
        (router(AppState::from_system(&system)), system, user_id, product_id, dir)
    }

    #[tokio::test]
    async fn confirm_payment_returns_the_delivery() {
        let (app, system, user_id, product_id, _dir) = seeded().await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/purchases/confirm-payment",
            Some(json!({
                "userId": user_id,
                "products": [{ "productId": product_id, "quantity": 2 }],
                "shippingAddress": address()
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["delivery"]["status"], "processing");
        assert_eq!(system.product_client.check_stock(product_id).await.unwrap(), 8);

        let purchase_id = body["delivery"]["purchaseId"].as_str().unwrap().to_string();
        let (status, view) = send(&app, Method::GET, &format!("/api/purchases/{purchase_id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["status"], "confirmed");
        assert_eq!(view["lineStatus"][0]["returnStatus"], "no_return");
    }

    #[tokio::test]
    async fn failures_map_to_status_codes() {
        let (app, _system, user_id, product_id, _dir) = seeded().await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/purchases/confirm-payment",
            Some(json!({
                "userId": user_id,
                "products": [{ "productId": product_id, "quantity": 15 }],
                "shippingAddress": address()
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "conflict");
        assert_eq!(body["rolledBack"], false);

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/purchases/confirm-payment",
            Some(json!({
                "userId": user_id,
                "products": [{ "productId": product_id, "quantity": -1 }],
                "shippingAddress": address()
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(&app, Method::GET, "/api/deliveries/delivery_404", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");

        let (status, _) = send(
            &app,
            Method::PATCH,
            "/api/deliveries/delivery_1/status",
            Some(json!({ "status": "teleported" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn refund_by_another_user_is_forbidden() {
        let (app, system, user_id, product_id, _dir) = seeded().await;
        let (_, body) = send(
            &app,
            Method::POST,
            "/api/purchases/confirm-payment",
            Some(json!({
                "userId": user_id,
                "products": [{ "productId": product_id, "quantity": 1 }],
                "shippingAddress": address()
            })),
        )
        .await;
        let delivery_id = body["delivery"]["id"].as_str().unwrap().to_string();
        for status in ["in-transit", "delivered"] {
            let (code, _) = send(
                &app,
                Method::PATCH,
                &format!("/api/deliveries/{delivery_id}/status"),
                Some(json!({ "status": status })),
            )
            .await;
            assert_eq!(code, StatusCode::OK);
        }

        let (status, body) = send(
            &app,
            Method::POST,
            "/api/refunds",
            Some(json!({
                "deliveryId": delivery_id,
                "productId": product_id,
                "quantity": 1,
                "userId": "user_999"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "forbidden");
        assert_eq!(system.refund_client.refunds_for_delivery(delivery_id).await.unwrap().len(), 0);
    }
}
