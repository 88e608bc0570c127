use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::{ApiError, AppState};
use crate::domain::{
    CartLine, Delivery, DeliveryAddress, DeliveryStatus, Purchase, RefundDecision, RefundRequest, ReturnStatus,
};

// =============================================================================
// Request / response bodies
// =============================================================================

/// Quantities arrive signed so a negative value is a validation error rather
/// than a body-parsing rejection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineBody {
    pub product_id: String,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPaymentBody {
    pub user_id: String,
    pub products: Vec<CartLineBody>,
    #[serde(default)]
    pub shipping_address: DeliveryAddress,
}

#[derive(Debug, Serialize)]
pub struct DeliveryResponse {
    pub delivery: Delivery,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineStatus {
    pub product_id: String,
    pub return_status: ReturnStatus,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseView {
    #[serde(flatten)]
    pub purchase: Purchase,
    pub line_status: Vec<LineStatus>,
}

#[derive(Debug, Serialize)]
pub struct DeliveryView {
    #[serde(flatten)]
    pub delivery: Delivery,
    pub refunds: Vec<RefundRequest>,
}

#[derive(Debug, Deserialize)]
pub struct StatusBody {
    pub status: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelBody {
    pub order_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundRequestBody {
    pub delivery_id: String,
    pub product_id: String,
    pub quantity: i64,
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateRefundBody {
    pub delivery_id: String,
    pub product_id: String,
    pub quantity: i64,
    pub status: String,
}

fn positive_quantity(quantity: i64) -> Result<u32, ApiError> {
    match u32::try_from(quantity) {
        Ok(quantity) if quantity > 0 => Ok(quantity),
        _ => Err(ApiError::validation(format!("quantity must be a positive integer, got {quantity}"))),
    }
}

// =============================================================================
// Purchases
// =============================================================================

#[instrument(skip(state, body), fields(user_id = %body.user_id))]
pub async fn confirm_payment(
    State(state): State<AppState>,
    Json(body): Json<ConfirmPaymentBody>,
) -> Result<Json<DeliveryResponse>, ApiError> {
    let cart = body
        .products
        .into_iter()
        .map(|line| Ok(CartLine::new(line.product_id, positive_quantity(line.quantity)?)))
        .collect::<Result<Vec<_>, ApiError>>()?;

    let delivery = state
        .purchases
        .confirm_payment(body.user_id, cart, body.shipping_address)
        .await?;
    Ok(Json(DeliveryResponse { delivery }))
}

#[instrument(skip(state))]
pub async fn get_purchase(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PurchaseView>, ApiError> {
    let purchase = state
        .purchases
        .get_purchase(id.clone())
        .await
        .map_err(ApiError::unavailable)?
        .ok_or_else(|| ApiError::not_found(format!("Purchase not found: {id}")))?;

    let mut line_status = Vec::with_capacity(purchase.items.len());
    for item in &purchase.items {
        let return_status = state
            .refunds
            .line_return_status(purchase.id.clone(), item.product_id.clone())
            .await
            .map_err(ApiError::unavailable)?;
        line_status.push(LineStatus {
            product_id: item.product_id.clone(),
            return_status,
        });
    }
    Ok(Json(PurchaseView { purchase, line_status }))
}

#[instrument(skip(state))]
pub async fn purchase_history(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Purchase>>, ApiError> {
    let purchases = state
        .purchases
        .purchase_history(user_id)
        .await
        .map_err(ApiError::unavailable)?;
    Ok(Json(purchases))
}

#[instrument(skip(state))]
pub async fn delete_purchase(State(state): State<AppState>, Path(id): Path<String>) -> Result<StatusCode, ApiError> {
    state.purchases.delete_purchase(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Deliveries
// =============================================================================

#[instrument(skip(state))]
pub async fn get_delivery(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeliveryView>, ApiError> {
    let delivery = state
        .deliveries
        .get_delivery(id.clone())
        .await
        .map_err(ApiError::unavailable)?
        .ok_or_else(|| ApiError::not_found(format!("Delivery not found: {id}")))?;
    let refunds = state
        .refunds
        .refunds_for_delivery(id)
        .await
        .map_err(ApiError::unavailable)?;
    Ok(Json(DeliveryView { delivery, refunds }))
}

#[instrument(skip(state))]
pub async fn user_deliveries(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Delivery>>, ApiError> {
    let deliveries = state
        .deliveries
        .deliveries_for_user(user_id)
        .await
        .map_err(ApiError::unavailable)?;
    Ok(Json(deliveries))
}

#[instrument(skip(state, body))]
pub async fn update_delivery_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<StatusBody>,
) -> Result<Json<DeliveryResponse>, ApiError> {
    let status: DeliveryStatus = body.status.parse().map_err(ApiError::validation)?;
    let delivery = state.deliveries.update_status(id, status).await?;
    Ok(Json(DeliveryResponse { delivery }))
}

#[instrument(skip(state, body))]
pub async fn cancel_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<CancelBody>,
) -> Result<Json<DeliveryResponse>, ApiError> {
    let delivery = state.deliveries.cancel_order(id, body.order_id).await?;
    Ok(Json(DeliveryResponse { delivery }))
}

// =============================================================================
// Refunds
// =============================================================================

#[instrument(skip(state, body), fields(delivery_id = %body.delivery_id))]
pub async fn create_refund_request(
    State(state): State<AppState>,
    Json(body): Json<RefundRequestBody>,
) -> Result<(StatusCode, Json<RefundRequest>), ApiError> {
    let quantity = positive_quantity(body.quantity)?;
    let request = state
        .refunds
        .create_refund_request(body.delivery_id, body.product_id, quantity, body.user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(request)))
}

#[instrument(skip(state, body), fields(delivery_id = %body.delivery_id))]
pub async fn evaluate_refund(
    State(state): State<AppState>,
    Json(body): Json<EvaluateRefundBody>,
) -> Result<Json<RefundRequest>, ApiError> {
    let decision: RefundDecision = body.status.parse().map_err(ApiError::validation)?;
    let quantity = positive_quantity(body.quantity)?;
    let request = state
        .refunds
        .evaluate_refund(body.delivery_id, body.product_id, quantity, decision)
        .await?;
    Ok(Json(request))
}
