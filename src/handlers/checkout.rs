use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::context::AppContext;
use crate::errors::AppError;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutOrderRequest {
    /// Internal numeric user id.
    pub user_id: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutOrderResponse {
    /// Payment-provider order id, to be passed back on capture.
    pub order_id: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CaptureCheckoutOrderRequest {
    pub user_id: i64,
    pub order_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CaptureCheckoutOrderResponse {
    #[serde(rename = "facturaId")]
    pub invoice_id: i64,
    #[serde(rename = "numeroFactura")]
    pub invoice_number: String,
    /// Capture response as returned by the payment provider.
    #[serde(rename = "paypalCapture")]
    #[schema(value_type = Object)]
    pub paypal_capture: serde_json::Value,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /checkout/orders
///
/// Prices the user's current cart and opens a payment-provider order for it.
/// Nothing is stored locally.
#[utoipa::path(
    post,
    path = "/checkout/orders",
    request_body = CreateCheckoutOrderRequest,
    responses(
        (status = 201, description = "Payment order created", body = CreateCheckoutOrderResponse),
        (status = 400, description = "Missing or invalid userId"),
        (status = 500, description = "Empty cart or payment provider failure"),
    ),
    tag = "checkout"
)]
pub async fn create_order(
    ctx: web::Data<AppContext>,
    body: web::Json<CreateCheckoutOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let created = ctx.checkout.create_order(body.user_id).await?;

    Ok(HttpResponse::Created().json(CreateCheckoutOrderResponse {
        order_id: created.provider_order_id,
    }))
}

/// POST /checkout/capture
///
/// Captures a previously created payment order, then invoices the current cart
/// and clears it.
#[utoipa::path(
    post,
    path = "/checkout/capture",
    request_body = CaptureCheckoutOrderRequest,
    responses(
        (status = 200, description = "Payment captured and invoiced", body = CaptureCheckoutOrderResponse),
        (status = 400, description = "Missing or invalid userId / orderId"),
        (status = 500, description = "Capture failed, or captured but not invoiced"),
    ),
    tag = "checkout"
)]
pub async fn capture_order(
    ctx: web::Data<AppContext>,
    body: web::Json<CaptureCheckoutOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let outcome = ctx
        .checkout
        .capture_order(body.user_id, &body.order_id)
        .await?;

    Ok(HttpResponse::Ok().json(CaptureCheckoutOrderResponse {
        invoice_id: outcome.invoice_id,
        invoice_number: outcome.invoice_number,
        paypal_capture: outcome.capture,
    }))
}
