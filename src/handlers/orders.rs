use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::application::pricing::amount_string;
use crate::context::AppContext;
use crate::domain::order::{
    CustomerSummary, Invoice, InvoiceDetail, InvoiceDetailView, InvoiceView, SellerOrder,
    SellerOrderView,
};
use crate::errors::AppError;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    /// "pendiente" or "listo" (English "pending" / "ready" also accepted).
    #[serde(alias = "estado")]
    pub status: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct InvoiceSearchParams {
    /// Fragment of the invoice number, e.g. a provider order id.
    pub search: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceResponse {
    pub id: i64,
    pub user_id: i64,
    /// Decimal total as a string, e.g. "38.50"
    pub total: String,
    pub invoice_number: String,
    pub issued_at: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDetailResponse {
    pub id: i64,
    pub product_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceWithDetailsResponse {
    #[serde(flatten)]
    pub invoice: InvoiceResponse,
    pub details: Vec<InvoiceDetailResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CustomerResponse {
    pub id: i64,
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SellerOrderResponse {
    pub id: i64,
    pub invoice_id: i64,
    pub status: String,
    pub invoice: Option<InvoiceResponse>,
    pub customer: Option<CustomerResponse>,
    pub details: Vec<InvoiceDetailResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SellerOrderStatusResponse {
    pub id: i64,
    pub invoice_id: i64,
    pub status: String,
}

impl From<Invoice> for InvoiceResponse {
    fn from(i: Invoice) -> Self {
        Self {
            id: i.id,
            user_id: i.user_id,
            total: amount_string(&i.total),
            invoice_number: i.invoice_number,
            issued_at: i.issued_at.to_rfc3339(),
        }
    }
}

impl From<InvoiceDetail> for InvoiceDetailResponse {
    fn from(d: InvoiceDetail) -> Self {
        Self {
            id: d.id,
            product_id: d.product_id,
            product_name: None,
            unit_price: None,
        }
    }
}

impl From<InvoiceDetailView> for InvoiceDetailResponse {
    fn from(d: InvoiceDetailView) -> Self {
        Self {
            id: d.id,
            product_id: d.product_id,
            product_name: d.product.as_ref().map(|p| p.name.clone()),
            unit_price: d.product.map(|p| amount_string(&p.price)),
        }
    }
}

impl From<CustomerSummary> for CustomerResponse {
    fn from(c: CustomerSummary) -> Self {
        Self {
            id: c.id,
            name: c.name,
            email: c.email,
        }
    }
}

impl From<SellerOrder> for SellerOrderStatusResponse {
    fn from(o: SellerOrder) -> Self {
        Self {
            id: o.id,
            invoice_id: o.invoice_id,
            status: o.status.to_string(),
        }
    }
}

impl From<SellerOrderView> for SellerOrderResponse {
    fn from(v: SellerOrderView) -> Self {
        Self {
            id: v.order.id,
            invoice_id: v.order.invoice_id,
            status: v.order.status.to_string(),
            invoice: v.invoice.map(InvoiceResponse::from),
            customer: v.customer.map(CustomerResponse::from),
            details: v.details.into_iter().map(InvoiceDetailResponse::from).collect(),
        }
    }
}

impl From<InvoiceView> for InvoiceWithDetailsResponse {
    fn from(v: InvoiceView) -> Self {
        Self {
            invoice: v.invoice.into(),
            details: v.details.into_iter().map(InvoiceDetailResponse::from).collect(),
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /orders
///
/// Seller-side view: every seller order with its invoice, customer and
/// invoiced units.
#[utoipa::path(
    get,
    path = "/orders",
    responses(
        (status = 200, description = "Seller orders", body = [SellerOrderResponse]),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn list_orders(ctx: web::Data<AppContext>) -> Result<HttpResponse, AppError> {
    let orders: Vec<SellerOrderResponse> = ctx
        .orders
        .list_seller_orders()
        .await?
        .into_iter()
        .map(SellerOrderResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(orders))
}

/// PATCH /orders/{id}/status
#[utoipa::path(
    patch,
    path = "/orders/{id}/status",
    params(("id" = i64, Path, description = "Seller order id")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = SellerOrderStatusResponse),
        (status = 400, description = "Unknown status or invalid id"),
        (status = 404, description = "Seller order not found"),
    ),
    tag = "orders"
)]
pub async fn update_status(
    ctx: web::Data<AppContext>,
    path: web::Path<i64>,
    body: web::Json<UpdateStatusRequest>,
) -> Result<HttpResponse, AppError> {
    let order = ctx
        .orders
        .update_seller_order_status(path.into_inner(), &body.status)
        .await?;

    Ok(HttpResponse::Ok().json(SellerOrderStatusResponse::from(order)))
}

/// GET /orders/invoices/{id}
///
/// Returns the invoice together with one detail row per invoiced unit.
#[utoipa::path(
    get,
    path = "/orders/invoices/{id}",
    params(("id" = i64, Path, description = "Invoice id")),
    responses(
        (status = 200, description = "Invoice found", body = InvoiceWithDetailsResponse),
        (status = 404, description = "Invoice not found"),
    ),
    tag = "orders"
)]
pub async fn get_invoice(
    ctx: web::Data<AppContext>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let view = ctx.orders.find_invoice(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(InvoiceWithDetailsResponse::from(view)))
}

/// GET /orders/invoices?search=
#[utoipa::path(
    get,
    path = "/orders/invoices",
    params(InvoiceSearchParams),
    responses(
        (status = 200, description = "Matching invoices", body = [InvoiceResponse]),
        (status = 400, description = "Missing or malformed search term"),
    ),
    tag = "orders"
)]
pub async fn search_invoices(
    ctx: web::Data<AppContext>,
    query: web::Query<InvoiceSearchParams>,
) -> Result<HttpResponse, AppError> {
    let invoices: Vec<InvoiceResponse> = ctx
        .orders
        .search_invoices(&query.search)
        .await?
        .into_iter()
        .map(InvoiceResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(invoices))
}
