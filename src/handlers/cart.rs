use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::pricing::{amount_string, compute_breakdown};
use crate::context::AppContext;
use crate::domain::cart::{CartLine, LineItem, PriceBreakdown};
use crate::domain::errors::DomainError;
use crate::errors::AppError;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddCartItemRequest {
    pub product_id: i64,
    /// External auth id of the cart owner.
    pub auth_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartLineResponse {
    pub id: i64,
    pub product_id: i64,
    pub user_id: i64,
}

impl From<CartLine> for CartLineResponse {
    fn from(line: CartLine) -> Self {
        Self {
            id: line.id,
            product_id: line.product_id,
            user_id: line.user_id,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LineItemResponse {
    pub product_id: i64,
    pub name: String,
    /// Two-decimal string, e.g. "10.00"
    pub unit_price: String,
    pub quantity: u32,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownResponse {
    pub item_total: String,
    pub tax_total: String,
    pub shipping: String,
    pub grand_total: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartSummaryResponse {
    pub items: Vec<LineItemResponse>,
    pub breakdown: BreakdownResponse,
}

impl From<&LineItem> for LineItemResponse {
    fn from(item: &LineItem) -> Self {
        Self {
            product_id: item.product_id,
            name: item.name.clone(),
            unit_price: amount_string(&item.unit_price),
            quantity: item.quantity,
        }
    }
}

impl From<PriceBreakdown> for BreakdownResponse {
    fn from(b: PriceBreakdown) -> Self {
        Self {
            item_total: amount_string(&b.item_total),
            tax_total: amount_string(&b.tax_total),
            shipping: amount_string(&b.shipping),
            grand_total: amount_string(&b.grand_total),
        }
    }
}

/// POST /cart
///
/// Adds one unit of a product to the cart of the user behind `authId`.
#[utoipa::path(
    post,
    path = "/cart",
    request_body = AddCartItemRequest,
    responses(
        (status = 201, description = "Unit added", body = CartLineResponse),
        (status = 400, description = "Invalid productId or authId"),
        (status = 404, description = "Unknown user"),
    ),
    tag = "cart"
)]
pub async fn add_item(
    ctx: web::Data<AppContext>,
    body: web::Json<AddCartItemRequest>,
) -> Result<HttpResponse, AppError> {
    let line = ctx.carts.add_item(&body.auth_id, body.product_id).await?;
    Ok(HttpResponse::Created().json(CartLineResponse::from(line)))
}

/// GET /cart/user/{auth_id}
#[utoipa::path(
    get,
    path = "/cart/user/{auth_id}",
    params(("auth_id" = String, Path, description = "External auth id")),
    responses(
        (status = 200, description = "Raw cart lines, one per unit", body = [CartLineResponse]),
        (status = 404, description = "Unknown user"),
    ),
    tag = "cart"
)]
pub async fn get_cart(
    ctx: web::Data<AppContext>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let user_id = ctx.carts.resolve_internal_user_id(&path).await?;
    let lines: Vec<CartLineResponse> = ctx
        .carts
        .get_cart_lines(user_id)
        .await?
        .into_iter()
        .map(CartLineResponse::from)
        .collect();
    Ok(HttpResponse::Ok().json(lines))
}

/// GET /cart/user/{auth_id}/summary
///
/// Line items grouped by product plus the price breakdown checkout would
/// charge. An empty cart yields no items and a zero breakdown.
#[utoipa::path(
    get,
    path = "/cart/user/{auth_id}/summary",
    params(("auth_id" = String, Path, description = "External auth id")),
    responses(
        (status = 200, description = "Priced cart", body = CartSummaryResponse),
        (status = 404, description = "Unknown user"),
    ),
    tag = "cart"
)]
pub async fn get_summary(
    ctx: web::Data<AppContext>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let user_id = ctx.carts.resolve_internal_user_id(&path).await?;
    let items = match ctx.carts.line_items(user_id).await {
        Ok(items) => items,
        Err(DomainError::EmptyCart) => Vec::new(),
        Err(e) => return Err(e.into()),
    };

    let breakdown = if items.is_empty() {
        PriceBreakdown::zero()
    } else {
        compute_breakdown(&items)
    };

    Ok(HttpResponse::Ok().json(CartSummaryResponse {
        items: items.iter().map(LineItemResponse::from).collect(),
        breakdown: breakdown.into(),
    }))
}

/// DELETE /cart/{id}
#[utoipa::path(
    delete,
    path = "/cart/{id}",
    params(("id" = i64, Path, description = "Cart line id")),
    responses((status = 204, description = "Line removed")),
    tag = "cart"
)]
pub async fn remove_line(
    ctx: web::Data<AppContext>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    ctx.carts.remove_line(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// DELETE /cart/user/{auth_id}/clear
#[utoipa::path(
    delete,
    path = "/cart/user/{auth_id}/clear",
    params(("auth_id" = String, Path, description = "External auth id")),
    responses(
        (status = 204, description = "Cart emptied"),
        (status = 404, description = "Unknown user"),
    ),
    tag = "cart"
)]
pub async fn clear_cart(
    ctx: web::Data<AppContext>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let user_id = ctx.carts.resolve_internal_user_id(&path).await?;
    ctx.carts.clear_cart(user_id).await?;
    Ok(HttpResponse::NoContent().finish())
}
