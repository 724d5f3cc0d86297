use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers::{self, cart, checkout, orders};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Checkout Service",
        description = "Cart pricing, payment capture and invoicing"
    ),
    paths(
        handlers::health,
        checkout::create_order,
        checkout::capture_order,
        cart::add_item,
        cart::get_cart,
        cart::get_summary,
        cart::remove_line,
        cart::clear_cart,
        orders::list_orders,
        orders::update_status,
        orders::get_invoice,
        orders::search_invoices,
    ),
    components(schemas(
        handlers::HealthResponse,
        checkout::CreateCheckoutOrderRequest,
        checkout::CreateCheckoutOrderResponse,
        checkout::CaptureCheckoutOrderRequest,
        checkout::CaptureCheckoutOrderResponse,
        cart::AddCartItemRequest,
        cart::CartLineResponse,
        cart::LineItemResponse,
        cart::BreakdownResponse,
        cart::CartSummaryResponse,
        orders::UpdateStatusRequest,
        orders::InvoiceResponse,
        orders::InvoiceDetailResponse,
        orders::InvoiceWithDetailsResponse,
        orders::CustomerResponse,
        orders::SellerOrderResponse,
        orders::SellerOrderStatusResponse,
    )),
    tags(
        (name = "checkout", description = "Payment order creation and capture"),
        (name = "cart", description = "Per-user shopping cart"),
        (name = "orders", description = "Seller orders and invoices"),
        (name = "health", description = "Liveness"),
    )
)]
pub struct ApiDoc;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi())
}
