use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use super::cart::{CartLine, LineItem, PriceBreakdown, Product, UserId};
use super::errors::DomainError;
use super::order::{
    CapturedPayment, Invoice, InvoiceDetail, InvoiceView, NewInvoice, NewInvoiceDetail,
    NewReconciliation, Reconciliation, SellerOrder, SellerOrderStatus, SellerOrderView,
};

#[cfg_attr(test, automock)]
#[async_trait]
pub trait CartRepository: Send + Sync {
    async fn find_user_id_by_auth_id(&self, auth_id: &str) -> Result<Option<UserId>, DomainError>;
    async fn find_cart_lines_by_user(&self, user_id: UserId) -> Result<Vec<CartLine>, DomainError>;
    async fn find_products_by_ids(&self, ids: &[i64]) -> Result<Vec<Product>, DomainError>;
    async fn insert_cart_line(
        &self,
        user_id: UserId,
        product_id: i64,
    ) -> Result<CartLine, DomainError>;
    async fn delete_cart_line(&self, cart_line_id: i64) -> Result<(), DomainError>;
    async fn clear_cart(&self, user_id: UserId) -> Result<(), DomainError>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn insert_invoice(&self, invoice: NewInvoice) -> Result<Invoice, DomainError>;
    async fn insert_invoice_details(
        &self,
        details: &[NewInvoiceDetail],
    ) -> Result<Vec<InvoiceDetail>, DomainError>;
    async fn insert_seller_order(
        &self,
        invoice_id: i64,
        status: SellerOrderStatus,
    ) -> Result<SellerOrder, DomainError>;
    /// Returns `None` when no row matches `order_id`.
    async fn update_seller_order_status(
        &self,
        order_id: i64,
        status: SellerOrderStatus,
    ) -> Result<Option<SellerOrder>, DomainError>;
    async fn list_seller_orders(&self) -> Result<Vec<SellerOrderView>, DomainError>;
    async fn find_invoice_by_id(&self, id: i64) -> Result<Option<InvoiceView>, DomainError>;
    /// Case-insensitive substring match on the invoice number.
    async fn find_invoices_by_number(&self, fragment: &str) -> Result<Vec<Invoice>, DomainError>;
    async fn insert_reconciliation(
        &self,
        record: NewReconciliation,
    ) -> Result<Reconciliation, DomainError>;
    async fn resolve_reconciliation(
        &self,
        id: i64,
        invoice_number: &str,
    ) -> Result<(), DomainError>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Creates a remote order for `breakdown` and returns the provider order id.
    async fn create_order(
        &self,
        breakdown: &PriceBreakdown,
        items: &[LineItem],
        correlation_ref: &str,
    ) -> Result<String, DomainError>;
    async fn capture_order(&self, provider_order_id: &str) -> Result<CapturedPayment, DomainError>;
}
