use std::sync::Arc;

use bigdecimal::BigDecimal;
use chrono::Utc;

use crate::domain::cart::{LineItem, UserId};
use crate::domain::errors::DomainError;
use crate::domain::order::{
    is_provider_reference, Invoice, InvoiceDetail, InvoiceView, NewInvoice, NewInvoiceDetail,
    NewReconciliation, Reconciliation, SellerOrder, SellerOrderStatus, SellerOrderView,
};
use crate::domain::ports::OrderRepository;

/// Invoice persistence and seller-order tracking.
///
/// None of these writes are atomic with each other; callers sequence them.
#[derive(Clone)]
pub struct OrderService {
    repo: Arc<dyn OrderRepository>,
}

impl OrderService {
    pub fn new(repo: Arc<dyn OrderRepository>) -> Self {
        Self { repo }
    }

    pub async fn write_invoice(
        &self,
        user_id: UserId,
        grand_total: BigDecimal,
        invoice_number: String,
    ) -> Result<Invoice, DomainError> {
        self.repo
            .insert_invoice(NewInvoice {
                user_id,
                total: grand_total,
                invoice_number,
                issued_at: Utc::now(),
            })
            .await
            .map_err(into_write_error)
    }

    /// Writes one detail row per unit, so a line item with quantity 3 yields
    /// three rows.
    pub async fn write_invoice_details(
        &self,
        invoice_id: i64,
        items: &[LineItem],
    ) -> Result<Vec<InvoiceDetail>, DomainError> {
        let rows: Vec<NewInvoiceDetail> = items
            .iter()
            .flat_map(|item| {
                (0..item.quantity).map(move |_| NewInvoiceDetail {
                    invoice_id,
                    product_id: item.product_id,
                })
            })
            .collect();

        self.repo
            .insert_invoice_details(&rows)
            .await
            .map_err(into_write_error)
    }

    pub async fn write_seller_order(&self, invoice_id: i64) -> Result<SellerOrder, DomainError> {
        self.repo
            .insert_seller_order(invoice_id, SellerOrderStatus::Pending)
            .await
            .map_err(into_write_error)
    }

    /// Validates `new_status` before touching the store.
    pub async fn update_seller_order_status(
        &self,
        order_id: i64,
        new_status: &str,
    ) -> Result<SellerOrder, DomainError> {
        let status: SellerOrderStatus = new_status.parse()?;
        if order_id <= 0 {
            return Err(DomainError::InvalidArgument(format!(
                "invalid order id {}",
                order_id
            )));
        }

        self.repo
            .update_seller_order_status(order_id, status)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("seller order {}", order_id)))
    }

    pub async fn list_seller_orders(&self) -> Result<Vec<SellerOrderView>, DomainError> {
        self.repo.list_seller_orders().await
    }

    pub async fn find_invoice(&self, id: i64) -> Result<InvoiceView, DomainError> {
        self.repo
            .find_invoice_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("invoice {}", id)))
    }

    /// Looks invoices up by a fragment of their number, typically the
    /// provider order id.
    pub async fn search_invoices(&self, fragment: &str) -> Result<Vec<Invoice>, DomainError> {
        let fragment = fragment.trim();
        if fragment.is_empty() {
            return Err(DomainError::InvalidArgument(
                "search term is required".to_string(),
            ));
        }
        if !is_provider_reference(fragment) {
            return Err(DomainError::InvalidArgument(
                "search term may only contain letters, digits and '-'".to_string(),
            ));
        }
        self.repo.find_invoices_by_number(fragment).await
    }

    pub async fn open_reconciliation(
        &self,
        provider_order_id: &str,
        user_id: UserId,
        amount: Option<BigDecimal>,
    ) -> Result<Reconciliation, DomainError> {
        self.repo
            .insert_reconciliation(NewReconciliation {
                provider_order_id: provider_order_id.to_string(),
                user_id,
                amount,
            })
            .await
            .map_err(into_write_error)
    }

    pub async fn resolve_reconciliation(
        &self,
        id: i64,
        invoice_number: &str,
    ) -> Result<(), DomainError> {
        self.repo
            .resolve_reconciliation(id, invoice_number)
            .await
            .map_err(into_write_error)
    }
}

fn into_write_error(e: DomainError) -> DomainError {
    match e {
        DomainError::Store(msg) => DomainError::Write(msg),
        other => other,
    }
}
