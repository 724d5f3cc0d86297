use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};

use super::cart::{Product, UserId};
use super::errors::DomainError;

#[derive(Debug, Clone)]
pub struct NewInvoice {
    pub user_id: UserId,
    pub total: BigDecimal,
    pub invoice_number: String,
    pub issued_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Invoice {
    pub id: i64,
    pub user_id: UserId,
    pub total: BigDecimal,
    pub invoice_number: String,
    pub issued_at: DateTime<Utc>,
}

/// A detail row stands for exactly one unit of one product.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceDetail {
    pub id: i64,
    pub invoice_id: i64,
    pub product_id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewInvoiceDetail {
    pub invoice_id: i64,
    pub product_id: i64,
}

#[derive(Debug, Clone)]
pub struct InvoiceView {
    pub invoice: Invoice,
    pub details: Vec<InvoiceDetail>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SellerOrderStatus {
    Pending,
    Ready,
}

impl SellerOrderStatus {
    /// Value stored in the `estado` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            SellerOrderStatus::Pending => "pendiente",
            SellerOrderStatus::Ready => "listo",
        }
    }
}

impl fmt::Display for SellerOrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SellerOrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pendiente" | "pending" => Ok(SellerOrderStatus::Pending),
            "listo" | "ready" => Ok(SellerOrderStatus::Ready),
            other => Err(DomainError::InvalidStatus(format!(
                "'{}' (expected 'pendiente' or 'listo')",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SellerOrder {
    pub id: i64,
    pub invoice_id: i64,
    pub status: SellerOrderStatus,
}

#[derive(Debug, Clone)]
pub struct CustomerSummary {
    pub id: UserId,
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone)]
pub struct InvoiceDetailView {
    pub id: i64,
    pub product_id: i64,
    pub product: Option<Product>,
}

/// Seller order joined with its invoice, customer and detail rows.
#[derive(Debug, Clone)]
pub struct SellerOrderView {
    pub order: SellerOrder,
    pub invoice: Option<Invoice>,
    pub customer: Option<CustomerSummary>,
    pub details: Vec<InvoiceDetailView>,
}

#[derive(Debug, Clone)]
pub struct NewReconciliation {
    pub provider_order_id: String,
    pub user_id: UserId,
    pub amount: Option<BigDecimal>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    pub id: i64,
    pub provider_order_id: String,
}

/// Payment provider order ids are plain tokens such as `5O190127TN364715T`.
/// Anything else is refused before it reaches a URL path or a search filter.
pub fn is_provider_reference(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Result of a completed remote capture.
#[derive(Debug, Clone)]
pub struct CapturedPayment {
    pub status: String,
    /// Amount the provider reports as captured.
    pub amount: BigDecimal,
    pub raw: serde_json::Value,
}

#[derive(Debug, Clone)]
pub struct CaptureOutcome {
    pub invoice_id: i64,
    pub invoice_number: String,
    pub capture: serde_json::Value,
}
