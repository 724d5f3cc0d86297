//! Checkout orchestration: remote order creation and capture-then-invoice.
//!
//! Capture always precedes any local write, and the cart is cleared only after
//! the invoice, its details and the seller order are stored. Nothing is rolled
//! back: once the provider has captured the payment, a failed write leaves a
//! pending reconciliation record and an `error!` log line carrying the provider
//! order id and user id.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::application::cart_service::CartService;
use crate::application::order_service::OrderService;
use crate::application::pricing::{amount_string, compute_breakdown, round2};
use crate::application::user_locks::UserLocks;
use crate::domain::cart::{PriceBreakdown, UserId};
use crate::domain::errors::DomainError;
use crate::domain::order::{is_provider_reference, CaptureOutcome, CapturedPayment};
use crate::domain::ports::PaymentGateway;

#[derive(Debug, Clone)]
pub struct CreatedOrder {
    pub provider_order_id: String,
    pub breakdown: PriceBreakdown,
}

#[derive(Clone)]
pub struct CheckoutService {
    carts: CartService,
    orders: OrderService,
    gateway: Arc<dyn PaymentGateway>,
    locks: UserLocks,
}

impl CheckoutService {
    pub fn new(
        carts: CartService,
        orders: OrderService,
        gateway: Arc<dyn PaymentGateway>,
        locks: UserLocks,
    ) -> Self {
        Self {
            carts,
            orders,
            gateway,
            locks,
        }
    }

    pub async fn create_order(&self, user_id: UserId) -> Result<CreatedOrder, DomainError> {
        validate_user_id(user_id)?;
        let _lock = self.locks.acquire(user_id).await;

        let items = self.carts.line_items(user_id).await?;
        let breakdown = compute_breakdown(&items);
        let correlation_ref = Uuid::new_v4().to_string();

        let provider_order_id = self
            .gateway
            .create_order(&breakdown, &items, &correlation_ref)
            .await?;

        log::info!(
            "Created payment order {} for user {} (total {}, ref {})",
            provider_order_id,
            user_id,
            breakdown.grand_total,
            correlation_ref
        );

        Ok(CreatedOrder {
            provider_order_id,
            breakdown,
        })
    }

    pub async fn capture_order(
        &self,
        user_id: UserId,
        provider_order_id: &str,
    ) -> Result<CaptureOutcome, DomainError> {
        validate_user_id(user_id)?;
        let provider_order_id = provider_order_id.trim();
        if provider_order_id.is_empty() {
            return Err(DomainError::InvalidArgument("orderId is required".to_string()));
        }
        if !is_provider_reference(provider_order_id) {
            return Err(DomainError::InvalidArgument(
                "orderId may only contain letters, digits and '-'".to_string(),
            ));
        }
        let _lock = self.locks.acquire(user_id).await;

        let captured = self
            .gateway
            .capture_order(provider_order_id)
            .await
            .map_err(|e| {
                log::warn!(
                    "Capture of payment order {} for user {} failed: {}",
                    provider_order_id,
                    user_id,
                    e
                );
                e
            })?;

        match self
            .record_capture(user_id, provider_order_id, &captured)
            .await
        {
            Ok(outcome) => {
                log::info!(
                    "Payment order {} captured and invoiced as {} (invoice id {})",
                    provider_order_id,
                    outcome.invoice_number,
                    outcome.invoice_id
                );
                Ok(outcome)
            }
            Err(e) => {
                log::error!(
                    "Payment captured but not invoiced, manual reconciliation required: \
                     provider_order_id={} user_id={} capture_status={} error={}",
                    provider_order_id,
                    user_id,
                    captured.status,
                    e
                );
                Err(e)
            }
        }
    }

    async fn record_capture(
        &self,
        user_id: UserId,
        provider_order_id: &str,
        captured: &CapturedPayment,
    ) -> Result<CaptureOutcome, DomainError> {
        let reconciliation = self
            .orders
            .open_reconciliation(provider_order_id, user_id, Some(captured.amount.clone()))
            .await?;

        let items = self.carts.line_items(user_id).await?;
        let breakdown = compute_breakdown(&items);

        if round2(&captured.amount) != breakdown.grand_total {
            return Err(DomainError::AmountMismatch {
                captured: amount_string(&captured.amount),
                invoiced: amount_string(&breakdown.grand_total),
            });
        }

        let invoice = self
            .orders
            .write_invoice(
                user_id,
                breakdown.grand_total.clone(),
                invoice_number(provider_order_id, Utc::now()),
            )
            .await?;
        self.orders.write_invoice_details(invoice.id, &items).await?;
        self.orders.write_seller_order(invoice.id).await?;
        self.carts.clear_cart(user_id).await?;

        if let Err(e) = self
            .orders
            .resolve_reconciliation(reconciliation.id, &invoice.invoice_number)
            .await
        {
            log::warn!(
                "Could not mark reconciliation {} for {} as resolved: {}",
                reconciliation.id,
                provider_order_id,
                e
            );
        }

        Ok(CaptureOutcome {
            invoice_id: invoice.id,
            invoice_number: invoice.invoice_number,
            capture: captured.raw.clone(),
        })
    }
}

fn validate_user_id(user_id: UserId) -> Result<(), DomainError> {
    if user_id <= 0 {
        return Err(DomainError::InvalidArgument(
            "userId must be a positive integer".to_string(),
        ));
    }
    Ok(())
}

pub fn invoice_number(provider_order_id: &str, at: DateTime<Utc>) -> String {
    format!("FAC-{}-{}", provider_order_id, at.timestamp_millis())
}
