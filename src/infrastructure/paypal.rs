//! PayPal Orders v2 client: client-credential token, order creation, capture.

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::application::pricing::amount_string;
use crate::domain::cart::{LineItem, PriceBreakdown};
use crate::domain::errors::DomainError;
use crate::domain::order::{is_provider_reference, CapturedPayment};
use crate::domain::ports::PaymentGateway;

pub const SANDBOX_API_BASE: &str = "https://api-m.sandbox.paypal.com";

#[derive(Debug, Clone)]
pub struct PayPalConfig {
    pub api_base: String,
    pub client_id: String,
    pub client_secret: String,
    /// ISO-4217 code applied to every amount, e.g. `USD`.
    pub currency: String,
}

#[derive(Debug, Clone)]
pub struct PayPalClient {
    config: PayPalConfig,
    http: Client,
}

// ── Wire types ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, PartialEq)]
struct Money {
    currency_code: String,
    value: String,
}

#[derive(Debug, Serialize)]
struct AmountBreakdown {
    item_total: Money,
    tax_total: Money,
    shipping: Money,
}

#[derive(Debug, Serialize)]
struct Amount {
    currency_code: String,
    value: String,
    breakdown: AmountBreakdown,
}

#[derive(Debug, Serialize)]
struct Item {
    name: String,
    quantity: String,
    unit_amount: Money,
}

#[derive(Debug, Serialize)]
struct PurchaseUnit {
    reference_id: String,
    amount: Amount,
    items: Vec<Item>,
}

#[derive(Debug, Serialize)]
struct CreateOrderRequest {
    intent: &'static str,
    purchase_units: Vec<PurchaseUnit>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct CreateOrderResponse {
    id: String,
}

// ── Client ───────────────────────────────────────────────────────────────────

impl PayPalClient {
    pub fn new(config: PayPalConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base.trim_end_matches('/'), path)
    }

    fn money(&self, value: &BigDecimal) -> Money {
        Money {
            currency_code: self.config.currency.clone(),
            value: amount_string(value),
        }
    }

    fn order_request(
        &self,
        breakdown: &PriceBreakdown,
        items: &[LineItem],
        correlation_ref: &str,
    ) -> CreateOrderRequest {
        CreateOrderRequest {
            intent: "CAPTURE",
            purchase_units: vec![PurchaseUnit {
                reference_id: correlation_ref.to_string(),
                amount: Amount {
                    currency_code: self.config.currency.clone(),
                    value: amount_string(&breakdown.grand_total),
                    breakdown: AmountBreakdown {
                        item_total: self.money(&breakdown.item_total),
                        tax_total: self.money(&breakdown.tax_total),
                        shipping: self.money(&breakdown.shipping),
                    },
                },
                items: items
                    .iter()
                    .map(|item| Item {
                        name: item.name.clone(),
                        quantity: item.quantity.to_string(),
                        unit_amount: self.money(&item.unit_price),
                    })
                    .collect(),
            }],
        }
    }

    /// Exchanges the configured client credentials for a bearer token.
    pub async fn access_token(&self) -> Result<String, DomainError> {
        let response = self
            .http
            .post(self.url("/v1/oauth2/token"))
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| DomainError::GatewayAuth(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(DomainError::GatewayAuth(format!(
                "token request failed with status {}: {}",
                status, text
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| DomainError::GatewayAuth(format!("unreadable token response: {}", e)))?;
        Ok(token.access_token)
    }
}

fn captured_amount(capture: &Value) -> Option<BigDecimal> {
    capture
        .pointer("/purchase_units/0/payments/captures/0/amount/value")
        .and_then(Value::as_str)
        .and_then(|v| v.parse().ok())
}

#[async_trait]
impl PaymentGateway for PayPalClient {
    async fn create_order(
        &self,
        breakdown: &PriceBreakdown,
        items: &[LineItem],
        correlation_ref: &str,
    ) -> Result<String, DomainError> {
        let token = self.access_token().await?;

        let response = self
            .http
            .post(self.url("/v2/checkout/orders"))
            .bearer_auth(token)
            .header("PayPal-Request-Id", correlation_ref)
            .json(&self.order_request(breakdown, items, correlation_ref))
            .send()
            .await
            .map_err(|e| DomainError::GatewayRequest(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(DomainError::GatewayRequest(format!(
                "order creation failed with status {}: {}",
                status, text
            )));
        }

        let created: CreateOrderResponse = response.json().await.map_err(|e| {
            DomainError::GatewayRequest(format!("unreadable order response: {}", e))
        })?;
        Ok(created.id)
    }

    async fn capture_order(&self, provider_order_id: &str) -> Result<CapturedPayment, DomainError> {
        // The id becomes a path segment of a request carrying the merchant token.
        if !is_provider_reference(provider_order_id) {
            return Err(DomainError::InvalidArgument(format!(
                "malformed payment order id '{}'",
                provider_order_id
            )));
        }

        let token = self.access_token().await?;
        // Only approximately idempotent: a retry gets a new timestamp.
        let request_id = format!("{}-{}", provider_order_id, Utc::now().timestamp_millis());

        let response = self
            .http
            .post(self.url(&format!("/v2/checkout/orders/{}/capture", provider_order_id)))
            .bearer_auth(token)
            .header("PayPal-Request-Id", request_id)
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(|e| DomainError::GatewayCapture(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(DomainError::GatewayCapture(format!(
                "capture of {} failed with status {}: {}",
                provider_order_id, status, text
            )));
        }

        let raw: Value = response.json().await.map_err(|e| {
            DomainError::GatewayCapture(format!("unreadable capture response: {}", e))
        })?;

        let status = raw
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or("UNKNOWN")
            .to_string();
        if status != "COMPLETED" {
            return Err(DomainError::GatewayCapture(format!(
                "capture of {} ended in status {}",
                provider_order_id, status
            )));
        }

        let amount = captured_amount(&raw).ok_or_else(|| {
            DomainError::GatewayCapture(format!(
                "capture of {} reports no captured amount",
                provider_order_id
            ))
        })?;

        Ok(CapturedPayment {
            status,
            amount,
            raw,
        })
    }
}
