use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Cart is empty")]
    EmptyCart,
    #[error("Invalid status: {0}")]
    InvalidStatus(String),
    #[error("Payment gateway authentication failed: {0}")]
    GatewayAuth(String),
    #[error("Payment gateway request failed: {0}")]
    GatewayRequest(String),
    #[error("Payment capture failed: {0}")]
    GatewayCapture(String),
    #[error("Captured amount {captured} does not match invoice total {invoiced}")]
    AmountMismatch { captured: String, invoiced: String },
    #[error("Write failed: {0}")]
    Write(String),
    #[error("Store error: {0}")]
    Store(String),
}
