use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::domain::cart::{CartLine, Product, UserId};
use crate::domain::errors::DomainError;
use crate::domain::order::{
    CustomerSummary, Invoice, InvoiceDetail, InvoiceDetailView, SellerOrder, SellerOrderView,
};

// ── Decimal columns ──────────────────────────────────────────────────────────

/// PostgREST renders `numeric` as a JSON number; accept strings too.
fn decimal<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigDecimal, D::Error> {
    let raw = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s,
        other => {
            return Err(serde::de::Error::custom(format!(
                "expected a decimal, got {}",
                other
            )))
        }
    };
    BigDecimal::from_str(&raw).map_err(serde::de::Error::custom)
}

// ── Rows ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct IdRow {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct CustomerRow {
    pub id: UserId,
    pub nombre: Option<String>,
    pub correo: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CartRow {
    pub id: i64,
    pub id_producto: i64,
    pub id_usuario: UserId,
}

#[derive(Debug, Serialize)]
pub struct NewCartRow {
    pub id_producto: i64,
    pub id_usuario: UserId,
}

#[derive(Debug, Deserialize)]
pub struct ProductRow {
    pub id: i64,
    pub nombre: String,
    #[serde(deserialize_with = "decimal")]
    pub precio: BigDecimal,
}

#[derive(Debug, Deserialize)]
pub struct InvoiceRow {
    pub id: i64,
    pub fecha: DateTime<Utc>,
    #[serde(rename = "usuarioId")]
    pub usuario_id: UserId,
    #[serde(deserialize_with = "decimal")]
    pub total_factura: BigDecimal,
    pub numero_factura: String,
}

#[derive(Debug, Serialize)]
pub struct NewInvoiceRow {
    pub fecha: DateTime<Utc>,
    #[serde(rename = "usuarioId")]
    pub usuario_id: UserId,
    pub total_factura: BigDecimal,
    pub numero_factura: String,
}

#[derive(Debug, Deserialize)]
pub struct InvoiceDetailRow {
    pub id: i64,
    pub id_factura: i64,
    pub id_producto: i64,
}

#[derive(Debug, Serialize)]
pub struct NewInvoiceDetailRow {
    pub id_factura: i64,
    pub id_producto: i64,
}

#[derive(Debug, Deserialize)]
pub struct InvoiceWithDetailsRow {
    #[serde(flatten)]
    pub invoice: InvoiceRow,
    #[serde(default)]
    pub detalle_factura: Vec<InvoiceDetailRow>,
}

#[derive(Debug, Deserialize)]
pub struct SellerOrderRow {
    pub id: i64,
    pub estado: String,
    pub id_factura: i64,
}

#[derive(Debug, Serialize)]
pub struct NewSellerOrderRow {
    pub id_factura: i64,
    pub estado: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct JoinedDetailRow {
    pub id: i64,
    pub id_producto: i64,
    pub producto: Option<ProductRow>,
}

#[derive(Debug, Deserialize)]
pub struct JoinedInvoiceRow {
    #[serde(flatten)]
    pub invoice: InvoiceRow,
    pub usuario: Option<CustomerRow>,
    #[serde(default)]
    pub detalle_factura: Vec<JoinedDetailRow>,
}

#[derive(Debug, Deserialize)]
pub struct JoinedSellerOrderRow {
    #[serde(flatten)]
    pub order: SellerOrderRow,
    pub factura: Option<JoinedInvoiceRow>,
}

#[derive(Debug, Serialize)]
pub struct NewReconciliationRow {
    pub id_orden_pago: String,
    pub id_usuario: UserId,
    pub monto: Option<BigDecimal>,
    pub estado: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct ReconciliationRow {
    pub id: i64,
    pub id_orden_pago: String,
}

// ── Row → domain ─────────────────────────────────────────────────────────────

impl From<CartRow> for CartLine {
    fn from(r: CartRow) -> Self {
        CartLine {
            id: r.id,
            product_id: r.id_producto,
            user_id: r.id_usuario,
        }
    }
}

impl From<ProductRow> for Product {
    fn from(r: ProductRow) -> Self {
        Product {
            id: r.id,
            name: r.nombre,
            price: r.precio,
        }
    }
}

impl From<InvoiceRow> for Invoice {
    fn from(r: InvoiceRow) -> Self {
        Invoice {
            id: r.id,
            user_id: r.usuario_id,
            total: r.total_factura,
            invoice_number: r.numero_factura,
            issued_at: r.fecha,
        }
    }
}

impl From<InvoiceDetailRow> for InvoiceDetail {
    fn from(r: InvoiceDetailRow) -> Self {
        InvoiceDetail {
            id: r.id,
            invoice_id: r.id_factura,
            product_id: r.id_producto,
        }
    }
}

impl TryFrom<SellerOrderRow> for SellerOrder {
    type Error = DomainError;

    fn try_from(r: SellerOrderRow) -> Result<Self, Self::Error> {
        let status = r.estado.parse().map_err(|_| {
            DomainError::Store(format!(
                "seller order {} has unknown estado '{}'",
                r.id, r.estado
            ))
        })?;
        Ok(SellerOrder {
            id: r.id,
            invoice_id: r.id_factura,
            status,
        })
    }
}

impl TryFrom<JoinedSellerOrderRow> for SellerOrderView {
    type Error = DomainError;

    fn try_from(r: JoinedSellerOrderRow) -> Result<Self, Self::Error> {
        let order = SellerOrder::try_from(r.order)?;
        let Some(factura) = r.factura else {
            return Ok(SellerOrderView {
                order,
                invoice: None,
                customer: None,
                details: Vec::new(),
            });
        };

        Ok(SellerOrderView {
            order,
            invoice: Some(factura.invoice.into()),
            customer: factura.usuario.map(|u| CustomerSummary {
                id: u.id,
                name: u.nombre,
                email: u.correo,
            }),
            details: factura
                .detalle_factura
                .into_iter()
                .map(|d| InvoiceDetailView {
                    id: d.id,
                    product_id: d.id_producto,
                    product: d.producto.map(Product::from),
                })
                .collect(),
        })
    }
}
