use async_trait::async_trait;
use serde_json::json;

use crate::domain::cart::{CartLine, Product, UserId};
use crate::domain::errors::DomainError;
use crate::domain::order::{
    is_provider_reference, Invoice, InvoiceDetail, InvoiceView, NewInvoice, NewInvoiceDetail,
    NewReconciliation, Reconciliation, SellerOrder, SellerOrderStatus, SellerOrderView,
};
use crate::domain::ports::{CartRepository, OrderRepository};

use super::models::{
    CartRow, IdRow, InvoiceDetailRow, InvoiceRow, InvoiceWithDetailsRow, JoinedSellerOrderRow,
    NewCartRow, NewInvoiceDetailRow, NewInvoiceRow, NewReconciliationRow, NewSellerOrderRow,
    ProductRow, ReconciliationRow, SellerOrderRow,
};
use super::supabase::SupabaseClient;

const USERS: &str = "usuario";
const PRODUCTS: &str = "producto";
const CART: &str = "carrito";
const INVOICES: &str = "factura";
const INVOICE_DETAILS: &str = "detalle_factura";
const SELLER_ORDERS: &str = "orden_vendedor";
const RECONCILIATIONS: &str = "conciliacion_pago";

const INVOICE_COLUMNS: &str = "id,fecha,usuarioId,total_factura,numero_factura";
const SELLER_ORDER_WITH_DETAILS: &str = "id,estado,id_factura,\
    factura(id,fecha,usuarioId,total_factura,numero_factura,\
    usuario(id,nombre,correo),\
    detalle_factura(id,id_factura,id_producto,producto(id,nombre,precio)))";

/// Repository over the hosted PostgREST tables.
#[derive(Debug, Clone)]
pub struct SupabaseStore {
    client: SupabaseClient,
}

impl SupabaseStore {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }
}

fn single<T>(rows: Vec<T>, what: &str) -> Result<T, DomainError> {
    rows.into_iter()
        .next()
        .ok_or_else(|| DomainError::Store(format!("{} returned no rows", what)))
}

#[async_trait]
impl CartRepository for SupabaseStore {
    async fn find_user_id_by_auth_id(&self, auth_id: &str) -> Result<Option<UserId>, DomainError> {
        let rows: Vec<IdRow> = self
            .client
            .from(USERS)
            .eq("auth_id", auth_id)
            .select("id")
            .await?;
        Ok(rows.into_iter().next().map(|r| r.id))
    }

    async fn find_cart_lines_by_user(&self, user_id: UserId) -> Result<Vec<CartLine>, DomainError> {
        let rows: Vec<CartRow> = self
            .client
            .from(CART)
            .eq("id_usuario", user_id)
            .select("id,id_producto,id_usuario")
            .await?;
        Ok(rows.into_iter().map(CartLine::from).collect())
    }

    async fn find_products_by_ids(&self, ids: &[i64]) -> Result<Vec<Product>, DomainError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows: Vec<ProductRow> = self
            .client
            .from(PRODUCTS)
            .in_list("id", ids)
            .select("id,nombre,precio")
            .await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn insert_cart_line(
        &self,
        user_id: UserId,
        product_id: i64,
    ) -> Result<CartLine, DomainError> {
        let rows: Vec<CartRow> = self
            .client
            .from(CART)
            .insert(&[NewCartRow {
                id_producto: product_id,
                id_usuario: user_id,
            }])
            .await?;
        single(rows, "cart insert").map(CartLine::from)
    }

    async fn delete_cart_line(&self, cart_line_id: i64) -> Result<(), DomainError> {
        self.client
            .from(CART)
            .eq("id", cart_line_id)
            .delete()
            .await?;
        Ok(())
    }

    async fn clear_cart(&self, user_id: UserId) -> Result<(), DomainError> {
        self.client
            .from(CART)
            .eq("id_usuario", user_id)
            .delete()
            .await?;
        Ok(())
    }
}

#[async_trait]
impl OrderRepository for SupabaseStore {
    async fn insert_invoice(&self, invoice: NewInvoice) -> Result<Invoice, DomainError> {
        let rows: Vec<InvoiceRow> = self
            .client
            .from(INVOICES)
            .insert(&[NewInvoiceRow {
                fecha: invoice.issued_at,
                usuario_id: invoice.user_id,
                total_factura: invoice.total,
                numero_factura: invoice.invoice_number,
            }])
            .await?;
        single(rows, "invoice insert").map(Invoice::from)
    }

    async fn insert_invoice_details(
        &self,
        details: &[NewInvoiceDetail],
    ) -> Result<Vec<InvoiceDetail>, DomainError> {
        let payload: Vec<NewInvoiceDetailRow> = details
            .iter()
            .map(|d| NewInvoiceDetailRow {
                id_factura: d.invoice_id,
                id_producto: d.product_id,
            })
            .collect();
        let rows: Vec<InvoiceDetailRow> = self
            .client
            .from(INVOICE_DETAILS)
            .insert(&payload)
            .await?;
        Ok(rows.into_iter().map(InvoiceDetail::from).collect())
    }

    async fn insert_seller_order(
        &self,
        invoice_id: i64,
        status: SellerOrderStatus,
    ) -> Result<SellerOrder, DomainError> {
        let rows: Vec<SellerOrderRow> = self
            .client
            .from(SELLER_ORDERS)
            .insert(&[NewSellerOrderRow {
                id_factura: invoice_id,
                estado: status.as_str(),
            }])
            .await?;
        SellerOrder::try_from(single(rows, "seller order insert")?)
    }

    async fn update_seller_order_status(
        &self,
        order_id: i64,
        status: SellerOrderStatus,
    ) -> Result<Option<SellerOrder>, DomainError> {
        let rows: Vec<SellerOrderRow> = self
            .client
            .from(SELLER_ORDERS)
            .eq("id", order_id)
            .update(&json!({ "estado": status.as_str() }))
            .await?;
        rows.into_iter().next().map(SellerOrder::try_from).transpose()
    }

    async fn list_seller_orders(&self) -> Result<Vec<SellerOrderView>, DomainError> {
        let rows: Vec<JoinedSellerOrderRow> = self
            .client
            .from(SELLER_ORDERS)
            .select(SELLER_ORDER_WITH_DETAILS)
            .await?;
        rows.into_iter().map(SellerOrderView::try_from).collect()
    }

    async fn find_invoice_by_id(&self, id: i64) -> Result<Option<InvoiceView>, DomainError> {
        let rows: Vec<InvoiceWithDetailsRow> = self
            .client
            .from(INVOICES)
            .eq("id", id)
            .select(&format!(
                "{},detalle_factura(id,id_factura,id_producto)",
                INVOICE_COLUMNS
            ))
            .await?;
        Ok(rows.into_iter().next().map(|r| InvoiceView {
            invoice: r.invoice.into(),
            details: r.detalle_factura.into_iter().map(InvoiceDetail::from).collect(),
        }))
    }

    async fn find_invoices_by_number(&self, fragment: &str) -> Result<Vec<Invoice>, DomainError> {
        // `*` and `%` are pattern wildcards for PostgREST `ilike`.
        if !is_provider_reference(fragment) {
            return Err(DomainError::InvalidArgument(format!(
                "invalid invoice search term '{}'",
                fragment
            )));
        }
        let rows: Vec<InvoiceRow> = self
            .client
            .from(INVOICES)
            .ilike("numero_factura", &format!("*{}*", fragment))
            .select(INVOICE_COLUMNS)
            .await?;
        Ok(rows.into_iter().map(Invoice::from).collect())
    }

    async fn insert_reconciliation(
        &self,
        record: NewReconciliation,
    ) -> Result<Reconciliation, DomainError> {
        let rows: Vec<ReconciliationRow> = self
            .client
            .from(RECONCILIATIONS)
            .insert(&[NewReconciliationRow {
                id_orden_pago: record.provider_order_id,
                id_usuario: record.user_id,
                monto: record.amount,
                estado: "pendiente",
            }])
            .await?;
        let row = single(rows, "reconciliation insert")?;
        Ok(Reconciliation {
            id: row.id,
            provider_order_id: row.id_orden_pago,
        })
    }

    async fn resolve_reconciliation(
        &self,
        id: i64,
        invoice_number: &str,
    ) -> Result<(), DomainError> {
        let _: Vec<IdRow> = self
            .client
            .from(RECONCILIATIONS)
            .eq("id", id)
            .update(&json!({ "estado": "resuelto", "detalle": invoice_number }))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::infrastructure::supabase::SupabaseConfig;

    fn store(server: &MockServer) -> SupabaseStore {
        SupabaseStore::new(SupabaseClient::new(SupabaseConfig {
            url: server.uri(),
            service_role_key: "key".to_string(),
        }))
    }

    #[tokio::test]
    async fn unknown_auth_id_resolves_to_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/usuario"))
            .and(query_param("auth_id", "eq.abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let found = store(&server).find_user_id_by_auth_id("abc").await.unwrap();

        assert_eq!(found, None);
    }

    #[tokio::test]
    async fn products_are_fetched_with_in_filter() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/producto"))
            .and(query_param("id", "in.(1,2)"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": 1, "nombre": "Empanada", "precio": 10 },
                { "id": 2, "nombre": "Arepa", "precio": 15.5 }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let products = store(&server).find_products_by_ids(&[1, 2]).await.unwrap();

        assert_eq!(products.len(), 2);
        assert_eq!(products[1].price.to_string(), "15.5");
    }

    #[tokio::test]
    async fn empty_product_lookup_skips_the_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let products = store(&server).find_products_by_ids(&[]).await.unwrap();

        assert!(products.is_empty());
    }

    #[tokio::test]
    async fn details_are_inserted_in_one_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/detalle_factura"))
            .and(body_json(json!([
                { "id_factura": 4, "id_producto": 1 },
                { "id_factura": 4, "id_producto": 1 }
            ])))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!([
                { "id": 1, "id_factura": 4, "id_producto": 1 },
                { "id": 2, "id_factura": 4, "id_producto": 1 }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let rows = store(&server)
            .insert_invoice_details(&[
                NewInvoiceDetail {
                    invoice_id: 4,
                    product_id: 1,
                },
                NewInvoiceDetail {
                    invoice_id: 4,
                    product_id: 1,
                },
            ])
            .await
            .unwrap();

        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn invoice_header_uses_store_column_names() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/factura"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!([{
                "id": 11,
                "fecha": "2024-05-01T12:00:00+00:00",
                "usuarioId": 7,
                "total_factura": 38.5,
                "numero_factura": "FAC-PAY-1-1"
            }])))
            .mount(&server)
            .await;

        let invoice = store(&server)
            .insert_invoice(NewInvoice {
                user_id: 7,
                total: "38.50".parse().unwrap(),
                invoice_number: "FAC-PAY-1-1".to_string(),
                issued_at: "2024-05-01T12:00:00Z".parse().unwrap(),
            })
            .await
            .unwrap();

        assert_eq!(invoice.id, 11);
        assert_eq!(invoice.user_id, 7);

        let requests = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body[0]["usuarioId"], 7);
        assert_eq!(body[0]["total_factura"], "38.50");
    }

    #[tokio::test]
    async fn status_update_without_match_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/rest/v1/orden_vendedor"))
            .and(query_param("id", "eq.99"))
            .and(body_json(json!({ "estado": "listo" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let updated = store(&server)
            .update_seller_order_status(99, SellerOrderStatus::Ready)
            .await
            .unwrap();

        assert!(updated.is_none());
    }

    #[tokio::test]
    async fn invoice_search_uses_ilike() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/factura"))
            .and(query_param("numero_factura", "ilike.*PAY-1*"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let found = store(&server).find_invoices_by_number("PAY-1").await.unwrap();

        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn invoice_search_never_sends_wildcards() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/factura"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(0)
            .mount(&server)
            .await;

        for fragment in ["*", "%", "PAY*", "a%b", "a,b"] {
            let err = store(&server)
                .find_invoices_by_number(fragment)
                .await
                .unwrap_err();
            assert!(matches!(err, DomainError::InvalidArgument(_)), "accepted {:?}", fragment);
        }
    }

    #[tokio::test]
    async fn store_failure_maps_to_store_error() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/rest/v1/carrito"))
            .respond_with(
                ResponseTemplate::new(503).set_body_json(json!({ "message": "unavailable" })),
            )
            .mount(&server)
            .await;

        let err = store(&server).clear_cart(7).await.unwrap_err();

        assert!(matches!(err, DomainError::Store(msg) if msg.contains("unavailable")));
    }
}
