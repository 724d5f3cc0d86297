use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Mutex;

use async_trait::async_trait;
use bigdecimal::BigDecimal;

use crate::domain::cart::{CartLine, Product, UserId};
use crate::domain::errors::DomainError;
use crate::domain::order::{
    Invoice, InvoiceDetail, InvoiceDetailView, InvoiceView, NewInvoice, NewInvoiceDetail,
    NewReconciliation, Reconciliation, SellerOrder, SellerOrderStatus, SellerOrderView,
};
use crate::domain::ports::{CartRepository, OrderRepository};

pub fn dec(s: &str) -> BigDecimal {
    BigDecimal::from_str(s).expect("valid decimal")
}

#[derive(Default)]
struct State {
    next_id: i64,
    writes: usize,
    fail_on: HashSet<&'static str>,
    users: Vec<(UserId, String)>,
    products: Vec<Product>,
    cart: Vec<CartLine>,
    invoices: Vec<Invoice>,
    details: Vec<InvoiceDetail>,
    seller_orders: Vec<SellerOrder>,
    reconciliations: Vec<(Reconciliation, bool)>,
}

impl State {
    fn id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn check(&self, op: &'static str) -> Result<(), DomainError> {
        if self.fail_on.contains(op) {
            return Err(DomainError::Store(format!("{} failed", op)));
        }
        Ok(())
    }

    fn write(&mut self, op: &'static str) -> Result<(), DomainError> {
        self.check(op)?;
        self.writes += 1;
        Ok(())
    }
}

/// Store double backing both repository ports.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().expect("store lock poisoned")
    }

    pub fn add_user(&self, id: UserId, auth_id: &str) {
        self.state().users.push((id, auth_id.to_string()));
    }

    pub fn add_product(&self, id: i64, name: &str, price: &str) {
        self.state().products.push(Product {
            id,
            name: name.to_string(),
            price: dec(price),
        });
    }

    /// Seeds one cart row per entry without counting as a write.
    pub fn fill_cart(&self, user_id: UserId, product_ids: &[i64]) {
        let mut state = self.state();
        for &product_id in product_ids {
            let id = state.id();
            state.cart.push(CartLine {
                id,
                product_id,
                user_id,
            });
        }
    }

    pub fn fail_on(&self, op: &'static str) {
        self.state().fail_on.insert(op);
    }

    pub fn write_count(&self) -> usize {
        self.state().writes
    }

    pub fn cart_len(&self, user_id: UserId) -> usize {
        self.state()
            .cart
            .iter()
            .filter(|l| l.user_id == user_id)
            .count()
    }

    pub fn invoices(&self) -> Vec<Invoice> {
        self.state().invoices.clone()
    }

    pub fn details_for(&self, invoice_id: i64) -> Vec<InvoiceDetail> {
        self.state()
            .details
            .iter()
            .filter(|d| d.invoice_id == invoice_id)
            .cloned()
            .collect()
    }

    pub fn seller_orders(&self) -> Vec<SellerOrder> {
        self.state().seller_orders.clone()
    }

    pub fn pending_reconciliations(&self) -> usize {
        self.state()
            .reconciliations
            .iter()
            .filter(|(_, resolved)| !resolved)
            .count()
    }
}

#[async_trait]
impl CartRepository for InMemoryStore {
    async fn find_user_id_by_auth_id(&self, auth_id: &str) -> Result<Option<UserId>, DomainError> {
        let state = self.state();
        state.check("find_user_id_by_auth_id")?;
        Ok(state
            .users
            .iter()
            .find(|(_, a)| a == auth_id)
            .map(|(id, _)| *id))
    }

    async fn find_cart_lines_by_user(&self, user_id: UserId) -> Result<Vec<CartLine>, DomainError> {
        let state = self.state();
        state.check("find_cart_lines_by_user")?;
        Ok(state
            .cart
            .iter()
            .filter(|l| l.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_products_by_ids(&self, ids: &[i64]) -> Result<Vec<Product>, DomainError> {
        let state = self.state();
        state.check("find_products_by_ids")?;
        Ok(state
            .products
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }

    async fn insert_cart_line(
        &self,
        user_id: UserId,
        product_id: i64,
    ) -> Result<CartLine, DomainError> {
        let mut state = self.state();
        state.write("insert_cart_line")?;
        let line = CartLine {
            id: state.id(),
            product_id,
            user_id,
        };
        state.cart.push(line.clone());
        Ok(line)
    }

    async fn delete_cart_line(&self, cart_line_id: i64) -> Result<(), DomainError> {
        let mut state = self.state();
        state.write("delete_cart_line")?;
        state.cart.retain(|l| l.id != cart_line_id);
        Ok(())
    }

    async fn clear_cart(&self, user_id: UserId) -> Result<(), DomainError> {
        let mut state = self.state();
        state.write("clear_cart")?;
        state.cart.retain(|l| l.user_id != user_id);
        Ok(())
    }
}

#[async_trait]
impl OrderRepository for InMemoryStore {
    async fn insert_invoice(&self, invoice: NewInvoice) -> Result<Invoice, DomainError> {
        let mut state = self.state();
        state.write("insert_invoice")?;
        let row = Invoice {
            id: state.id(),
            user_id: invoice.user_id,
            total: invoice.total,
            invoice_number: invoice.invoice_number,
            issued_at: invoice.issued_at,
        };
        state.invoices.push(row.clone());
        Ok(row)
    }

    async fn insert_invoice_details(
        &self,
        details: &[NewInvoiceDetail],
    ) -> Result<Vec<InvoiceDetail>, DomainError> {
        let mut state = self.state();
        state.write("insert_invoice_details")?;
        let mut rows = Vec::with_capacity(details.len());
        for d in details {
            let row = InvoiceDetail {
                id: state.id(),
                invoice_id: d.invoice_id,
                product_id: d.product_id,
            };
            state.details.push(row.clone());
            rows.push(row);
        }
        Ok(rows)
    }

    async fn insert_seller_order(
        &self,
        invoice_id: i64,
        status: SellerOrderStatus,
    ) -> Result<SellerOrder, DomainError> {
        let mut state = self.state();
        state.write("insert_seller_order")?;
        let row = SellerOrder {
            id: state.id(),
            invoice_id,
            status,
        };
        state.seller_orders.push(row.clone());
        Ok(row)
    }

    async fn update_seller_order_status(
        &self,
        order_id: i64,
        status: SellerOrderStatus,
    ) -> Result<Option<SellerOrder>, DomainError> {
        let mut state = self.state();
        state.write("update_seller_order_status")?;
        Ok(state
            .seller_orders
            .iter_mut()
            .find(|o| o.id == order_id)
            .map(|o| {
                o.status = status;
                o.clone()
            }))
    }

    async fn list_seller_orders(&self) -> Result<Vec<SellerOrderView>, DomainError> {
        let state = self.state();
        state.check("list_seller_orders")?;
        Ok(state
            .seller_orders
            .iter()
            .map(|o| SellerOrderView {
                order: o.clone(),
                invoice: state.invoices.iter().find(|i| i.id == o.invoice_id).cloned(),
                customer: None,
                details: state
                    .details
                    .iter()
                    .filter(|d| d.invoice_id == o.invoice_id)
                    .map(|d| InvoiceDetailView {
                        id: d.id,
                        product_id: d.product_id,
                        product: state.products.iter().find(|p| p.id == d.product_id).cloned(),
                    })
                    .collect(),
            })
            .collect())
    }

    async fn find_invoice_by_id(&self, id: i64) -> Result<Option<InvoiceView>, DomainError> {
        let state = self.state();
        state.check("find_invoice_by_id")?;
        Ok(state
            .invoices
            .iter()
            .find(|i| i.id == id)
            .map(|invoice| InvoiceView {
                invoice: invoice.clone(),
                details: state
                    .details
                    .iter()
                    .filter(|d| d.invoice_id == id)
                    .cloned()
                    .collect(),
            }))
    }

    async fn find_invoices_by_number(&self, fragment: &str) -> Result<Vec<Invoice>, DomainError> {
        let state = self.state();
        state.check("find_invoices_by_number")?;
        let needle = fragment.to_lowercase();
        Ok(state
            .invoices
            .iter()
            .filter(|i| i.invoice_number.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn insert_reconciliation(
        &self,
        record: NewReconciliation,
    ) -> Result<Reconciliation, DomainError> {
        let mut state = self.state();
        state.write("insert_reconciliation")?;
        let row = Reconciliation {
            id: state.id(),
            provider_order_id: record.provider_order_id,
        };
        state.reconciliations.push((row.clone(), false));
        Ok(row)
    }

    async fn resolve_reconciliation(
        &self,
        id: i64,
        _invoice_number: &str,
    ) -> Result<(), DomainError> {
        let mut state = self.state();
        state.write("resolve_reconciliation")?;
        if let Some((_, resolved)) = state.reconciliations.iter_mut().find(|(r, _)| r.id == id) {
            *resolved = true;
        }
        Ok(())
    }
}
