use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::domain::cart::{CartLine, LineItem, Product, UserId};
use crate::domain::errors::DomainError;
use crate::domain::ports::CartRepository;

/// Groups per-unit cart lines into one line item per product, in product id
/// order. Fails with `EmptyCart` when there is nothing to group.
pub fn aggregate_to_line_items(
    lines: &[CartLine],
    catalog: &HashMap<i64, Product>,
) -> Result<Vec<LineItem>, DomainError> {
    let mut quantities: BTreeMap<i64, u32> = BTreeMap::new();
    for line in lines {
        *quantities.entry(line.product_id).or_insert(0) += 1;
    }

    if quantities.is_empty() {
        return Err(DomainError::EmptyCart);
    }

    quantities
        .into_iter()
        .map(|(product_id, quantity)| {
            let product = catalog
                .get(&product_id)
                .ok_or_else(|| DomainError::NotFound(format!("product {}", product_id)))?;
            Ok(LineItem {
                product_id,
                name: product.name.clone(),
                unit_price: product.price.clone(),
                quantity,
            })
        })
        .collect()
}

#[derive(Clone)]
pub struct CartService {
    repo: Arc<dyn CartRepository>,
}

impl CartService {
    pub fn new(repo: Arc<dyn CartRepository>) -> Self {
        Self { repo }
    }

    pub async fn resolve_internal_user_id(&self, auth_id: &str) -> Result<UserId, DomainError> {
        if auth_id.trim().is_empty() {
            return Err(DomainError::InvalidArgument("authId is required".to_string()));
        }
        self.repo
            .find_user_id_by_auth_id(auth_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("user with auth id {}", auth_id)))
    }

    pub async fn get_cart_lines(&self, user_id: UserId) -> Result<Vec<CartLine>, DomainError> {
        self.repo.find_cart_lines_by_user(user_id).await
    }

    /// Reads the cart and resolves every product in it.
    pub async fn line_items(&self, user_id: UserId) -> Result<Vec<LineItem>, DomainError> {
        let lines = self.get_cart_lines(user_id).await?;
        if lines.is_empty() {
            return Err(DomainError::EmptyCart);
        }

        let mut ids: Vec<i64> = lines.iter().map(|l| l.product_id).collect();
        ids.sort_unstable();
        ids.dedup();

        let catalog: HashMap<i64, Product> = self
            .repo
            .find_products_by_ids(&ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        aggregate_to_line_items(&lines, &catalog)
    }

    pub async fn add_item(&self, auth_id: &str, product_id: i64) -> Result<CartLine, DomainError> {
        if product_id <= 0 {
            return Err(DomainError::InvalidArgument(
                "productId must be a positive integer".to_string(),
            ));
        }
        let user_id = self.resolve_internal_user_id(auth_id).await?;
        self.repo.insert_cart_line(user_id, product_id).await
    }

    pub async fn remove_line(&self, cart_line_id: i64) -> Result<(), DomainError> {
        self.repo.delete_cart_line(cart_line_id).await
    }

    /// Deletes every cart line of the user. Clearing an empty cart is a no-op.
    pub async fn clear_cart(&self, user_id: UserId) -> Result<(), DomainError> {
        self.repo.clear_cart(user_id).await
    }
}
