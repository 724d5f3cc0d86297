use bigdecimal::BigDecimal;

/// Internal numeric user id used by every relational record.
pub type UserId = i64;

/// One unit of a product in a user's cart. Duplicate rows are duplicate units.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub id: i64,
    pub product_id: i64,
    pub user_id: UserId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: BigDecimal,
}

/// Cart lines grouped by product. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub product_id: i64,
    pub name: String,
    pub unit_price: BigDecimal,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriceBreakdown {
    pub item_total: BigDecimal,
    pub tax_total: BigDecimal,
    pub shipping: BigDecimal,
    pub grand_total: BigDecimal,
}

impl PriceBreakdown {
    /// Breakdown of an empty cart. No shipping is charged for nothing.
    pub fn zero() -> Self {
        let zero = BigDecimal::new(0.into(), 2);
        Self {
            item_total: zero.clone(),
            tax_total: zero.clone(),
            shipping: zero.clone(),
            grand_total: zero,
        }
    }
}
