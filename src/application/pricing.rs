//! Order totals.
//!
//! Every amount is a 2-decimal `BigDecimal`. Tax is 10% of the item total and
//! shipping is a flat fee waived from `FREE_SHIPPING_THRESHOLD` upwards.

use bigdecimal::{BigDecimal, RoundingMode};

use crate::domain::cart::{LineItem, PriceBreakdown};

fn cents(value: i64) -> BigDecimal {
    BigDecimal::new(value.into(), 2)
}

pub fn tax_rate() -> BigDecimal {
    cents(10)
}

pub fn free_shipping_threshold() -> BigDecimal {
    cents(3000)
}

pub fn shipping_fee() -> BigDecimal {
    cents(499)
}

/// Round half-up to 2 fractional digits.
pub fn round2(value: &BigDecimal) -> BigDecimal {
    value.with_scale_round(2, RoundingMode::HalfUp)
}

/// Fixed two-decimal rendering used for every amount on the wire, e.g.
/// `"0.00"` rather than `"0"`.
pub fn amount_string(value: &BigDecimal) -> String {
    format!("{:.2}", round2(value))
}

/// Unit prices are rounded before summing so the item total always equals
/// the sum of the per-unit amounts sent to the payment provider.
pub fn compute_breakdown(items: &[LineItem]) -> PriceBreakdown {
    let item_total = round2(
        &items
            .iter()
            .map(|item| round2(&item.unit_price) * BigDecimal::from(item.quantity))
            .sum::<BigDecimal>(),
    );
    let tax_total = round2(&(&item_total * tax_rate()));
    let shipping = if item_total >= free_shipping_threshold() {
        cents(0)
    } else {
        shipping_fee()
    };
    let grand_total = round2(&(&item_total + &tax_total + &shipping));

    PriceBreakdown {
        item_total,
        tax_total,
        shipping,
        grand_total,
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn item(product_id: i64, price: &str, quantity: u32) -> LineItem {
        LineItem {
            product_id,
            name: format!("product-{}", product_id),
            unit_price: BigDecimal::from_str(price).unwrap(),
            quantity,
        }
    }

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn free_shipping_at_or_above_threshold() {
        let b = compute_breakdown(&[item(1, "10.00", 2), item(2, "15.00", 1)]);

        assert_eq!(b.item_total, dec("35.00"));
        assert_eq!(b.tax_total, dec("3.50"));
        assert_eq!(b.shipping, dec("0.00"));
        assert_eq!(b.grand_total, dec("38.50"));
    }

    #[test]
    fn flat_shipping_below_threshold() {
        let b = compute_breakdown(&[item(3, "5.00", 1)]);

        assert_eq!(b.item_total, dec("5.00"));
        assert_eq!(b.tax_total, dec("0.50"));
        assert_eq!(b.shipping, dec("4.99"));
        assert_eq!(b.grand_total, dec("10.49"));
    }

    #[test]
    fn exactly_thirty_ships_free() {
        let b = compute_breakdown(&[item(1, "30", 1)]);

        assert_eq!(b.shipping, dec("0"));
        assert_eq!(b.grand_total, dec("33.00"));
    }

    #[test]
    fn tax_rounds_half_up() {
        // 0.10 * 1.25 = 0.125
        let b = compute_breakdown(&[item(1, "1.25", 1)]);

        assert_eq!(b.tax_total, dec("0.13"));
        assert_eq!(b.grand_total, dec("6.37"));
    }

    #[test]
    fn amounts_always_carry_two_decimals() {
        let b = compute_breakdown(&[item(1, "3", 4)]);

        assert_eq!(amount_string(&b.item_total), "12.00");
        assert_eq!(amount_string(&b.tax_total), "1.20");
        assert_eq!(amount_string(&b.shipping), "4.99");
        assert_eq!(amount_string(&b.grand_total), "18.19");
    }

    #[test]
    fn zero_renders_with_two_decimals() {
        let b = compute_breakdown(&[item(1, "10.00", 2), item(2, "15.00", 1)]);

        assert_eq!(amount_string(&b.shipping), "0.00");
        assert_eq!(amount_string(&cents(0)), "0.00");
        assert_eq!(amount_string(&dec("0")), "0.00");
        assert_eq!(amount_string(&dec("7")), "7.00");
        assert_eq!(amount_string(&dec("38.5")), "38.50");
        assert_eq!(amount_string(&dec("1.005")), "1.01");
    }

    #[test]
    fn item_total_is_sum_of_rounded_unit_prices() {
        // 4.995 rounds to 5.00 per unit; the unrounded sum would be 14.985 -> 14.99.
        let b = compute_breakdown(&[item(1, "4.995", 3)]);

        assert_eq!(amount_string(&b.item_total), "15.00");
        assert_eq!(amount_string(&b.tax_total), "1.50");
        assert_eq!(amount_string(&b.shipping), "4.99");
        assert_eq!(amount_string(&b.grand_total), "21.49");
    }

    #[test]
    fn empty_input_only_charges_shipping() {
        let b = compute_breakdown(&[]);

        assert_eq!(b.item_total, dec("0"));
        assert_eq!(b.tax_total, dec("0"));
        assert_eq!(b.shipping, dec("4.99"));
    }
}
