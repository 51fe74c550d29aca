//! Cart domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use ecostore_core::{CartId, CartItemId, UserId, line_total};

use super::product::Product;

/// A user's cart (domain type).
///
/// Created lazily on first authenticated cart interaction; exactly one per
/// user, always resolved from the authenticated identity.
#[derive(Debug, Clone)]
pub struct Cart {
    /// Unique cart ID.
    pub id: CartId,
    /// Owning user.
    pub user_id: UserId,
    /// When the cart was created.
    pub created_at: DateTime<Utc>,
}

/// A cart line joined with its live product.
///
/// The product is re-read on every computation; no price is captured at
/// add time.
#[derive(Debug, Clone)]
pub struct CartLine {
    /// Line ID.
    pub item_id: CartItemId,
    /// The referenced product, as currently stored.
    pub product: Product,
    /// Units of the product in the cart. At least 1.
    pub quantity: i32,
}

impl CartLine {
    /// Live price of this line.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        line_total(self.product.price, self.quantity)
    }

    /// Units requested beyond what is currently in stock, if any.
    #[must_use]
    pub const fn shortfall(&self) -> Option<i32> {
        if self.quantity > self.product.stock {
            Some(self.quantity - self.product.stock)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecostore_core::{Category, ProductId};
    use rust_decimal::dec;

    fn line(price: Decimal, stock: i32, quantity: i32) -> CartLine {
        CartLine {
            item_id: CartItemId::new(1),
            product: Product {
                id: ProductId::new(1),
                name: "Solar Charger".to_string(),
                description: "Charges".to_string(),
                price,
                category: Category::SolarProducts,
                stock,
                image_url: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            quantity,
        }
    }

    #[test]
    fn test_line_total_uses_live_price() {
        assert_eq!(line(dec!(10.00), 5, 2).line_total(), dec!(20.00));
    }

    #[test]
    fn test_shortfall() {
        assert_eq!(line(dec!(1.00), 5, 2).shortfall(), None);
        assert_eq!(line(dec!(1.00), 1, 3).shortfall(), Some(2));
        assert_eq!(line(dec!(1.00), 0, 1).shortfall(), Some(1));
    }
}
