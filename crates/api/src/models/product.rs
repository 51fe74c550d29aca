//! Product domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use ecostore_core::{Category, ProductId, limits};

/// A catalog product (domain type).
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Long-form description.
    pub description: String,
    /// Unit price in the store currency.
    pub price: Decimal,
    /// Canonical category.
    pub category: Category,
    /// Units on hand. Never negative.
    pub stock: i32,
    /// Optional image URL.
    pub image_url: Option<String>,
    /// When the product was created.
    pub created_at: DateTime<Utc>,
    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Whether the product has no units left.
    #[must_use]
    pub const fn is_out_of_stock(&self) -> bool {
        self.stock == 0
    }

    /// Whether the product is running low (but not out).
    #[must_use]
    pub const fn is_low_stock(&self) -> bool {
        self.stock > 0 && self.stock <= limits::LOW_STOCK_THRESHOLD
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::dec;

    fn product(stock: i32) -> Product {
        Product {
            id: ProductId::new(1),
            name: "Bamboo Cup".to_string(),
            description: "A cup".to_string(),
            price: dec!(4.99),
            category: Category::BambooProducts,
            stock,
            image_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_out_of_stock_flag() {
        assert!(product(0).is_out_of_stock());
        assert!(!product(1).is_out_of_stock());
    }

    #[test]
    fn test_low_stock_flag() {
        assert!(!product(0).is_low_stock());
        assert!(product(1).is_low_stock());
        assert!(product(10).is_low_stock());
        assert!(!product(11).is_low_stock());
    }
}
