//! Cart repository for database operations.
//!
//! The schema enforces the one-line-per-product invariant with a unique
//! `(cart_id, product_id)` constraint; adding an existing product accumulates
//! quantity through an upsert instead of appending a duplicate line.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use ecostore_core::{CartId, CartItemId, Category, ProductId, UserId};

use super::RepositoryError;
use crate::models::{Cart, CartLine, Product};

/// Raw `cart` row.
#[derive(Debug, sqlx::FromRow)]
struct CartRow {
    id: i32,
    user_id: i32,
    created_at: DateTime<Utc>,
}

impl From<CartRow> for Cart {
    fn from(row: CartRow) -> Self {
        Self {
            id: CartId::new(row.id),
            user_id: UserId::new(row.user_id),
            created_at: row.created_at,
        }
    }
}

/// Cart line joined with its product.
#[derive(Debug, sqlx::FromRow)]
struct CartLineRow {
    item_id: i32,
    quantity: i32,
    product_id: i32,
    name: String,
    description: String,
    price: Decimal,
    category: String,
    stock: i32,
    image_url: Option<String>,
    product_created_at: DateTime<Utc>,
    product_updated_at: DateTime<Utc>,
}

impl TryFrom<CartLineRow> for CartLine {
    type Error = RepositoryError;

    fn try_from(row: CartLineRow) -> Result<Self, Self::Error> {
        let category: Category = row.category.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid category in database: {e}"))
        })?;

        Ok(Self {
            item_id: CartItemId::new(row.item_id),
            quantity: row.quantity,
            product: Product {
                id: ProductId::new(row.product_id),
                name: row.name,
                description: row.description,
                price: row.price,
                category,
                stock: row.stock,
                image_url: row.image_url,
                created_at: row.product_created_at,
                updated_at: row.product_updated_at,
            },
        })
    }
}

const LINE_QUERY: &str = "SELECT ci.id AS item_id, ci.quantity,
            p.id AS product_id, p.name, p.description, p.price, p.category,
            p.stock, p.image_url,
            p.created_at AS product_created_at, p.updated_at AS product_updated_at
     FROM cart_item ci
     JOIN product p ON p.id = ci.product_id";

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the user's cart, creating it if it doesn't exist yet.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn ensure(&self, user_id: UserId) -> Result<Cart, RepositoryError> {
        // ON CONFLICT DO NOTHING + re-select keeps this race-free under
        // concurrent first interactions from the same user.
        sqlx::query("INSERT INTO cart (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
            .bind(user_id.as_i32())
            .execute(self.pool)
            .await?;

        let row = sqlx::query_as::<_, CartRow>(
            "SELECT id, user_id, created_at FROM cart WHERE user_id = $1",
        )
        .bind(user_id.as_i32())
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// All lines of a cart, each joined with its live product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn lines(&self, cart_id: CartId) -> Result<Vec<CartLine>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartLineRow>(&format!(
            "{LINE_QUERY} WHERE ci.cart_id = $1 ORDER BY ci.id"
        ))
        .bind(cart_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(CartLine::try_from).collect()
    }

    /// A single line of a cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn line(
        &self,
        cart_id: CartId,
        item_id: CartItemId,
    ) -> Result<Option<CartLine>, RepositoryError> {
        let row = sqlx::query_as::<_, CartLineRow>(&format!(
            "{LINE_QUERY} WHERE ci.cart_id = $1 AND ci.id = $2"
        ))
        .bind(cart_id.as_i32())
        .bind(item_id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(CartLine::try_from).transpose()
    }

    /// Add a product to the cart, accumulating quantity if already present.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn add_item(
        &self,
        cart_id: CartId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<CartItemId, RepositoryError> {
        let (id,): (i32,) = sqlx::query_as(
            "INSERT INTO cart_item (cart_id, product_id, quantity)
             VALUES ($1, $2, $3)
             ON CONFLICT (cart_id, product_id)
             DO UPDATE SET quantity = cart_item.quantity + EXCLUDED.quantity
             RETURNING id",
        )
        .bind(cart_id.as_i32())
        .bind(product_id.as_i32())
        .bind(quantity)
        .fetch_one(self.pool)
        .await?;

        Ok(CartItemId::new(id))
    }

    /// Set the quantity of a line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line isn't in this cart.
    pub async fn set_quantity(
        &self,
        cart_id: CartId,
        item_id: CartItemId,
        quantity: i32,
    ) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE cart_item SET quantity = $3 WHERE cart_id = $1 AND id = $2")
                .bind(cart_id.as_i32())
                .bind(item_id.as_i32())
                .bind(quantity)
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Remove a line from the cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line isn't in this cart.
    pub async fn remove_item(
        &self,
        cart_id: CartId,
        item_id: CartItemId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM cart_item WHERE cart_id = $1 AND id = $2")
            .bind(cart_id.as_i32())
            .bind(item_id.as_i32())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Remove all lines from the cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear(&self, cart_id: CartId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM cart_item WHERE cart_id = $1")
            .bind(cart_id.as_i32())
            .execute(self.pool)
            .await?;

        Ok(())
    }
}
