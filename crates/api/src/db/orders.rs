//! Order repository for database operations.
//!
//! Settlement is the one multi-row write in the system and runs in a single
//! transaction: the order row is locked, each line's stock is decremented
//! conditionally, the order flips to `paid`, and the cart is emptied. If any
//! line cannot be covered by current stock the whole transaction rolls back.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use ecostore_core::{CartTotals, OrderId, ProductId, UserId};

use super::RepositoryError;
use crate::models::{Order, OrderLine, OrderStatus};

/// Raw `store_order` row.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i32,
    user_id: i32,
    session_id: String,
    subtotal: Decimal,
    tax: Decimal,
    total: Decimal,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status: OrderStatus = row.status.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid status in database: {e}"))
        })?;

        Ok(Self {
            id: OrderId::new(row.id),
            user_id: UserId::new(row.user_id),
            session_id: row.session_id,
            subtotal: row.subtotal,
            tax: row.tax,
            total: row.total,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Raw `order_line` row.
#[derive(Debug, sqlx::FromRow)]
struct OrderLineRow {
    product_id: i32,
    product_name: String,
    unit_price: Decimal,
    quantity: i32,
}

impl From<OrderLineRow> for OrderLine {
    fn from(row: OrderLineRow) -> Self {
        Self {
            product_id: ProductId::new(row.product_id),
            product_name: row.product_name,
            unit_price: row.unit_price,
            quantity: row.quantity,
        }
    }
}

const ORDER_COLUMNS: &str =
    "id, user_id, session_id, subtotal, tax, total, status, created_at, updated_at";

/// Outcome of a settlement attempt.
#[derive(Debug)]
pub enum SettleOutcome {
    /// Stock was decremented, the order marked paid, and the cart cleared.
    Completed(Order),
    /// The order was already paid; nothing was changed.
    AlreadyPaid(Order),
    /// One or more products no longer had enough stock. Nothing was changed.
    InsufficientStock(Vec<String>),
    /// The order exists but is canceled or failed.
    NotPending(OrderStatus),
    /// No order with this session id belongs to this user.
    NotFound,
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record a pending order for a freshly created checkout session.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the session id was already
    /// recorded, `RepositoryError::Database` otherwise.
    pub async fn create_pending(
        &self,
        user_id: UserId,
        session_id: &str,
        totals: &CartTotals,
        lines: &[OrderLine],
    ) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "INSERT INTO store_order (user_id, session_id, subtotal, tax, total, status)
             VALUES ($1, $2, $3, $4, $5, 'pending')
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(user_id.as_i32())
        .bind(session_id)
        .bind(totals.subtotal)
        .bind(totals.tax)
        .bind(totals.total)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("session already recorded".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        for line in lines {
            sqlx::query(
                "INSERT INTO order_line (order_id, product_id, product_name, unit_price, quantity)
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(row.id)
            .bind(line.product_id.as_i32())
            .bind(&line.product_name)
            .bind(line.unit_price)
            .bind(line.quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Order::try_from(row)
    }

    /// The user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn history(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM store_order WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Order::try_from).collect()
    }

    /// Lines of an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn lines(&self, order_id: OrderId) -> Result<Vec<OrderLine>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderLineRow>(
            "SELECT product_id, product_name, unit_price, quantity
             FROM order_line WHERE order_id = $1 ORDER BY id",
        )
        .bind(order_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(OrderLine::from).collect())
    }

    /// Settle a paid checkout session.
    ///
    /// Idempotent: the order row is locked `FOR UPDATE`, so a concurrent
    /// duplicate confirmation blocks and then observes `paid`, returning
    /// [`SettleOutcome::AlreadyPaid`] without touching stock. Stock is
    /// decremented with a `stock >= quantity` guard; losing a race for the
    /// last units rolls everything back and reports the affected products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any query fails.
    pub async fn settle(
        &self,
        user_id: UserId,
        session_id: &str,
    ) -> Result<SettleOutcome, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let Some(row) = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM store_order
             WHERE user_id = $1 AND session_id = $2
             FOR UPDATE"
        ))
        .bind(user_id.as_i32())
        .bind(session_id)
        .fetch_optional(&mut *tx)
        .await?
        else {
            return Ok(SettleOutcome::NotFound);
        };

        let order = Order::try_from(row)?;
        match order.status {
            OrderStatus::Paid => return Ok(SettleOutcome::AlreadyPaid(order)),
            OrderStatus::Canceled | OrderStatus::Failed => {
                return Ok(SettleOutcome::NotPending(order.status));
            }
            OrderStatus::Pending => {}
        }

        let lines = sqlx::query_as::<_, OrderLineRow>(
            "SELECT product_id, product_name, unit_price, quantity
             FROM order_line WHERE order_id = $1 ORDER BY id",
        )
        .bind(order.id.as_i32())
        .fetch_all(&mut *tx)
        .await?;

        let mut exhausted = Vec::new();
        for line in &lines {
            let result = sqlx::query(
                "UPDATE product SET stock = stock - $2, updated_at = now()
                 WHERE id = $1 AND stock >= $2",
            )
            .bind(line.product_id)
            .bind(line.quantity)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                exhausted.push(line.product_name.clone());
            }
        }

        if !exhausted.is_empty() {
            tx.rollback().await?;
            return Ok(SettleOutcome::InsufficientStock(exhausted));
        }

        let paid = sqlx::query_as::<_, OrderRow>(&format!(
            "UPDATE store_order SET status = 'paid', updated_at = now()
             WHERE id = $1
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(order.id.as_i32())
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "DELETE FROM cart_item
             USING cart
             WHERE cart_item.cart_id = cart.id AND cart.user_id = $1",
        )
        .bind(user_id.as_i32())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(SettleOutcome::Completed(Order::try_from(paid)?))
    }

    /// Mark a pending order canceled.
    ///
    /// Returns `true` if a pending order was found and canceled. Already
    /// settled or canceled orders are left untouched.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn cancel(
        &self,
        user_id: UserId,
        session_id: &str,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE store_order SET status = 'canceled', updated_at = now()
             WHERE user_id = $1 AND session_id = $2 AND status = 'pending'",
        )
        .bind(user_id.as_i32())
        .bind(session_id)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
