//! Checkout workflow over the cart, order, and Stripe layers.
//!
//! A checkout starts from the caller's cart: totals are computed from live
//! product prices, a hosted Stripe session is created, and a pending order
//! snapshot is recorded under the session id. Confirmation verifies payment
//! with Stripe and settles the order exactly once.

use rust_decimal::Decimal;
use sqlx::PgPool;
use thiserror::Error;

use ecostore_core::{CartTotals, OrderId, UserId, totals_from_lines};

use crate::db::RepositoryError;
use crate::db::carts::CartRepository;
use crate::db::orders::{OrderRepository, SettleOutcome};
use crate::models::{CartLine, Order, OrderLine};
use crate::services::stripe::{ChargeLine, StripeClient, StripeError};

/// Errors from the checkout workflow.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The cart has no items to check out.
    #[error("Cart is empty")]
    EmptyCart,

    /// One or more products ran out of stock before settlement.
    #[error("Insufficient stock for: {}", .0.join(", "))]
    StockExhausted(Vec<String>),

    /// No confirmable order matches this session id for this user.
    #[error("Checkout session not found")]
    SessionNotFound,

    /// Stripe reports the session as not paid yet.
    #[error("Payment has not been completed")]
    PaymentIncomplete,

    /// Repository failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Stripe API failure.
    #[error(transparent)]
    Stripe(#[from] StripeError),
}

/// A started checkout session.
#[derive(Debug)]
pub struct CheckoutStart {
    /// Hosted payment page to redirect the buyer to.
    pub url: String,
    /// Stripe session id, used later for confirm/cancel/verify.
    pub session_id: String,
    /// Totals snapshot recorded on the pending order.
    pub totals: CartTotals,
    /// Non-fatal stock warnings; settlement re-checks stock regardless.
    pub warnings: Vec<String>,
}

/// Result of confirming a paid session.
#[derive(Debug)]
pub struct Settlement {
    pub order: Order,
    /// True when a previous confirmation already settled this session.
    pub already_paid: bool,
}

/// An order together with its line snapshot.
#[derive(Debug)]
pub struct OrderDetails {
    pub order: Order,
    pub lines: Vec<OrderLine>,
}

/// Checkout service.
pub struct CheckoutService<'a> {
    carts: CartRepository<'a>,
    orders: OrderRepository<'a>,
    stripe: &'a StripeClient,
    client_url: &'a str,
}

impl<'a> CheckoutService<'a> {
    /// Create a new checkout service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, stripe: &'a StripeClient, client_url: &'a str) -> Self {
        Self {
            carts: CartRepository::new(pool),
            orders: OrderRepository::new(pool),
            stripe,
            client_url,
        }
    }

    /// Start a checkout for the caller's cart.
    ///
    /// Fails fast on an empty cart, before any Stripe call. Stock shortfalls
    /// are reported as warnings only; they become hard failures at
    /// confirmation time if still unresolved.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart` for an empty cart, and Stripe or
    /// repository errors otherwise.
    pub async fn create_session(&self, user_id: UserId) -> Result<CheckoutStart, CheckoutError> {
        let cart = self.carts.ensure(user_id).await?;
        let lines = self.carts.lines(cart.id).await?;

        if lines.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let warnings = stock_issues(&lines);
        let totals = totals_from_lines(lines.iter().map(|l| (l.product.price, l.quantity)));

        let success_url = format!(
            "{}/checkout/success?session_id={{CHECKOUT_SESSION_ID}}",
            self.client_url
        );
        let cancel_url = format!("{}/checkout/cancel", self.client_url);

        let session = self
            .stripe
            .create_checkout_session(&charge_lines(&lines, totals.tax), &success_url, &cancel_url)
            .await?;

        let url = session.url.ok_or_else(|| {
            StripeError::Parse("created session is missing a payment URL".to_owned())
        })?;

        let order_lines: Vec<OrderLine> = lines
            .iter()
            .map(|l| OrderLine {
                product_id: l.product.id,
                product_name: l.product.name.clone(),
                unit_price: l.product.price,
                quantity: l.quantity,
            })
            .collect();

        self.orders
            .create_pending(user_id, &session.id, &totals, &order_lines)
            .await?;

        Ok(CheckoutStart {
            url,
            session_id: session.id,
            totals,
            warnings,
        })
    }

    /// Confirm a checkout session after the buyer returns from Stripe.
    ///
    /// Verifies with Stripe that the session is paid, then settles the order:
    /// stock is decremented, the order flips to `paid`, and the cart is
    /// cleared. Safe to call more than once; repeats observe the settled
    /// order without touching stock again.
    ///
    /// # Errors
    ///
    /// Returns `PaymentIncomplete` if Stripe hasn't recorded payment,
    /// `StockExhausted` if stock ran out since the session was created, and
    /// `SessionNotFound` if no confirmable order matches.
    pub async fn confirm(
        &self,
        user_id: UserId,
        session_id: &str,
    ) -> Result<Settlement, CheckoutError> {
        let session = self.stripe.retrieve_checkout_session(session_id).await?;
        if !session.is_paid() {
            return Err(CheckoutError::PaymentIncomplete);
        }

        match self.orders.settle(user_id, session_id).await? {
            SettleOutcome::Completed(order) => Ok(Settlement {
                order,
                already_paid: false,
            }),
            SettleOutcome::AlreadyPaid(order) => Ok(Settlement {
                order,
                already_paid: true,
            }),
            SettleOutcome::InsufficientStock(names) => Err(CheckoutError::StockExhausted(names)),
            // A canceled or failed order is no longer confirmable.
            SettleOutcome::NotPending(_) | SettleOutcome::NotFound => {
                Err(CheckoutError::SessionNotFound)
            }
        }
    }

    /// Cancel a pending checkout session.
    ///
    /// # Errors
    ///
    /// Returns `SessionNotFound` if no pending order matches this session id.
    pub async fn cancel(&self, user_id: UserId, session_id: &str) -> Result<(), CheckoutError> {
        if !self.orders.cancel(user_id, session_id).await? {
            return Err(CheckoutError::SessionNotFound);
        }
        Ok(())
    }

    /// The line snapshot of one order.
    ///
    /// # Errors
    ///
    /// Returns repository errors from the underlying query.
    pub async fn order_lines(&self, order_id: OrderId) -> Result<Vec<OrderLine>, CheckoutError> {
        Ok(self.orders.lines(order_id).await?)
    }

    /// The caller's order history with line snapshots, newest first.
    ///
    /// # Errors
    ///
    /// Returns repository errors from the underlying queries.
    pub async fn history(&self, user_id: UserId) -> Result<Vec<OrderDetails>, CheckoutError> {
        let orders = self.orders.history(user_id).await?;

        let mut details = Vec::with_capacity(orders.len());
        for order in orders {
            let lines = self.orders.lines(order.id).await?;
            details.push(OrderDetails { order, lines });
        }

        Ok(details)
    }
}

/// Warnings for cart lines requesting more than current stock.
pub fn stock_issues(lines: &[CartLine]) -> Vec<String> {
    lines
        .iter()
        .filter(|l| l.shortfall().is_some())
        .map(|l| {
            format!(
                "Only {} of '{}' in stock (requested {})",
                l.product.stock, l.product.name, l.quantity
            )
        })
        .collect()
}

/// Stripe charge lines for a cart, with tax as its own line.
fn charge_lines(lines: &[CartLine], tax: Decimal) -> Vec<ChargeLine> {
    let mut charges: Vec<ChargeLine> = lines
        .iter()
        .map(|l| ChargeLine {
            name: l.product.name.clone(),
            unit_price: l.product.price,
            quantity: l.quantity,
        })
        .collect();

    if tax > Decimal::ZERO {
        charges.push(ChargeLine {
            name: "Sales Tax".to_owned(),
            unit_price: tax,
            quantity: 1,
        });
    }

    charges
}
