//! Payment and checkout routes.
//!
//! Wraps the checkout service: session creation, confirmation (idempotent),
//! cancellation, and order history.

use axum::{
    Json,
    extract::{Path, State},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::{Order, OrderLine, OrderStatus};
use crate::services::checkout::{CheckoutService, OrderDetails};
use crate::state::AppState;

/// Request to confirm a checkout session.
#[derive(Debug, Deserialize)]
pub struct ConfirmRequest {
    pub session_id: String,
}

/// A freshly created checkout session.
#[derive(Debug, Serialize)]
pub struct CheckoutSessionResponse {
    /// Hosted payment page to redirect the buyer to.
    pub url: String,
    pub session_id: String,
    /// Non-fatal stock warnings. Settlement re-checks stock regardless.
    pub issues: Vec<String>,
}

/// One line of an order snapshot.
#[derive(Debug, Serialize)]
pub struct OrderLineResponse {
    pub product_id: i32,
    pub product_name: String,
    pub unit_price: Decimal,
    pub quantity: i32,
}

impl From<OrderLine> for OrderLineResponse {
    fn from(line: OrderLine) -> Self {
        Self {
            product_id: line.product_id.as_i32(),
            product_name: line.product_name,
            unit_price: line.unit_price,
            quantity: line.quantity,
        }
    }
}

/// An order as returned to the client.
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub id: i32,
    pub session_id: String,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<OrderLineResponse>,
}

impl OrderResponse {
    fn new(order: Order, lines: Vec<OrderLine>) -> Self {
        Self {
            id: order.id.as_i32(),
            session_id: order.session_id,
            subtotal: order.subtotal,
            tax: order.tax,
            total: order.total,
            status: order.status,
            created_at: order.created_at,
            items: lines.into_iter().map(Into::into).collect(),
        }
    }
}

/// Outcome of a confirmation.
#[derive(Debug, Serialize)]
pub struct ConfirmResponse {
    pub message: String,
    pub order: OrderResponse,
}

/// Confirmation message.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Start a Stripe checkout for the caller's cart.
///
/// POST /api/payments/create-checkout-session
///
/// # Errors
///
/// 400 for an empty cart (before any Stripe call), 502 on Stripe failure.
pub async fn create_checkout_session(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<CheckoutSessionResponse>> {
    let checkout = CheckoutService::new(state.pool(), state.stripe(), &state.config().client_url);
    let start = checkout.create_session(user.id).await?;

    tracing::info!(
        user_id = %user.id,
        session_id = %start.session_id,
        total = %start.totals.total,
        "checkout session created"
    );

    Ok(Json(CheckoutSessionResponse {
        url: start.url,
        session_id: start.session_id,
        issues: start.warnings,
    }))
}

/// Confirm a paid session (browser redirect callback).
///
/// POST /api/payments/success
///
/// # Errors
///
/// 400 if Stripe hasn't recorded payment, 409 if stock ran out, 404 for an
/// unknown session.
pub async fn success(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(req): Json<ConfirmRequest>,
) -> Result<Json<ConfirmResponse>> {
    confirm(&state, user.id, &req.session_id).await
}

/// Confirm a paid session by id.
///
/// GET /api/payments/verify/{session_id}
///
/// Same semantics as `POST /api/payments/success`; repeated calls are safe.
///
/// # Errors
///
/// 400 if Stripe hasn't recorded payment, 409 if stock ran out, 404 for an
/// unknown session.
pub async fn verify(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(session_id): Path<String>,
) -> Result<Json<ConfirmResponse>> {
    confirm(&state, user.id, &session_id).await
}

/// Cancel a pending checkout session.
///
/// POST /api/payments/cancel/{session_id}
///
/// # Errors
///
/// 404 if no pending order matches this session.
pub async fn cancel(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(session_id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let checkout = CheckoutService::new(state.pool(), state.stripe(), &state.config().client_url);
    checkout.cancel(user.id, &session_id).await?;

    Ok(Json(MessageResponse {
        message: "Checkout canceled".to_owned(),
    }))
}

/// The caller's order history, newest first.
///
/// GET /api/payments/history
///
/// # Errors
///
/// 401 without a valid token.
pub async fn history(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<OrderResponse>>> {
    let checkout = CheckoutService::new(state.pool(), state.stripe(), &state.config().client_url);
    let orders = checkout.history(user.id).await?;

    Ok(Json(
        orders
            .into_iter()
            .map(|OrderDetails { order, lines }| OrderResponse::new(order, lines))
            .collect(),
    ))
}

async fn confirm(
    state: &AppState,
    user_id: ecostore_core::UserId,
    session_id: &str,
) -> Result<Json<ConfirmResponse>> {
    let checkout = CheckoutService::new(state.pool(), state.stripe(), &state.config().client_url);
    let settlement = checkout.confirm(user_id, session_id).await?;

    let message = if settlement.already_paid {
        "Order already confirmed".to_owned()
    } else {
        tracing::info!(user_id = %user_id, session_id, "order settled");
        "Payment confirmed".to_owned()
    };

    let items = checkout.order_lines(settlement.order.id).await?;

    Ok(Json(ConfirmResponse {
        message,
        order: OrderResponse::new(settlement.order, items),
    }))
}
