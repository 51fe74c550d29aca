//! Cart routes.
//!
//! All endpoints resolve the cart from the authenticated identity; cart ids
//! supplied by clients are never trusted. Every mutation responds with the
//! updated cart aggregate so clients need no follow-up read.

use axum::{
    Json,
    extract::{Path, State},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use ecostore_core::{CartItemId, CartTotals, ProductId, UserId, limits, totals_from_lines};

use crate::db::carts::CartRepository;
use crate::db::products::ProductRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::CartLine;
use crate::routes::products::ProductResponse;
use crate::services::checkout::stock_issues;
use crate::state::AppState;

/// Request to add a product to the cart.
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: i32,
    pub quantity: i32,
}

/// Request to set a line's quantity.
#[derive(Debug, Deserialize)]
pub struct SetQuantityRequest {
    pub quantity: i32,
}

/// One cart line with its live-priced total.
#[derive(Debug, Serialize)]
pub struct CartLineResponse {
    pub id: i32,
    pub quantity: i32,
    pub line_total: Decimal,
    pub product: ProductResponse,
}

impl From<CartLine> for CartLineResponse {
    fn from(line: CartLine) -> Self {
        Self {
            id: line.item_id.as_i32(),
            quantity: line.quantity,
            line_total: line.line_total(),
            product: line.product.into(),
        }
    }
}

/// The full cart aggregate.
#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub id: i32,
    pub items: Vec<CartLineResponse>,
    #[serde(flatten)]
    pub totals: CartTotals,
}

/// Pre-checkout validation verdict.
#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    pub total_items: i64,
    pub total_price: Decimal,
    pub message: String,
}

/// Ensure the caller's cart exists.
///
/// POST /api/cart
///
/// # Errors
///
/// 401 without a valid token.
pub async fn ensure(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<CartResponse>> {
    cart_response(&state, user.id).await
}

/// The full cart with live-priced totals.
///
/// GET /api/cart
///
/// # Errors
///
/// 401 without a valid token.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<CartResponse>> {
    cart_response(&state, user.id).await
}

/// Totals only.
///
/// GET /api/cart/summary
///
/// # Errors
///
/// 401 without a valid token.
pub async fn summary(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<CartTotals>> {
    let carts = CartRepository::new(state.pool());
    let cart = carts.ensure(user.id).await?;
    let lines = carts.lines(cart.id).await?;

    Ok(Json(totals(&lines)))
}

/// Add a product to the cart, accumulating quantity if already present.
///
/// POST /api/cart/items
///
/// # Errors
///
/// 404 for an unknown product, 400 for an out-of-stock product, a quantity
/// outside 1..=99, or a combined quantity exceeding live stock.
pub async fn add_item(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(req): Json<AddItemRequest>,
) -> Result<Json<CartResponse>> {
    validate_quantity(req.quantity)?;

    let product = ProductRepository::new(state.pool())
        .get(ProductId::new(req.product_id))
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_owned()))?;

    if product.is_out_of_stock() {
        return Err(AppError::Validation(format!(
            "'{}' is out of stock",
            product.name
        )));
    }

    let carts = CartRepository::new(state.pool());
    let cart = carts.ensure(user.id).await?;

    // The stock check covers what's already in the cart plus the new units.
    let lines = carts.lines(cart.id).await?;
    let already_in_cart = lines
        .iter()
        .find(|l| l.product.id == product.id)
        .map_or(0, |l| l.quantity);

    if already_in_cart + req.quantity > product.stock {
        return Err(AppError::Validation(format!(
            "Only {} of '{}' in stock",
            product.stock, product.name
        )));
    }

    carts.add_item(cart.id, product.id, req.quantity).await?;

    cart_response(&state, user.id).await
}

/// Set a line's quantity.
///
/// PUT /api/cart/items/{id}
///
/// Zero is rejected; removal is its own endpoint.
///
/// # Errors
///
/// 404 if the line isn't in the caller's cart, 400 for a quantity outside
/// 1..=99 or above live stock.
pub async fn set_quantity(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i32>,
    Json(req): Json<SetQuantityRequest>,
) -> Result<Json<CartResponse>> {
    validate_quantity(req.quantity)?;

    let carts = CartRepository::new(state.pool());
    let cart = carts.ensure(user.id).await?;
    let item_id = CartItemId::new(id);

    let line = carts
        .line(cart.id, item_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Cart item".to_owned()))?;

    if req.quantity > line.product.stock {
        return Err(AppError::Validation(format!(
            "Only {} of '{}' in stock",
            line.product.stock, line.product.name
        )));
    }

    carts.set_quantity(cart.id, item_id, req.quantity).await?;

    cart_response(&state, user.id).await
}

/// Remove a line from the cart.
///
/// DELETE /api/cart/items/{id}
///
/// # Errors
///
/// 404 if the line isn't in the caller's cart.
pub async fn remove_item(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i32>,
) -> Result<Json<CartResponse>> {
    let carts = CartRepository::new(state.pool());
    let cart = carts.ensure(user.id).await?;

    carts.remove_item(cart.id, CartItemId::new(id)).await?;

    cart_response(&state, user.id).await
}

/// Remove every line from the cart.
///
/// DELETE /api/cart
///
/// # Errors
///
/// 401 without a valid token.
pub async fn clear(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<CartResponse>> {
    let carts = CartRepository::new(state.pool());
    let cart = carts.ensure(user.id).await?;

    carts.clear(cart.id).await?;

    cart_response(&state, user.id).await
}

/// Remove every line from the cart, ignoring a client-supplied cart id.
///
/// DELETE /api/cart/{id}
///
/// Older clients address the cart by id on this endpoint; the id is accepted
/// for wire compatibility but the cart cleared is always the caller's own.
///
/// # Errors
///
/// 401 without a valid token.
pub async fn clear_by_id(
    state: State<AppState>,
    auth: RequireAuth,
    Path(_cart_id): Path<String>,
) -> Result<Json<CartResponse>> {
    clear(state, auth).await
}

/// Pre-checkout validation: is the cart non-empty and fully stocked?
///
/// POST /api/cart/validate
///
/// # Errors
///
/// 401 without a valid token.
pub async fn validate(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<ValidateResponse>> {
    let carts = CartRepository::new(state.pool());
    let cart = carts.ensure(user.id).await?;
    let lines = carts.lines(cart.id).await?;

    let totals = totals(&lines);

    if lines.is_empty() {
        return Ok(Json(ValidateResponse {
            valid: false,
            total_items: 0,
            total_price: Decimal::ZERO,
            message: "Cart is empty".to_owned(),
        }));
    }

    let issues = stock_issues(&lines);
    let valid = issues.is_empty();
    let message = if valid {
        "Cart is ready for checkout".to_owned()
    } else {
        issues.join("; ")
    };

    Ok(Json(ValidateResponse {
        valid,
        total_items: totals.item_count,
        total_price: totals.total,
        message,
    }))
}

fn validate_quantity(quantity: i32) -> Result<()> {
    if !(limits::MIN_QUANTITY..=limits::MAX_QUANTITY).contains(&quantity) {
        return Err(AppError::Validation(format!(
            "Quantity must be between {} and {}",
            limits::MIN_QUANTITY,
            limits::MAX_QUANTITY
        )));
    }
    Ok(())
}

fn totals(lines: &[CartLine]) -> CartTotals {
    totals_from_lines(lines.iter().map(|l| (l.product.price, l.quantity)))
}

/// The caller's cart as a response aggregate.
async fn cart_response(state: &AppState, user_id: UserId) -> Result<Json<CartResponse>> {
    let carts = CartRepository::new(state.pool());
    let cart = carts.ensure(user_id).await?;
    let lines = carts.lines(cart.id).await?;

    let totals = totals(&lines);

    Ok(Json(CartResponse {
        id: cart.id.as_i32(),
        items: lines.into_iter().map(Into::into).collect(),
        totals,
    }))
}
