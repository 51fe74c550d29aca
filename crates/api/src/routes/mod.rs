//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /api/health                      - Liveness check
//! GET  /api/health/ready                - Readiness check (DB ping)
//!
//! # Auth
//! POST /api/auth/register               - Create account, returns token
//! POST /api/auth/login                  - Login, returns token
//! GET  /api/auth/profile                - Current user's profile
//! PUT  /api/auth/profile                - Update username/email
//! PUT  /api/auth/change-password        - Change password
//!
//! # Products
//! GET  /api/products                    - Listing (category/search/sort/page)
//! GET  /api/products/search             - Free-text search (?q=)
//! GET  /api/products/category/{name}    - Category listing
//! GET  /api/products/{id}               - Product detail
//! POST /api/products                    - Create (admin)
//! PUT  /api/products/{id}               - Update (admin)
//! DELETE /api/products/{id}             - Delete (admin)
//! GET  /api/products/admin/statistics   - Stock statistics (admin)
//!
//! # Cart (requires auth)
//! POST /api/cart                        - Ensure the caller's cart exists
//! GET  /api/cart                        - Full cart with totals
//! GET  /api/cart/summary                - Totals only
//! POST /api/cart/items                  - Add product
//! PUT  /api/cart/items/{id}             - Set line quantity
//! DELETE /api/cart/items/{id}           - Remove line
//! DELETE /api/cart                      - Clear cart
//! DELETE /api/cart/{id}                 - Clear cart (id accepted, ignored)
//! POST /api/cart/validate               - Pre-checkout stock check
//!
//! # Payments (requires auth)
//! POST /api/payments/create-checkout-session - Start Stripe checkout
//! POST /api/payments/success            - Confirm a paid session
//! GET  /api/payments/verify/{id}        - Confirm a paid session
//! POST /api/payments/cancel/{id}        - Cancel a pending session
//! GET  /api/payments/history            - Order history
//! ```

pub mod auth;
pub mod cart;
pub mod health;
pub mod payments;
pub mod products;

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/profile", get(auth::profile).put(auth::update_profile))
        .route("/change-password", put(auth::change_password))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::list).post(products::create))
        .route("/search", get(products::search))
        .route("/category/{category}", get(products::by_category))
        .route("/admin/statistics", get(products::statistics))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::remove),
        )
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(cart::ensure).get(cart::show).delete(cart::clear))
        .route("/summary", get(cart::summary))
        .route("/items", post(cart::add_item))
        .route(
            "/items/{id}",
            put(cart::set_quantity).delete(cart::remove_item),
        )
        .route("/validate", post(cart::validate))
        .route("/{id}", delete(cart::clear_by_id))
}

/// Create the payment routes router.
pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/create-checkout-session",
            post(payments::create_checkout_session),
        )
        .route("/success", post(payments::success))
        .route("/verify/{session_id}", get(payments::verify))
        .route("/cancel/{session_id}", post(payments::cancel))
        .route("/history", get(payments::history))
}

/// Create the health routes router.
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(health::health))
        .route("/ready", get(health::readiness))
}

/// Create all routes, nested under `/api`.
pub fn routes() -> Router<AppState> {
    let api = Router::new()
        .nest("/health", health_routes())
        .nest("/auth", auth_routes())
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .nest("/payments", payment_routes());

    Router::new().nest("/api", api)
}
