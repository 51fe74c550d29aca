//! Checkout workflow integration tests.
//!
//! Require a running API server. Tests that reach Stripe need
//! `STRIPE_API_BASE` pointed at a stripe-mock instance.

use serde_json::{Value, json};

use ecostore_integration_tests::TestContext;

#[tokio::test]
#[ignore = "requires a running API server"]
async fn test_empty_cart_checkout_fails_fast() {
    let ctx = TestContext::new();
    let (token, _) = ctx.register_user().await;

    let resp = ctx
        .post_authed("/api/payments/create-checkout-session", &token, &json!({}))
        .await;

    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.expect("error JSON");
    assert_eq!(body["error"], "Cart is empty");
}

#[tokio::test]
#[ignore = "requires a running API server"]
async fn test_cancel_unknown_session_is_404() {
    let ctx = TestContext::new();
    let (token, _) = ctx.register_user().await;

    let resp = ctx
        .post_authed(
            "/api/payments/cancel/cs_test_does_not_exist",
            &token,
            &json!({}),
        )
        .await;

    assert_eq!(resp.status(), 404);
}

#[tokio::test]
#[ignore = "requires a running API server"]
async fn test_fresh_account_has_empty_history() {
    let ctx = TestContext::new();
    let (token, _) = ctx.register_user().await;

    let resp = ctx.get_authed("/api/payments/history", &token).await;
    assert_eq!(resp.status(), 200);

    let history: Value = resp.json().await.expect("history JSON");
    assert_eq!(history.as_array().expect("array").len(), 0);
}

#[tokio::test]
#[ignore = "requires a running API server and stripe-mock"]
async fn test_checkout_session_created_for_stocked_cart() {
    let ctx = TestContext::new();
    let (token, _) = ctx.register_user().await;

    // Put one unit of the first catalog product in the cart
    let resp = ctx
        .client
        .get(ctx.url("/api/products"))
        .send()
        .await
        .expect("listing request failed");
    let listing: Value = resp.json().await.expect("listing JSON");
    let product_id = listing["products"][0]["id"].clone();

    let resp = ctx
        .post_authed(
            "/api/cart/items",
            &token,
            &json!({"product_id": product_id, "quantity": 1}),
        )
        .await;
    assert_eq!(resp.status(), 200);

    let resp = ctx
        .post_authed("/api/payments/create-checkout-session", &token, &json!({}))
        .await;
    assert_eq!(resp.status(), 200);

    let session: Value = resp.json().await.expect("session JSON");
    assert!(session["url"].as_str().is_some());
    assert!(session["session_id"].as_str().is_some());
    assert_eq!(session["issues"].as_array().expect("issues").len(), 0);
}
