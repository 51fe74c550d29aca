//! Cart flow integration tests.
//!
//! Require a running API server with a seeded catalog
//! (`cargo run -p ecostore-cli -- seed`).

use rust_decimal::Decimal;
use serde_json::{Value, json};

use ecostore_integration_tests::TestContext;

/// First product id from the public listing.
async fn any_product(ctx: &TestContext) -> Value {
    let resp = ctx
        .client
        .get(ctx.url("/api/products"))
        .send()
        .await
        .expect("listing request failed");
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.expect("listing JSON");
    body["products"]
        .as_array()
        .and_then(|p| p.first())
        .expect("catalog is empty; run the seed command first")
        .clone()
}

fn decimal(value: &Value) -> Decimal {
    value
        .as_str()
        .expect("decimal fields serialize as strings")
        .parse()
        .expect("invalid decimal")
}

#[tokio::test]
#[ignore = "requires a running API server"]
async fn test_empty_cart_has_zero_totals() {
    let ctx = TestContext::new();
    let (token, _) = ctx.register_user().await;

    let resp = ctx.get_authed("/api/cart", &token).await;
    assert_eq!(resp.status(), 200);

    let cart: Value = resp.json().await.expect("cart JSON");
    assert_eq!(cart["items"].as_array().expect("items").len(), 0);
    assert_eq!(decimal(&cart["total"]), Decimal::ZERO);
    assert_eq!(cart["item_count"], 0);
}

#[tokio::test]
#[ignore = "requires a running API server"]
async fn test_duplicate_add_accumulates_one_line() {
    let ctx = TestContext::new();
    let (token, _) = ctx.register_user().await;
    let product = any_product(&ctx).await;
    let add = json!({"product_id": product["id"], "quantity": 1});

    let resp = ctx.post_authed("/api/cart/items", &token, &add).await;
    assert_eq!(resp.status(), 200);

    let resp = ctx.post_authed("/api/cart/items", &token, &add).await;
    assert_eq!(resp.status(), 200);

    let cart: Value = resp.json().await.expect("cart JSON");
    let items = cart["items"].as_array().expect("items");
    assert_eq!(items.len(), 1, "duplicate add must not append a line");
    assert_eq!(items[0]["quantity"], 2);
    assert_eq!(cart["item_count"], 2);
}

#[tokio::test]
#[ignore = "requires a running API server"]
async fn test_totals_derive_from_live_prices() {
    let ctx = TestContext::new();
    let (token, _) = ctx.register_user().await;
    let product = any_product(&ctx).await;
    let price = decimal(&product["price"]);

    let resp = ctx
        .post_authed(
            "/api/cart/items",
            &token,
            &json!({"product_id": product["id"], "quantity": 2}),
        )
        .await;
    assert_eq!(resp.status(), 200);

    let cart: Value = resp.json().await.expect("cart JSON");
    let subtotal = decimal(&cart["subtotal"]);
    let tax = decimal(&cart["tax"]);
    let total = decimal(&cart["total"]);

    assert_eq!(subtotal, price * Decimal::from(2));
    assert_eq!(total, subtotal + tax);
}

#[tokio::test]
#[ignore = "requires a running API server"]
async fn test_remove_last_item_zeroes_totals() {
    let ctx = TestContext::new();
    let (token, _) = ctx.register_user().await;
    let product = any_product(&ctx).await;

    let resp = ctx
        .post_authed(
            "/api/cart/items",
            &token,
            &json!({"product_id": product["id"], "quantity": 1}),
        )
        .await;
    assert_eq!(resp.status(), 200);
    let cart: Value = resp.json().await.expect("cart JSON");
    let item_id = cart["items"][0]["id"].as_i64().expect("item id");

    let resp = ctx
        .client
        .delete(ctx.url(&format!("/api/cart/items/{item_id}")))
        .bearer_auth(&token)
        .send()
        .await
        .expect("remove request failed");
    assert_eq!(resp.status(), 200);

    let cart: Value = resp.json().await.expect("cart JSON");
    assert_eq!(cart["items"].as_array().expect("items").len(), 0);
    assert_eq!(decimal(&cart["total"]), Decimal::ZERO);
}

#[tokio::test]
#[ignore = "requires a running API server"]
async fn test_zero_quantity_update_is_rejected() {
    let ctx = TestContext::new();
    let (token, _) = ctx.register_user().await;
    let product = any_product(&ctx).await;

    let resp = ctx
        .post_authed(
            "/api/cart/items",
            &token,
            &json!({"product_id": product["id"], "quantity": 1}),
        )
        .await;
    let cart: Value = resp.json().await.expect("cart JSON");
    let item_id = cart["items"][0]["id"].as_i64().expect("item id");

    let resp = ctx
        .client
        .put(ctx.url(&format!("/api/cart/items/{item_id}")))
        .bearer_auth(&token)
        .json(&json!({"quantity": 0}))
        .send()
        .await
        .expect("update request failed");

    assert_eq!(resp.status(), 400);
}

#[tokio::test]
#[ignore = "requires a running API server"]
async fn test_validate_reports_empty_cart() {
    let ctx = TestContext::new();
    let (token, _) = ctx.register_user().await;

    let resp = ctx
        .post_authed("/api/cart/validate", &token, &json!({}))
        .await;
    assert_eq!(resp.status(), 200);

    let verdict: Value = resp.json().await.expect("validate JSON");
    assert_eq!(verdict["valid"], false);
    assert_eq!(verdict["total_items"], 0);
}
