//! Settlement tests against a live database.
//!
//! These exercise the order settlement transaction through the repositories,
//! so they need a migrated PostgreSQL instance reachable via
//! `ECOSTORE_DATABASE_URL` (or `DATABASE_URL`). No Stripe involvement: the
//! session ids here are synthetic.

#![allow(clippy::unwrap_used)]

use rust_decimal::dec;
use secrecy::SecretString;
use sqlx::PgPool;

use ecostore_core::{Category, Email, ProductId, Role, UserId, totals_from_lines};

use ecostore_api::db::create_pool;
use ecostore_api::db::orders::{OrderRepository, SettleOutcome};
use ecostore_api::db::products::{ProductInput, ProductRepository};
use ecostore_api::db::users::UserRepository;
use ecostore_api::models::{OrderLine, OrderStatus, Product};
use ecostore_api::services::auth::hash_password;

async fn pool() -> PgPool {
    let url = std::env::var("ECOSTORE_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .expect("set ECOSTORE_DATABASE_URL to run these tests");
    create_pool(&SecretString::from(url))
        .await
        .expect("database pool")
}

/// Unique suffix so repeated runs never collide on unique columns.
fn unique(prefix: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock before epoch")
        .as_nanos();
    format!("{prefix}-{nanos}")
}

async fn create_user(pool: &PgPool) -> UserId {
    let username = unique("settle");
    let email = Email::parse(&format!("{username}@example.com")).unwrap();
    let hash = hash_password("settlement-pass-1").unwrap();

    UserRepository::new(pool)
        .create(&username, &email, &hash, Role::User)
        .await
        .expect("user")
        .id
}

async fn create_product(pool: &PgPool, stock: i32) -> Product {
    ProductRepository::new(pool)
        .create(&ProductInput {
            name: unique("Steel Bottle"),
            description: "Vacuum-insulated steel bottle".to_owned(),
            price: dec!(12.50),
            category: Category::ReusableItems,
            stock,
            image_url: None,
        })
        .await
        .expect("product")
}

/// Record a pending single-line order and return its session id.
async fn pending_order(pool: &PgPool, user_id: UserId, product: &Product, quantity: i32) -> String {
    let session_id = unique("cs_test");
    let lines = vec![OrderLine {
        product_id: product.id,
        product_name: product.name.clone(),
        unit_price: product.price,
        quantity,
    }];
    let totals = totals_from_lines(lines.iter().map(|l| (l.unit_price, l.quantity)));

    OrderRepository::new(pool)
        .create_pending(user_id, &session_id, &totals, &lines)
        .await
        .expect("pending order");

    session_id
}

async fn stock_of(pool: &PgPool, id: ProductId) -> i32 {
    ProductRepository::new(pool)
        .get(id)
        .await
        .expect("product query")
        .expect("product exists")
        .stock
}

#[tokio::test]
#[ignore = "requires a migrated PostgreSQL database"]
async fn test_duplicate_settlement_decrements_stock_once() {
    let pool = pool().await;
    let user_id = create_user(&pool).await;
    let product = create_product(&pool, 10).await;
    let session_id = pending_order(&pool, user_id, &product, 3).await;
    let orders = OrderRepository::new(&pool);

    let first = orders.settle(user_id, &session_id).await.expect("settle");
    let SettleOutcome::Completed(order) = first else {
        panic!("expected Completed, got {first:?}");
    };
    assert_eq!(order.status, OrderStatus::Paid);
    assert_eq!(stock_of(&pool, product.id).await, 7);

    let second = orders
        .settle(user_id, &session_id)
        .await
        .expect("settle again");
    let SettleOutcome::AlreadyPaid(order) = second else {
        panic!("expected AlreadyPaid, got {second:?}");
    };
    assert_eq!(order.status, OrderStatus::Paid);
    assert_eq!(stock_of(&pool, product.id).await, 7);
}

#[tokio::test]
#[ignore = "requires a migrated PostgreSQL database"]
async fn test_settlement_shortfall_rolls_back() {
    let pool = pool().await;
    let user_id = create_user(&pool).await;
    let product = create_product(&pool, 1).await;
    let session_id = pending_order(&pool, user_id, &product, 2).await;
    let orders = OrderRepository::new(&pool);

    let outcome = orders.settle(user_id, &session_id).await.expect("settle");
    let SettleOutcome::InsufficientStock(names) = outcome else {
        panic!("expected InsufficientStock, got {outcome:?}");
    };
    assert_eq!(names, vec![product.name.clone()]);

    // Nothing changed: stock intact, order still pending
    assert_eq!(stock_of(&pool, product.id).await, 1);

    // Restocking lets the same session settle
    sqlx::query("UPDATE product SET stock = $2 WHERE id = $1")
        .bind(product.id.as_i32())
        .bind(5)
        .execute(&pool)
        .await
        .expect("restock");

    let retried = orders.settle(user_id, &session_id).await.expect("retry");
    assert!(matches!(retried, SettleOutcome::Completed(_)));
    assert_eq!(stock_of(&pool, product.id).await, 3);
}
