//! Auth flow integration tests.
//!
//! Require a running API server and database; see the crate docs for setup.

use serde_json::json;

use ecostore_integration_tests::TestContext;

#[tokio::test]
#[ignore = "requires a running API server"]
async fn test_register_login_profile_roundtrip() {
    let ctx = TestContext::new();
    let (token, body) = ctx.register_user().await;

    let email = body["user"]["email"].as_str().expect("user email");
    assert_eq!(body["user"]["role"], "user");

    // The token from registration is immediately usable
    let resp = ctx.get_authed("/api/auth/profile", &token).await;
    assert_eq!(resp.status(), 200);
    let profile: serde_json::Value = resp.json().await.expect("profile JSON");
    assert_eq!(profile["email"], email);

    // Logging in with the same credentials mints a fresh token
    let resp = ctx
        .client
        .post(ctx.url("/api/auth/login"))
        .json(&json!({"email": email, "password": "integration-pass-1"}))
        .send()
        .await
        .expect("login request failed");
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
#[ignore = "requires a running API server"]
async fn test_duplicate_registration_conflicts() {
    let ctx = TestContext::new();
    let (_, body) = ctx.register_user().await;

    let resp = ctx
        .client
        .post(ctx.url("/api/auth/register"))
        .json(&json!({
            "username": body["user"]["username"],
            "email": body["user"]["email"],
            "password": "integration-pass-1",
        }))
        .send()
        .await
        .expect("register request failed");

    assert_eq!(resp.status(), 409);
}

#[tokio::test]
#[ignore = "requires a running API server"]
async fn test_wrong_password_is_unauthorized() {
    let ctx = TestContext::new();
    let (_, body) = ctx.register_user().await;

    let resp = ctx
        .client
        .post(ctx.url("/api/auth/login"))
        .json(&json!({"email": body["user"]["email"], "password": "wrong-password-1"}))
        .send()
        .await
        .expect("login request failed");

    assert_eq!(resp.status(), 401);
}

#[tokio::test]
#[ignore = "requires a running API server"]
async fn test_change_password_flow() {
    let ctx = TestContext::new();
    let (token, body) = ctx.register_user().await;
    let email = body["user"]["email"].clone();

    let resp = ctx
        .client
        .put(ctx.url("/api/auth/change-password"))
        .bearer_auth(&token)
        .json(&json!({
            "current_password": "integration-pass-1",
            "new_password": "integration-pass-2",
        }))
        .send()
        .await
        .expect("change-password request failed");
    assert_eq!(resp.status(), 200);

    // Old password no longer works, new one does
    let resp = ctx
        .client
        .post(ctx.url("/api/auth/login"))
        .json(&json!({"email": email, "password": "integration-pass-1"}))
        .send()
        .await
        .expect("login request failed");
    assert_eq!(resp.status(), 401);

    let resp = ctx
        .client
        .post(ctx.url("/api/auth/login"))
        .json(&json!({"email": email, "password": "integration-pass-2"}))
        .send()
        .await
        .expect("login request failed");
    assert_eq!(resp.status(), 200);
}
