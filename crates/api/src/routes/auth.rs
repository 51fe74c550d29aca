//! Authentication routes.
//!
//! JSON endpoints for registration, login, and profile management. Register
//! and login return a bearer token alongside the user; the profile endpoints
//! require one.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::middleware::RequireAuth;
use crate::models::User;
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Request to create an account.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Request to log in.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request to update the caller's profile.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub username: String,
    pub email: String,
}

/// Request to change the caller's password.
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Public view of a user account.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub role: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.as_i32(),
            username: user.username,
            email: user.email.into_inner(),
            role: user.role.as_str().to_owned(),
        }
    }
}

/// Token plus user, returned from register and login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}

/// Simple confirmation message.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Create an account.
///
/// POST /api/auth/register
///
/// # Errors
///
/// 400 on validation failure, 409 if the username or email is taken.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>> {
    let auth = AuthService::new(state.pool(), state.tokens());
    let (user, token) = auth.register(&req.username, &req.email, &req.password).await?;

    tracing::info!(user_id = %user.id, "account registered");

    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}

/// Log in with email and password.
///
/// POST /api/auth/login
///
/// # Errors
///
/// 401 on bad credentials.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let auth = AuthService::new(state.pool(), state.tokens());
    let (user, token) = auth.login(&req.email, &req.password).await?;

    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}

/// The caller's profile.
///
/// GET /api/auth/profile
///
/// # Errors
///
/// 401 without a valid token, 404 if the account no longer exists.
pub async fn profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<UserResponse>> {
    let auth = AuthService::new(state.pool(), state.tokens());
    let user = auth.profile(user.id).await?;

    Ok(Json(user.into()))
}

/// Update the caller's username and email.
///
/// PUT /api/auth/profile
///
/// # Errors
///
/// 400 on validation failure, 409 on a duplicate username or email.
pub async fn update_profile(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<UserResponse>> {
    let auth = AuthService::new(state.pool(), state.tokens());
    let user = auth.update_profile(user.id, &req.username, &req.email).await?;

    Ok(Json(user.into()))
}

/// Change the caller's password.
///
/// PUT /api/auth/change-password
///
/// # Errors
///
/// 401 if the current password is wrong, 400 if the new one is too weak.
pub async fn change_password(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>> {
    let auth = AuthService::new(state.pool(), state.tokens());
    auth.change_password(user.id, &req.current_password, &req.new_password)
        .await?;

    Ok(Json(MessageResponse {
        message: "Password updated".to_owned(),
    }))
}
