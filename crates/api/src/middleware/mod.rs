//! Request middleware and extractors.

pub mod auth;

pub use auth::{AuthUser, Claims, RequireAdmin, RequireAuth, TokenError, TokenKeys};
