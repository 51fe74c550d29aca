//! Business services layered over the repositories.

pub mod auth;
pub mod checkout;
pub mod stripe;
