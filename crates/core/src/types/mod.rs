//! Shared type definitions.

pub mod category;
pub mod email;
pub mod id;
pub mod limits;
pub mod money;
pub mod role;

pub use category::{Category, CategoryError};
pub use email::{Email, EmailError};
pub use id::{CartId, CartItemId, OrderId, ProductId, UserId};
pub use money::{CartTotals, TAX_RATE, line_total, totals_from_lines};
pub use role::{Role, RoleError};
