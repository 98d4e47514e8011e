//! Domain types for the admin panel.
//!
//! These are validated domain objects, separate from the raw database rows
//! (`db/` converts rows into these via `TryFrom`).

pub mod category;
pub mod order;
pub mod principal;
pub mod product;
pub mod role;
pub mod user;

pub use category::Category;
pub use order::{CartItem, Order, OrderItem, OrderWithItems};
pub use principal::Principal;
pub use product::{Product, ProductImage, ProductWithImages};
pub use role::{Permission, Role, RoleWithAccess, is_system_role};
pub use user::{User, UserWithRoles};

/// Session keys used by the admin panel.
pub mod session_keys {
    /// The authenticated user's id. Roles and permissions are loaded fresh
    /// from the database on every request, never cached in the session.
    pub const CURRENT_USER_ID: &str = "current_user_id";
}
