//! Middleware for the admin panel.

pub mod auth;
pub mod session;

pub use auth::OptionalPrincipal;
pub use session::create_session_layer;
