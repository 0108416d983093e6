//! Admin gating for sync routes.

pub mod middleware;

pub use middleware::RequireAdmin;
