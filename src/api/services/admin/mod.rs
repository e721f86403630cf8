//! Admin API
//!
//! Link tracker management behind the bearer-token middleware. Responses
//! use the unified `{ code, message, data }` envelope.

pub mod error_code;
pub mod helpers;
pub mod link_admin;
pub mod routes;
pub mod types;

pub use routes::admin_v1_routes;
