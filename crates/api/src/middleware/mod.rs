//! Request extractors and layers.
//!
//! - [`auth`] - bearer-token extractors for employees and admins
//! - [`rate_limit`] - per-IP limits for the token endpoints

pub mod auth;
pub mod rate_limit;

pub use auth::{RequireAdmin, RequireEmployee};
pub use rate_limit::{ClientIp, auth_rate_limiter};
