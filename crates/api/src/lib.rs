//! HTTP API layer for gymhub.
//!
//! - **Endpoints**: the admin panel surface under `/admin` and the
//!   user-facing moderation, conversation and report endpoints
//! - **Extractors**: [`extractors::AuthUser`] and [`extractors::AdminUser`]
//! - **Middleware**: bearer-token session gate
//!
//! Built on Axum 0.8.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::{AppState, auth_middleware};
