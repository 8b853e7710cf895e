//! API endpoints.

mod admin;
mod blocking;
mod conversations;
mod muting;
mod reports;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(muting::router())
        .merge(blocking::router())
        .nest("/conversations", conversations::router())
        .nest("/reports", reports::router())
        .nest("/admin", admin::router())
}
