use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Public Router Module
///
/// Endpoints that are **unauthenticated**. The navigation gate lives here because a
/// missing session is a valid input to it: it answers with a redirect to the login page
/// rather than a 401.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for load balancers.
        .route("/health", get(|| async { "ok" }))
        // GET /navigation?path=...
        // Allow or redirect decision for a page navigation.
        .route("/navigation", get(handlers::resolve_navigation))
}
