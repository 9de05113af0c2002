use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Admin Router Module
///
/// Routes exclusively for the 'admin' role. Nested under `/admin`; authentication is
/// enforced by the extractor and the role check happens inside each handler.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /admin/policies
        // The role policy table in force, for auditing who can reach which sections.
        .route("/policies", get(handlers::get_policies))
}
