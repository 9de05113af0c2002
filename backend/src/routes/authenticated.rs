use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Authenticated Router Module
///
/// Routes for any actor holding a valid session. Every handler here relies on the
/// `AuthUser` middleware layered above this module in `create_router`.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /me
        // The session's identity, default landing page and allowed sections.
        .route("/me", get(handlers::get_me))
        // GET /forms
        // The portal's forms and their sections.
        .route("/forms", get(handlers::list_forms))
        // POST /forms/{form}/validate
        // Full validation on submit.
        .route("/forms/{form}/validate", post(handlers::validate_form))
        // POST /forms/{form}/stages/{stage}/validate
        // Single-section validation when the user steps forward.
        .route(
            "/forms/{form}/stages/{stage}/validate",
            post(handlers::validate_form_stage),
        )
}
