use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core components: the navigation gate and the form validator.
pub mod access;
pub mod validation;
pub mod forms;

// Service plumbing.
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;

// Module for routing segregation (Public, Authenticated, Admin).
pub mod routes;
use auth::AuthUser;
use routes::{admin, authenticated, public};

// --- Public Re-exports ---

pub use access::{AccessRouter, NavigationDecision, PolicyTable, RedirectPaths, RoleAccessPolicy};
pub use config::AppConfig;
pub use forms::FormRegistry;

/// ApiDoc
///
/// Auto-generates the OpenAPI document for every route decorated with `#[utoipa::path]`.
/// Served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::resolve_navigation, handlers::get_me, handlers::list_forms,
        handlers::validate_form, handlers::validate_form_stage, handlers::get_policies
    ),
    components(
        schemas(
            access::NavigationDecision, access::RoleAccessPolicy, access::PolicyTable,
            validation::ValidationOutcome, validation::FieldErrorMap,
            models::ValidateFormRequest, models::UserProfile, models::FormSummary,
        )
    ),
    tags(
        (name = "site-safety-portal", description = "Site Safety Portal navigation and form validation API")
    )
)]
struct ApiDoc;

/// Shared, read-only access router.
pub type AccessState = Arc<AccessRouter>;
/// Shared, read-only form registry.
pub type FormState = Arc<FormRegistry>;

/// AppState
///
/// The single, immutable container shared by every request: configuration, the role
/// policy table (inside the access router) and the form definitions. All of it is built
/// once at startup.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub access: AccessState,
    pub forms: FormState,
}

impl AppState {
    /// Wires the access router to the redirect targets named in the configuration.
    pub fn new(config: AppConfig, policies: PolicyTable, forms: FormRegistry) -> Self {
        let redirects = RedirectPaths {
            login: config.login_path.clone(),
            unauthorized: config.unauthorized_path.clone(),
        };
        Self {
            access: Arc::new(AccessRouter::new(policies, redirects)),
            forms: Arc::new(forms),
            config,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

// Lets the `AuthUser` extractor pull the JWT secret and environment from the state.
impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Enforces a valid session for the authenticated routes. The `AuthUser` extractor
/// rejects with 401 before the handler runs.
async fn auth_middleware(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the routing structure, applies global and scoped middleware, and registers
/// the application state.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(
            authenticated::authenticated_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        // The admin role check is performed inside the handlers.
        .nest("/admin", admin::admin_routes())
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Opens the per-request span, tagged with the `x-request-id` so every log line of a
/// request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
