use crate::{
    AppState,
    access::{NavigationDecision, PolicyTable},
    auth::AuthUser,
    error::AppError,
    models::{FormSummary, NavigationQuery, UserProfile, ValidateFormRequest},
    validation::{ValidationOutcome, validate_stage},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::HeaderMap,
};

// --- Handlers ---

/// resolve_navigation
///
/// [Public Route] Decides whether the browser may open `path` or must be redirected.
///
/// The session is optional here: a missing or invalid token is itself an input to the
/// decision (redirect to login). Public pages short-circuit to `allow` before the
/// access router is consulted.
#[utoipa::path(
    get,
    path = "/navigation",
    params(NavigationQuery),
    responses((status = 200, description = "Navigation decision", body = NavigationDecision))
)]
pub async fn resolve_navigation(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<NavigationQuery>,
) -> Json<NavigationDecision> {
    if state.config.is_public_path(&query.path) {
        return Json(NavigationDecision::Allow);
    }

    let actor = AuthUser::resolve(&headers, &state.config);
    let decision = state
        .access
        .decide(actor.as_ref().map(|a| a.role.as_str()), &query.path);

    tracing::debug!(path = %query.path, ?decision, "navigation resolved");
    Json(decision)
}

/// get_me
///
/// [Authenticated Route] The session's identity and the sections its role can open.
#[utoipa::path(
    get,
    path = "/me",
    responses(
        (status = 200, description = "Profile", body = UserProfile),
        (status = 401, description = "No valid session")
    )
)]
pub async fn get_me(
    AuthUser { id, role }: AuthUser,
    State(state): State<AppState>,
) -> Json<UserProfile> {
    let policy = state.access.policy_for(&role);
    Json(UserProfile {
        id,
        default_route: policy.map(|p| p.default_route.clone()),
        allowed_route_prefixes: policy
            .map(|p| p.allowed_route_prefixes.clone())
            .unwrap_or_default(),
        role,
    })
}

/// list_forms
///
/// [Authenticated Route] Lists every form with its sections in step order.
#[utoipa::path(
    get,
    path = "/forms",
    responses((status = 200, description = "Forms", body = [FormSummary]))
)]
pub async fn list_forms(_user: AuthUser, State(state): State<AppState>) -> Json<Vec<FormSummary>> {
    let forms = state
        .forms
        .iter()
        .map(|form| FormSummary {
            name: form.name().to_string(),
            title: form.title().to_string(),
            stages: form.stages().iter().map(|s| s.name().to_string()).collect(),
        })
        .collect();
    Json(forms)
}

/// validate_form
///
/// [Authenticated Route] Validates a whole form record across every section.
///
/// A rejected record is still a 200: the verdict and field errors are the payload.
#[utoipa::path(
    post,
    path = "/forms/{form}/validate",
    params(("form" = String, Path, description = "Form name")),
    request_body = ValidateFormRequest,
    responses(
        (status = 200, description = "Validation outcome", body = ValidationOutcome),
        (status = 404, description = "Unknown form")
    )
)]
pub async fn validate_form(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(form): Path<String>,
    Json(payload): Json<ValidateFormRequest>,
) -> Result<Json<ValidationOutcome>, AppError> {
    let definition = state
        .forms
        .get(&form)
        .ok_or_else(|| AppError::UnknownForm(form.clone()))?;

    let outcome = definition.validate(&payload.record);
    tracing::debug!(
        form = %form,
        accepted = outcome.accepted,
        failing_fields = outcome.errors.len(),
        "form validated"
    );
    Ok(Json(outcome))
}

/// validate_form_stage
///
/// [Authenticated Route] Validates one section, used when stepping between sections.
#[utoipa::path(
    post,
    path = "/forms/{form}/stages/{stage}/validate",
    params(
        ("form" = String, Path, description = "Form name"),
        ("stage" = String, Path, description = "Stage name")
    ),
    request_body = ValidateFormRequest,
    responses(
        (status = 200, description = "Validation outcome", body = ValidationOutcome),
        (status = 404, description = "Unknown form or stage")
    )
)]
pub async fn validate_form_stage(
    _user: AuthUser,
    State(state): State<AppState>,
    Path((form, stage)): Path<(String, String)>,
    Json(payload): Json<ValidateFormRequest>,
) -> Result<Json<ValidationOutcome>, AppError> {
    let definition = state
        .forms
        .get(&form)
        .ok_or_else(|| AppError::UnknownForm(form.clone()))?;
    let section = definition
        .stage(&stage)
        .ok_or_else(|| AppError::UnknownStage {
            form: form.clone(),
            stage: stage.clone(),
        })?;

    Ok(Json(validate_stage(&payload.record, section)))
}

/// get_policies
///
/// [Admin Route] The role policy table currently in force.
///
/// *RBAC*: Strict enforcement of the "admin" role.
#[utoipa::path(
    get,
    path = "/admin/policies",
    responses(
        (status = 200, description = "Role policy table", body = PolicyTable),
        (status = 403, description = "Not an admin")
    )
)]
pub async fn get_policies(
    AuthUser { role, .. }: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<PolicyTable>, AppError> {
    if role != "admin" {
        return Err(AppError::Forbidden("admin"));
    }
    Ok(Json(state.access.policies().clone()))
}
