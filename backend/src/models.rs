use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::validation::FormRecord;

// --- Request Payloads (Input Schemas) ---

/// NavigationQuery
///
/// Query parameters for the navigation gate (GET /navigation?path=...).
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct NavigationQuery {
    /// The page path the browser is about to open.
    pub path: String,
}

/// ValidateFormRequest
///
/// Input payload for POST /forms/{form}/validate and the per-stage variant.
/// The record is a snapshot of the form state at the time of the request.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ValidateFormRequest {
    #[ts(type = "Record<string, unknown>")]
    #[schema(value_type = Object)]
    pub record: FormRecord,
}

// --- Output Schemas ---

/// UserProfile
///
/// Output schema for GET /me: who the session belongs to and where they may go.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UserProfile {
    pub id: Uuid,
    pub role: String,
    /// `None` when the role has no access policy.
    pub default_route: Option<String>,
    pub allowed_route_prefixes: Vec<String>,
}

/// FormSummary
///
/// Output schema for GET /forms: a form and its sections in step order.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct FormSummary {
    pub name: String,
    pub title: String,
    pub stages: Vec<String>,
}
