//! # Organization Administration API
//!
//! Admin-only listing and registration of client organizations.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use ecolk_core::error::{limit_text, require_text};
use ecolk_core::Organization;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::auth::{require_admin, CallerIdentity};
use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::state::AppState;

pub const ORGANIZATION_NAME_MAX_LEN: usize = 200;
/// INN and OGRN are at most 15 digits; the column allows some slack.
pub const REGISTRATION_NUMBER_MAX_LEN: usize = 20;

/// Request to register an organization.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrganizationRequest {
    pub name: String,
    #[serde(default)]
    pub inn: String,
    #[serde(default)]
    pub ogrn: String,
}

impl Validate for CreateOrganizationRequest {
    fn validate(&self) -> Result<(), String> {
        require_text("name", &self.name, ORGANIZATION_NAME_MAX_LEN)
            .and_then(|()| limit_text("inn", &self.inn, REGISTRATION_NUMBER_MAX_LEN))
            .and_then(|()| limit_text("ogrn", &self.ogrn, REGISTRATION_NUMBER_MAX_LEN))
            .map_err(|e| e.to_string())
    }
}

/// Build the organizations router.
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/v1/organizations",
        get(list_organizations).post(create_organization),
    )
}

/// GET /v1/organizations: List all organizations.
#[utoipa::path(
    get,
    path = "/v1/organizations",
    responses(
        (status = 200, description = "All organizations in id order", body = Vec<Organization>),
        (status = 403, description = "Caller is not an admin", body = crate::error::ErrorBody),
    ),
    tag = "organizations"
)]
async fn list_organizations(
    State(state): State<AppState>,
    caller: CallerIdentity,
) -> Result<Json<Vec<Organization>>, AppError> {
    require_admin(&caller)?;
    Ok(Json(state.organizations.list()))
}

/// POST /v1/organizations: Register an organization.
#[utoipa::path(
    post,
    path = "/v1/organizations",
    request_body = CreateOrganizationRequest,
    responses(
        (status = 201, description = "Organization created", body = Organization),
        (status = 403, description = "Caller is not an admin", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "organizations"
)]
async fn create_organization(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<CreateOrganizationRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Organization>), AppError> {
    require_admin(&caller)?;
    let req = extract_validated_json(body)?;

    let record = Organization {
        id: state.organizations.allocate_id(),
        name: req.name.trim().to_string(),
        inn: req.inn.trim().to_string(),
        ogrn: req.ogrn.trim().to_string(),
    };

    if let Some(pool) = &state.db_pool {
        crate::db::organizations::insert(pool, &record).await?;
    }
    state.organizations.insert(record.id, record.clone());

    tracing::info!(organization_id = %record.id, "organization registered");
    Ok((StatusCode::CREATED, Json(record)))
}
