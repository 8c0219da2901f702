//! # Artifact Metadata API
//!
//! Artifacts are files (permits, protocols, reports) uploaded as evidence
//! for a site. Only metadata is kept here; the bytes are stored elsewhere
//! under the server-assigned `stored_file_name`.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get};
use axum::{Json, Router};
use chrono::Utc;
use ecolk_core::error::require_text;
use ecolk_core::{ArtifactId, RequirementId, SiteId};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::{authorize_site_access, require_admin, site_not_found, CallerIdentity};
use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::state::{AppState, ArtifactRecord};

pub const FILE_NAME_MAX_LEN: usize = 255;
pub const MIME_TYPE_MAX_LEN: usize = 100;
/// Uploads above 10 MiB are rejected.
pub const MAX_FILE_SIZE: i64 = 10 * 1024 * 1024;

/// Request to register an uploaded artifact.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterArtifactRequest {
    /// Requirement this artifact evidences; must belong to the same site.
    #[serde(default)]
    pub requirement_id: Option<RequirementId>,
    pub original_file_name: String,
    pub mime_type: String,
    pub file_size: i64,
}

impl Validate for RegisterArtifactRequest {
    fn validate(&self) -> Result<(), String> {
        require_text("original_file_name", &self.original_file_name, FILE_NAME_MAX_LEN)
            .and_then(|()| require_text("mime_type", &self.mime_type, MIME_TYPE_MAX_LEN))
            .map_err(|e| e.to_string())?;
        if !(0..=MAX_FILE_SIZE).contains(&self.file_size) {
            return Err(format!(
                "file_size must be between 0 and {MAX_FILE_SIZE} bytes"
            ));
        }
        Ok(())
    }
}

/// Build the artifacts router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/sites/{id}/artifacts",
            get(list_artifacts).post(register_artifact),
        )
        .route("/v1/artifacts/{id}", delete(delete_artifact))
}

/// GET /v1/sites/{id}/artifacts: List a site's artifacts, newest first.
#[utoipa::path(
    get,
    path = "/v1/sites/{id}/artifacts",
    params(("id" = i64, Path, description = "Site ID")),
    responses(
        (status = 200, description = "Artifact metadata, newest first", body = Vec<ArtifactRecord>),
        (status = 403, description = "Access denied", body = crate::error::ErrorBody),
    ),
    tag = "artifacts"
)]
async fn list_artifacts(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(site_id): Path<SiteId>,
) -> Result<Json<Vec<ArtifactRecord>>, AppError> {
    authorize_site_access(&caller, state.site_owner(site_id), || {
        format!("site {site_id} not found")
    })?;

    let mut artifacts = state.artifacts.list_where(|a| a.site_id == site_id);
    artifacts.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at).then(b.id.cmp(&a.id)));
    Ok(Json(artifacts))
}

/// POST /v1/sites/{id}/artifacts: Register artifact metadata.
#[utoipa::path(
    post,
    path = "/v1/sites/{id}/artifacts",
    params(("id" = i64, Path, description = "Site ID")),
    request_body = RegisterArtifactRequest,
    responses(
        (status = 201, description = "Artifact registered", body = ArtifactRecord),
        (status = 403, description = "Access denied", body = crate::error::ErrorBody),
        (status = 404, description = "Site not found", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "artifacts"
)]
async fn register_artifact(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(site_id): Path<SiteId>,
    body: Result<Json<RegisterArtifactRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ArtifactRecord>), AppError> {
    authorize_site_access(&caller, state.site_owner(site_id), || {
        format!("site {site_id} not found")
    })?;
    let req = extract_validated_json(body)?;

    if let Some(requirement_id) = req.requirement_id {
        let belongs = state
            .requirements
            .get(&requirement_id)
            .is_some_and(|r| r.site_id == site_id);
        if !belongs {
            return Err(AppError::Validation(format!(
                "requirement {requirement_id} does not belong to site {site_id}"
            )));
        }
    }

    let record = ArtifactRecord {
        id: state.artifacts.allocate_id(),
        site_id,
        requirement_id: req.requirement_id,
        original_file_name: req.original_file_name.trim().to_string(),
        stored_file_name: Uuid::new_v4(),
        mime_type: req.mime_type.trim().to_string(),
        file_size: req.file_size,
        uploaded_at: Utc::now(),
    };

    let site_gone = || site_not_found(&caller, || format!("site {site_id} not found"));
    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::documents::insert_artifact(pool, &record).await {
            if crate::db::is_foreign_key_violation(&e) {
                return Err(site_gone());
            }
            return Err(e.into());
        }
    }
    if !state.insert_for_site(&state.artifacts, site_id, record.id, record.clone()) {
        tracing::debug!(site_id = %site_id, "site deleted during artifact registration");
        return Err(site_gone());
    }

    tracing::info!(artifact_id = %record.id, site_id = %site_id, "artifact registered");
    Ok((StatusCode::CREATED, Json(record)))
}

/// DELETE /v1/artifacts/{id}: Delete artifact metadata.
#[utoipa::path(
    delete,
    path = "/v1/artifacts/{id}",
    params(("id" = i64, Path, description = "Artifact ID")),
    responses(
        (status = 204, description = "Artifact deleted"),
        (status = 403, description = "Caller is not an admin", body = crate::error::ErrorBody),
        (status = 404, description = "Artifact not found", body = crate::error::ErrorBody),
    ),
    tag = "artifacts"
)]
async fn delete_artifact(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<ArtifactId>,
) -> Result<StatusCode, AppError> {
    require_admin(&caller)?;
    let not_found = || format!("artifact {id} not found");
    if !state.artifacts.contains(&id) {
        return Err(AppError::NotFound(not_found()));
    }

    if let Some(pool) = &state.db_pool {
        if !crate::db::documents::delete_artifact(pool, id).await? {
            return Err(AppError::NotFound(not_found()));
        }
    }
    state
        .artifacts
        .remove(&id)
        .ok_or_else(|| AppError::NotFound(not_found()))?;

    tracing::info!(artifact_id = %id, "artifact deleted");
    Ok(StatusCode::NO_CONTENT)
}
