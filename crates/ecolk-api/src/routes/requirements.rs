//! # Requirement Editing API
//!
//! Generated requirements are edited one row at a time. Only the status,
//! deadline and responsible person change; the generated payload stays as
//! the rule produced it.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::put;
use axum::{Json, Router};
use ecolk_core::{Requirement, RequirementId, RequirementUpdate};

use crate::auth::{authorize_site_access, require_admin, CallerIdentity};
use crate::error::AppError;
use crate::extractors::extract_validated_json;
use crate::state::AppState;

/// Build the requirements router.
pub fn router() -> Router<AppState> {
    Router::new().route("/v1/requirements/{id}", put(update_requirement))
}

/// PUT /v1/requirements/{id}: Replace a requirement's mutable fields.
#[utoipa::path(
    put,
    path = "/v1/requirements/{id}",
    params(("id" = i64, Path, description = "Requirement ID")),
    request_body = RequirementUpdate,
    responses(
        (status = 200, description = "Requirement updated", body = Requirement),
        (status = 403, description = "Caller is not an admin", body = crate::error::ErrorBody),
        (status = 404, description = "Requirement not found", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "requirements"
)]
async fn update_requirement(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<RequirementId>,
    body: Result<Json<RequirementUpdate>, JsonRejection>,
) -> Result<Json<Requirement>, AppError> {
    require_admin(&caller)?;
    let update = extract_validated_json(body)?;
    let not_found = || format!("requirement {id} not found");

    let _edit = state.edit_lock.lock().await;
    let current = state
        .requirements
        .get(&id)
        .ok_or_else(|| AppError::NotFound(not_found()))?;
    authorize_site_access(&caller, state.site_owner(current.site_id), not_found)?;

    if let Some(pool) = &state.db_pool {
        let mut persisted = current;
        persisted.apply(&update);
        if !crate::db::sites::update_requirement(pool, &persisted).await? {
            return Err(AppError::NotFound(not_found()));
        }
    }

    // The row may have been deleted with its site since it was read.
    let updated = state
        .requirements
        .update(&id, |r| r.apply(&update))
        .ok_or_else(|| AppError::NotFound(not_found()))?;

    tracing::debug!(requirement_id = %id, status = %updated.status, "requirement updated");
    Ok(Json(updated))
}
