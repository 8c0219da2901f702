//! # Legal-Act Reference Directory API
//!
//! Laws and regulations cited by requirements. Every authenticated caller
//! can read the directory; only admins maintain it.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use ecolk_core::error::{limit_optional_text, require_text};
use ecolk_core::LegalActId;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::auth::{require_admin, CallerIdentity};
use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::state::{AppState, LegalActRecord};

pub const TITLE_MAX_LEN: usize = 500;
pub const REFERENCE_CODE_MAX_LEN: usize = 100;
pub const DESCRIPTION_MAX_LEN: usize = 1000;
pub const EXTERNAL_LINK_MAX_LEN: usize = 500;

/// Request to create or replace a legal act.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LegalActRequest {
    pub title: String,
    pub reference_code: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Absolute `http` or `https` URL.
    #[serde(default)]
    pub external_link: Option<String>,
}

impl Validate for LegalActRequest {
    fn validate(&self) -> Result<(), String> {
        require_text("title", &self.title, TITLE_MAX_LEN)
            .and_then(|()| {
                require_text("reference_code", &self.reference_code, REFERENCE_CODE_MAX_LEN)
            })
            .and_then(|()| {
                limit_optional_text(
                    "description",
                    self.description.as_deref(),
                    DESCRIPTION_MAX_LEN,
                )
            })
            .and_then(|()| {
                limit_optional_text(
                    "external_link",
                    self.external_link.as_deref(),
                    EXTERNAL_LINK_MAX_LEN,
                )
            })
            .map_err(|e| e.to_string())?;

        if let Some(link) = non_blank(&self.external_link) {
            let parsed =
                url::Url::parse(&link).map_err(|e| format!("external_link is not a URL: {e}"))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err("external_link must be an http or https URL".to_string());
            }
        }
        Ok(())
    }
}

impl LegalActRequest {
    fn into_record(self, id: LegalActId) -> LegalActRecord {
        LegalActRecord {
            id,
            title: self.title.trim().to_string(),
            reference_code: self.reference_code.trim().to_string(),
            description: non_blank(&self.description),
            external_link: non_blank(&self.external_link),
        }
    }
}

/// Trimmed value of an optional field; blank counts as absent.
fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Build the legal acts router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/legal-acts",
            get(list_legal_acts).post(create_legal_act),
        )
        .route(
            "/v1/legal-acts/{id}",
            put(update_legal_act).delete(delete_legal_act),
        )
}

/// GET /v1/legal-acts: List the directory.
#[utoipa::path(
    get,
    path = "/v1/legal-acts",
    responses(
        (status = 200, description = "Legal acts ordered by reference code", body = Vec<LegalActRecord>),
    ),
    tag = "legal_acts"
)]
async fn list_legal_acts(State(state): State<AppState>) -> Json<Vec<LegalActRecord>> {
    let mut acts = state.legal_acts.list();
    acts.sort_by(|a, b| {
        a.reference_code
            .cmp(&b.reference_code)
            .then(a.id.cmp(&b.id))
    });
    Json(acts)
}

/// POST /v1/legal-acts: Add a legal act.
#[utoipa::path(
    post,
    path = "/v1/legal-acts",
    request_body = LegalActRequest,
    responses(
        (status = 201, description = "Legal act created", body = LegalActRecord),
        (status = 403, description = "Caller is not an admin", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "legal_acts"
)]
async fn create_legal_act(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<LegalActRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<LegalActRecord>), AppError> {
    require_admin(&caller)?;
    let req = extract_validated_json(body)?;
    let record = req.into_record(state.legal_acts.allocate_id());

    if let Some(pool) = &state.db_pool {
        crate::db::legal_acts::insert(pool, &record).await?;
    }
    state.legal_acts.insert(record.id, record.clone());

    tracing::info!(
        legal_act_id = %record.id,
        reference_code = %record.reference_code,
        "legal act created"
    );
    Ok((StatusCode::CREATED, Json(record)))
}

/// PUT /v1/legal-acts/{id}: Replace every field of a legal act.
#[utoipa::path(
    put,
    path = "/v1/legal-acts/{id}",
    params(("id" = i64, Path, description = "Legal act ID")),
    request_body = LegalActRequest,
    responses(
        (status = 200, description = "Legal act updated", body = LegalActRecord),
        (status = 403, description = "Caller is not an admin", body = crate::error::ErrorBody),
        (status = 404, description = "Legal act not found", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "legal_acts"
)]
async fn update_legal_act(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<LegalActId>,
    body: Result<Json<LegalActRequest>, JsonRejection>,
) -> Result<Json<LegalActRecord>, AppError> {
    require_admin(&caller)?;
    let req = extract_validated_json(body)?;
    let not_found = || AppError::NotFound(format!("legal act {id} not found"));

    let _edit = state.edit_lock.lock().await;
    if !state.legal_acts.contains(&id) {
        return Err(not_found());
    }
    let replacement = req.into_record(id);

    if let Some(pool) = &state.db_pool {
        if !crate::db::legal_acts::update(pool, &replacement).await? {
            return Err(not_found());
        }
    }
    let updated = state
        .legal_acts
        .update(&id, |act| *act = replacement)
        .ok_or_else(not_found)?;

    tracing::info!(legal_act_id = %id, "legal act updated");
    Ok(Json(updated))
}

/// DELETE /v1/legal-acts/{id}: Remove a legal act.
#[utoipa::path(
    delete,
    path = "/v1/legal-acts/{id}",
    params(("id" = i64, Path, description = "Legal act ID")),
    responses(
        (status = 204, description = "Legal act deleted"),
        (status = 403, description = "Caller is not an admin", body = crate::error::ErrorBody),
        (status = 404, description = "Legal act not found", body = crate::error::ErrorBody),
    ),
    tag = "legal_acts"
)]
async fn delete_legal_act(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<LegalActId>,
) -> Result<StatusCode, AppError> {
    require_admin(&caller)?;
    let not_found = || AppError::NotFound(format!("legal act {id} not found"));

    let _edit = state.edit_lock.lock().await;
    if !state.legal_acts.contains(&id) {
        return Err(not_found());
    }
    if let Some(pool) = &state.db_pool {
        if !crate::db::legal_acts::delete(pool, id).await? {
            return Err(not_found());
        }
    }
    state.legal_acts.remove(&id).ok_or_else(not_found)?;

    tracing::info!(legal_act_id = %id, "legal act deleted");
    Ok(StatusCode::NO_CONTENT)
}
