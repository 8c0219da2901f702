//! # Rule Administration API
//!
//! Admin-only CRUD over the generation rule catalog, plus a dry run that
//! shows which rules a profile would fire. Edits apply to later site
//! registrations only.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use ecolk_core::{RuleId, SiteProfile};
use ecolk_rules::{GenerationRule, RuleCatalog, RuleDraft, RuleMatch};

use crate::auth::{require_admin, CallerIdentity};
use crate::error::AppError;
use crate::extractors::{extract_json, extract_validated_json};
use crate::state::AppState;

/// Build the rules router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/rules", get(list_rules).post(create_rule))
        .route("/v1/rules/preview", post(preview_rules))
        .route(
            "/v1/rules/{id}",
            get(get_rule).put(update_rule).delete(delete_rule),
        )
}

/// GET /v1/rules: List every rule in catalog order.
#[utoipa::path(
    get,
    path = "/v1/rules",
    responses(
        (status = 200, description = "All rules, active and inactive", body = Vec<GenerationRule>),
        (status = 403, description = "Caller is not an admin", body = crate::error::ErrorBody),
    ),
    tag = "rules"
)]
async fn list_rules(
    State(state): State<AppState>,
    caller: CallerIdentity,
) -> Result<Json<Vec<GenerationRule>>, AppError> {
    require_admin(&caller)?;
    Ok(Json(state.rules.list()?))
}

/// GET /v1/rules/{id}: Get one rule.
#[utoipa::path(
    get,
    path = "/v1/rules/{id}",
    params(("id" = i64, Path, description = "Rule ID")),
    responses(
        (status = 200, description = "Rule found", body = GenerationRule),
        (status = 404, description = "Rule not found", body = crate::error::ErrorBody),
    ),
    tag = "rules"
)]
async fn get_rule(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<RuleId>,
) -> Result<Json<GenerationRule>, AppError> {
    require_admin(&caller)?;
    Ok(Json(state.rules.get(id)?))
}

/// POST /v1/rules: Create a rule.
#[utoipa::path(
    post,
    path = "/v1/rules",
    request_body = RuleDraft,
    responses(
        (status = 201, description = "Rule created", body = GenerationRule),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "rules"
)]
async fn create_rule(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<RuleDraft>, JsonRejection>,
) -> Result<(StatusCode, Json<GenerationRule>), AppError> {
    require_admin(&caller)?;
    let draft = extract_validated_json(body)?;

    let rule = GenerationRule::from_draft(state.rules.allocate_id(), draft);
    if let Some(pool) = &state.db_pool {
        crate::db::rules::insert(pool, &rule).await?;
    }
    state.rules.insert_existing(rule.clone())?;

    if rule.is_dead() {
        tracing::warn!(rule_id = %rule.id, "rule has no triggers and will never fire");
    }
    tracing::info!(rule_id = %rule.id, active = rule.is_active, "rule created");
    Ok((StatusCode::CREATED, Json(rule)))
}

/// PUT /v1/rules/{id}: Replace every field of a rule.
#[utoipa::path(
    put,
    path = "/v1/rules/{id}",
    params(("id" = i64, Path, description = "Rule ID")),
    request_body = RuleDraft,
    responses(
        (status = 200, description = "Rule updated", body = GenerationRule),
        (status = 404, description = "Rule not found", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "rules"
)]
async fn update_rule(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<RuleId>,
    body: Result<Json<RuleDraft>, JsonRejection>,
) -> Result<Json<GenerationRule>, AppError> {
    require_admin(&caller)?;
    let draft = extract_validated_json(body)?;
    let _edit = state.edit_lock.lock().await;
    state.rules.get(id)?;

    if let Some(pool) = &state.db_pool {
        let replacement = GenerationRule::from_draft(id, draft.clone());
        if !crate::db::rules::update(pool, &replacement).await? {
            return Err(AppError::NotFound(format!("rule {id} not found")));
        }
    }
    let rule = state.rules.update(id, draft)?;

    tracing::info!(rule_id = %id, active = rule.is_active, "rule updated");
    Ok(Json(rule))
}

/// DELETE /v1/rules/{id}: Delete a rule.
#[utoipa::path(
    delete,
    path = "/v1/rules/{id}",
    params(("id" = i64, Path, description = "Rule ID")),
    responses(
        (status = 204, description = "Rule deleted"),
        (status = 404, description = "Rule not found", body = crate::error::ErrorBody),
    ),
    tag = "rules"
)]
async fn delete_rule(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<RuleId>,
) -> Result<StatusCode, AppError> {
    require_admin(&caller)?;
    let _edit = state.edit_lock.lock().await;
    state.rules.get(id)?;

    if let Some(pool) = &state.db_pool {
        if !crate::db::rules::delete(pool, id).await? {
            return Err(AppError::NotFound(format!("rule {id} not found")));
        }
    }
    state.rules.delete(id)?;

    tracing::info!(rule_id = %id, "rule deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /v1/rules/preview: Evaluate a profile against the active rules.
#[utoipa::path(
    post,
    path = "/v1/rules/preview",
    request_body = SiteProfile,
    responses(
        (status = 200, description = "Rules that would fire, with the triggers that fired them", body = Vec<RuleMatch>),
    ),
    tag = "rules"
)]
async fn preview_rules(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<SiteProfile>, JsonRejection>,
) -> Result<Json<Vec<RuleMatch>>, AppError> {
    require_admin(&caller)?;
    let profile = extract_json(body)?;
    Ok(Json(state.generator.preview(&profile)?))
}
