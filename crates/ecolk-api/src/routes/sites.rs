//! # Site API
//!
//! Site registration, listing, detail and deletion.
//!
//! Registration is the only caller of the requirement generator: the
//! generator runs exactly once per site, and the site is stored together
//! with every requirement it produced. Later rule edits never touch the
//! requirements of existing sites.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use ecolk_core::error::require_text;
use ecolk_core::{
    NvosCategory, OrganizationId, Requirement, Site, SiteId, SiteProfile, WaterUseType,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::{authorize_site_access, require_admin, CallerIdentity};
use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::middleware::metrics::record_generated;
use crate::state::AppState;

pub const SITE_NAME_MAX_LEN: usize = 200;
pub const SITE_ADDRESS_MAX_LEN: usize = 500;

/// Request to register a site.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSiteRequest {
    pub organization_id: OrganizationId,
    pub name: String,
    pub address: String,
    pub category: NvosCategory,
    pub water_use_type: WaterUseType,
    #[serde(default)]
    pub has_byproducts: bool,
}

impl CreateSiteRequest {
    fn profile(&self) -> SiteProfile {
        SiteProfile {
            category: self.category,
            water_use_type: self.water_use_type,
            has_byproducts: self.has_byproducts,
        }
    }
}

impl Validate for CreateSiteRequest {
    fn validate(&self) -> Result<(), String> {
        require_text("name", &self.name, SITE_NAME_MAX_LEN)
            .and_then(|()| require_text("address", &self.address, SITE_ADDRESS_MAX_LEN))
            .map_err(|e| e.to_string())
    }
}

/// A site with its requirements.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SiteDetailResponse {
    pub site: Site,
    pub requirements: Vec<Requirement>,
}

/// Build the sites router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/sites", get(list_sites).post(create_site))
        .route("/v1/sites/{id}", get(get_site).delete(delete_site))
}

/// POST /v1/sites: Register a site and generate its requirements.
#[utoipa::path(
    post,
    path = "/v1/sites",
    request_body = CreateSiteRequest,
    responses(
        (status = 201, description = "Site registered with generated requirements", body = SiteDetailResponse),
        (status = 403, description = "Caller may not register sites for this organization", body = crate::error::ErrorBody),
        (status = 404, description = "Organization not found", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "sites"
)]
async fn create_site(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<CreateSiteRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SiteDetailResponse>), AppError> {
    let req = extract_validated_json(body)?;

    let owner = state
        .organizations
        .get(&req.organization_id)
        .map(|org| org.id);
    let organization_id = authorize_site_access(&caller, owner, || {
        format!("organization {} not found", req.organization_id)
    })?;

    let profile = req.profile();
    let generated = state.generator.generate(&profile)?;

    let site = Site {
        id: state.sites.allocate_id(),
        organization_id,
        name: req.name.trim().to_string(),
        address: req.address.trim().to_string(),
        profile,
    };
    let requirements: Vec<Requirement> = generated
        .into_iter()
        .map(|g| g.bind(state.requirements.allocate_id(), site.id))
        .collect();

    if let Some(pool) = &state.db_pool {
        crate::db::sites::insert_with_requirements(pool, &site, &requirements).await?;
    }

    // Requirements first, so a reader never sees the site without them.
    state
        .requirements
        .insert_all(requirements.iter().map(|r| (r.id, r.clone())));
    state.sites.insert(site.id, site.clone());

    record_generated(requirements.len());
    tracing::info!(
        site_id = %site.id,
        organization_id = %site.organization_id,
        category = %profile.category,
        requirements = requirements.len(),
        "site registered"
    );

    Ok((
        StatusCode::CREATED,
        Json(SiteDetailResponse { site, requirements }),
    ))
}

/// GET /v1/sites: List the sites visible to the caller.
#[utoipa::path(
    get,
    path = "/v1/sites",
    responses(
        (status = 200, description = "Visible sites in id order", body = Vec<Site>),
    ),
    tag = "sites"
)]
async fn list_sites(State(state): State<AppState>, caller: CallerIdentity) -> Json<Vec<Site>> {
    let scope = caller.principal().visible_organizations();
    Json(scope.filter(state.sites.list()).collect())
}

/// GET /v1/sites/{id}: Get a site with its requirements.
#[utoipa::path(
    get,
    path = "/v1/sites/{id}",
    params(("id" = i64, Path, description = "Site ID")),
    responses(
        (status = 200, description = "Site found", body = SiteDetailResponse),
        (status = 403, description = "Access denied", body = crate::error::ErrorBody),
        (status = 404, description = "Site not found (admins only)", body = crate::error::ErrorBody),
    ),
    tag = "sites"
)]
async fn get_site(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<SiteId>,
) -> Result<Json<SiteDetailResponse>, AppError> {
    let site = state.sites.get(&id);
    authorize_site_access(&caller, site.as_ref().map(|s| s.organization_id), || {
        format!("site {id} not found")
    })?;
    let site = site.ok_or_else(|| AppError::NotFound(format!("site {id} not found")))?;

    let requirements = state.requirements_of(id);
    Ok(Json(SiteDetailResponse { site, requirements }))
}

/// DELETE /v1/sites/{id}: Delete a site with everything attached to it.
#[utoipa::path(
    delete,
    path = "/v1/sites/{id}",
    params(("id" = i64, Path, description = "Site ID")),
    responses(
        (status = 204, description = "Site and dependent records deleted"),
        (status = 403, description = "Caller is not an admin", body = crate::error::ErrorBody),
        (status = 404, description = "Site not found", body = crate::error::ErrorBody),
    ),
    tag = "sites"
)]
async fn delete_site(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(id): Path<SiteId>,
) -> Result<StatusCode, AppError> {
    require_admin(&caller)?;
    authorize_site_access(&caller, state.site_owner(id), || format!("site {id} not found"))?;

    if let Some(pool) = &state.db_pool {
        if !crate::db::sites::delete(pool, id).await? {
            return Err(AppError::NotFound(format!("site {id} not found")));
        }
    }

    if state.sites.remove(&id).is_none() {
        return Err(AppError::NotFound(format!("site {id} not found")));
    }
    let requirements = state.requirements.remove_where(|r| r.site_id == id).len();
    let artifacts = state.artifacts.remove_where(|a| a.site_id == id).len();
    let documents = state
        .financial_documents
        .remove_where(|d| d.site_id == id)
        .len();

    tracing::info!(
        site_id = %id,
        requirements,
        artifacts,
        financial_documents = documents,
        "site deleted"
    );
    Ok(StatusCode::NO_CONTENT)
}
