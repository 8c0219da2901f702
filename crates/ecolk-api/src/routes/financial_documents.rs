//! # Financial Document API
//!
//! Contracts, invoices and acts issued for a site. Clients may read the
//! documents of their own sites; only admins record new ones.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::NaiveDate;
use ecolk_core::error::require_text;
use ecolk_core::SiteId;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::auth::{authorize_site_access, require_admin, site_not_found, CallerIdentity};
use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::state::{
    AppState, FinancialDocumentRecord, FinancialDocumentStatus, FinancialDocumentType,
};

pub const DOCUMENT_NUMBER_MAX_LEN: usize = 50;

/// Request to record a financial document.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RecordFinancialDocumentRequest {
    pub document_number: String,
    pub document_date: NaiveDate,
    /// Amount in kopecks.
    pub amount_kopecks: i64,
    pub document_type: FinancialDocumentType,
    /// Defaults to `draft`.
    #[serde(default)]
    pub status: Option<FinancialDocumentStatus>,
}

impl Validate for RecordFinancialDocumentRequest {
    fn validate(&self) -> Result<(), String> {
        require_text(
            "document_number",
            &self.document_number,
            DOCUMENT_NUMBER_MAX_LEN,
        )
        .map_err(|e| e.to_string())?;
        if self.amount_kopecks < 0 {
            return Err("amount_kopecks must not be negative".to_string());
        }
        Ok(())
    }
}

/// Build the financial documents router.
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/v1/sites/{id}/financial-documents",
        get(list_financial_documents).post(record_financial_document),
    )
}

/// GET /v1/sites/{id}/financial-documents: List a site's documents, newest first.
#[utoipa::path(
    get,
    path = "/v1/sites/{id}/financial-documents",
    params(("id" = i64, Path, description = "Site ID")),
    responses(
        (status = 200, description = "Documents, newest first", body = Vec<FinancialDocumentRecord>),
        (status = 403, description = "Access denied", body = crate::error::ErrorBody),
    ),
    tag = "financial_documents"
)]
async fn list_financial_documents(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(site_id): Path<SiteId>,
) -> Result<Json<Vec<FinancialDocumentRecord>>, AppError> {
    authorize_site_access(&caller, state.site_owner(site_id), || {
        format!("site {site_id} not found")
    })?;

    let mut documents = state
        .financial_documents
        .list_where(|d| d.site_id == site_id);
    documents.sort_by(|a, b| {
        b.document_date
            .cmp(&a.document_date)
            .then(b.id.cmp(&a.id))
    });
    Ok(Json(documents))
}

/// POST /v1/sites/{id}/financial-documents: Record a financial document.
#[utoipa::path(
    post,
    path = "/v1/sites/{id}/financial-documents",
    params(("id" = i64, Path, description = "Site ID")),
    request_body = RecordFinancialDocumentRequest,
    responses(
        (status = 201, description = "Document recorded", body = FinancialDocumentRecord),
        (status = 403, description = "Caller is not an admin", body = crate::error::ErrorBody),
        (status = 404, description = "Site not found", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "financial_documents"
)]
async fn record_financial_document(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(site_id): Path<SiteId>,
    body: Result<Json<RecordFinancialDocumentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<FinancialDocumentRecord>), AppError> {
    require_admin(&caller)?;
    authorize_site_access(&caller, state.site_owner(site_id), || {
        format!("site {site_id} not found")
    })?;
    let req = extract_validated_json(body)?;

    let record = FinancialDocumentRecord {
        id: state.financial_documents.allocate_id(),
        site_id,
        document_number: req.document_number.trim().to_string(),
        document_date: req.document_date,
        amount_kopecks: req.amount_kopecks,
        document_type: req.document_type,
        status: req.status.unwrap_or(FinancialDocumentStatus::Draft),
    };

    let site_gone = || site_not_found(&caller, || format!("site {site_id} not found"));
    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::documents::insert_financial_document(pool, &record).await {
            if crate::db::is_foreign_key_violation(&e) {
                return Err(site_gone());
            }
            return Err(e.into());
        }
    }
    if !state.insert_for_site(
        &state.financial_documents,
        site_id,
        record.id,
        record.clone(),
    ) {
        tracing::debug!(
            site_id = %site_id,
            "site deleted during financial document registration"
        );
        return Err(site_gone());
    }

    tracing::info!(
        document_id = %record.id,
        site_id = %site_id,
        document_type = record.document_type.as_str(),
        "financial document recorded"
    );
    Ok((StatusCode::CREATED, Json(record)))
}
