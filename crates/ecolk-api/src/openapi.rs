//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single OpenAPI 3.1 spec,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "EcologyLK Compliance Portal API",
        version = "0.1.0",
        description = "Site registration with rule-based generation of environmental compliance requirements, organization-scoped access to sites and their documents, and rule catalog administration."
    ),
    paths(
        // Organizations
        crate::routes::organizations::list_organizations,
        crate::routes::organizations::create_organization,
        // Sites
        crate::routes::sites::create_site,
        crate::routes::sites::list_sites,
        crate::routes::sites::get_site,
        crate::routes::sites::delete_site,
        // Requirements
        crate::routes::requirements::update_requirement,
        // Rules
        crate::routes::rules::list_rules,
        crate::routes::rules::get_rule,
        crate::routes::rules::create_rule,
        crate::routes::rules::update_rule,
        crate::routes::rules::delete_rule,
        crate::routes::rules::preview_rules,
        // Artifacts
        crate::routes::artifacts::list_artifacts,
        crate::routes::artifacts::register_artifact,
        crate::routes::artifacts::delete_artifact,
        // Financial documents
        crate::routes::financial_documents::list_financial_documents,
        crate::routes::financial_documents::record_financial_document,
        // Calendar
        crate::routes::calendar::list_events,
        // Legal acts
        crate::routes::legal_acts::list_legal_acts,
        crate::routes::legal_acts::create_legal_act,
        crate::routes::legal_acts::update_legal_act,
        crate::routes::legal_acts::delete_legal_act,
    ),
    components(schemas(
        // Core records
        ecolk_core::Organization,
        ecolk_core::Site,
        ecolk_core::SiteProfile,
        ecolk_core::NvosCategory,
        ecolk_core::WaterUseType,
        ecolk_core::Requirement,
        ecolk_core::RequirementStatus,
        ecolk_core::RequirementUpdate,
        // Rule catalog
        ecolk_rules::GenerationRule,
        ecolk_rules::RuleDraft,
        ecolk_rules::CategoryTriggers,
        ecolk_rules::TriggerCondition,
        ecolk_rules::RuleMatch,
        // State record types
        crate::state::ArtifactRecord,
        crate::state::FinancialDocumentRecord,
        crate::state::FinancialDocumentType,
        crate::state::FinancialDocumentStatus,
        crate::state::LegalActRecord,
        // Error types
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        // Request/response DTOs
        crate::routes::organizations::CreateOrganizationRequest,
        crate::routes::sites::CreateSiteRequest,
        crate::routes::sites::SiteDetailResponse,
        crate::routes::artifacts::RegisterArtifactRequest,
        crate::routes::financial_documents::RecordFinancialDocumentRequest,
        crate::routes::calendar::CalendarEvent,
        crate::routes::legal_acts::LegalActRequest,
    )),
    tags(
        (name = "organizations", description = "Organization administration"),
        (name = "sites", description = "Site registration and requirement generation"),
        (name = "requirements", description = "Requirement editing"),
        (name = "rules", description = "Generation rule catalog"),
        (name = "artifacts", description = "Artifact metadata"),
        (name = "financial_documents", description = "Contracts, invoices and acts"),
        (name = "calendar", description = "Deadline calendar"),
        (name = "legal_acts", description = "Legal-act reference directory"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json: Return the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_lists_site_and_rule_paths() {
        let spec = ApiDoc::openapi();
        let paths: Vec<&String> = spec.paths.paths.keys().collect();
        for expected in [
            "/v1/sites",
            "/v1/sites/{id}",
            "/v1/rules",
            "/v1/rules/preview",
            "/v1/calendar/events",
            "/v1/legal-acts",
            "/v1/legal-acts/{id}",
        ] {
            assert!(
                paths.iter().any(|p| p.as_str() == expected),
                "missing path {expected}"
            );
        }
    }
}
