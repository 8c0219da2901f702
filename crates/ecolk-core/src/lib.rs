//! # ecolk-core: Foundational Types for the Compliance Portal
//!
//! Leaf crate of the workspace. Defines the data contracts shared by the rule
//! engine (`ecolk-rules`) and the HTTP service (`ecolk-api`), plus the one
//! authorization predicate every site-scoped endpoint goes through.
//!
//! ## Contents
//!
//! - [`identity`]: integer-backed identifier newtypes (`SiteId`,
//!   `OrganizationId`, ...). No bare integers for identifiers.
//! - [`site`]: the three-attribute [`SiteProfile`] that drives requirement
//!   generation, and the `Site`/`Organization` records.
//! - [`requirement`]: generated and persisted compliance requirements.
//! - [`access`]: the access scope resolver: [`Principal`],
//!   [`can_access_site`], [`OrganizationScope`].
//!
//! ## Crate Policy
//!
//! - No dependencies on other `ecolk-*` crates.
//! - No I/O, no async, no `unsafe`.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod access;
pub mod error;
pub mod identity;
pub mod requirement;
pub mod site;

pub use access::{
    can_access_resource, can_access_site, OrganizationScope, OwnedResource, Principal, Role,
};
pub use error::ValidationError;
pub use identity::{
    ArtifactId, FinancialDocumentId, LegalActId, OrganizationId, RequirementId, RuleId,
    SequentialId, SiteId,
};
pub use requirement::{GeneratedRequirement, Requirement, RequirementStatus, RequirementUpdate};
pub use site::{NvosCategory, Organization, Site, SiteProfile, WaterUseType};
