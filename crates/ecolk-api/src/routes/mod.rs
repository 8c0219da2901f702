//! # API Route Modules
//!
//! Each module exposes a `router()` returning `Router<AppState>`; the
//! routers are merged behind the auth middleware in [`crate::app`].
//!
//! Every handler that returns or mutates site-scoped data resolves the
//! caller's access through [`crate::auth::authorize_site_access`] or the
//! bulk [`ecolk_core::OrganizationScope`] before touching the stores.

pub mod artifacts;
pub mod calendar;
pub mod financial_documents;
pub mod legal_acts;
pub mod organizations;
pub mod requirements;
pub mod rules;
pub mod sites;
