//! # Access Scope Resolver
//!
//! The single authorization predicate for site-scoped data. Every resource
//! reachable from a site (the site itself, its requirements, artifacts and
//! financial documents) belongs to exactly one organization through the
//! site's `organization_id`; that organization is the unit of scoping.
//!
//! ## Rules
//!
//! - `Admin` sees everything.
//! - Any other role sees a resource only when its own organization id is
//!   present and equal to the resource's owning organization.
//! - A non-admin principal without an organization is authenticated but sees
//!   nothing. This is a `false`, never an error.
//!
//! Listing endpoints use the bulk form, [`OrganizationScope`], obtained from
//! [`Principal::visible_organizations`]. Both forms are pure functions of
//! their inputs and take no locks.

use serde::{Deserialize, Serialize};

use crate::identity::OrganizationId;
use crate::site::Site;

/// Roles known to the portal.
///
/// Only `Admin` bypasses organization scoping. `Manager` and `Client` are
/// both bound to a client organization and are scoped identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Client,
    Manager,
    Admin,
}

impl Role {
    /// Return the string representation of this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Manager => "manager",
            Self::Admin => "admin",
        }
    }

    /// Parse a role name, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "client" => Some(Self::Client),
            "manager" => Some(Self::Manager),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authenticated caller as seen by the resolver.
///
/// Arrives already resolved from the authentication layer and is trusted
/// as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Principal {
    pub role: Role,
    /// Organization the principal is scoped to. Absent for admins and for
    /// unaffiliated accounts.
    pub organization_id: Option<OrganizationId>,
}

impl Principal {
    /// An administrator, not bound to any organization.
    pub const fn admin() -> Self {
        Self {
            role: Role::Admin,
            organization_id: None,
        }
    }

    /// A client-role member of `organization_id`.
    pub const fn client(organization_id: OrganizationId) -> Self {
        Self {
            role: Role::Client,
            organization_id: Some(organization_id),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// The set of organizations whose resources this principal may see.
    pub fn visible_organizations(&self) -> OrganizationScope {
        if self.is_admin() {
            return OrganizationScope::All;
        }
        match self.organization_id {
            Some(org) => OrganizationScope::Only(org),
            None => OrganizationScope::Nothing,
        }
    }
}

/// Whether `principal` may read or write data of a site owned by
/// `site_organization_id`.
pub fn can_access_site(principal: &Principal, site_organization_id: OrganizationId) -> bool {
    principal.visible_organizations().contains(site_organization_id)
}

/// A resource that belongs, directly or through its site, to one
/// organization.
pub trait OwnedResource {
    /// The owning organization.
    fn owning_organization(&self) -> OrganizationId;
}

impl OwnedResource for Site {
    fn owning_organization(&self) -> OrganizationId {
        self.organization_id
    }
}

impl<T: OwnedResource + ?Sized> OwnedResource for &T {
    fn owning_organization(&self) -> OrganizationId {
        (**self).owning_organization()
    }
}

impl OwnedResource for OrganizationId {
    fn owning_organization(&self) -> OrganizationId {
        *self
    }
}

/// [`can_access_site`] for any resource reachable from a site.
pub fn can_access_resource<R: OwnedResource + ?Sized>(principal: &Principal, resource: &R) -> bool {
    can_access_site(principal, resource.owning_organization())
}

/// Bulk form of the resolver: the organizations a principal may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrganizationScope {
    /// Every organization (administrators).
    All,
    /// Exactly one organization.
    Only(OrganizationId),
    /// No organization at all.
    Nothing,
}

impl OrganizationScope {
    pub fn contains(&self, organization_id: OrganizationId) -> bool {
        match self {
            Self::All => true,
            Self::Only(org) => *org == organization_id,
            Self::Nothing => false,
        }
    }

    /// Keep only the candidates whose owning organization is in scope.
    pub fn filter<I, R>(self, candidates: I) -> impl Iterator<Item = R>
    where
        I: IntoIterator<Item = R>,
        R: OwnedResource,
    {
        candidates
            .into_iter()
            .filter(move |r| self.contains(r.owning_organization()))
    }
}
