//! # Identity Newtypes
//!
//! Domain-primitive newtypes for identifiers throughout the portal. Each
//! identifier is a distinct type: you cannot pass a [`SiteId`] where an
//! [`OrganizationId`] is expected.
//!
//! Identifiers are integer-backed and assigned in increasing order by the
//! owning store, so "catalog order" and "creation order" coincide with
//! ascending id order. On the wire every id is a plain JSON integer.

use serde::{Deserialize, Serialize};

/// Identifiers that a store can allocate from a monotonically increasing
/// sequence.
pub trait SequentialId: Copy + Ord + std::hash::Hash + Send + Sync + 'static {
    /// Wrap a raw sequence value.
    fn from_raw(raw: i64) -> Self;

    /// The raw sequence value (also the database primary key).
    fn raw(&self) -> i64;
}

macro_rules! sequential_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Create an identifier from its raw value.
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl SequentialId for $name {
            fn from_raw(raw: i64) -> Self {
                Self(raw)
            }

            fn raw(&self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> i64 {
                id.0
            }
        }
    };
}

sequential_id!(
    /// An organization ("client" legal entity) that owns one or more sites.
    OrganizationId
);

sequential_id!(
    /// A regulated physical facility.
    SiteId
);

sequential_id!(
    /// A generation rule in the rule catalog.
    RuleId
);

sequential_id!(
    /// A compliance requirement attached to a site.
    RequirementId
);

sequential_id!(
    /// Metadata record of an uploaded artifact.
    ArtifactId
);

sequential_id!(
    /// A financial document (contract, invoice, act) attached to a site.
    FinancialDocumentId
);

sequential_id!(
    /// An entry of the legal-act reference directory.
    LegalActId
);
