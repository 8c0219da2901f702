//! # Compliance Requirements
//!
//! A requirement starts life as a [`GeneratedRequirement`] produced by the
//! rule engine, is bound to a site as a [`Requirement`] when the site is
//! persisted, and is afterwards edited field by field through
//! [`RequirementUpdate`]. Title, basis and penalty risk are copies taken at
//! generation time, never live references to the rule that produced them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{limit_optional_text, ValidationError};
use crate::identity::{RequirementId, SiteId};

/// Maximum length of the responsible-person field.
pub const RESPONSIBLE_PERSON_MAX_LEN: usize = 200;

/// Progress of a requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum RequirementStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

impl RequirementStatus {
    /// Return the string representation of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }

    /// Parse the string form produced by [`RequirementStatus::as_str`].
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "not_started" => Some(Self::NotStarted),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

impl std::fmt::Display for RequirementStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A requirement produced by the generator, not yet attached to a site.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct GeneratedRequirement {
    pub title: String,
    /// Legal citation.
    pub basis: String,
    pub penalty_risk: Option<String>,
    pub status: RequirementStatus,
    pub deadline: Option<DateTime<Utc>>,
    pub responsible_person: Option<String>,
}

impl GeneratedRequirement {
    /// A fresh requirement: not started, no deadline, nobody responsible.
    pub fn new(title: impl Into<String>, basis: impl Into<String>, penalty_risk: Option<String>) -> Self {
        Self {
            title: title.into(),
            basis: basis.into(),
            penalty_risk,
            status: RequirementStatus::NotStarted,
            deadline: None,
            responsible_person: None,
        }
    }

    /// Attach this requirement to a site under the given id.
    pub fn bind(self, id: RequirementId, site_id: SiteId) -> Requirement {
        Requirement {
            id,
            site_id,
            title: self.title,
            basis: self.basis,
            penalty_risk: self.penalty_risk,
            status: self.status,
            deadline: self.deadline,
            responsible_person: self.responsible_person,
        }
    }
}

/// A requirement attached to a site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Requirement {
    pub id: RequirementId,
    pub site_id: SiteId,
    pub title: String,
    pub basis: String,
    pub penalty_risk: Option<String>,
    pub status: RequirementStatus,
    pub deadline: Option<DateTime<Utc>>,
    pub responsible_person: Option<String>,
}

impl Requirement {
    /// Replace the mutable fields with those of `update`.
    ///
    /// The update must already have been validated.
    pub fn apply(&mut self, update: &RequirementUpdate) {
        self.status = update.status;
        self.deadline = update.deadline;
        self.responsible_person = update.responsible_person.clone();
    }

    /// Whether the deadline has passed and the requirement is not completed.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status != RequirementStatus::Completed
            && self.deadline.is_some_and(|deadline| deadline < now)
    }
}

/// Replacement values for a requirement's mutable fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RequirementUpdate {
    pub status: RequirementStatus,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default)]
    pub responsible_person: Option<String>,
}

impl RequirementUpdate {
    /// Check field limits.
    pub fn validate(&self) -> Result<(), ValidationError> {
        limit_optional_text(
            "responsible_person",
            self.responsible_person.as_deref(),
            RESPONSIBLE_PERSON_MAX_LEN,
        )
    }
}
