//! # Requirement Generator
//!
//! Turns a [`SiteProfile`] into the checklist of requirements a new site
//! must satisfy.
//!
//! ## Algorithm
//!
//! 1. Take one snapshot of the active rules from the injected catalog.
//! 2. Evaluate every rule against the profile under the configured
//!    [`MatchPolicy`].
//! 3. Keep each matching rule once, keyed by its id, however many of its
//!    triggers fired.
//! 4. Map each kept rule to a fresh [`GeneratedRequirement`] (not started,
//!    no deadline, nobody responsible), in catalog order.
//!
//! The snapshot is taken once per call, so a concurrent rule edit is seen
//! either entirely or not at all. An empty catalog or a profile matching no
//! rule yields an empty list; the only error is a storage failure reported
//! by the catalog.

use std::collections::BTreeMap;

use ecolk_core::{GeneratedRequirement, RuleId, SiteProfile};
use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogError, RuleCatalog};
use crate::matching::MatchPolicy;
use crate::rule::{GenerationRule, TriggerCondition};

/// One rule that fired for a profile, with the triggers that fired it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RuleMatch {
    pub rule_id: RuleId,
    pub generated_title: String,
    pub matched_conditions: Vec<TriggerCondition>,
}

/// Generates requirements from the rules of a catalog.
#[derive(Debug, Clone)]
pub struct RequirementGenerator<C> {
    catalog: C,
    policy: MatchPolicy,
}

impl<C: RuleCatalog> RequirementGenerator<C> {
    /// A generator using the default [`MatchPolicy::AnyTrigger`].
    pub fn new(catalog: C) -> Self {
        Self::with_policy(catalog, MatchPolicy::default())
    }

    pub fn with_policy(catalog: C, policy: MatchPolicy) -> Self {
        Self { catalog, policy }
    }

    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Compute the requirements for `profile` from the current active rules.
    pub fn generate(&self, profile: &SiteProfile) -> Result<Vec<GeneratedRequirement>, CatalogError> {
        let matched = self.matching_rules(profile)?;
        Ok(matched
            .into_values()
            .map(|rule| {
                GeneratedRequirement::new(
                    rule.generated_title,
                    rule.generated_basis,
                    rule.generated_penalty_risk,
                )
            })
            .collect())
    }

    /// Evaluate `profile` like [`generate`](Self::generate) but report which
    /// rules fired and why, without producing requirements.
    pub fn preview(&self, profile: &SiteProfile) -> Result<Vec<RuleMatch>, CatalogError> {
        let matched = self.matching_rules(profile)?;
        Ok(matched
            .into_values()
            .map(|rule| RuleMatch {
                rule_id: rule.id,
                matched_conditions: self.policy.matched_conditions(&rule, profile),
                generated_title: rule.generated_title,
            })
            .collect())
    }

    /// Matching active rules keyed by id. Keying by id deduplicates rules
    /// and fixes the output order to catalog order.
    fn matching_rules(
        &self,
        profile: &SiteProfile,
    ) -> Result<BTreeMap<RuleId, GenerationRule>, CatalogError> {
        let snapshot = self.catalog.active_rules()?;
        let evaluated = snapshot.len();

        let mut matched = BTreeMap::new();
        for rule in snapshot {
            if self.policy.matches(&rule, profile) {
                tracing::debug!(
                    rule_id = %rule.id,
                    conditions = ?self.policy.matched_conditions(&rule, profile),
                    "rule matched site profile"
                );
                matched.entry(rule.id).or_insert(rule);
            }
        }

        tracing::info!(
            category = %profile.category,
            water_use_type = %profile.water_use_type,
            has_byproducts = profile.has_byproducts,
            policy = %self.policy,
            rules_evaluated = evaluated,
            rules_matched = matched.len(),
            "requirement generation evaluated"
        );
        Ok(matched)
    }
}
