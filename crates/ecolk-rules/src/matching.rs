//! # Match Policies
//!
//! Decides whether a [`GenerationRule`] fires for a [`SiteProfile`].
//!
//! [`MatchPolicy::AnyTrigger`] is the portal's policy and the default: the
//! rule fires when *any* set trigger agrees with the profile. It cannot
//! express "category I *and* a well"; administrators who need that can
//! switch the deployment to [`MatchPolicy::AllTriggers`], which fires only
//! when every set trigger agrees. Under both policies a dead rule never
//! fires.

use ecolk_core::SiteProfile;
use serde::{Deserialize, Serialize};

use crate::rule::{GenerationRule, TriggerCondition};

/// How the set triggers of a rule combine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// OR: any set trigger is a sufficient reason to fire.
    #[default]
    AnyTrigger,
    /// AND: every set trigger must agree.
    AllTriggers,
}

impl MatchPolicy {
    /// Return the configuration name of this policy.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AnyTrigger => "any",
            Self::AllTriggers => "all",
        }
    }

    /// Parse a configuration value (`any` or `all`).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "any" | "any_trigger" | "or" => Some(Self::AnyTrigger),
            "all" | "all_triggers" | "and" => Some(Self::AllTriggers),
            _ => None,
        }
    }

    /// Whether `rule` fires for `profile`.
    pub fn matches(&self, rule: &GenerationRule, profile: &SiteProfile) -> bool {
        let conditions = rule.conditions();
        if conditions.is_empty() {
            return false;
        }
        match self {
            Self::AnyTrigger => conditions.iter().any(|c| condition_holds(c, profile)),
            Self::AllTriggers => conditions.iter().all(|c| condition_holds(c, profile)),
        }
    }

    /// The set triggers of `rule` that agree with `profile`, or an empty list
    /// when the rule does not fire under this policy.
    pub fn matched_conditions(
        &self,
        rule: &GenerationRule,
        profile: &SiteProfile,
    ) -> Vec<TriggerCondition> {
        if !self.matches(rule, profile) {
            return Vec::new();
        }
        rule.conditions()
            .into_iter()
            .filter(|c| condition_holds(c, profile))
            .collect()
    }
}

impl std::fmt::Display for MatchPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn condition_holds(condition: &TriggerCondition, profile: &SiteProfile) -> bool {
    match condition {
        TriggerCondition::Category(levels) => levels.contains(&profile.category),
        TriggerCondition::WaterUse(water) => *water == profile.water_use_type,
        TriggerCondition::Byproducts(flag) => *flag == profile.has_byproducts,
    }
}
