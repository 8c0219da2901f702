//! # Generation Rules
//!
//! A rule pairs a set of optional triggers with the requirement it produces.
//! Every trigger is tri-state: `None` means "not a reason to fire", and a set
//! value names the profile attribute value that is.
//!
//! Category triggers only fire on `Some(true)`. A category trigger stored as
//! `Some(false)` behaves exactly like `None`. Water use and byproduct
//! triggers fire when set and equal to the profile's value, so
//! `trigger_has_byproducts: Some(false)` fires for sites *without*
//! byproducts.
//!
//! A rule with no trigger set is a dead rule. It is accepted by the catalog
//! and never matches.

use std::collections::BTreeSet;

use ecolk_core::error::{limit_optional_text, require_text};
use ecolk_core::{NvosCategory, RuleId, ValidationError, WaterUseType};
use serde::{Deserialize, Serialize};

/// Maximum length of every free-text rule field.
pub const RULE_TEXT_MAX_LEN: usize = 500;

/// Per-category triggers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CategoryTriggers {
    #[serde(default)]
    pub i: Option<bool>,
    #[serde(default)]
    pub ii: Option<bool>,
    #[serde(default)]
    pub iii: Option<bool>,
    #[serde(default)]
    pub iv: Option<bool>,
}

impl CategoryTriggers {
    /// Triggers firing for exactly the given categories.
    pub fn for_categories(categories: &[NvosCategory]) -> Self {
        let mut triggers = Self::default();
        for category in categories {
            *triggers.slot_mut(*category) = Some(true);
        }
        triggers
    }

    /// The stored trigger for one category.
    pub fn get(&self, category: NvosCategory) -> Option<bool> {
        match category {
            NvosCategory::I => self.i,
            NvosCategory::II => self.ii,
            NvosCategory::III => self.iii,
            NvosCategory::IV => self.iv,
        }
    }

    fn slot_mut(&mut self, category: NvosCategory) -> &mut Option<bool> {
        match category {
            NvosCategory::I => &mut self.i,
            NvosCategory::II => &mut self.ii,
            NvosCategory::III => &mut self.iii,
            NvosCategory::IV => &mut self.iv,
        }
    }

    /// Whether the trigger for `category` fires.
    pub fn fires_for(&self, category: NvosCategory) -> bool {
        self.get(category) == Some(true)
    }

    /// Categories whose trigger fires.
    pub fn firing(&self) -> BTreeSet<NvosCategory> {
        NvosCategory::ALL
            .into_iter()
            .filter(|c| self.fires_for(*c))
            .collect()
    }
}

/// One set trigger of a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TriggerCondition {
    /// Fires when the site's category is one of these.
    Category(BTreeSet<NvosCategory>),
    /// Fires when the site uses water this way.
    WaterUse(WaterUseType),
    /// Fires when the site's byproducts flag equals this value.
    Byproducts(bool),
}

/// A rule stored in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct GenerationRule {
    pub id: RuleId,
    /// Shown in the admin UI only.
    pub description: String,
    #[serde(default)]
    pub category_triggers: CategoryTriggers,
    #[serde(default)]
    pub trigger_water_use_type: Option<WaterUseType>,
    #[serde(default)]
    pub trigger_has_byproducts: Option<bool>,
    pub generated_title: String,
    pub generated_basis: String,
    #[serde(default)]
    pub generated_penalty_risk: Option<String>,
    pub is_active: bool,
}

impl GenerationRule {
    /// Build a stored rule from a validated draft.
    pub fn from_draft(id: RuleId, draft: RuleDraft) -> Self {
        Self {
            id,
            description: draft.description,
            category_triggers: draft.category_triggers,
            trigger_water_use_type: draft.trigger_water_use_type,
            trigger_has_byproducts: draft.trigger_has_byproducts,
            generated_title: draft.generated_title,
            generated_basis: draft.generated_basis,
            generated_penalty_risk: draft.generated_penalty_risk,
            is_active: draft.is_active,
        }
    }

    /// The triggers that are set, in a fixed order: category, water use,
    /// byproducts. Empty for a dead rule.
    pub fn conditions(&self) -> Vec<TriggerCondition> {
        let mut conditions = Vec::with_capacity(3);
        let categories = self.category_triggers.firing();
        if !categories.is_empty() {
            conditions.push(TriggerCondition::Category(categories));
        }
        if let Some(water) = self.trigger_water_use_type {
            conditions.push(TriggerCondition::WaterUse(water));
        }
        if let Some(byproducts) = self.trigger_has_byproducts {
            conditions.push(TriggerCondition::Byproducts(byproducts));
        }
        conditions
    }

    pub fn is_dead(&self) -> bool {
        self.conditions().is_empty()
    }
}

fn default_active() -> bool {
    true
}

/// Input for creating or replacing a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RuleDraft {
    pub description: String,
    #[serde(default)]
    pub category_triggers: CategoryTriggers,
    #[serde(default)]
    pub trigger_water_use_type: Option<WaterUseType>,
    #[serde(default)]
    pub trigger_has_byproducts: Option<bool>,
    pub generated_title: String,
    pub generated_basis: String,
    #[serde(default)]
    pub generated_penalty_risk: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl RuleDraft {
    /// An active draft with no triggers set.
    pub fn new(
        description: impl Into<String>,
        generated_title: impl Into<String>,
        generated_basis: impl Into<String>,
    ) -> Self {
        Self {
            description: description.into(),
            category_triggers: CategoryTriggers::default(),
            trigger_water_use_type: None,
            trigger_has_byproducts: None,
            generated_title: generated_title.into(),
            generated_basis: generated_basis.into(),
            generated_penalty_risk: None,
            is_active: true,
        }
    }

    pub fn with_categories(mut self, categories: &[NvosCategory]) -> Self {
        self.category_triggers = CategoryTriggers::for_categories(categories);
        self
    }

    pub fn with_water_use(mut self, water_use: WaterUseType) -> Self {
        self.trigger_water_use_type = Some(water_use);
        self
    }

    pub fn with_byproducts(mut self, has_byproducts: bool) -> Self {
        self.trigger_has_byproducts = Some(has_byproducts);
        self
    }

    pub fn with_penalty_risk(mut self, penalty_risk: impl Into<String>) -> Self {
        self.generated_penalty_risk = Some(penalty_risk.into());
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// Check presence and length of the text fields.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("description", &self.description, RULE_TEXT_MAX_LEN)?;
        require_text("generated_title", &self.generated_title, RULE_TEXT_MAX_LEN)?;
        require_text("generated_basis", &self.generated_basis, RULE_TEXT_MAX_LEN)?;
        limit_optional_text(
            "generated_penalty_risk",
            self.generated_penalty_risk.as_deref(),
            RULE_TEXT_MAX_LEN,
        )
    }
}

impl From<GenerationRule> for RuleDraft {
    fn from(rule: GenerationRule) -> Self {
        Self {
            description: rule.description,
            category_triggers: rule.category_triggers,
            trigger_water_use_type: rule.trigger_water_use_type,
            trigger_has_byproducts: rule.trigger_has_byproducts,
            generated_title: rule.generated_title,
            generated_basis: rule.generated_basis,
            generated_penalty_risk: rule.generated_penalty_risk,
            is_active: rule.is_active,
        }
    }
}
