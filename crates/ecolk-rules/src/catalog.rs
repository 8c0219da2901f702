//! # Rule Catalog
//!
//! Durable home of the generation rules. The generator depends only on the
//! [`RuleCatalog`] trait, so it can run against the in-memory catalog in
//! tests and against whatever backs the service in production.
//!
//! Catalog order is ascending [`RuleId`]. Ids are assigned from a
//! monotonically increasing sequence and never reused, so catalog order is
//! also creation order.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use ecolk_core::{RuleId, SequentialId, ValidationError};
use parking_lot::RwLock;
use thiserror::Error;

use crate::rule::{GenerationRule, RuleDraft};

/// Failures of catalog operations. None of them is fatal.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// No rule with this id exists.
    #[error("rule {0} not found")]
    NotFound(RuleId),

    /// The draft failed validation; nothing was written.
    #[error("invalid rule: {0}")]
    Validation(#[from] ValidationError),

    /// The backing store failed.
    #[error("rule storage error: {0}")]
    Storage(String),
}

/// Storage and retrieval of generation rules.
///
/// Implementations must let readers proceed concurrently, and every read
/// returns an owned snapshot: a caller never observes a half-applied edit.
pub trait RuleCatalog: Send + Sync {
    /// All rules with `is_active == true`, in catalog order.
    fn active_rules(&self) -> Result<Vec<GenerationRule>, CatalogError>;

    /// Every rule, active or not, in catalog order.
    fn list(&self) -> Result<Vec<GenerationRule>, CatalogError>;

    fn get(&self, id: RuleId) -> Result<GenerationRule, CatalogError>;

    /// Validate and store a new rule under a fresh id.
    fn create(&self, draft: RuleDraft) -> Result<GenerationRule, CatalogError>;

    /// Validate and replace every field of an existing rule.
    fn update(&self, id: RuleId, draft: RuleDraft) -> Result<GenerationRule, CatalogError>;

    /// Remove a rule, returning it.
    fn delete(&self, id: RuleId) -> Result<GenerationRule, CatalogError>;

    /// Store a rule that already has an id (hydration from durable storage).
    /// Replaces any rule with the same id.
    fn insert_existing(&self, rule: GenerationRule) -> Result<(), CatalogError>;
}

impl<C: RuleCatalog + ?Sized> RuleCatalog for Arc<C> {
    fn active_rules(&self) -> Result<Vec<GenerationRule>, CatalogError> {
        (**self).active_rules()
    }

    fn list(&self) -> Result<Vec<GenerationRule>, CatalogError> {
        (**self).list()
    }

    fn get(&self, id: RuleId) -> Result<GenerationRule, CatalogError> {
        (**self).get(id)
    }

    fn create(&self, draft: RuleDraft) -> Result<GenerationRule, CatalogError> {
        (**self).create(draft)
    }

    fn update(&self, id: RuleId, draft: RuleDraft) -> Result<GenerationRule, CatalogError> {
        (**self).update(id, draft)
    }

    fn delete(&self, id: RuleId) -> Result<GenerationRule, CatalogError> {
        (**self).delete(id)
    }

    fn insert_existing(&self, rule: GenerationRule) -> Result<(), CatalogError> {
        (**self).insert_existing(rule)
    }
}

/// Catalog held in process memory.
///
/// Backed by a `BTreeMap` so iteration is in id order without sorting.
#[derive(Debug)]
pub struct InMemoryRuleCatalog {
    rules: RwLock<BTreeMap<RuleId, GenerationRule>>,
    next_id: AtomicI64,
}

impl InMemoryRuleCatalog {
    pub fn new() -> Self {
        Self {
            rules: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// A catalog pre-populated from drafts, in the given order.
    ///
    /// Fails on the first invalid draft.
    pub fn with_rules<I>(drafts: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = RuleDraft>,
    {
        let catalog = Self::new();
        for draft in drafts {
            catalog.create(draft)?;
        }
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.rules.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.read().is_empty()
    }

    /// Reserve the next id without storing anything.
    ///
    /// Used when a rule must be written to durable storage under its id
    /// before it becomes visible here.
    pub fn allocate_id(&self) -> RuleId {
        RuleId::from_raw(self.next_id.fetch_add(1, Ordering::SeqCst))
    }
}

impl Default for InMemoryRuleCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleCatalog for InMemoryRuleCatalog {
    fn active_rules(&self) -> Result<Vec<GenerationRule>, CatalogError> {
        Ok(self
            .rules
            .read()
            .values()
            .filter(|r| r.is_active)
            .cloned()
            .collect())
    }

    fn list(&self) -> Result<Vec<GenerationRule>, CatalogError> {
        Ok(self.rules.read().values().cloned().collect())
    }

    fn get(&self, id: RuleId) -> Result<GenerationRule, CatalogError> {
        self.rules
            .read()
            .get(&id)
            .cloned()
            .ok_or(CatalogError::NotFound(id))
    }

    fn create(&self, draft: RuleDraft) -> Result<GenerationRule, CatalogError> {
        draft.validate()?;
        let rule = GenerationRule::from_draft(self.allocate_id(), draft);
        self.rules.write().insert(rule.id, rule.clone());
        Ok(rule)
    }

    fn update(&self, id: RuleId, draft: RuleDraft) -> Result<GenerationRule, CatalogError> {
        draft.validate()?;
        let mut rules = self.rules.write();
        let slot = rules.get_mut(&id).ok_or(CatalogError::NotFound(id))?;
        *slot = GenerationRule::from_draft(id, draft);
        Ok(slot.clone())
    }

    fn delete(&self, id: RuleId) -> Result<GenerationRule, CatalogError> {
        self.rules
            .write()
            .remove(&id)
            .ok_or(CatalogError::NotFound(id))
    }

    fn insert_existing(&self, rule: GenerationRule) -> Result<(), CatalogError> {
        self.next_id.fetch_max(rule.id.raw().saturating_add(1), Ordering::SeqCst);
        self.rules.write().insert(rule.id, rule);
        Ok(())
    }
}
