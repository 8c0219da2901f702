//! # ecolk-rules: Rule Catalog and Requirement Generator
//!
//! Computes the compliance checklist of a newly registered site from its
//! [`SiteProfile`](ecolk_core::SiteProfile).
//!
//! ## Pieces
//!
//! - [`rule`]: administrator-authored [`GenerationRule`]s with tri-state
//!   triggers and field validation.
//! - [`matching`]: the named [`MatchPolicy`] deciding when a rule fires.
//!   The default is [`MatchPolicy::AnyTrigger`]: every set trigger is an
//!   independent sufficient condition.
//! - [`catalog`]: the [`RuleCatalog`] trait and its in-memory implementation.
//! - [`generator`]: [`RequirementGenerator`], which snapshots the active
//!   rules once, evaluates them, deduplicates by rule and emits requirements
//!   in catalog order.
//! - [`seed`]: built-in starter rules and the YAML loader.
//!
//! ## Determinism
//!
//! For an unchanged catalog and an identical profile, `generate` returns the
//! same list in the same order. Catalog edits affect later calls only and
//! never touch requirements that were already generated.
//!
//! Everything here is synchronous; callers running on an async runtime can
//! call straight in since no operation blocks on I/O.

pub mod catalog;
pub mod generator;
pub mod matching;
pub mod rule;
pub mod seed;

pub use catalog::{CatalogError, InMemoryRuleCatalog, RuleCatalog};
pub use generator::{RequirementGenerator, RuleMatch};
pub use matching::MatchPolicy;
pub use rule::{CategoryTriggers, GenerationRule, RuleDraft, TriggerCondition};
pub use seed::{default_rules, load_rules_file, load_rules_yaml, SeedError};
