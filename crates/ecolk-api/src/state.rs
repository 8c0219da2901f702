//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor.
//!
//! ## Architecture
//!
//! In-memory [`Store`]s are authoritative for reads. When a Postgres pool is
//! configured every write goes to the database first, then to the store,
//! and [`AppState::hydrate_from_db`] reloads the stores on startup.
//!
//! Edits that replace an existing row (requirements, rules, legal acts)
//! hold [`AppState::edit_lock`] across the database write and the store
//! update, so Postgres and memory see concurrent edits in the same order.
//!
//! The rule catalog is shared between the rule administration routes and
//! the [`RequirementGenerator`] through an `Arc`, so a rule edit is visible
//! to the next generation without any extra wiring.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use ecolk_core::{
    ArtifactId, FinancialDocumentId, LegalActId, Organization, OrganizationId, OwnedResource,
    Requirement, RequirementId, SequentialId, Site, SiteId,
};
use ecolk_rules::{InMemoryRuleCatalog, MatchPolicy, RequirementGenerator, RuleCatalog};
use metrics_exporter_prometheus::PrometheusHandle;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tokio::sync::Mutex;
use utoipa::ToSchema;
use uuid::Uuid;

// -- Generic In-Memory Store --------------------------------------------------

/// Thread-safe, cloneable in-memory store keyed by a sequential id.
///
/// The lock is `parking_lot` and is never held across `.await` points.
/// Ids come from a shared counter that only moves forward, including past
/// ids loaded from the database, so an id is never handed out twice.
#[derive(Debug)]
pub struct Store<K: SequentialId, T: Clone + Send + Sync> {
    data: Arc<RwLock<BTreeMap<K, T>>>,
    next_id: Arc<AtomicI64>,
}

impl<K: SequentialId, T: Clone + Send + Sync> Clone for Store<K, T> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
            next_id: Arc::clone(&self.next_id),
        }
    }
}

impl<K: SequentialId, T: Clone + Send + Sync> Store<K, T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(BTreeMap::new())),
            next_id: Arc::new(AtomicI64::new(1)),
        }
    }

    /// Reserve a fresh id.
    pub fn allocate_id(&self) -> K {
        K::from_raw(self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    /// Insert a record, returning the previous value if the key existed.
    pub fn insert(&self, id: K, value: T) -> Option<T> {
        self.next_id.fetch_max(id.raw().saturating_add(1), Ordering::SeqCst);
        self.data.write().insert(id, value)
    }

    /// Insert several records under one write lock.
    pub fn insert_all(&self, records: impl IntoIterator<Item = (K, T)>) {
        let mut guard = self.data.write();
        for (id, value) in records {
            self.next_id.fetch_max(id.raw().saturating_add(1), Ordering::SeqCst);
            guard.insert(id, value);
        }
    }

    /// Retrieve a record by ID.
    pub fn get(&self, id: &K) -> Option<T> {
        self.data.read().get(id).cloned()
    }

    /// List all records in ascending id order.
    pub fn list(&self) -> Vec<T> {
        self.data.read().values().cloned().collect()
    }

    /// List the records matching `predicate`, in ascending id order.
    pub fn list_where(&self, predicate: impl Fn(&T) -> bool) -> Vec<T> {
        self.data
            .read()
            .values()
            .filter(|v| predicate(v))
            .cloned()
            .collect()
    }

    /// Update a record in place. Returns the updated record, or `None` if not found.
    pub fn update(&self, id: &K, f: impl FnOnce(&mut T)) -> Option<T> {
        let mut guard = self.data.write();
        let entry = guard.get_mut(id)?;
        f(entry);
        Some(entry.clone())
    }

    /// Atomically read-validate-update a record.
    ///
    /// Returns `None` if the record doesn't exist, or `Some(result)` with
    /// the closure's `Result`.
    pub fn try_update<R, E>(
        &self,
        id: &K,
        f: impl FnOnce(&mut T) -> Result<R, E>,
    ) -> Option<Result<R, E>> {
        self.data.write().get_mut(id).map(f)
    }

    /// Remove a record by ID.
    pub fn remove(&self, id: &K) -> Option<T> {
        self.data.write().remove(id)
    }

    /// Remove every record matching `predicate`, returning them.
    pub fn remove_where(&self, predicate: impl Fn(&T) -> bool) -> Vec<T> {
        let mut guard = self.data.write();
        let doomed: Vec<K> = guard
            .iter()
            .filter(|(_, v)| predicate(v))
            .map(|(k, _)| *k)
            .collect();
        doomed.iter().filter_map(|k| guard.remove(k)).collect()
    }

    /// Check if a record exists.
    pub fn contains(&self, id: &K) -> bool {
        self.data.read().contains_key(id)
    }

    /// Return the number of records.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K: SequentialId, T: Clone + Send + Sync> Default for Store<K, T> {
    fn default() -> Self {
        Self::new()
    }
}

// -- Site-Owned Record Types --------------------------------------------------

/// Metadata of an uploaded artifact. The bytes live in external storage
/// under `stored_file_name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ArtifactRecord {
    pub id: ArtifactId,
    pub site_id: SiteId,
    /// Optional link to the requirement this artifact evidences.
    pub requirement_id: Option<RequirementId>,
    pub original_file_name: String,
    /// Server-assigned storage key.
    pub stored_file_name: Uuid,
    pub mime_type: String,
    pub file_size: i64,
    pub uploaded_at: DateTime<Utc>,
}

/// Kind of a financial document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FinancialDocumentType {
    Contract,
    Invoice,
    Act,
}

impl FinancialDocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Contract => "contract",
            Self::Invoice => "invoice",
            Self::Act => "act",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "contract" => Some(Self::Contract),
            "invoice" => Some(Self::Invoice),
            "act" => Some(Self::Act),
            _ => None,
        }
    }
}

/// Payment state of a financial document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FinancialDocumentStatus {
    Draft,
    Sent,
    Paid,
    Overdue,
}

impl FinancialDocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Sent => "sent",
            Self::Paid => "paid",
            Self::Overdue => "overdue",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(Self::Draft),
            "sent" => Some(Self::Sent),
            "paid" => Some(Self::Paid),
            "overdue" => Some(Self::Overdue),
            _ => None,
        }
    }
}

/// A contract, invoice or act attached to a site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FinancialDocumentRecord {
    pub id: FinancialDocumentId,
    pub site_id: SiteId,
    pub document_number: String,
    pub document_date: NaiveDate,
    /// Amount in kopecks.
    pub amount_kopecks: i64,
    pub document_type: FinancialDocumentType,
    pub status: FinancialDocumentStatus,
}

// -- Reference Directory ------------------------------------------------------

/// An entry of the legal-act reference directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LegalActRecord {
    pub id: LegalActId,
    pub title: String,
    /// Short citation, e.g. "FZ-7".
    pub reference_code: String,
    pub description: Option<String>,
    pub external_link: Option<String>,
}

// -- Application Configuration ------------------------------------------------

/// Error reading configuration from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Application configuration.
#[derive(Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Static bearer token secret. If `None`, authentication is disabled.
    pub auth_token: Option<String>,
    /// How rule triggers combine during generation.
    pub match_policy: MatchPolicy,
    /// YAML file of seed rules, used instead of the built-in defaults.
    pub rules_seed_path: Option<String>,
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`, treating blank values as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let port = match get("PORT") {
            Some(raw) => raw.trim().parse().map_err(|e| ConfigError::Invalid {
                name: "PORT",
                reason: format!("{e}"),
            })?,
            None => defaults.port,
        };

        let match_policy = match get("RULE_MATCH_POLICY") {
            Some(raw) => MatchPolicy::parse(&raw).ok_or_else(|| ConfigError::Invalid {
                name: "RULE_MATCH_POLICY",
                reason: format!("expected 'any' or 'all', got '{raw}'"),
            })?,
            None => defaults.match_policy,
        };

        Ok(Self {
            port,
            auth_token: get("AUTH_TOKEN"),
            match_policy,
            rules_seed_path: get("RULES_SEED_PATH"),
        })
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field(
                "auth_token",
                &self.auth_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("match_policy", &self.match_policy)
            .field("rules_seed_path", &self.rules_seed_path)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            auth_token: None,
            match_policy: MatchPolicy::AnyTrigger,
            rules_seed_path: None,
        }
    }
}

// -- Application State --------------------------------------------------------

/// The generator type used by the service.
pub type SiteRequirementGenerator = RequirementGenerator<Arc<InMemoryRuleCatalog>>;

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub organizations: Store<OrganizationId, Organization>,
    pub sites: Store<SiteId, Site>,
    pub requirements: Store<RequirementId, Requirement>,
    pub artifacts: Store<ArtifactId, ArtifactRecord>,
    pub financial_documents: Store<FinancialDocumentId, FinancialDocumentRecord>,
    pub legal_acts: Store<LegalActId, LegalActRecord>,

    /// Rule catalog, shared with `generator`.
    pub rules: Arc<InMemoryRuleCatalog>,
    pub generator: Arc<SiteRequirementGenerator>,

    /// When `Some`, every write is persisted to Postgres before it is
    /// applied in memory.
    pub db_pool: Option<PgPool>,

    /// Prometheus recorder handle, when the binary installed one.
    pub metrics: Option<PrometheusHandle>,

    /// Serializes edits of existing rows across the database write and the
    /// in-memory update.
    pub edit_lock: Arc<Mutex<()>>,

    pub config: AppConfig,
}

impl AppState {
    /// State with default configuration and an empty rule catalog.
    pub fn new() -> Self {
        Self::with_config(AppConfig::default(), None)
    }

    /// State with the given configuration and optional database pool.
    pub fn with_config(config: AppConfig, db_pool: Option<PgPool>) -> Self {
        let rules = Arc::new(InMemoryRuleCatalog::new());
        let generator = Arc::new(RequirementGenerator::with_policy(
            Arc::clone(&rules),
            config.match_policy,
        ));
        Self {
            organizations: Store::new(),
            sites: Store::new(),
            requirements: Store::new(),
            artifacts: Store::new(),
            financial_documents: Store::new(),
            legal_acts: Store::new(),
            rules,
            generator,
            db_pool,
            metrics: None,
            edit_lock: Arc::new(Mutex::new(())),
            config,
        }
    }

    /// Attach a Prometheus handle for the `/metrics` endpoint.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Owning organization of a site, if the site exists.
    pub fn site_owner(&self, site_id: SiteId) -> Option<OrganizationId> {
        self.sites.get(&site_id).map(|s| s.owning_organization())
    }

    /// Insert a record owned by `site_id`, keeping it only while the site
    /// exists.
    ///
    /// Returns `false`, with the record removed again, when the site is gone
    /// after the insert. Site deletion removes the site before sweeping its
    /// children, so a racing insert is caught either here or by that sweep.
    pub fn insert_for_site<K: SequentialId, T: Clone + Send + Sync>(
        &self,
        store: &Store<K, T>,
        site_id: SiteId,
        id: K,
        record: T,
    ) -> bool {
        store.insert(id, record);
        if self.sites.contains(&site_id) {
            return true;
        }
        store.remove(&id);
        false
    }

    /// Requirements of one site, in id order.
    pub fn requirements_of(&self, site_id: SiteId) -> Vec<Requirement> {
        self.requirements.list_where(|r| r.site_id == site_id)
    }

    /// Hydrate in-memory stores from the database.
    ///
    /// Called once on startup when a database pool is available.
    pub async fn hydrate_from_db(&self) -> Result<(), String> {
        let pool = match &self.db_pool {
            Some(pool) => pool,
            None => return Ok(()),
        };

        let organizations = crate::db::organizations::load_all(pool)
            .await
            .map_err(|e| format!("failed to load organizations: {e}"))?;
        let organization_count = organizations.len();
        self.organizations
            .insert_all(organizations.into_iter().map(|o| (o.id, o)));

        let sites = crate::db::sites::load_all(pool)
            .await
            .map_err(|e| format!("failed to load sites: {e}"))?;
        let site_count = sites.len();
        self.sites.insert_all(sites.into_iter().map(|s| (s.id, s)));

        let requirements = crate::db::sites::load_all_requirements(pool)
            .await
            .map_err(|e| format!("failed to load requirements: {e}"))?;
        let requirement_count = requirements.len();
        self.requirements
            .insert_all(requirements.into_iter().map(|r| (r.id, r)));

        let rules = crate::db::rules::load_all(pool)
            .await
            .map_err(|e| format!("failed to load rules: {e}"))?;
        let rule_count = rules.len();
        for rule in rules {
            self.rules
                .insert_existing(rule)
                .map_err(|e| format!("failed to hydrate rule catalog: {e}"))?;
        }

        let artifacts = crate::db::documents::load_all_artifacts(pool)
            .await
            .map_err(|e| format!("failed to load artifacts: {e}"))?;
        let artifact_count = artifacts.len();
        self.artifacts
            .insert_all(artifacts.into_iter().map(|a| (a.id, a)));

        let documents = crate::db::documents::load_all_financial_documents(pool)
            .await
            .map_err(|e| format!("failed to load financial documents: {e}"))?;
        let document_count = documents.len();
        self.financial_documents
            .insert_all(documents.into_iter().map(|d| (d.id, d)));

        let legal_acts = crate::db::legal_acts::load_all(pool)
            .await
            .map_err(|e| format!("failed to load legal acts: {e}"))?;
        let legal_act_count = legal_acts.len();
        self.legal_acts
            .insert_all(legal_acts.into_iter().map(|a| (a.id, a)));

        tracing::info!(
            organizations = organization_count,
            sites = site_count,
            requirements = requirement_count,
            rules = rule_count,
            artifacts = artifact_count,
            financial_documents = document_count,
            legal_acts = legal_act_count,
            "Hydrated in-memory stores from database"
        );

        Ok(())
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecolk_core::{NvosCategory, SiteProfile, WaterUseType};
    use std::collections::HashMap;

    fn site(id: i64, org: i64) -> Site {
        Site {
            id: SiteId::new(id),
            organization_id: OrganizationId::new(org),
            name: format!("site {id}"),
            address: "addr".into(),
            profile: SiteProfile {
                category: NvosCategory::II,
                water_use_type: WaterUseType::None,
                has_byproducts: false,
            },
        }
    }

    // -- Store tests ----------------------------------------------------------

    #[test]
    fn store_allocates_increasing_ids() {
        let store: Store<SiteId, Site> = Store::new();
        let a = store.allocate_id();
        let b = store.allocate_id();
        assert!(a < b);
    }

    #[test]
    fn store_insert_advances_allocation_past_existing_ids() {
        let store: Store<SiteId, Site> = Store::new();
        store.insert(SiteId::new(10), site(10, 1));
        assert_eq!(store.allocate_id(), SiteId::new(11));
    }

    #[test]
    fn store_list_is_id_ordered() {
        let store: Store<SiteId, Site> = Store::new();
        store.insert_all([3, 1, 2].map(|i| (SiteId::new(i), site(i, 1))));
        let ids: Vec<_> = store.list().into_iter().map(|s| s.id.raw()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn store_update_and_try_update() {
        let store: Store<SiteId, Site> = Store::new();
        store.insert(SiteId::new(1), site(1, 1));
        let updated = store
            .update(&SiteId::new(1), |s| s.name = "renamed".into())
            .unwrap();
        assert_eq!(updated.name, "renamed");
        assert!(store.update(&SiteId::new(2), |_| {}).is_none());

        let result: Option<Result<(), &str>> =
            store.try_update(&SiteId::new(1), |_| Err("rejected"));
        assert_eq!(result, Some(Err("rejected")));
    }

    #[test]
    fn store_remove_where() {
        let store: Store<SiteId, Site> = Store::new();
        store.insert_all((1..=4).map(|i| (SiteId::new(i), site(i, i % 2))));
        let removed = store.remove_where(|s| s.organization_id == OrganizationId::new(1));
        assert_eq!(removed.len(), 2);
        assert_eq!(store.len(), 2);
        assert!(!store.contains(&SiteId::new(1)));
    }

    #[test]
    fn store_insert_at_max_id_does_not_overflow() {
        let store: Store<SiteId, Site> = Store::new();
        store.insert(SiteId::new(i64::MAX), site(i64::MAX, 1));
        store.insert_all([(SiteId::new(i64::MAX), site(i64::MAX, 1))]);
        assert!(store.contains(&SiteId::new(i64::MAX)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn store_clone_shares_data() {
        let store: Store<SiteId, Site> = Store::new();
        let clone = store.clone();
        clone.insert(SiteId::new(1), site(1, 1));
        assert_eq!(store.len(), 1);
        assert!(!store.is_empty());
    }

    // -- Config tests ---------------------------------------------------------

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn config_defaults() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.port, 8080);
        assert!(config.auth_token.is_none());
        assert_eq!(config.match_policy, MatchPolicy::AnyTrigger);
        assert!(config.rules_seed_path.is_none());
    }

    #[test]
    fn config_reads_values() {
        let config = AppConfig::from_lookup(lookup(&[
            ("PORT", "9000"),
            ("AUTH_TOKEN", "secret"),
            ("RULE_MATCH_POLICY", "all"),
            ("RULES_SEED_PATH", "/etc/ecolk/rules.yaml"),
        ]))
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.auth_token.as_deref(), Some("secret"));
        assert_eq!(config.match_policy, MatchPolicy::AllTriggers);
        assert_eq!(config.rules_seed_path.as_deref(), Some("/etc/ecolk/rules.yaml"));
    }

    #[test]
    fn config_rejects_bad_values() {
        assert!(AppConfig::from_lookup(lookup(&[("PORT", "eighty")])).is_err());
        let err = AppConfig::from_lookup(lookup(&[("RULE_MATCH_POLICY", "xor")])).unwrap_err();
        assert!(err.to_string().contains("RULE_MATCH_POLICY"));
    }

    #[test]
    fn config_blank_token_disables_auth() {
        let config = AppConfig::from_lookup(lookup(&[("AUTH_TOKEN", "  ")])).unwrap();
        assert!(config.auth_token.is_none());
    }

    #[test]
    fn config_debug_redacts_token() {
        let config = AppConfig {
            auth_token: Some("super-secret".into()),
            ..AppConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    // -- AppState tests -------------------------------------------------------

    #[test]
    fn generator_sees_catalog_edits() {
        let state = AppState::new();
        let profile = site(1, 1).profile;
        assert!(state.generator.generate(&profile).unwrap().is_empty());

        state
            .rules
            .create(
                ecolk_rules::RuleDraft::new("d", "Declaration", "b")
                    .with_categories(&[NvosCategory::II]),
            )
            .unwrap();
        assert_eq!(state.generator.generate(&profile).unwrap().len(), 1);
    }

    #[test]
    fn match_policy_flows_into_generator() {
        let config = AppConfig {
            match_policy: MatchPolicy::AllTriggers,
            ..AppConfig::default()
        };
        let state = AppState::with_config(config, None);
        assert_eq!(state.generator.policy(), MatchPolicy::AllTriggers);
    }

    #[test]
    fn site_owner_lookup() {
        let state = AppState::new();
        state.sites.insert(SiteId::new(4), site(4, 7));
        assert_eq!(state.site_owner(SiteId::new(4)), Some(OrganizationId::new(7)));
        assert_eq!(state.site_owner(SiteId::new(5)), None);
    }

    fn artifact(id: i64, site_id: i64) -> ArtifactRecord {
        ArtifactRecord {
            id: ArtifactId::new(id),
            site_id: SiteId::new(site_id),
            requirement_id: None,
            original_file_name: "permit.pdf".into(),
            stored_file_name: Uuid::new_v4(),
            mime_type: "application/pdf".into(),
            file_size: 1024,
            uploaded_at: Utc::now(),
        }
    }

    #[test]
    fn insert_for_site_keeps_record_of_existing_site() {
        let state = AppState::new();
        state.sites.insert(SiteId::new(1), site(1, 1));
        let kept = state.insert_for_site(
            &state.artifacts,
            SiteId::new(1),
            ArtifactId::new(1),
            artifact(1, 1),
        );
        assert!(kept);
        assert!(state.artifacts.contains(&ArtifactId::new(1)));
    }

    #[test]
    fn insert_for_site_drops_record_of_deleted_site() {
        let state = AppState::new();
        state.sites.insert(SiteId::new(1), site(1, 1));
        // Registration passed its access check, then the site was deleted
        // and its children swept before the record landed.
        state.sites.remove(&SiteId::new(1));
        state.artifacts.remove_where(|a| a.site_id == SiteId::new(1));

        let kept = state.insert_for_site(
            &state.artifacts,
            SiteId::new(1),
            ArtifactId::new(1),
            artifact(1, 1),
        );
        assert!(!kept);
        assert!(state.artifacts.is_empty());
    }

    #[test]
    fn insert_for_site_leaves_other_sites_untouched() {
        let state = AppState::new();
        state.sites.insert(SiteId::new(2), site(2, 1));
        state.artifacts.insert(ArtifactId::new(1), artifact(1, 2));
        assert!(!state.insert_for_site(
            &state.artifacts,
            SiteId::new(9),
            ArtifactId::new(2),
            artifact(2, 9)
        ));
        assert_eq!(state.artifacts.len(), 1);
    }

    #[tokio::test]
    async fn hydrate_without_pool_is_noop() {
        let state = AppState::new();
        state.hydrate_from_db().await.unwrap();
        assert!(state.sites.is_empty());
    }
}
