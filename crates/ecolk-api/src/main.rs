//! # ecolk-api: Binary Entry Point
//!
//! Reads configuration from the environment, connects the optional
//! database, seeds an empty rule catalog and serves the API.

use anyhow::Context;
use ecolk_api::state::{AppConfig, AppState};
use ecolk_rules::{GenerationRule, RuleCatalog, RuleDraft};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::from_env().context("invalid configuration")?;
    tracing::info!(?config, "configuration loaded");
    let port = config.port;

    // Optional; absent means in-memory only.
    let db_pool = ecolk_api::db::init_pool()
        .await
        .context("database initialization failed")?;

    let recorder = PrometheusBuilder::new()
        .install_recorder()
        .context("failed to install Prometheus recorder")?;

    let state = AppState::with_config(config, db_pool).with_metrics(recorder);

    state
        .hydrate_from_db()
        .await
        .map_err(anyhow::Error::msg)
        .context("database hydration failed")?;

    seed_rules(&state).await?;

    let app = ecolk_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("ecolk API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Structured logging; JSON lines when `LOG_FORMAT=json`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Fill an empty catalog from `RULES_SEED_PATH` or the built-in rules.
///
/// A catalog that already holds rules (hydrated from the database) is left
/// untouched.
async fn seed_rules(state: &AppState) -> anyhow::Result<()> {
    if !state.rules.is_empty() {
        tracing::info!(rules = state.rules.len(), "rule catalog already populated");
        return Ok(());
    }

    let drafts: Vec<RuleDraft> = match &state.config.rules_seed_path {
        Some(path) => ecolk_rules::load_rules_file(path)
            .with_context(|| format!("failed to seed rules from {path}"))?,
        None => ecolk_rules::default_rules(),
    };

    for draft in drafts {
        draft.validate().context("invalid seed rule")?;
        let rule = GenerationRule::from_draft(state.rules.allocate_id(), draft);
        if let Some(pool) = &state.db_pool {
            ecolk_api::db::rules::insert(pool, &rule)
                .await
                .context("failed to persist seed rule")?;
        }
        state.rules.insert_existing(rule)?;
    }

    tracing::info!(
        rules = state.rules.len(),
        source = state.config.rules_seed_path.as_deref().unwrap_or("built-in"),
        "rule catalog seeded"
    );
    Ok(())
}
