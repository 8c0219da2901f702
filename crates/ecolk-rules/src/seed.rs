//! # Rule Seeding
//!
//! Starter content for an empty catalog, either the built-in
//! [`default_rules`] or a YAML file of [`RuleDraft`]s:
//!
//! ```yaml
//! - description: Wells need a subsoil licence
//!   trigger_water_use_type: well
//!   generated_title: Subsoil use licence
//!   generated_basis: Law 2395-1 "On Subsoil", art. 11
//! ```
//!
//! Every loaded draft is validated; one invalid entry rejects the whole file.

use std::path::{Path, PathBuf};

use ecolk_core::{NvosCategory, ValidationError, WaterUseType};
use thiserror::Error;

use crate::rule::RuleDraft;

/// Errors while loading seed rules.
#[derive(Error, Debug)]
pub enum SeedError {
    #[error("failed to read rule seed file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed rule seed YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("seed rule #{index} is invalid: {source}")]
    InvalidRule {
        /// Zero-based position in the file.
        index: usize,
        #[source]
        source: ValidationError,
    },
}

/// Parse and validate a YAML list of rule drafts.
pub fn load_rules_yaml(yaml: &str) -> Result<Vec<RuleDraft>, SeedError> {
    let drafts: Vec<RuleDraft> = serde_yaml::from_str(yaml)?;
    for (index, draft) in drafts.iter().enumerate() {
        draft
            .validate()
            .map_err(|source| SeedError::InvalidRule { index, source })?;
    }
    Ok(drafts)
}

/// [`load_rules_yaml`] on the contents of a file.
pub fn load_rules_file(path: impl AsRef<Path>) -> Result<Vec<RuleDraft>, SeedError> {
    let path = path.as_ref();
    let yaml = std::fs::read_to_string(path).map_err(|source| SeedError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_rules_yaml(&yaml)
}

/// The built-in starter catalog.
pub fn default_rules() -> Vec<RuleDraft> {
    use NvosCategory::{I, II, III, IV};

    vec![
        RuleDraft::new(
            "Stationary emission sources at category I-II sites",
            "Permit for emissions of pollutants into the air",
            "Federal Law 96-FZ \"On Air Protection\", art. 14",
        )
        .with_categories(&[I, II])
        .with_penalty_risk("Fine up to 250,000 RUB or suspension of activity up to 90 days (CAO art. 8.21)"),
        RuleDraft::new(
            "Category I sites operate under an integrated permit",
            "Integrated environmental permit",
            "Federal Law 7-FZ \"On Environmental Protection\", art. 31.1",
        )
        .with_categories(&[I])
        .with_penalty_risk("Suspension of activity up to 90 days"),
        RuleDraft::new(
            "Category II sites file an environmental impact declaration",
            "Environmental impact declaration",
            "Federal Law 7-FZ \"On Environmental Protection\", art. 31.2",
        )
        .with_categories(&[II]),
        RuleDraft::new(
            "Category I-III sites pay for negative environmental impact",
            "Quarterly and annual NVOS payment",
            "Federal Law 7-FZ \"On Environmental Protection\", art. 16.4",
        )
        .with_categories(&[I, II, III])
        .with_penalty_risk("Fine up to 100,000 RUB (CAO art. 8.41)"),
        RuleDraft::new(
            "Category I-III sites run industrial environmental control",
            "Industrial environmental control programme",
            "Federal Law 7-FZ \"On Environmental Protection\", art. 67",
        )
        .with_categories(&[I, II, III]),
        RuleDraft::new(
            "Waste generation limits for category I-II sites",
            "Waste generation standards and disposal limits",
            "Federal Law 89-FZ \"On Production and Consumption Waste\", art. 18",
        )
        .with_categories(&[I, II])
        .with_penalty_risk("Fine up to 250,000 RUB (CAO art. 8.2)"),
        RuleDraft::new(
            "Category IV sites file a simplified emission report",
            "Report on emissions and waste for category IV sites",
            "Federal Law 7-FZ \"On Environmental Protection\", art. 69.2",
        )
        .with_categories(&[IV]),
        RuleDraft::new(
            "Groundwater wells require a subsoil licence",
            "Subsoil use licence for groundwater extraction",
            "Law 2395-1 \"On Subsoil\", art. 11",
        )
        .with_water_use(WaterUseType::Well)
        .with_penalty_risk("Fine up to 1,000,000 RUB (CAO art. 7.3)"),
        RuleDraft::new(
            "Surface water intake requires a water use agreement",
            "Water use agreement",
            "Water Code of the Russian Federation, art. 11",
        )
        .with_water_use(WaterUseType::SurfaceWater)
        .with_penalty_risk("Fine up to 1,000,000 RUB (CAO art. 7.6)"),
        RuleDraft::new(
            "Any water intake is metered and reported",
            "Water use accounting (form 2-TP vodkhoz)",
            "Water Code of the Russian Federation, art. 39",
        )
        .with_water_use(WaterUseType::Other),
        RuleDraft::new(
            "Byproducts (manure, litter) need handling documentation",
            "Byproduct handling and use documentation",
            "Federal Law 248-FZ \"On Byproducts of Animal Husbandry\", art. 4",
        )
        .with_byproducts(true),
    ]
}
