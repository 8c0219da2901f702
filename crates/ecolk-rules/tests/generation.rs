//! End-to-end behaviour of the requirement generator against an in-memory
//! catalog.

use std::collections::BTreeSet;
use std::sync::Arc;

use ecolk_core::{NvosCategory, SiteProfile, WaterUseType};
use ecolk_rules::{
    default_rules, CategoryTriggers, InMemoryRuleCatalog, MatchPolicy, RequirementGenerator,
    RuleCatalog, RuleDraft,
};
use proptest::prelude::*;

fn profile(category: NvosCategory, water: WaterUseType, byproducts: bool) -> SiteProfile {
    SiteProfile {
        category,
        water_use_type: water,
        has_byproducts: byproducts,
    }
}

fn titles(generator: &RequirementGenerator<Arc<InMemoryRuleCatalog>>, p: SiteProfile) -> BTreeSet<String> {
    generator
        .generate(&p)
        .unwrap()
        .into_iter()
        .map(|r| r.title)
        .collect()
}

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// R1: category I -> "Declaration X"; R2: well -> "Well License";
/// R3: category IV -> "Never".
fn three_rule_catalog() -> (Arc<InMemoryRuleCatalog>, ecolk_core::RuleId) {
    let catalog = Arc::new(InMemoryRuleCatalog::new());
    let r1 = catalog
        .create(RuleDraft::new("r1", "Declaration X", "basis 1").with_categories(&[NvosCategory::I]))
        .unwrap();
    catalog
        .create(RuleDraft::new("r2", "Well License", "basis 2").with_water_use(WaterUseType::Well))
        .unwrap();
    catalog
        .create(RuleDraft::new("r3", "Never", "basis 3").with_categories(&[NvosCategory::IV]))
        .unwrap();
    (catalog, r1.id)
}

#[test]
fn scenario_category_one_with_well() {
    let (catalog, _) = three_rule_catalog();
    let generator = RequirementGenerator::new(catalog);
    assert_eq!(
        titles(&generator, profile(NvosCategory::I, WaterUseType::Well, false)),
        set(&["Declaration X", "Well License"])
    );
}

#[test]
fn scenario_category_four_without_water() {
    let (catalog, _) = three_rule_catalog();
    let generator = RequirementGenerator::new(catalog);
    assert_eq!(
        titles(&generator, profile(NvosCategory::IV, WaterUseType::None, false)),
        set(&["Never"])
    );
}

#[test]
fn scenario_deactivated_rule_drops_out() {
    let (catalog, r1) = three_rule_catalog();
    let mut draft: RuleDraft = catalog.get(r1).unwrap().into();
    draft.is_active = false;
    catalog.update(r1, draft).unwrap();

    let generator = RequirementGenerator::new(Arc::clone(&catalog));
    assert_eq!(
        titles(&generator, profile(NvosCategory::I, WaterUseType::Well, false)),
        set(&["Well License"])
    );
    // Deactivation is not deletion.
    assert_eq!(catalog.list().unwrap().len(), 3);
}

#[test]
fn or_matching_not_and() {
    let catalog = Arc::new(
        InMemoryRuleCatalog::with_rules([RuleDraft::new("either", "Either", "b")
            .with_categories(&[NvosCategory::I])
            .with_byproducts(true)])
        .unwrap(),
    );
    let generator = RequirementGenerator::new(catalog);

    for byproducts in [false, true] {
        assert_eq!(
            titles(&generator, profile(NvosCategory::I, WaterUseType::None, byproducts)),
            set(&["Either"])
        );
    }
    assert_eq!(
        titles(&generator, profile(NvosCategory::III, WaterUseType::None, true)),
        set(&["Either"])
    );
    assert!(titles(&generator, profile(NvosCategory::III, WaterUseType::None, false)).is_empty());
}

#[test]
fn rule_matching_through_two_triggers_emitted_once() {
    let catalog = Arc::new(
        InMemoryRuleCatalog::with_rules([RuleDraft::new("both", "Both", "b")
            .with_categories(&[NvosCategory::II])
            .with_water_use(WaterUseType::SurfaceWater)
            .with_byproducts(true)])
        .unwrap(),
    );
    let out = RequirementGenerator::new(catalog)
        .generate(&profile(NvosCategory::II, WaterUseType::SurfaceWater, true))
        .unwrap();
    assert_eq!(out.len(), 1);
}

#[test]
fn dead_rule_never_generated() {
    let catalog = Arc::new(InMemoryRuleCatalog::new());
    let mut draft = RuleDraft::new("dead", "Dead", "b");
    draft.category_triggers = CategoryTriggers {
        i: Some(false),
        ii: None,
        iii: Some(false),
        iv: None,
    };
    catalog.create(draft).unwrap();
    let generator = RequirementGenerator::new(catalog);

    for category in NvosCategory::ALL {
        for water in [
            WaterUseType::None,
            WaterUseType::Well,
            WaterUseType::SurfaceWater,
            WaterUseType::Other,
        ] {
            for byproducts in [false, true] {
                assert!(titles(&generator, profile(category, water, byproducts)).is_empty());
            }
        }
    }
}

#[test]
fn catalog_edits_do_not_touch_earlier_output() {
    let (catalog, r1) = three_rule_catalog();
    let generator = RequirementGenerator::new(Arc::clone(&catalog));
    let before = generator
        .generate(&profile(NvosCategory::I, WaterUseType::None, false))
        .unwrap();

    catalog
        .update(r1, RuleDraft::new("r1", "Renamed", "basis 1").with_categories(&[NvosCategory::I]))
        .unwrap();

    assert_eq!(before[0].title, "Declaration X");
    let after = generator
        .generate(&profile(NvosCategory::I, WaterUseType::None, false))
        .unwrap();
    assert_eq!(after[0].title, "Renamed");
}

#[test]
fn default_catalog_covers_every_profile_dimension() {
    let catalog = Arc::new(InMemoryRuleCatalog::with_rules(default_rules()).unwrap());
    let generator = RequirementGenerator::new(catalog);
    for category in NvosCategory::ALL {
        assert!(!titles(&generator, profile(category, WaterUseType::None, false)).is_empty());
    }
}

fn category_strategy() -> impl Strategy<Value = NvosCategory> {
    prop::sample::select(NvosCategory::ALL.to_vec())
}

fn water_strategy() -> impl Strategy<Value = WaterUseType> {
    prop::sample::select(vec![
        WaterUseType::None,
        WaterUseType::Well,
        WaterUseType::SurfaceWater,
        WaterUseType::Other,
    ])
}

fn profile_strategy() -> impl Strategy<Value = SiteProfile> {
    (category_strategy(), water_strategy(), any::<bool>()).prop_map(|(c, w, b)| profile(c, w, b))
}

fn draft_strategy() -> impl Strategy<Value = RuleDraft> {
    (
        prop::array::uniform4(proptest::option::of(any::<bool>())),
        proptest::option::of(water_strategy()),
        proptest::option::of(any::<bool>()),
        any::<bool>(),
        "[a-z]{1,8}",
    )
        .prop_map(|(cats, water, byproducts, active, title)| {
            let mut draft = RuleDraft::new("generated", title, "basis");
            draft.category_triggers = CategoryTriggers {
                i: cats[0],
                ii: cats[1],
                iii: cats[2],
                iv: cats[3],
            };
            draft.trigger_water_use_type = water;
            draft.trigger_has_byproducts = byproducts;
            draft.is_active = active;
            draft
        })
}

proptest! {
    #[test]
    fn generation_is_deterministic(
        drafts in proptest::collection::vec(draft_strategy(), 0..12),
        p in profile_strategy(),
        all in any::<bool>(),
    ) {
        let policy = if all { MatchPolicy::AllTriggers } else { MatchPolicy::AnyTrigger };
        let catalog = Arc::new(InMemoryRuleCatalog::with_rules(drafts).unwrap());
        let generator = RequirementGenerator::with_policy(catalog, policy);
        let first = generator.generate(&p).unwrap();
        let second = generator.generate(&p).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn output_never_exceeds_active_rule_count(
        drafts in proptest::collection::vec(draft_strategy(), 0..12),
        p in profile_strategy(),
    ) {
        let catalog = Arc::new(InMemoryRuleCatalog::with_rules(drafts).unwrap());
        let active = catalog.active_rules().unwrap().len();
        let generator = RequirementGenerator::new(catalog);
        prop_assert!(generator.generate(&p).unwrap().len() <= active);
    }

    #[test]
    fn all_triggers_output_is_subset_of_any_trigger_output(
        drafts in proptest::collection::vec(draft_strategy(), 0..12),
        p in profile_strategy(),
    ) {
        let catalog = Arc::new(InMemoryRuleCatalog::with_rules(drafts).unwrap());
        let any_ids: BTreeSet<_> = RequirementGenerator::new(Arc::clone(&catalog))
            .preview(&p)
            .unwrap()
            .into_iter()
            .map(|m| m.rule_id)
            .collect();
        let all_ids: BTreeSet<_> = RequirementGenerator::with_policy(catalog, MatchPolicy::AllTriggers)
            .preview(&p)
            .unwrap()
            .into_iter()
            .map(|m| m.rule_id)
            .collect();
        prop_assert!(all_ids.is_subset(&any_ids));
    }
}
