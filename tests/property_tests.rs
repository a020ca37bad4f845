//! Property-based tests for registration and selection
//!
//! - Registration accepts exactly the well-formed definitions
//! - Every run picks a registered variant, and keeps picking it
//! - A resolvable URL override always wins over a saved choice

use ab_testing_toolkit::{
    AbTestManager, ExperimentDefinition, PageLocation, SelectionSource, Variant,
};
use proptest::prelude::*;

// ============================================================================
// Property Test Generators (Strategies)
// ============================================================================

/// Distinct, non-empty slugs
fn arb_slugs(min: usize, max: usize) -> impl Strategy<Value = Vec<String>> {
    proptest::collection::btree_set("[a-z][a-z0-9-]{0,7}", min..=max)
        .prop_map(|slugs| slugs.into_iter().collect())
}

fn definition(id: &str, slugs: &[String]) -> ExperimentDefinition {
    ExperimentDefinition::builder(id, "Property test")
        .variants(
            slugs
                .iter()
                .map(|slug| Variant::new(slug.clone(), slug.to_uppercase())),
        )
        .build()
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: register succeeds iff id is non-empty and there are ≥ 2 variants
    #[test]
    fn prop_register_accepts_well_formed(
        id in "[a-z0-9-]{0,6}",
        slugs in arb_slugs(0, 5),
    ) {
        let mut manager = AbTestManager::builder().seed(0).build();
        let expected_ok = !id.is_empty() && slugs.len() >= 2;

        let result = manager.register(definition(&id, &slugs));

        prop_assert_eq!(result.is_ok(), expected_ok);
        prop_assert_eq!(manager.registry().contains(&id), expected_ok);
        prop_assert_eq!(manager.run(&id).unwrap().is_some(), expected_ok);
    }

    /// Property: runs choose a registered variant and repeat it
    #[test]
    fn prop_run_is_stable(slugs in arb_slugs(2, 6), seed in any::<u64>()) {
        let mut manager = AbTestManager::builder().seed(seed).build();
        manager.register(definition("t1", &slugs)).unwrap();

        let first = manager.run("t1").unwrap().unwrap();
        prop_assert!(slugs.iter().any(|slug| slug == first.variant.slug()));

        for _ in 0..3 {
            let again = manager.run("t1").unwrap().unwrap();
            prop_assert_eq!(&again.variant, &first.variant);
            prop_assert_eq!(again.source, SelectionSource::Persisted);
        }
    }

    /// Property: a resolvable URL override wins over any saved slug
    #[test]
    fn prop_override_beats_saved(
        slugs in arb_slugs(2, 6),
        saved in any::<prop::sample::Index>(),
        forced in any::<prop::sample::Index>(),
    ) {
        let saved_slug = &slugs[saved.index(slugs.len())];
        let forced_slug = &slugs[forced.index(slugs.len())];
        let mut manager = AbTestManager::builder()
            .location(PageLocation::from_query(&format!("ab-test=t1&ab-variant={forced_slug}")))
            .seed(0)
            .build();
        manager.register(definition("t1", &slugs)).unwrap();
        manager.store().write("t1", saved_slug).unwrap();

        let outcome = manager.run("t1").unwrap().unwrap();

        prop_assert_eq!(outcome.variant.slug(), forced_slug.as_str());
        prop_assert_eq!(outcome.source, SelectionSource::UrlOverride);
        prop_assert_eq!(manager.saved_variant("t1").unwrap(), Some(saved_slug.clone()));
    }
}
