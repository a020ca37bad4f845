//! Variant selection: URL override, then saved choice, then random.

use rand::Rng;
use tracing::info;

use super::SelectionStore;
use crate::config::ManagerConfig;
use crate::experiment::{ExperimentDefinition, Variant};
use crate::kv::KvStore;
use crate::location::PageLocation;
use crate::Result;

/// How a variant was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionSource {
    /// Forced by `ab-test` / `ab-variant` query parameters
    UrlOverride,
    /// Read back from a valid saved record
    Persisted,
    /// Drawn uniformly and saved
    Random,
}

impl SelectionSource {
    /// Get source name as string
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::UrlOverride => "url",
            Self::Persisted => "storage",
            Self::Random => "random",
        }
    }
}

/// A resolved variant and how it was chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Chosen variant
    pub variant: Variant,
    /// Which precedence rule chose it
    pub source: SelectionSource,
}

/// Resolves variants against a page location.
#[derive(Debug, Clone, Copy)]
pub struct Selector<'a> {
    location: &'a PageLocation,
    config: &'a ManagerConfig,
}

impl<'a> Selector<'a> {
    /// Create a selector reading override parameters named by `config`.
    #[must_use]
    pub const fn new(location: &'a PageLocation, config: &'a ManagerConfig) -> Self {
        Self { location, config }
    }

    /// Variant forced by the query string, if it targets this test and names
    /// one of its slugs.
    #[must_use]
    pub fn url_override<'d>(&self, definition: &'d ExperimentDefinition) -> Option<&'d Variant> {
        if self.location.param(&self.config.test_param) != Some(definition.id()) {
            return None;
        }
        let slug = self.location.param(&self.config.variant_param)?;
        definition.variant(slug)
    }

    /// Pick the variant for `definition`, first match wins:
    ///
    /// 1. URL override
    /// 2. saved selection naming a current variant
    /// 3. uniform random choice, saved immediately
    ///
    /// Returns `None` only when the test has no variants.
    ///
    /// # Errors
    ///
    /// Returns error if reading or saving the selection fails.
    pub fn select<K, R>(
        &self,
        definition: &ExperimentDefinition,
        store: &SelectionStore<K>,
        rng: &mut R,
    ) -> Result<Option<Selection>>
    where
        K: KvStore,
        R: Rng + ?Sized,
    {
        let id = definition.id();
        let debug = definition.debug();

        if let Some(variant) = self.url_override(definition) {
            if debug {
                info!(
                    experiment_id = %id,
                    variant = %variant.name(),
                    "variant chosen by URL parameter"
                );
            }
            return Ok(Some(Selection {
                variant: variant.clone(),
                source: SelectionSource::UrlOverride,
            }));
        }

        if let Some(variant) = store
            .read(id)?
            .and_then(|slug| definition.variant(&slug).cloned())
        {
            if debug {
                info!(
                    experiment_id = %id,
                    variant = %variant.name(),
                    "variant chosen by local storage"
                );
            }
            return Ok(Some(Selection {
                variant,
                source: SelectionSource::Persisted,
            }));
        }

        let variants = definition.variants();
        if variants.is_empty() {
            return Ok(None);
        }
        let variant = variants[rng.gen_range(0..variants.len())].clone();
        store.write(id, variant.slug())?;
        if debug {
            info!(experiment_id = %id, variant = %variant.name(), "variant randomly chosen");
        }
        Ok(Some(Selection {
            variant,
            source: SelectionSource::Random,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryKvStore;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn definition() -> ExperimentDefinition {
        ExperimentDefinition::builder("exp1", "Experiment 1")
            .variant(Variant::new("a", "A"))
            .variant(Variant::new("b", "B"))
            .build()
    }

    fn select(location: &PageLocation, store: &SelectionStore<MemoryKvStore>) -> Selection {
        let config = ManagerConfig::default();
        let mut rng = StdRng::seed_from_u64(7);
        Selector::new(location, &config)
            .select(&definition(), store, &mut rng)
            .unwrap()
            .unwrap()
    }

    #[test]
    fn test_url_beats_saved() {
        let store = SelectionStore::new(MemoryKvStore::new());
        store.write("exp1", "b").unwrap();
        let location = PageLocation::from_query("ab-test=exp1&ab-variant=a");

        let selection = select(&location, &store);

        assert_eq!(selection.source, SelectionSource::UrlOverride);
        assert_eq!(selection.variant.slug(), "a");
        // Override does not touch storage
        assert_eq!(store.read("exp1").unwrap(), Some("b".to_string()));
    }

    #[test]
    fn test_unknown_url_slug_falls_through() {
        let store = SelectionStore::new(MemoryKvStore::new());
        store.write("exp1", "b").unwrap();
        let location = PageLocation::from_query("ab-test=exp1&ab-variant=zzz");

        let selection = select(&location, &store);

        assert_eq!(selection.source, SelectionSource::Persisted);
        assert_eq!(selection.variant.slug(), "b");
    }

    #[test]
    fn test_override_for_other_test_ignored() {
        let store = SelectionStore::new(MemoryKvStore::new());
        store.write("exp1", "b").unwrap();
        let location = PageLocation::from_query("ab-test=exp2&ab-variant=a");

        assert_eq!(select(&location, &store).variant.slug(), "b");
    }

    #[test]
    fn test_stale_saved_slug_rerandomizes() {
        let store = SelectionStore::new(MemoryKvStore::new());
        store.write("exp1", "removed-variant").unwrap();

        let selection = select(&PageLocation::default(), &store);

        assert_eq!(selection.source, SelectionSource::Random);
        assert_eq!(
            store.read("exp1").unwrap().as_deref(),
            Some(selection.variant.slug())
        );
    }

    #[test]
    fn test_empty_variants_selects_nothing() {
        let config = ManagerConfig::default();
        let location = PageLocation::default();
        let store = SelectionStore::new(MemoryKvStore::new());
        let empty = ExperimentDefinition::builder("empty", "Empty").build();
        let mut rng = StdRng::seed_from_u64(1);

        let selection = Selector::new(&location, &config)
            .select(&empty, &store, &mut rng)
            .unwrap();

        assert!(selection.is_none());
        assert!(store.kv().is_empty());
    }
}
