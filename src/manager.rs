//! Test manager: registration, runs and saved-variant deletion
//!
//! The manager is the session context. It owns the registry, run history,
//! selection store, page location and random source, and holds a handle to
//! the shared data layer. Everything starts empty when the manager is built
//! and lives as long as it does.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tracing::{info, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::ManagerConfig;
use crate::data_layer::{DataLayer, DataLayerEvent};
use crate::error::HookStage;
use crate::experiment::{ExperimentDefinition, ExperimentRegistry, Variant};
use crate::kv::{KvStore, MemoryKvStore};
use crate::location::PageLocation;
use crate::selection::{Selection, SelectionSource, SelectionStore, Selector};
use crate::{Error, Result};

/// What a completed run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    /// Test that ran
    pub experiment_id: String,
    /// Variant that ran
    pub variant: Variant,
    /// How the variant was chosen
    pub source: SelectionSource,
    /// Whether the test had already run this session
    pub repeated: bool,
    /// Event pushed to the data layer, if enabled
    pub event: Option<DataLayerEvent>,
}

/// A/B test manager for one page session.
///
/// # Example
///
/// ```rust
/// use ab_testing_toolkit::{AbTestManager, ExperimentDefinition, PageLocation, Variant};
///
/// # fn example() -> ab_testing_toolkit::Result<()> {
/// let mut manager = AbTestManager::builder()
///     .location(PageLocation::parse("https://shop.test/?ab-test=cta&ab-variant=b")?)
///     .build();
///
/// manager.register(
///     ExperimentDefinition::builder("cta", "Call to action")
///         .variant(Variant::new("a", "Buy now"))
///         .variant(Variant::new("b", "Add to cart"))
///         .build(),
/// )?;
///
/// let outcome = manager.run("cta")?.expect("registered test runs");
/// assert_eq!(outcome.variant.slug(), "b");
/// assert_eq!(manager.data_layer().len(), 1);
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```
pub struct AbTestManager<K: KvStore = MemoryKvStore> {
    registry: ExperimentRegistry,
    store: SelectionStore<K>,
    location: PageLocation,
    data_layer: DataLayer,
    rng: Box<dyn RngCore + Send>,
    config: ManagerConfig,
}

impl AbTestManager<MemoryKvStore> {
    /// Create a new manager builder
    #[must_use]
    pub fn builder() -> AbTestManagerBuilder<MemoryKvStore> {
        AbTestManagerBuilder::default()
    }

    /// Session-only manager with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }
}

impl Default for AbTestManager<MemoryKvStore> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: KvStore> AbTestManager<K> {
    /// Register a test, replacing any test with the same id.
    ///
    /// A truthy debug query parameter forces debug logging for the test.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` if the id is empty, there are fewer than
    /// two variants, or a variant lacks a name or slug. Nothing is
    /// registered in that case.
    pub fn register(&mut self, definition: ExperimentDefinition) -> Result<()> {
        let mut definition = definition;
        if self.location.is_truthy(&self.config.debug_param) {
            definition.force_debug();
        }

        definition.validate()?;

        if definition.debug() {
            let id = definition.id();
            info!(experiment_id = %id, name = %definition.name(), "test registered");
            let links = definition.deep_links_with(
                self.location.base_url(),
                &self.config.test_param,
                &self.config.variant_param,
            );
            for (variant, link) in definition.variants().iter().zip(links) {
                info!(
                    experiment_id = %id,
                    variant = %variant.name(),
                    slug = %variant.slug(),
                    deep_link = %link,
                    "variant registered"
                );
            }
        }

        self.registry.insert(definition);
        Ok(())
    }

    /// Select a variant for the test and run it.
    ///
    /// Order of work: resolve the variant, `on_before_run`, the variant's
    /// action, `on_after_run`, record the run, push the data-layer event.
    /// An unknown id is logged and yields `Ok(None)` without touching state.
    ///
    /// # Errors
    ///
    /// Returns `Error::Hook` if a hook or the variant action fails; the run
    /// is then not recorded and no event is pushed. Storage failures while
    /// saving a new selection propagate.
    pub fn run(&mut self, experiment_id: &str) -> Result<Option<RunOutcome>> {
        let Some(definition) = self.registry.get(experiment_id).cloned() else {
            info!(experiment_id = %experiment_id, "no test by id");
            return Ok(None);
        };
        let debug = definition.debug();

        let selection = Selector::new(&self.location, &self.config).select(
            &definition,
            &self.store,
            self.rng.as_mut(),
        )?;

        let repeated = self.registry.has_run(experiment_id);
        if repeated && debug {
            warn!(experiment_id = %experiment_id, "multiple runs of test");
        }

        let Some(Selection { variant, source }) = selection else {
            info!(experiment_id = %experiment_id, "no variant selected for test");
            return Ok(None);
        };

        if debug {
            info!(experiment_id = %experiment_id, "running...");
        }

        if let Some(hook) = definition.on_before_run() {
            hook(&variant).map_err(hook_error(experiment_id, HookStage::BeforeRun))?;
        }
        variant
            .run()
            .map_err(hook_error(experiment_id, HookStage::VariantRun))?;
        if let Some(hook) = definition.on_after_run() {
            hook(&variant).map_err(hook_error(experiment_id, HookStage::AfterRun))?;
        }

        self.registry.record_run(experiment_id);

        let event = definition.use_data_layer().then(|| {
            let event = DataLayerEvent {
                event: definition
                    .data_layer_event_name()
                    .filter(|name| !name.is_empty())
                    .unwrap_or(self.config.default_event_name.as_str())
                    .to_string(),
                test_id: experiment_id.to_string(),
                test_name: definition.name().to_string(),
                variant_slug: variant.slug().to_string(),
                variant_name: variant.name().to_string(),
            };
            if debug {
                info!(experiment_id = %experiment_id, event = ?event, "pushing data layer...");
            }
            self.data_layer.push(event.clone());
            event
        });

        if debug {
            info!(experiment_id = %experiment_id, "ready");
        }

        Ok(Some(RunOutcome {
            experiment_id: experiment_id.to_string(),
            variant,
            source,
            repeated,
            event,
        }))
    }

    /// Forget the saved variant of one test; other tests keep theirs.
    ///
    /// # Errors
    ///
    /// Returns error if the selection store cannot be written.
    pub fn delete_saved_variant(&self, experiment_id: &str) -> Result<()> {
        self.store.delete(experiment_id)
    }

    /// Saved, non-expired variant slug of a test.
    ///
    /// # Errors
    ///
    /// Returns error if the selection store cannot be read.
    pub fn saved_variant(&self, experiment_id: &str) -> Result<Option<String>> {
        self.store.read(experiment_id)
    }

    /// Replace the page location, as after a navigation.
    pub fn set_location(&mut self, location: PageLocation) {
        self.location = location;
    }

    /// Registered tests and run history
    #[must_use]
    pub const fn registry(&self) -> &ExperimentRegistry {
        &self.registry
    }

    /// Ids of completed runs, in order
    #[must_use]
    pub fn run_history(&self) -> &[String] {
        self.registry.run_history()
    }

    /// Shared event queue
    #[must_use]
    pub const fn data_layer(&self) -> &DataLayer {
        &self.data_layer
    }

    /// Persisted selections
    #[must_use]
    pub const fn store(&self) -> &SelectionStore<K> {
        &self.store
    }

    /// Current page location
    #[must_use]
    pub const fn location(&self) -> &PageLocation {
        &self.location
    }

    /// Active configuration
    #[must_use]
    pub const fn config(&self) -> &ManagerConfig {
        &self.config
    }
}

fn hook_error(experiment_id: &str, stage: HookStage) -> impl FnOnce(anyhow::Error) -> Error + '_ {
    move |source| Error::Hook {
        experiment_id: experiment_id.to_string(),
        stage,
        source,
    }
}

/// Builder for `AbTestManager`. Every part has a default: in-memory
/// storage, system clock, entropy-seeded RNG, empty location, fresh data
/// layer, default config.
pub struct AbTestManagerBuilder<K: KvStore> {
    kv: K,
    clock: Arc<dyn Clock>,
    rng: Option<Box<dyn RngCore + Send>>,
    location: PageLocation,
    data_layer: DataLayer,
    config: ManagerConfig,
}

impl Default for AbTestManagerBuilder<MemoryKvStore> {
    fn default() -> Self {
        Self {
            kv: MemoryKvStore::new(),
            clock: Arc::new(SystemClock),
            rng: None,
            location: PageLocation::default(),
            data_layer: DataLayer::new(),
            config: ManagerConfig::default(),
        }
    }
}

impl<K: KvStore> AbTestManagerBuilder<K> {
    /// Use `kv` for persisted selections
    #[must_use]
    pub fn store<S: KvStore>(self, kv: S) -> AbTestManagerBuilder<S> {
        AbTestManagerBuilder {
            kv,
            clock: self.clock,
            rng: self.rng,
            location: self.location,
            data_layer: self.data_layer,
            config: self.config,
        }
    }

    /// Clock used for expirations
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Random source for bucketing
    #[must_use]
    pub fn rng(mut self, rng: impl RngCore + Send + 'static) -> Self {
        self.rng = Some(Box::new(rng));
        self
    }

    /// Deterministic bucketing from a seed
    #[must_use]
    pub fn seed(self, seed: u64) -> Self {
        self.rng(StdRng::seed_from_u64(seed))
    }

    /// Page location for override and debug parameters
    #[must_use]
    pub fn location(mut self, location: PageLocation) -> Self {
        self.location = location;
        self
    }

    /// Push events to an existing queue
    #[must_use]
    pub fn data_layer(mut self, data_layer: DataLayer) -> Self {
        self.data_layer = data_layer;
        self
    }

    /// Replace the configuration
    #[must_use]
    pub fn config(mut self, config: ManagerConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the manager
    #[must_use]
    pub fn build(self) -> AbTestManager<K> {
        let store = SelectionStore::with_config(self.kv, self.clock, &self.config);
        let rng: Box<dyn RngCore + Send> = match self.rng {
            Some(rng) => rng,
            None => Box::new(StdRng::from_entropy()),
        };
        AbTestManager {
            registry: ExperimentRegistry::new(),
            store,
            location: self.location,
            data_layer: self.data_layer,
            rng,
            config: self.config,
        }
    }
}
