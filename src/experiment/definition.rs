//! Experiment Definition - what `register` stores

use std::fmt;
use std::rc::Rc;

use super::Variant;
use crate::config::{DEFAULT_TEST_PARAM, DEFAULT_VARIANT_PARAM};
use crate::error::ValidationError;

/// Lifecycle hook receiving the selected variant.
pub type Hook = Rc<dyn Fn(&Variant) -> anyhow::Result<()>>;

/// A registered A/B test.
///
/// Built with [`ExperimentDefinition::builder`]; the defaulted options are
/// `debug = false`, `use_data_layer = true`, no event name and no hooks.
#[derive(Clone)]
pub struct ExperimentDefinition {
    id: String,
    name: String,
    variants: Vec<Variant>,
    debug: bool,
    use_data_layer: bool,
    data_layer_event_name: Option<String>,
    on_before_run: Option<Hook>,
    on_after_run: Option<Hook>,
}

impl ExperimentDefinition {
    /// Create a builder for a test with the given id and name.
    #[must_use]
    pub fn builder(id: impl Into<String>, name: impl Into<String>) -> ExperimentDefinitionBuilder {
        ExperimentDefinitionBuilder::new(id, name)
    }

    /// Get the test ID.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get the test name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Variants in registration order.
    #[must_use]
    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    /// Whether debug logging is on.
    #[must_use]
    pub const fn debug(&self) -> bool {
        self.debug
    }

    /// Whether runs push a data-layer event.
    #[must_use]
    pub const fn use_data_layer(&self) -> bool {
        self.use_data_layer
    }

    /// Custom data-layer event name, if set.
    #[must_use]
    pub fn data_layer_event_name(&self) -> Option<&str> {
        self.data_layer_event_name.as_deref()
    }

    pub(crate) const fn on_before_run(&self) -> Option<&Hook> {
        self.on_before_run.as_ref()
    }

    pub(crate) const fn on_after_run(&self) -> Option<&Hook> {
        self.on_after_run.as_ref()
    }

    pub(crate) fn force_debug(&mut self) {
        self.debug = true;
    }

    /// Find a variant by slug.
    #[must_use]
    pub fn variant(&self, slug: &str) -> Option<&Variant> {
        self.variants.iter().find(|variant| variant.slug() == slug)
    }

    /// Check the registration invariants.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule: empty id, fewer than two variants,
    /// then any variant with an empty name or slug.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_empty() {
            return Err(ValidationError::MissingId);
        }
        if self.variants.len() < 2 {
            return Err(ValidationError::NotEnoughVariants);
        }
        for variant in &self.variants {
            if variant.name().is_empty() {
                return Err(ValidationError::MissingVariantName);
            }
            if variant.slug().is_empty() {
                return Err(ValidationError::MissingVariantSlug);
            }
        }
        Ok(())
    }

    /// Links forcing each variant, in variant order.
    ///
    /// ```rust
    /// use ab_testing_toolkit::{ExperimentDefinition, Variant};
    ///
    /// let test = ExperimentDefinition::builder("hero", "Hero copy")
    ///     .variant(Variant::new("a", "A"))
    ///     .variant(Variant::new("b", "B"))
    ///     .build();
    ///
    /// assert_eq!(
    ///     test.deep_links("https://site.test/"),
    ///     vec![
    ///         "https://site.test/?ab-test=hero&ab-variant=a",
    ///         "https://site.test/?ab-test=hero&ab-variant=b",
    ///     ]
    /// );
    /// ```
    #[must_use]
    pub fn deep_links(&self, base_url: &str) -> Vec<String> {
        self.deep_links_with(base_url, DEFAULT_TEST_PARAM, DEFAULT_VARIANT_PARAM)
    }

    /// Like [`deep_links`](Self::deep_links) with custom parameter names.
    #[must_use]
    pub fn deep_links_with(
        &self,
        base_url: &str,
        test_param: &str,
        variant_param: &str,
    ) -> Vec<String> {
        self.variants
            .iter()
            .map(|variant| {
                format!(
                    "{base_url}?{test_param}={}&{variant_param}={}",
                    self.id,
                    variant.slug()
                )
            })
            .collect()
    }
}

impl fmt::Debug for ExperimentDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExperimentDefinition")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("variants", &self.variants)
            .field("debug", &self.debug)
            .field("use_data_layer", &self.use_data_layer)
            .field("data_layer_event_name", &self.data_layer_event_name)
            .field("on_before_run", &self.on_before_run.is_some())
            .field("on_after_run", &self.on_after_run.is_some())
            .finish()
    }
}

/// Builder for `ExperimentDefinition`.
pub struct ExperimentDefinitionBuilder {
    id: String,
    name: String,
    variants: Vec<Variant>,
    debug: bool,
    use_data_layer: bool,
    data_layer_event_name: Option<String>,
    on_before_run: Option<Hook>,
    on_after_run: Option<Hook>,
}

impl ExperimentDefinitionBuilder {
    /// Create a new builder with required fields and default options.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            variants: Vec::new(),
            debug: false,
            use_data_layer: true,
            data_layer_event_name: None,
            on_before_run: None,
            on_after_run: None,
        }
    }

    /// Append a variant.
    #[must_use]
    pub fn variant(mut self, variant: Variant) -> Self {
        self.variants.push(variant);
        self
    }

    /// Append several variants.
    #[must_use]
    pub fn variants(mut self, variants: impl IntoIterator<Item = Variant>) -> Self {
        self.variants.extend(variants);
        self
    }

    /// Log registration, selection and run steps.
    #[must_use]
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Push an event to the data layer after each run.
    #[must_use]
    pub fn use_data_layer(mut self, use_data_layer: bool) -> Self {
        self.use_data_layer = use_data_layer;
        self
    }

    /// Event name used instead of `ABTest`.
    #[must_use]
    pub fn data_layer_event_name(mut self, name: impl Into<String>) -> Self {
        self.data_layer_event_name = Some(name.into());
        self
    }

    /// Hook called with the selected variant before its action.
    #[must_use]
    pub fn on_before_run<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Variant) -> anyhow::Result<()> + 'static,
    {
        self.on_before_run = Some(Rc::new(hook));
        self
    }

    /// Hook called with the selected variant after its action.
    #[must_use]
    pub fn on_after_run<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Variant) -> anyhow::Result<()> + 'static,
    {
        self.on_after_run = Some(Rc::new(hook));
        self
    }

    /// Build the definition. Validation happens at registration.
    #[must_use]
    pub fn build(self) -> ExperimentDefinition {
        ExperimentDefinition {
            id: self.id,
            name: self.name,
            variants: self.variants,
            debug: self.debug,
            use_data_layer: self.use_data_layer,
            data_layer_event_name: self.data_layer_event_name,
            on_before_run: self.on_before_run,
            on_after_run: self.on_after_run,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_variants() -> ExperimentDefinitionBuilder {
        ExperimentDefinition::builder("t1", "Test")
            .variant(Variant::new("a", "A"))
            .variant(Variant::new("b", "B"))
    }

    #[test]
    fn test_builder_defaults() {
        let test = two_variants().build();

        assert!(!test.debug());
        assert!(test.use_data_layer());
        assert!(test.data_layer_event_name().is_none());
        assert!(test.on_before_run().is_none());
        assert!(test.on_after_run().is_none());
    }

    #[test]
    fn test_validate_ok() {
        assert_eq!(two_variants().build().validate(), Ok(()));
    }

    #[test]
    fn test_validate_missing_id() {
        let test = ExperimentDefinition::builder("", "Test")
            .variants([Variant::new("a", "A"), Variant::new("b", "B")])
            .build();
        assert_eq!(test.validate(), Err(ValidationError::MissingId));
    }

    #[test]
    fn test_validate_one_variant() {
        let test = ExperimentDefinition::builder("t1", "Test")
            .variant(Variant::new("a", "A"))
            .build();
        assert_eq!(test.validate(), Err(ValidationError::NotEnoughVariants));
    }

    #[test]
    fn test_validate_id_checked_before_variants() {
        let test = ExperimentDefinition::builder("", "Test").build();
        assert_eq!(test.validate(), Err(ValidationError::MissingId));
    }

    #[test]
    fn test_validate_variant_fields() {
        let nameless = two_variants().variant(Variant::new("c", "")).build();
        assert_eq!(nameless.validate(), Err(ValidationError::MissingVariantName));

        let slugless = two_variants().variant(Variant::new("", "C")).build();
        assert_eq!(slugless.validate(), Err(ValidationError::MissingVariantSlug));
    }

    #[test]
    fn test_variant_lookup() {
        let test = two_variants().build();
        assert_eq!(test.variant("b").map(Variant::name), Some("B"));
        assert!(test.variant("z").is_none());
    }
}
