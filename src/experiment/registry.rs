//! Experiment Registry - in-memory session state
//!
//! Holds registered definitions and the ordered history of runs. Both start
//! empty and live as long as the owning manager.

use std::collections::HashMap;

use super::ExperimentDefinition;

/// In-memory store for registered tests and their run history.
#[derive(Debug, Default)]
pub struct ExperimentRegistry {
    experiments: HashMap<String, ExperimentDefinition>,
    run_history: Vec<String>,
}

impl ExperimentRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if no test is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.experiments.is_empty()
    }

    /// Get the number of registered tests.
    #[must_use]
    pub fn len(&self) -> usize {
        self.experiments.len()
    }

    /// Add a test, replacing any test with the same id.
    pub fn insert(&mut self, experiment: ExperimentDefinition) {
        self.experiments.insert(experiment.id().to_string(), experiment);
    }

    /// Get a test by ID.
    #[must_use]
    pub fn get(&self, experiment_id: &str) -> Option<&ExperimentDefinition> {
        self.experiments.get(experiment_id)
    }

    /// Whether a test with this id is registered.
    #[must_use]
    pub fn contains(&self, experiment_id: &str) -> bool {
        self.experiments.contains_key(experiment_id)
    }

    /// Append a completed run. Repeats are kept.
    pub fn record_run(&mut self, experiment_id: &str) {
        self.run_history.push(experiment_id.to_string());
    }

    /// Whether the test has completed at least one run this session.
    #[must_use]
    pub fn has_run(&self, experiment_id: &str) -> bool {
        self.run_history.iter().any(|id| id == experiment_id)
    }

    /// Completed runs in order.
    #[must_use]
    pub fn run_history(&self) -> &[String] {
        &self.run_history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experiment::Variant;

    fn definition(id: &str, name: &str) -> ExperimentDefinition {
        ExperimentDefinition::builder(id, name)
            .variant(Variant::new("a", "A"))
            .variant(Variant::new("b", "B"))
            .build()
    }

    #[test]
    fn test_registry_default() {
        let registry = ExperimentRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
        assert!(registry.run_history().is_empty());
    }

    #[test]
    fn test_insert_overwrites_same_id() {
        let mut registry = ExperimentRegistry::new();

        registry.insert(definition("exp-1", "First"));
        registry.insert(definition("exp-1", "Second"));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("exp-1").map(ExperimentDefinition::name), Some("Second"));
    }

    #[test]
    fn test_run_history_keeps_repeats() {
        let mut registry = ExperimentRegistry::new();

        registry.record_run("exp-1");
        registry.record_run("exp-2");
        registry.record_run("exp-1");

        assert!(registry.has_run("exp-1"));
        assert!(!registry.has_run("exp-3"));
        assert_eq!(registry.run_history(), ["exp-1", "exp-2", "exp-1"]);
    }

    #[test]
    fn test_contains() {
        let mut registry = ExperimentRegistry::new();
        registry.insert(definition("a", "A"));

        assert!(registry.contains("a"));
        assert!(!registry.contains("b"));
    }
}
