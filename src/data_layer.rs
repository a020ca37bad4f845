//! Shared analytics event queue (`dataLayer`).

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

/// Event pushed after a test runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataLayerEvent {
    /// Event name (`ABTest` unless the test overrides it)
    pub event: String,
    /// Test id
    pub test_id: String,
    /// Human-readable test name
    pub test_name: String,
    /// Slug of the variant that ran
    pub variant_slug: String,
    /// Name of the variant that ran
    pub variant_name: String,
}

/// Cloneable handle to an ordered, append-only event queue.
///
/// Clones share the same queue, so integrators keep a handle and read what
/// the manager pushed. The manager never removes events; a consumer that
/// forwards them elsewhere takes them with [`drain`](Self::drain).
///
/// ```rust
/// use ab_testing_toolkit::DataLayer;
///
/// let layer = DataLayer::new();
/// let observer = layer.clone();
/// assert!(observer.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct DataLayer {
    events: Arc<Mutex<Vec<DataLayerEvent>>>,
}

impl DataLayer {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<DataLayerEvent>> {
        // Pushes cannot leave the vector half-written.
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append an event.
    pub fn push(&self, event: DataLayerEvent) {
        self.lock().push(event);
    }

    /// Copy of all events in push order.
    #[must_use]
    pub fn events(&self) -> Vec<DataLayerEvent> {
        self.lock().clone()
    }

    /// Remove and return all events in push order.
    pub fn drain(&self) -> Vec<DataLayerEvent> {
        std::mem::take(&mut *self.lock())
    }

    /// Number of events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing has been pushed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Events as a JSON array, the shape external consumers read.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Array(
            self.lock()
                .iter()
                .filter_map(|event| serde_json::to_value(event).ok())
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(slug: &str) -> DataLayerEvent {
        DataLayerEvent {
            event: "ABTest".to_string(),
            test_id: "t1".to_string(),
            test_name: "Test".to_string(),
            variant_slug: slug.to_string(),
            variant_name: slug.to_uppercase(),
        }
    }

    #[test]
    fn test_clones_share_queue() {
        let layer = DataLayer::new();
        let observer = layer.clone();

        layer.push(event("a"));
        layer.push(event("b"));

        assert_eq!(observer.len(), 2);
        assert_eq!(observer.events()[1].variant_slug, "b");
    }

    #[test]
    fn test_drain_empties_shared_queue() {
        let layer = DataLayer::new();
        let forwarder = layer.clone();
        layer.push(event("a"));
        layer.push(event("b"));

        let drained = forwarder.drain();

        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].variant_slug, "a");
        assert!(layer.is_empty());
        assert!(forwarder.drain().is_empty());
    }

    #[test]
    fn test_event_json_uses_camel_case() {
        let layer = DataLayer::new();
        layer.push(event("a"));

        let json = layer.to_json();
        assert_eq!(
            json,
            serde_json::json!([{
                "event": "ABTest",
                "testId": "t1",
                "testName": "Test",
                "variantSlug": "a",
                "variantName": "A",
            }])
        );
    }
}
