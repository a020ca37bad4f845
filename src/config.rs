//! Manager configuration: storage slot, query parameter names, expiration.

use serde::{Deserialize, Serialize};

/// Storage slot holding all persisted selections
pub const DEFAULT_STORAGE_KEY: &str = "ab-test-manager";

/// Query parameter that forces debug logging when truthy
pub const DEFAULT_DEBUG_PARAM: &str = "ab-test-debug";

/// Query parameter naming the test to override
pub const DEFAULT_TEST_PARAM: &str = "ab-test";

/// Query parameter naming the forced variant slug
pub const DEFAULT_VARIANT_PARAM: &str = "ab-variant";

/// Data-layer event name when a test does not set one
pub const DEFAULT_EVENT_NAME: &str = "ABTest";

/// 365 days in milliseconds
pub const DEFAULT_EXPIRATION_MS: i64 = 365 * 24 * 60 * 60 * 1000;

/// Tunables for an `AbTestManager`.
///
/// Every field has a default matching the browser toolkit, so a partial JSON
/// document is enough:
///
/// ```rust
/// use ab_testing_toolkit::ManagerConfig;
///
/// let config: ManagerConfig = serde_json::from_str(r#"{"storage_key": "my-tests"}"#).unwrap();
/// assert_eq!(config.storage_key, "my-tests");
/// assert_eq!(config.test_param, "ab-test");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Key of the storage slot
    pub storage_key: String,
    /// Debug-activation query parameter
    pub debug_param: String,
    /// Override test-id query parameter
    pub test_param: String,
    /// Override variant-slug query parameter
    pub variant_param: String,
    /// Fallback data-layer event name
    pub default_event_name: String,
    /// Lifetime of a persisted selection
    pub expiration_ms: i64,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            debug_param: DEFAULT_DEBUG_PARAM.to_string(),
            test_param: DEFAULT_TEST_PARAM.to_string(),
            variant_param: DEFAULT_VARIANT_PARAM.to_string(),
            default_event_name: DEFAULT_EVENT_NAME.to_string(),
            expiration_ms: DEFAULT_EXPIRATION_MS,
        }
    }
}
