//! Selection Record - remembered variant with an expiration

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persisted mapping of test id to its record, as stored in the slot.
pub type SelectionMap = BTreeMap<String, SelectionRecord>;

/// The variant a visitor was bucketed into for one test.
///
/// Serialized as `{"testId", "variantSlug", "expiration"}` with the
/// expiration in Unix epoch milliseconds, the format the browser toolkit
/// reads and writes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SelectionRecord {
    test_id: String,
    variant_slug: String,
    expiration: i64,
}

impl SelectionRecord {
    /// Create a record.
    ///
    /// # Arguments
    ///
    /// * `test_id` - Test the selection belongs to
    /// * `variant_slug` - Slug of the chosen variant
    /// * `expiration` - Epoch milliseconds after which the record is invalid
    #[must_use]
    pub fn new(
        test_id: impl Into<String>,
        variant_slug: impl Into<String>,
        expiration: i64,
    ) -> Self {
        Self {
            test_id: test_id.into(),
            variant_slug: variant_slug.into(),
            expiration,
        }
    }

    /// Get the test ID.
    #[must_use]
    pub fn test_id(&self) -> &str {
        &self.test_id
    }

    /// Get the chosen variant slug.
    #[must_use]
    pub fn variant_slug(&self) -> &str {
        &self.variant_slug
    }

    /// Expiration in epoch milliseconds.
    #[must_use]
    pub const fn expiration(&self) -> i64 {
        self.expiration
    }

    /// Expiration as a timestamp, if representable.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.expiration)
    }

    /// A record is valid strictly before its expiration.
    #[must_use]
    pub const fn is_valid_at(&self, now_millis: i64) -> bool {
        now_millis < self.expiration
    }
}
