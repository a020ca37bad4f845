//! Selection Store - expiring persisted selections in one KV slot
//!
//! The whole `test id → record` mapping is one JSON value under a single
//! key. Every write is read-modify-write of the entire mapping, and
//! expired entries are pruned on read by rewriting the slot from the
//! surviving records.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, error, warn};

use super::{SelectionMap, SelectionRecord};
use crate::clock::{Clock, SystemClock};
use crate::config::{ManagerConfig, DEFAULT_EXPIRATION_MS, DEFAULT_STORAGE_KEY};
use crate::kv::KvStore;
use crate::{Error, Result};

/// Decode a raw slot value.
///
/// An empty value is an empty mapping, like a missing slot. Entries that are
/// not well-formed selection records are skipped.
///
/// # Errors
///
/// Returns `Error::StorageParse` if the value is not a JSON object.
pub fn parse_store(raw: &str) -> Result<SelectionMap> {
    decode_slot(raw).map(|(records, _)| records)
}

/// Decoded records plus the number of entries that had to be skipped.
fn decode_slot(raw: &str) -> Result<(SelectionMap, usize)> {
    if raw.is_empty() {
        return Ok((SelectionMap::new(), 0));
    }
    let entries: Map<String, Value> = serde_json::from_str(raw).map_err(Error::StorageParse)?;
    let total = entries.len();
    let records: SelectionMap = entries
        .into_iter()
        .filter_map(|(key, value)| {
            serde_json::from_value::<SelectionRecord>(value)
                .ok()
                .map(|record| (key, record))
        })
        .collect();
    let skipped = total - records.len();
    Ok((records, skipped))
}

/// Persisted selections on top of any `KvStore`.
pub struct SelectionStore<K: KvStore> {
    kv: K,
    clock: Arc<dyn Clock>,
    key: String,
    expiration_ms: i64,
}

impl<K: KvStore> SelectionStore<K> {
    /// Store using the system clock and default slot key and expiration.
    #[must_use]
    pub fn new(kv: K) -> Self {
        Self {
            kv,
            clock: Arc::new(SystemClock),
            key: DEFAULT_STORAGE_KEY.to_string(),
            expiration_ms: DEFAULT_EXPIRATION_MS,
        }
    }

    /// Store with an explicit clock and the key/expiration from `config`.
    #[must_use]
    pub fn with_config(kv: K, clock: Arc<dyn Clock>, config: &ManagerConfig) -> Self {
        Self {
            kv,
            clock,
            key: config.storage_key.clone(),
            expiration_ms: config.expiration_ms,
        }
    }

    /// Get reference to inner store (for inspection/testing)
    #[must_use]
    pub const fn kv(&self) -> &K {
        &self.kv
    }

    /// Key of the slot holding the mapping
    #[must_use]
    pub fn storage_key(&self) -> &str {
        &self.key
    }

    /// All non-expired selections.
    ///
    /// A slot that is not a JSON object is logged, deleted and read as empty.
    /// If any record has expired or is malformed, the slot is rewritten with
    /// only the surviving records.
    ///
    /// # Errors
    ///
    /// Returns error if the underlying store fails.
    pub fn read_all(&self) -> Result<SelectionMap> {
        let Some(raw) = self.kv.get(&self.key)? else {
            return Ok(SelectionMap::new());
        };

        let (mut survivors, malformed) = match decode_slot(&raw) {
            Ok(decoded) => decoded,
            Err(err) => {
                error!(key = %self.key, error = %err, "discarding malformed saved variants");
                self.kv.delete(&self.key)?;
                return Ok(SelectionMap::new());
            }
        };
        if malformed > 0 {
            warn!(key = %self.key, malformed, "dropping malformed saved variant records");
        }

        let now = self.clock.now_millis();
        let decoded = survivors.len();
        survivors.retain(|_, record| record.is_valid_at(now));
        let expired = decoded - survivors.len();
        if expired == 0 && malformed == 0 {
            return Ok(survivors);
        }

        debug!(key = %self.key, expired, malformed, "pruning saved variants");
        let survivors: SelectionMap = survivors
            .into_values()
            .map(|record| (record.test_id().to_string(), record))
            .collect();
        self.persist(&survivors)?;
        Ok(survivors)
    }

    /// Remember `variant_slug` for `test_id`, expiring one window from now.
    ///
    /// # Errors
    ///
    /// Returns error if the mapping cannot be encoded or stored.
    pub fn write(&self, test_id: &str, variant_slug: &str) -> Result<SelectionRecord> {
        let mut records = self.read_all()?;
        let expiration = self.clock.now_millis().saturating_add(self.expiration_ms);
        let record = SelectionRecord::new(test_id, variant_slug, expiration);
        records.insert(test_id.to_string(), record.clone());
        self.persist(&records)?;
        Ok(record)
    }

    /// Saved slug for `test_id`, if a valid record exists.
    ///
    /// # Errors
    ///
    /// Returns error if the underlying store fails.
    pub fn read(&self, test_id: &str) -> Result<Option<String>> {
        Ok(self
            .read_all()?
            .remove(test_id)
            .map(|record| record.variant_slug().to_string()))
    }

    /// Forget the selection for `test_id`. The mapping is written back even
    /// when no record existed.
    ///
    /// # Errors
    ///
    /// Returns error if the mapping cannot be encoded or stored.
    pub fn delete(&self, test_id: &str) -> Result<()> {
        let mut records = self.read_all()?;
        records.remove(test_id);
        self.persist(&records)
    }

    /// Remove the whole slot.
    ///
    /// # Errors
    ///
    /// Returns error if the underlying store fails.
    pub fn clear(&self) -> Result<()> {
        self.kv.delete(&self.key)
    }

    fn persist(&self, records: &SelectionMap) -> Result<()> {
        let encoded = serde_json::to_string(records).map_err(Error::Serialize)?;
        self.kv.set(&self.key, encoded)
    }
}
