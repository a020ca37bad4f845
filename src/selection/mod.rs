//! Bucketing and persisted selections
//!
//! ```text
//! run(id) ─► Selector ─► URL override? ─► saved record? ─► random ─► SelectionStore::write
//!                                              ▲
//!                         SelectionStore::read_all (prunes expired records)
//! ```

mod record;
mod selector;
mod store;

pub use record::{SelectionMap, SelectionRecord};
pub use selector::{Selection, SelectionSource, Selector};
pub use store::{parse_store, SelectionStore};
