//! # ab-testing-toolkit: client-side A/B test variant selection
//!
//! Registers A/B tests, buckets the visitor into one variant per test, and
//! remembers the choice for a year. Each run executes the chosen variant's
//! behavior and can report it to an analytics data layer.
//!
//! ## Selection Precedence
//!
//! 1. **URL override**: `?ab-test=<id>&ab-variant=<slug>` forces a known slug
//! 2. **Saved choice**: a non-expired record in the `ab-test-manager` slot
//! 3. **Random**: uniform draw among the variants, saved immediately
//!
//! ## Example Usage
//!
//! ```rust
//! use ab_testing_toolkit::{AbTestManager, ExperimentDefinition, Variant};
//!
//! let mut manager = AbTestManager::builder().seed(42).build();
//!
//! manager.register(
//!     ExperimentDefinition::builder("t1", "Headline")
//!         .variant(Variant::new("a", "Short").with_action(|| Ok(())))
//!         .variant(Variant::new("b", "Long").with_action(|| Ok(())))
//!         .build(),
//! )?;
//!
//! let first = manager.run("t1")?.expect("t1 is registered");
//! let second = manager.run("t1")?.expect("t1 is registered");
//! assert_eq!(first.variant, second.variant);
//!
//! manager.delete_saved_variant("t1")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod clock;
pub mod config;
pub mod data_layer;
pub mod error;
pub mod experiment;
pub mod kv;
pub mod location;
pub mod manager;
pub mod selection;
#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
pub mod wasm;

pub use config::ManagerConfig;
pub use data_layer::{DataLayer, DataLayerEvent};
pub use error::{Error, HookStage, Result, ValidationError};
pub use experiment::{ExperimentDefinition, Variant};
pub use location::PageLocation;
pub use manager::{AbTestManager, AbTestManagerBuilder, RunOutcome};
pub use selection::{SelectionRecord, SelectionSource};
