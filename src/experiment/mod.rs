//! Test definitions and the in-session registry
//!
//! ```text
//! ExperimentDefinition (1) ──< Variant (≥ 2)
//!          │
//!          └── ExperimentRegistry: id → definition, run history
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use ab_testing_toolkit::experiment::{ExperimentDefinition, ExperimentRegistry, Variant};
//!
//! let test = ExperimentDefinition::builder("checkout-cta", "Checkout CTA")
//!     .variant(Variant::new("green", "Green button"))
//!     .variant(Variant::new("blue", "Blue button"))
//!     .data_layer_event_name("CheckoutTest")
//!     .build();
//! assert!(test.validate().is_ok());
//!
//! let mut registry = ExperimentRegistry::new();
//! registry.insert(test);
//! assert!(registry.contains("checkout-cta"));
//! ```

mod definition;
mod registry;
mod variant;

pub use definition::{ExperimentDefinition, ExperimentDefinitionBuilder, Hook};
pub use registry::ExperimentRegistry;
pub use variant::{Action, Variant};
