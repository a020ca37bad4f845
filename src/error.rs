//! Error types for the A/B test manager
//!
//! Registration problems are hard failures. Storage parse problems are
//! recovered internally and only surface from the explicit parse entry point.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Reasons a test definition is rejected by `register`.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// Empty or missing test id
    #[error("a test ID is required")]
    MissingId,

    /// Fewer than two variants
    #[error("a test must have at least 2 variants")]
    NotEnoughVariants,

    /// A variant has an empty name
    #[error("a variant must have a name")]
    MissingVariantName,

    /// A variant has an empty slug
    #[error("a variant must have a slug")]
    MissingVariantSlug,
}

/// Lifecycle point at which a caller-supplied hook failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookStage {
    /// `on_before_run` of the test
    BeforeRun,
    /// `on_run` of the selected variant
    VariantRun,
    /// `on_after_run` of the test
    AfterRun,
}

impl HookStage {
    /// Get stage name as string
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::BeforeRun => "on_before_run",
            Self::VariantRun => "on_run",
            Self::AfterRun => "on_after_run",
        }
    }
}

impl std::fmt::Display for HookStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A/B test manager error types
#[derive(Error, Debug)]
pub enum Error {
    /// Test definition failed validation; nothing was registered
    #[error("Invalid test definition: {0}")]
    Validation(#[from] ValidationError),

    /// Persisted selections could not be decoded
    #[error("Malformed saved variants: {0}")]
    StorageParse(#[source] serde_json::Error),

    /// Selections could not be encoded for storage
    #[error("Failed to encode saved variants: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Key-value backend failure (quota exceeded, storage disabled, ...)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Page location could not be parsed
    #[error("Invalid page location: {0}")]
    InvalidLocation(#[from] url::ParseError),

    /// Caller-supplied hook returned an error
    #[error("Hook {stage} failed for test '{experiment_id}': {source}")]
    Hook {
        /// Test that was running
        experiment_id: String,
        /// Hook that failed
        stage: HookStage,
        /// Error returned by the hook
        #[source]
        source: anyhow::Error,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
