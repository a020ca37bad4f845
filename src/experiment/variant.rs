//! Variant - one arm of an experiment

use std::fmt;
use std::rc::Rc;

/// Zero-argument action run when a variant is chosen.
pub type Action = Rc<dyn Fn() -> anyhow::Result<()>>;

/// A variant of a test, identified by its slug.
///
/// The optional action is shared behind an `Rc`, so cloning a variant is
/// cheap and clones run the same action. Actions run on the calling thread
/// and need not be `Send`.
#[derive(Clone)]
pub struct Variant {
    slug: String,
    name: String,
    action: Option<Action>,
}

impl Variant {
    /// Create a variant without an action.
    ///
    /// # Arguments
    ///
    /// * `slug` - Identifier, unique within the test; used in URLs and storage
    /// * `name` - Human-readable name reported to the data layer
    #[must_use]
    pub fn new(slug: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            name: name.into(),
            action: None,
        }
    }

    /// Attach the action to execute when this variant runs.
    #[must_use]
    pub fn with_action<F>(mut self, action: F) -> Self
    where
        F: Fn() -> anyhow::Result<()> + 'static,
    {
        self.action = Some(Rc::new(action));
        self
    }

    /// Get the variant slug.
    #[must_use]
    pub fn slug(&self) -> &str {
        &self.slug
    }

    /// Get the variant name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether an action is attached.
    #[must_use]
    pub const fn has_action(&self) -> bool {
        self.action.is_some()
    }

    /// Execute the attached action, if any.
    ///
    /// # Errors
    ///
    /// Returns whatever error the action returns.
    pub fn run(&self) -> anyhow::Result<()> {
        self.action.as_ref().map_or(Ok(()), |action| action())
    }
}

impl fmt::Debug for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variant")
            .field("slug", &self.slug)
            .field("name", &self.name)
            .field("has_action", &self.has_action())
            .finish()
    }
}

impl PartialEq for Variant {
    fn eq(&self, other: &Self) -> bool {
        self.slug == other.slug && self.name == other.name
    }
}

impl Eq for Variant {}
