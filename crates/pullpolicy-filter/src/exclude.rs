//! Documents the filter must never touch
//!
//! Field specs only say where to look, not what to skip, so skipping is a
//! separate predicate. The filter ships with [`KindExclusion`] for
//! `CustomResourceDefinition`: CRD schemas contain `containers`-shaped fields
//! that are not workloads.

use pullpolicy_tree::Document;

/// Kind excluded by default
pub const CUSTOM_RESOURCE_DEFINITION: &str = "CustomResourceDefinition";

/// Predicate deciding whether a document passes through unchanged
pub trait ExclusionPredicate: Send + Sync {
    /// Check whether `doc` must be left alone
    fn is_excluded(&self, doc: &Document) -> bool;
}

impl<F> ExclusionPredicate for F
where
    F: Fn(&Document) -> bool + Send + Sync,
{
    fn is_excluded(&self, doc: &Document) -> bool {
        self(doc)
    }
}

/// Excludes documents by their top-level `kind`
///
/// Documents without a readable kind are never excluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindExclusion {
    kinds: Vec<String>,
}

impl KindExclusion {
    /// Exclude the given kinds
    pub fn new<I, S>(kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kinds: kinds.into_iter().map(Into::into).collect(),
        }
    }

    /// Exclude `CustomResourceDefinition` only
    #[must_use]
    pub fn custom_resource_definitions() -> Self {
        Self::new([CUSTOM_RESOURCE_DEFINITION])
    }

    /// Excluded kinds
    #[inline]
    #[must_use]
    pub fn kinds(&self) -> &[String] {
        &self.kinds
    }
}

impl Default for KindExclusion {
    fn default() -> Self {
        Self::custom_resource_definitions()
    }
}

impl ExclusionPredicate for KindExclusion {
    fn is_excluded(&self, doc: &Document) -> bool {
        doc.kind()
            .is_some_and(|kind| self.kinds.iter().any(|excluded| excluded == kind))
    }
}
