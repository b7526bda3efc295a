//! Document filter - main entry point
//!
//! Runs the exclusion check on every document, resolves each configured field
//! spec against the ones that remain and applies the mutation policy to every
//! container found. The first error aborts the batch; documents already
//! mutated stay mutated.

use std::fmt;

use pullpolicy_tree::Document;

use crate::config::PullPolicyConfig;
use crate::error::FilterError;
use crate::exclude::{ExclusionPredicate, KindExclusion};
use crate::path::FieldSpec;
use crate::policy::{MutationPolicy, Outcome};
use crate::resolve::resolve;

/// Counters for one filter run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterStats {
    /// Documents seen
    pub documents: usize,
    /// Documents passed through by the exclusion predicate
    pub excluded: usize,
    /// Container entries visited
    pub containers: usize,
    /// Container entries whose pull policy was written
    pub updated: usize,
}

/// Pull policy filter
///
/// # Example
///
/// ```rust
/// use pullpolicy_filter::{ImageRule, PullPolicyConfig, PullPolicyFilter};
/// use pullpolicy_tree::stream::{parse_stream, render_stream};
///
/// let mut docs = parse_stream(
///     "kind: Pod\nspec:\n  containers:\n  - name: web\n    image: nginx:1.14.2\n",
/// )
/// .unwrap();
///
/// let filter = PullPolicyFilter::new(PullPolicyConfig::new(vec![
///     ImageRule::new("nginx", "Always"),
/// ]));
/// filter.filter(&mut docs).unwrap();
///
/// assert!(render_stream(&docs).unwrap().contains("imagePullPolicy: Always"));
/// ```
pub struct PullPolicyFilter {
    field_specs: Vec<FieldSpec>,
    policy: MutationPolicy,
    exclusion: Box<dyn ExclusionPredicate>,
}

impl PullPolicyFilter {
    /// Create filter, installing default field specs if none are configured
    #[must_use]
    pub fn new(mut config: PullPolicyConfig) -> Self {
        config.default_field_specs();
        Self {
            field_specs: config.field_specs,
            policy: MutationPolicy::new(config.images),
            exclusion: Box::new(KindExclusion::default()),
        }
    }

    /// Replace the exclusion predicate
    #[must_use]
    pub fn with_exclusion(mut self, exclusion: impl ExclusionPredicate + 'static) -> Self {
        self.exclusion = Box::new(exclusion);
        self
    }

    /// Field specs in evaluation order
    #[inline]
    #[must_use]
    pub fn field_specs(&self) -> &[FieldSpec] {
        &self.field_specs
    }

    /// Mutation policy
    #[inline]
    #[must_use]
    pub fn policy(&self) -> &MutationPolicy {
        &self.policy
    }

    /// Filter documents in place, handing the same documents back
    ///
    /// # Errors
    /// Returns the first resolution or policy error; see
    /// [`filter_with_stats`](Self::filter_with_stats)
    pub fn filter<'d>(
        &self,
        documents: &'d mut [Document],
    ) -> Result<&'d mut [Document], FilterError> {
        self.filter_with_stats(documents)?;
        Ok(documents)
    }

    /// Filter documents in place and report what happened
    ///
    /// # Errors
    /// - `FilterError::TypeMismatch` if a path or container has the wrong shape
    /// - `FilterError::MissingField` if a container has no image
    /// - `FilterError::Tree` if a materialized field cannot be inserted
    pub fn filter_with_stats(&self, documents: &mut [Document]) -> Result<FilterStats, FilterError> {
        let mut stats = FilterStats::default();

        for (index, doc) in documents.iter_mut().enumerate() {
            stats.documents += 1;
            if self.exclusion.is_excluded(doc) {
                tracing::debug!(
                    "skipping document {} of kind {}",
                    index,
                    doc.kind().unwrap_or_default()
                );
                stats.excluded += 1;
                continue;
            }
            self.filter_document(doc, &mut stats).map_err(|e| {
                tracing::error!("filtering document {} failed: {}", index, e);
                e
            })?;
        }

        tracing::info!(
            "filtered {} documents ({} excluded), updated {} of {} containers",
            stats.documents,
            stats.excluded,
            stats.updated,
            stats.containers
        );
        Ok(stats)
    }

    fn filter_document(&self, doc: &mut Document, stats: &mut FilterStats) -> Result<(), FilterError> {
        for spec in &self.field_specs {
            let spec = spec.containers();
            let containers = resolve(doc, &spec).collect::<Result<Vec<_>, _>>()?;
            tracing::trace!("{} resolved to {} containers", spec, containers.len());

            for container in containers {
                stats.containers += 1;
                if self.policy.apply(doc, container)? == Outcome::Updated {
                    stats.updated += 1;
                }
            }
        }
        Ok(())
    }
}

impl fmt::Debug for PullPolicyFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PullPolicyFilter")
            .field("field_specs", &self.field_specs)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
