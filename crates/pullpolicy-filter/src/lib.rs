//! Image pull policy filter
//!
//! Sets `imagePullPolicy` on the containers of workload manifests whose image
//! name matches a configured rule.
//!
//! # Core Operations
//!
//! - **Resolve**: walk [`FieldSpec`] paths such as `spec/containers[]` to the
//!   container entries of a [`Document`](pullpolicy_tree::Document)
//! - **Match**: compare each container's image name against [`ImageRule`]s,
//!   ignoring tag and digest
//! - **Mutate**: write the first matching rule's value into `imagePullPolicy`
//!
//! # Architecture
//!
//! ```text
//! documents → ExclusionPredicate → resolve(FieldSpec) → containers → MutationPolicy
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use pullpolicy_filter::{PullPolicyConfig, PullPolicyFilter};
//!
//! let config = PullPolicyConfig::from_yaml(config_text)?;
//! config.validate()?;
//!
//! let filter = PullPolicyFilter::new(config);
//! filter.filter(&mut documents)?;
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

// Core modules
pub mod config;
pub mod error;
pub mod exclude;
pub mod filter;
pub mod image;
pub mod path;
pub mod policy;
pub mod resolve;

// Re-exports for convenience
pub use config::{PullPolicyConfig, DEFAULT_FIELD_PATHS};
pub use error::{FilterError, FilterResult};
pub use exclude::{ExclusionPredicate, KindExclusion, CUSTOM_RESOURCE_DEFINITION};
pub use filter::{FilterStats, PullPolicyFilter};
pub use image::ImageRef;
pub use path::{FieldPath, FieldSpec, Segment};
pub use policy::{ImageRule, MutationPolicy, Outcome, IMAGE_FIELD, PULL_POLICY_FIELD};
pub use resolve::{resolve, Resolution};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the pull policy filter
    pub use crate::config::PullPolicyConfig;
    pub use crate::error::FilterError;
    pub use crate::filter::PullPolicyFilter;
    pub use crate::path::FieldSpec;
    pub use crate::policy::ImageRule;
    pub use pullpolicy_tree::{stream, Document};
}
