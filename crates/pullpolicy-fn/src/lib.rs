//! Pull policy transformer invocation
//!
//! Loads a `PullPolicyTransformer` config, runs the filter once over a
//! manifest stream and renders the result. The binary in `main.rs` only adds
//! argument parsing, file I/O and logging setup.

#![allow(missing_docs)]

use anyhow::{bail, Context};
use pullpolicy_filter::{FilterStats, PullPolicyConfig, PullPolicyFilter};
use pullpolicy_tree::stream;
use serde::Deserialize;

/// Group and version the transformer is registered under
pub const API_VERSION: &str = "k8s.blachniet.com/v1alpha1";

/// Kind the transformer is registered under
pub const KIND: &str = "PullPolicyTransformer";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TypeMeta {
    #[serde(default)]
    api_version: String,
    #[serde(default)]
    kind: String,
}

/// Parse and validate a transformer config
///
/// # Errors
/// Fails if the YAML is malformed, the config is not a
/// `k8s.blachniet.com/v1alpha1` `PullPolicyTransformer`, or a rule is invalid.
pub fn load_config(text: &str) -> anyhow::Result<PullPolicyConfig> {
    let meta: TypeMeta = serde_yaml::from_str(text).context("reading transformer config")?;
    if meta.api_version != API_VERSION || meta.kind != KIND {
        bail!(
            "unsupported transformer {}/{}: expected {API_VERSION}/{KIND}",
            meta.api_version,
            meta.kind
        );
    }

    let config = PullPolicyConfig::from_yaml(text)?;
    config.validate()?;
    tracing::debug!(
        "loaded {} image rules and {} field specs",
        config.images.len(),
        config.field_specs.len()
    );
    Ok(config)
}

/// Result of one transformer run
#[derive(Debug, Clone)]
pub struct Transformed {
    /// Rendered manifest stream
    pub output: String,
    /// What the filter did
    pub stats: FilterStats,
}

/// Run the filter over a manifest stream
///
/// # Errors
/// Fails on malformed manifests or on the first filter error.
pub fn transform(config: PullPolicyConfig, manifests: &str) -> anyhow::Result<Transformed> {
    let mut documents = stream::parse_stream(manifests).context("parsing manifests")?;
    let filter = PullPolicyFilter::new(config);
    let stats = filter
        .filter_with_stats(&mut documents)
        .context("applying pull policies")?;
    let output = stream::render_stream(&documents).context("rendering manifests")?;
    Ok(Transformed { output, stats })
}
