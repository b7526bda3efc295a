//! Transformer configuration
//!
//! ```yaml
//! images:
//!   - name: nginx
//!     newPullPolicy: Always
//! fieldSpecs:
//!   - path: spec/foos[]
//!     createIfNotPresent: true
//! ```

use serde::{Deserialize, Serialize};

use crate::error::FilterError;
use crate::path::{FieldPath, FieldSpec};
use crate::policy::ImageRule;

/// Container lists of pods and of pod templates
pub const DEFAULT_FIELD_PATHS: [&[&str]; 4] = [
    &["spec", "containers"],
    &["spec", "initContainers"],
    &["spec", "template", "spec", "containers"],
    &["spec", "template", "spec", "initContainers"],
];

/// Pull policy transformer configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullPolicyConfig {
    /// Rules, first match wins
    #[serde(default)]
    pub images: Vec<ImageRule>,

    /// Where container lists live; defaults apply when empty
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub field_specs: Vec<FieldSpec>,
}

impl PullPolicyConfig {
    /// Create config with rules and no field specs
    #[inline]
    #[must_use]
    pub fn new(images: Vec<ImageRule>) -> Self {
        Self {
            images,
            field_specs: Vec::new(),
        }
    }

    /// Add a field spec
    #[must_use]
    pub fn with_field_spec(mut self, spec: FieldSpec) -> Self {
        self.field_specs.push(spec);
        self
    }

    /// Parse from YAML
    ///
    /// Keys other than `images` and `fieldSpecs` are ignored.
    ///
    /// # Errors
    /// Returns `FilterError::Config` for malformed YAML, unknown shapes or
    /// unparsable paths
    pub fn from_yaml(yaml: &str) -> Result<Self, FilterError> {
        serde_yaml::from_str(yaml).map_err(|e| FilterError::Config(e.to_string()))
    }

    /// Install the default field specs if none are configured
    ///
    /// Calling this again, or on a config that already has field specs,
    /// changes nothing.
    pub fn default_field_specs(&mut self) {
        if !self.field_specs.is_empty() {
            return;
        }
        self.field_specs = DEFAULT_FIELD_PATHS
            .iter()
            .map(|names| FieldSpec::new(FieldPath::fields(names).with_elements(), false))
            .collect();
    }

    /// Check rules for empty names or values
    ///
    /// # Errors
    /// Returns `FilterError::Config` naming the first invalid rule
    pub fn validate(&self) -> Result<(), FilterError> {
        for (i, rule) in self.images.iter().enumerate() {
            if rule.name.is_empty() {
                return Err(FilterError::Config(format!("images[{i}]: name is empty")));
            }
            if rule.new_value.is_empty() {
                return Err(FilterError::Config(format!(
                    "images[{i}]: new pull policy for '{}' is empty",
                    rule.name
                )));
            }
        }
        Ok(())
    }
}
