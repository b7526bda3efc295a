//! Pull policy rules and their application to container entries

use pullpolicy_tree::{Document, NodeId, Scalar};
use serde::{Deserialize, Serialize};

use crate::error::FilterError;
use crate::image;

/// Field holding the image reference of a container
pub const IMAGE_FIELD: &str = "image";

/// Field the matching rule writes
pub const PULL_POLICY_FIELD: &str = "imagePullPolicy";

/// Image name and the pull policy to give it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRule {
    /// Image name, compared without tag or digest
    pub name: String,
    /// Value written to the pull policy field
    #[serde(rename = "newPullPolicy", alias = "newValue")]
    pub new_value: String,
}

impl ImageRule {
    /// Create rule
    #[inline]
    pub fn new(name: impl Into<String>, new_value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            new_value: new_value.into(),
        }
    }

    /// Check whether this rule applies to the image reference `image`
    #[inline]
    #[must_use]
    pub fn matches(&self, image: &str) -> bool {
        image::matches(image, &self.name)
    }
}

/// What [`MutationPolicy::apply`] did to a container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Pull policy written
    Updated,
    /// A rule matched but the policy already had its value
    AlreadySet,
    /// No rule matched; container untouched
    NoMatch,
}

/// Ordered rule list plus the fields it reads and writes
///
/// Rules are scanned in order and the first match wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationPolicy {
    rules: Vec<ImageRule>,
    identifying_field: String,
    output_field: String,
}

impl MutationPolicy {
    /// Policy over `image` / `imagePullPolicy`
    #[must_use]
    pub fn new(rules: Vec<ImageRule>) -> Self {
        Self {
            rules,
            identifying_field: IMAGE_FIELD.to_string(),
            output_field: PULL_POLICY_FIELD.to_string(),
        }
    }

    /// Read and write other fields
    #[must_use]
    pub fn with_fields(mut self, identifying: impl Into<String>, output: impl Into<String>) -> Self {
        self.identifying_field = identifying.into();
        self.output_field = output.into();
        self
    }

    /// Configured rules, in evaluation order
    #[inline]
    #[must_use]
    pub fn rules(&self) -> &[ImageRule] {
        &self.rules
    }

    /// First rule matching `image`
    #[must_use]
    pub fn matching_rule(&self, image: &str) -> Option<&ImageRule> {
        self.rules.iter().find(|rule| rule.matches(image))
    }

    /// Apply the first matching rule to the container mapping at `container`
    ///
    /// # Errors
    /// - `FilterError::TypeMismatch` if the container is not a mapping or its
    ///   image is not a scalar
    /// - `FilterError::MissingField` if the container has no image
    pub fn apply(&self, doc: &mut Document, container: NodeId) -> Result<Outcome, FilterError> {
        let image = doc
            .field(container, &self.identifying_field)?
            .ok_or_else(|| FilterError::missing_field(doc.location(container), &self.identifying_field))?;
        let image = doc.scalar(image)?.text().into_owned();

        let Some(rule) = self.matching_rule(&image) else {
            tracing::trace!("no rule for image {} at {}", image, doc.location(container));
            return Ok(Outcome::NoMatch);
        };

        if let Some(current) = doc.field(container, &self.output_field)? {
            let current = doc.scalar(current).ok().and_then(Scalar::as_str);
            if current == Some(rule.new_value.as_str()) {
                return Ok(Outcome::AlreadySet);
            }
        }

        doc.set_field(container, &self.output_field, rule.new_value.as_str())?;
        tracing::debug!(
            "set {} to {} for image {} at {}",
            self.output_field,
            rule.new_value,
            image,
            doc.location(container)
        );
        Ok(Outcome::Updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pullpolicy_tree::stream::parse_document;
    use pullpolicy_tree::Shape;

    fn container(yaml: &str) -> (Document, NodeId) {
        let doc = parse_document(&format!("containers:\n- {}\n", yaml.trim())).unwrap();
        let list = doc.field(doc.root(), "containers").unwrap().unwrap();
        let first = doc.elements(list).unwrap()[0];
        (doc, first)
    }

    fn policy_of(doc: &Document, id: NodeId) -> Option<String> {
        let policy = doc.field(id, PULL_POLICY_FIELD).unwrap()?;
        Some(doc.scalar(policy).unwrap().text().into_owned())
    }

    fn nginx_always() -> MutationPolicy {
        MutationPolicy::new(vec![ImageRule::new("nginx", "Always")])
    }

    #[test]
    fn apply_adds_missing_policy() {
        let (mut doc, id) = container("{name: web, image: 'nginx:1.14.2'}");
        assert_eq!(nginx_always().apply(&mut doc, id).unwrap(), Outcome::Updated);
        assert_eq!(policy_of(&doc, id).as_deref(), Some("Always"));
    }

    #[test]
    fn apply_overwrites_existing_policy() {
        let (mut doc, id) = container("{image: 'nginx:1.14.2', imagePullPolicy: IfNotPresent}");
        assert_eq!(nginx_always().apply(&mut doc, id).unwrap(), Outcome::Updated);
        assert_eq!(policy_of(&doc, id).as_deref(), Some("Always"));
    }

    #[test]
    fn apply_is_idempotent() {
        let (mut doc, id) = container("{image: 'nginx:1.14.2'}");
        let policy = nginx_always();
        assert_eq!(policy.apply(&mut doc, id).unwrap(), Outcome::Updated);
        let once = doc.to_value();
        assert_eq!(policy.apply(&mut doc, id).unwrap(), Outcome::AlreadySet);
        assert_eq!(doc.to_value(), once);
    }

    #[test]
    fn apply_leaves_unmatched_untouched() {
        let (mut doc, id) = container("{image: 'notnginx:1.14.2'}");
        let before = doc.to_value();
        assert_eq!(nginx_always().apply(&mut doc, id).unwrap(), Outcome::NoMatch);
        assert_eq!(doc.to_value(), before);

        let (mut doc, id) = container("{image: 'redis', imagePullPolicy: Never}");
        nginx_always().apply(&mut doc, id).unwrap();
        assert_eq!(policy_of(&doc, id).as_deref(), Some("Never"));
    }

    #[test]
    fn first_matching_rule_wins() {
        let policy = MutationPolicy::new(vec![
            ImageRule::new("redis", "Never"),
            ImageRule::new("nginx", "IfNotPresent"),
            ImageRule::new("nginx", "Always"),
        ]);
        let (mut doc, id) = container("{image: 'nginx:latest'}");
        policy.apply(&mut doc, id).unwrap();
        assert_eq!(policy_of(&doc, id).as_deref(), Some("IfNotPresent"));
    }

    #[test]
    fn missing_image_is_error() {
        let (mut doc, id) = container("{name: nginx}");
        let err = nginx_always().apply(&mut doc, id).unwrap_err();
        assert!(matches!(err, FilterError::MissingField { ref field, .. } if field == "image"));
        assert_eq!(err.to_string(), "missing field 'image' at containers[0]");
    }

    #[test]
    fn scalar_container_is_type_mismatch() {
        let (mut doc, id) = container("'not what you expected'");
        let err = nginx_always().apply(&mut doc, id).unwrap_err();
        assert!(matches!(
            err,
            FilterError::TypeMismatch {
                expected: Shape::Mapping,
                actual: Shape::Scalar,
                ..
            }
        ));
    }

    #[test]
    fn non_scalar_image_is_type_mismatch() {
        let (mut doc, id) = container("{image: [nginx]}");
        let err = nginx_always().apply(&mut doc, id).unwrap_err();
        assert!(matches!(
            err,
            FilterError::TypeMismatch {
                expected: Shape::Scalar,
                actual: Shape::Sequence,
                ..
            }
        ));
    }

    #[test]
    fn custom_fields() {
        let policy = nginx_always().with_fields("ref", "policy");
        let (mut doc, id) = container("{ref: nginx}");
        policy.apply(&mut doc, id).unwrap();
        let value = doc.field(id, "policy").unwrap().unwrap();
        assert_eq!(doc.scalar(value).unwrap().as_str(), Some("Always"));
    }

    #[test]
    fn rule_accepts_both_value_keys() {
        let a: ImageRule = serde_yaml::from_str("name: nginx\nnewPullPolicy: Always\n").unwrap();
        let b: ImageRule = serde_yaml::from_str("name: nginx\nnewValue: Always\n").unwrap();
        assert_eq!(a, b);
    }
}
