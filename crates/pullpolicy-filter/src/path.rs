//! Field paths for locating container lists
//!
//! Provides [`FieldPath`] and [`FieldSpec`]. The textual form is the
//! slash-separated field-spec syntax used by manifest transformers:
//!
//! - `spec/template/spec/containers[]`: walk three fields, then every element
//! - `metadata/annotations/example.com\/key`: `\/` escapes a slash in a name

use std::borrow::Cow;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FilterError;

/// One step of a [`FieldPath`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Named field of a mapping
    Field(String),
    /// Every element of a sequence (`[]`)
    Elements,
}

/// Structural address into a document
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldPath(Vec<Segment>);

impl FieldPath {
    /// Create path from segments
    #[inline]
    #[must_use]
    pub fn new(segments: Vec<Segment>) -> Self {
        Self(segments)
    }

    /// Path walking the given field names
    #[must_use]
    pub fn fields(names: &[&str]) -> Self {
        Self(
            names
                .iter()
                .map(|name| Segment::Field((*name).to_string()))
                .collect(),
        )
    }

    /// Get path segments
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    /// Get number of segments
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if path is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check if the path ends in a sequence wildcard
    #[inline]
    #[must_use]
    pub fn ends_with_elements(&self) -> bool {
        matches!(self.0.last(), Some(Segment::Elements))
    }

    /// Same path, terminated by a sequence wildcard
    #[must_use]
    pub fn with_elements(&self) -> Self {
        let mut new = self.clone();
        if !new.ends_with_elements() {
            new.0.push(Segment::Elements);
        }
        new
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                Segment::Field(name) => {
                    if i > 0 {
                        f.write_str("/")?;
                    }
                    f.write_str(&name.replace('/', "\\/"))?;
                }
                Segment::Elements => f.write_str("[]")?,
            }
        }
        Ok(())
    }
}

impl FromStr for FieldPath {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(FilterError::malformed_path(s, "path is empty"));
        }

        let mut segments = Vec::new();
        for raw in split_escaped(s) {
            let (name, elements) = match raw.strip_suffix("[]") {
                Some(name) => (name, true),
                None => (raw.as_str(), false),
            };
            if name.is_empty() {
                let reason = if elements {
                    "'[]' must follow a field name"
                } else {
                    "path contains empty segment"
                };
                return Err(FilterError::malformed_path(s, reason));
            }
            if name.contains(|c: char| c == '[' || c == ']') {
                return Err(FilterError::malformed_path(
                    s,
                    format!("unexpected bracket in segment '{raw}'"),
                ));
            }
            segments.push(Segment::Field(name.to_string()));
            if elements {
                segments.push(Segment::Elements);
            }
        }

        Ok(Self(segments))
    }
}

impl TryFrom<String> for FieldPath {
    type Error = FilterError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<FieldPath> for String {
    fn from(path: FieldPath) -> Self {
        path.to_string()
    }
}

/// Split on `/`, honouring `\/` escapes
fn split_escaped(s: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'/') => {
                current.push('/');
                chars.next();
            }
            '/' => parts.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    parts.push(current);
    parts
}

/// Path expression plus its creation policy
///
/// When `create_if_not_present` is set, missing fields along the path are
/// materialized as empty mappings or sequences instead of ending the walk.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    /// Where the container list lives
    pub path: FieldPath,
    /// Materialize missing fields
    #[serde(default)]
    pub create_if_not_present: bool,
}

impl FieldSpec {
    /// Create spec from a path
    #[inline]
    #[must_use]
    pub fn new(path: FieldPath, create_if_not_present: bool) -> Self {
        Self {
            path,
            create_if_not_present,
        }
    }

    /// Parse spec from the textual path syntax
    ///
    /// # Errors
    /// Returns `FilterError::MalformedPath` if the path cannot be parsed
    pub fn parse(path: &str, create_if_not_present: bool) -> Result<Self, FilterError> {
        Ok(Self::new(path.parse()?, create_if_not_present))
    }

    /// This spec with its path terminated by a sequence wildcard
    ///
    /// The node a path names is the container list, so a path without a
    /// trailing `[]` is visited as if it had one.
    #[must_use]
    pub fn containers(&self) -> Cow<'_, Self> {
        if self.path.ends_with_elements() {
            Cow::Borrowed(self)
        } else {
            Cow::Owned(Self::new(
                self.path.with_elements(),
                self.create_if_not_present,
            ))
        }
    }
}

impl Display for FieldSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str) -> Segment {
        Segment::Field(name.to_string())
    }

    #[test]
    fn parse_nested_containers() {
        let path: FieldPath = "spec/template/spec/containers[]".parse().unwrap();
        assert_eq!(
            path.segments(),
            &[
                field("spec"),
                field("template"),
                field("spec"),
                field("containers"),
                Segment::Elements
            ]
        );
        assert!(path.ends_with_elements());
    }

    #[test]
    fn parse_intermediate_wildcard() {
        let path: FieldPath = "spec/containers[]/ports[]".parse().unwrap();
        assert_eq!(path.len(), 5);
        assert_eq!(path.segments()[2], field("ports"));
    }

    #[test]
    fn parse_escaped_slash() {
        let path: FieldPath = r"metadata/annotations/example.com\/key".parse().unwrap();
        assert_eq!(path.segments()[2], field("example.com/key"));
        assert_eq!(path.to_string(), r"metadata/annotations/example.com\/key");
    }

    #[test]
    fn display_round_trips() {
        for text in ["spec/containers[]", "spec/foos", "a[]/b[]/c"] {
            let path: FieldPath = text.parse().unwrap();
            assert_eq!(path.to_string(), text);
        }
    }

    #[test]
    fn parse_rejects_empty_path() {
        let result: Result<FieldPath, _> = "".parse();
        assert!(matches!(result, Err(FilterError::MalformedPath { .. })));
    }

    #[test]
    fn parse_rejects_empty_segment() {
        let result: Result<FieldPath, _> = "spec//containers[]".parse();
        assert!(matches!(result, Err(FilterError::MalformedPath { .. })));
    }

    #[test]
    fn parse_rejects_bare_wildcard() {
        let result: Result<FieldPath, _> = "spec/[]".parse();
        assert!(matches!(result, Err(FilterError::MalformedPath { .. })));
    }

    #[test]
    fn parse_rejects_stray_bracket() {
        let result: Result<FieldPath, _> = "spec/containers[0]".parse();
        assert!(matches!(result, Err(FilterError::MalformedPath { .. })));
    }

    #[test]
    fn with_elements_is_idempotent() {
        let path = FieldPath::fields(&["spec", "containers"]);
        let once = path.with_elements();
        assert_eq!(once.with_elements(), once);
        assert_eq!(once.to_string(), "spec/containers[]");
    }

    #[test]
    fn containers_borrows_terminated_paths() {
        let spec = FieldSpec::parse("spec/containers[]", false).unwrap();
        assert!(matches!(spec.containers(), Cow::Borrowed(_)));

        let spec = FieldSpec::parse("spec/containers", true).unwrap();
        let terminated = spec.containers();
        assert!(terminated.path.ends_with_elements());
        assert!(terminated.create_if_not_present);
    }

    #[test]
    fn field_spec_deserializes_camel_case() {
        let spec: FieldSpec =
            serde_yaml::from_str("path: spec/foos[]\ncreateIfNotPresent: true\n").unwrap();
        assert_eq!(spec, FieldSpec::parse("spec/foos[]", true).unwrap());
    }

    #[test]
    fn field_spec_rejects_malformed_path() {
        let result: Result<FieldSpec, _> = serde_yaml::from_str("path: 'spec//x'\n");
        let err = result.unwrap_err();
        assert!(err.to_string().contains("malformed path"));
    }
}
