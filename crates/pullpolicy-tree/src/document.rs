//! Arena-backed documents
//!
//! Provides [`Document`], the owner of every node of one manifest, and
//! [`Location`] for reporting where in a manifest something happened.

use std::fmt::{self, Display, Formatter};

use serde_yaml::value::{Tag, TaggedValue};
use serde_yaml::{Mapping, Value};

use crate::error::TreeError;
use crate::node::{Entry, Node, NodeId, Scalar, Shape};

#[derive(Debug, Clone)]
struct Slot {
    node: Node,
    tag: Option<Tag>,
    parent: Option<NodeId>,
}

/// One top-level manifest
///
/// All nodes live in a flat arena addressed by [`NodeId`]. Replacing a field
/// value repoints the mapping entry at a freshly allocated subtree; the old
/// subtree stays in the arena but is no longer reachable from the root and is
/// never serialized.
#[derive(Debug, Clone)]
pub struct Document {
    slots: Vec<Slot>,
    root: NodeId,
}

impl Document {
    /// Build a document from a parsed YAML value
    ///
    /// # Errors
    /// - `TreeError::UnsupportedKey` for sequence or mapping keys
    /// - `TreeError::UnsupportedTag` for doubly tagged values
    pub fn from_value(value: &Value) -> Result<Self, TreeError> {
        let mut doc = Self {
            slots: Vec::new(),
            root: NodeId(0),
        };
        doc.root = doc.graft(value, None)?;
        Ok(doc)
    }

    /// Convert back to a YAML value
    #[must_use]
    pub fn to_value(&self) -> Value {
        self.value_at(self.root)
    }

    /// Root node
    #[inline]
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Node stored at `id`
    #[inline]
    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.slot(id).node
    }

    /// Shape of the node at `id`
    #[inline]
    #[must_use]
    pub fn shape(&self, id: NodeId) -> Shape {
        self.node(id).shape()
    }

    /// Parent of `id`, `None` for the root
    #[inline]
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slot(id).parent
    }

    /// Check whether `id` holds a null scalar
    #[inline]
    #[must_use]
    pub fn is_null(&self, id: NodeId) -> bool {
        matches!(self.node(id), Node::Scalar(Scalar::Null))
    }

    /// Entries of the mapping at `map`
    ///
    /// # Errors
    /// Returns `TreeError::TypeMismatch` if `map` is not a mapping
    pub fn entries(&self, map: NodeId) -> Result<&[Entry], TreeError> {
        match self.node(map) {
            Node::Mapping(entries) => Ok(entries),
            _ => Err(self.mismatch(map, Shape::Mapping)),
        }
    }

    /// Look up a field of the mapping at `map`
    ///
    /// # Errors
    /// Returns `TreeError::TypeMismatch` if `map` is not a mapping
    pub fn field(&self, map: NodeId, name: &str) -> Result<Option<NodeId>, TreeError> {
        Ok(self
            .entries(map)?
            .iter()
            .find(|entry| entry.key.as_str() == Some(name))
            .map(|entry| entry.value))
    }

    /// Elements of the sequence at `seq`
    ///
    /// # Errors
    /// Returns `TreeError::TypeMismatch` if `seq` is not a sequence
    pub fn elements(&self, seq: NodeId) -> Result<&[NodeId], TreeError> {
        match self.node(seq) {
            Node::Sequence(items) => Ok(items),
            _ => Err(self.mismatch(seq, Shape::Sequence)),
        }
    }

    /// Scalar stored at `id`
    ///
    /// # Errors
    /// Returns `TreeError::TypeMismatch` if `id` is not a scalar
    pub fn scalar(&self, id: NodeId) -> Result<&Scalar, TreeError> {
        match self.node(id) {
            Node::Scalar(scalar) => Ok(scalar),
            _ => Err(self.mismatch(id, Shape::Scalar)),
        }
    }

    /// Append a new field to the mapping at `map`
    ///
    /// # Errors
    /// - `TreeError::TypeMismatch` if `map` is not a mapping
    /// - `TreeError::DuplicateField` if the field already exists
    pub fn insert_field(
        &mut self,
        map: NodeId,
        name: &str,
        value: impl Into<Value>,
    ) -> Result<NodeId, TreeError> {
        if self.field(map, name)?.is_some() {
            return Err(TreeError::DuplicateField {
                location: self.location(map),
                field: name.to_string(),
            });
        }
        let child = self.graft(&value.into(), Some(map))?;
        self.mapping_mut(map)?.push(Entry {
            key: Scalar::from(name),
            value: child,
        });
        Ok(child)
    }

    /// Set a field of the mapping at `map`
    ///
    /// An existing field keeps its position and gets the new value; a missing
    /// field is appended.
    ///
    /// # Errors
    /// Returns `TreeError::TypeMismatch` if `map` is not a mapping
    pub fn set_field(
        &mut self,
        map: NodeId,
        name: &str,
        value: impl Into<Value>,
    ) -> Result<NodeId, TreeError> {
        let position = self
            .entries(map)?
            .iter()
            .position(|entry| entry.key.as_str() == Some(name));
        let Some(position) = position else {
            return self.insert_field(map, name, value);
        };
        let child = self.graft(&value.into(), Some(map))?;
        self.mapping_mut(map)?[position].value = child;
        Ok(child)
    }

    /// The document's top-level `kind`
    ///
    /// `None` when the root is not a mapping or has no string `kind`.
    #[must_use]
    pub fn kind(&self) -> Option<&str> {
        let kind = self.field(self.root, "kind").ok().flatten()?;
        self.scalar(kind).ok()?.as_str()
    }

    /// Address of `id` relative to the root
    #[must_use]
    pub fn location(&self, id: NodeId) -> Location {
        let mut steps = Vec::new();
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            match self.node(parent) {
                Node::Mapping(entries) => {
                    if let Some(entry) = entries.iter().find(|e| e.value == current) {
                        steps.push(Step::Field(entry.key.text().into_owned()));
                    }
                }
                Node::Sequence(items) => {
                    if let Some(index) = items.iter().position(|&c| c == current) {
                        steps.push(Step::Index(index));
                    }
                }
                Node::Scalar(_) => {}
            }
            current = parent;
        }
        steps.reverse();
        Location(steps)
    }

    #[inline]
    fn slot(&self, id: NodeId) -> &Slot {
        &self.slots[id.0]
    }

    fn mapping_mut(&mut self, map: NodeId) -> Result<&mut Vec<Entry>, TreeError> {
        if self.shape(map) != Shape::Mapping {
            return Err(self.mismatch(map, Shape::Mapping));
        }
        match &mut self.slots[map.0].node {
            Node::Mapping(entries) => Ok(entries),
            _ => unreachable!("shape checked above"),
        }
    }

    fn mismatch(&self, id: NodeId, expected: Shape) -> TreeError {
        TreeError::TypeMismatch {
            location: self.location(id),
            expected,
            actual: self.shape(id),
        }
    }

    fn alloc(&mut self, node: Node, tag: Option<Tag>, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.slots.len());
        self.slots.push(Slot { node, tag, parent });
        id
    }

    /// Copy `value` into the arena below `parent`
    fn graft(&mut self, value: &Value, parent: Option<NodeId>) -> Result<NodeId, TreeError> {
        let (value, tag) = match value {
            Value::Tagged(tagged) => (&tagged.value, Some(tagged.tag.clone())),
            other => (other, None),
        };
        // Children need the parent's id, so reserve the slot first.
        let id = self.alloc(Node::Scalar(Scalar::Null), tag, parent);
        let node = match value {
            Value::Sequence(items) => {
                let mut children = Vec::with_capacity(items.len());
                for item in items {
                    children.push(self.graft(item, Some(id))?);
                }
                Node::Sequence(children)
            }
            Value::Mapping(map) => {
                let mut entries = Vec::with_capacity(map.len());
                for (key, item) in map {
                    let key = Scalar::from_value(key).ok_or_else(|| TreeError::UnsupportedKey {
                        key: format!("{key:?}"),
                    })?;
                    let value = self.graft(item, Some(id))?;
                    entries.push(Entry { key, value });
                }
                Node::Mapping(entries)
            }
            Value::Tagged(inner) => {
                return Err(TreeError::UnsupportedTag {
                    tag: inner.tag.to_string(),
                })
            }
            leaf => Node::Scalar(Scalar::from_value(leaf).unwrap_or(Scalar::Null)),
        };
        self.slots[id.0].node = node;
        Ok(id)
    }

    fn value_at(&self, id: NodeId) -> Value {
        let slot = self.slot(id);
        let value = match &slot.node {
            Node::Scalar(scalar) => scalar.to_value(),
            Node::Sequence(items) => {
                Value::Sequence(items.iter().map(|&child| self.value_at(child)).collect())
            }
            Node::Mapping(entries) => {
                let mut map = Mapping::with_capacity(entries.len());
                for entry in entries {
                    map.insert(entry.key.to_value(), self.value_at(entry.value));
                }
                Value::Mapping(map)
            }
        };
        match &slot.tag {
            Some(tag) => Value::Tagged(Box::new(TaggedValue {
                tag: tag.clone(),
                value,
            })),
            None => value,
        }
    }
}

impl PartialEq for Document {
    /// Structural equality of the reachable trees
    fn eq(&self, other: &Self) -> bool {
        self.to_value() == other.to_value()
    }
}

/// One step of a [`Location`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Step {
    /// Mapping field
    Field(String),
    /// Sequence index
    Index(usize),
}

/// Address of a node from its document root
///
/// Displays as `spec.containers[1].image`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Location(Vec<Step>);

impl Location {
    /// The document root
    #[inline]
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Steps from the root
    #[inline]
    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.0
    }

    /// Location of a field below this one
    #[must_use]
    pub fn field(&self, name: impl Into<String>) -> Self {
        let mut steps = self.0.clone();
        steps.push(Step::Field(name.into()));
        Self(steps)
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("document root");
        }
        for (i, step) in self.0.iter().enumerate() {
            match step {
                Step::Field(name) if i == 0 => write!(f, "{name}")?,
                Step::Field(name) => write!(f, ".{name}")?,
                Step::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}
