//! Path resolution over document trees
//!
//! [`resolve`] walks a [`FieldSpec`] against a document and yields every node
//! the path reaches, in document order. Resolution is lazy: each call to
//! `next` advances the walk, materializing missing fields on the way when the
//! field spec asks for it.

use pullpolicy_tree::{Document, NodeId};
use serde_yaml::{Mapping, Value};

use crate::error::FilterError;
use crate::path::{FieldSpec, Segment};

/// Resolve `spec` against the root of `doc`
#[must_use]
pub fn resolve<'a>(doc: &'a mut Document, spec: &'a FieldSpec) -> Resolution<'a> {
    let root = doc.root();
    Resolution {
        doc,
        segments: spec.path.segments(),
        create: spec.create_if_not_present,
        pending: vec![(root, 0)],
    }
}

/// Lazy iterator over resolved nodes
///
/// Yields `Err` at most once; the walk stops after the first error.
#[derive(Debug)]
pub struct Resolution<'a> {
    doc: &'a mut Document,
    segments: &'a [Segment],
    create: bool,
    /// Stack of `(node, next segment index)`
    pending: Vec<(NodeId, usize)>,
}

impl Resolution<'_> {
    fn step(&mut self, node: NodeId, depth: usize, segment: &Segment) -> Result<(), FilterError> {
        // A null value holds nothing, whatever shape the path expects.
        if self.doc.is_null(node) {
            return Ok(());
        }

        match segment {
            Segment::Field(name) => {
                let child = match self.doc.field(node, name)? {
                    Some(child) => child,
                    None if self.create => self.materialize(node, name, depth)?,
                    None => return Ok(()),
                };
                self.pending.push((child, depth + 1));
            }
            Segment::Elements => {
                let elements = self.doc.elements(node)?;
                self.pending
                    .extend(elements.iter().rev().map(|&element| (element, depth + 1)));
            }
        }
        Ok(())
    }

    /// Create the missing field `name`, shaped for the segment after it
    fn materialize(&mut self, node: NodeId, name: &str, depth: usize) -> Result<NodeId, FilterError> {
        let blank = match self.segments.get(depth + 1) {
            Some(Segment::Elements) => Value::Sequence(Vec::new()),
            _ => Value::Mapping(Mapping::new()),
        };
        let child = self.doc.insert_field(node, name, blank)?;
        tracing::trace!("created missing field at {}", self.doc.location(child));
        Ok(child)
    }
}

impl Iterator for Resolution<'_> {
    type Item = Result<NodeId, FilterError>;

    fn next(&mut self) -> Option<Self::Item> {
        let segments = self.segments;
        while let Some((node, depth)) = self.pending.pop() {
            let Some(segment) = segments.get(depth) else {
                return Some(Ok(node));
            };
            if let Err(err) = self.step(node, depth, segment) {
                self.pending.clear();
                return Some(Err(err));
            }
        }
        None
    }
}
