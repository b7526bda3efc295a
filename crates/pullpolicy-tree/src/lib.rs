//! Manifest document tree
//!
//! Addressable, mutable trees of typed YAML nodes backed by an arena.
//!
//! # Core Concepts
//!
//! - [`Document`]: one top-level manifest; owns every node in a flat arena
//! - [`NodeId`]: stable index of a node inside its document
//! - [`Node`]: closed variant over [`Scalar`], sequence and mapping shapes
//! - [`Location`]: human-readable address of a node (`spec.containers[0]`)
//!
//! Mutation is "overwrite the value at index i": handles stay valid for the
//! lifetime of the document and no node is ever moved.
//!
//! # Example
//!
//! ```rust
//! use pullpolicy_tree::{stream, Scalar};
//!
//! let mut docs = stream::parse_stream("kind: Pod\nspec: {}\n").unwrap();
//! let doc = &mut docs[0];
//! let spec = doc.field(doc.root(), "spec").unwrap().unwrap();
//! doc.set_field(spec, "restartPolicy", Scalar::from("Never")).unwrap();
//!
//! assert_eq!(doc.kind(), Some("Pod"));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod document;
mod error;
mod node;
pub mod stream;

pub use document::{Document, Location, Step};
pub use error::TreeError;
pub use node::{Entry, Node, NodeId, Scalar, Shape};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
