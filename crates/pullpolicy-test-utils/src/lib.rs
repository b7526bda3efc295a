//! Testing utilities for the pullpolicy workspace
//!
//! Shared manifest fixtures, YAML helpers, and assertions.

#![allow(missing_docs)]

use pretty_assertions::assert_eq;
use pullpolicy_tree::stream::{parse_stream, render_stream};
use pullpolicy_tree::Document;
use serde_yaml::Value;

pub const NGINX_POD: &str = "
apiVersion: v1
kind: Pod
metadata:
  name: nginx
spec:
  containers:
  - name: nginx
    image: nginx:1.14.2
";

pub const NGINX_DEPLOYMENT: &str = "
apiVersion: apps/v1
kind: Deployment
metadata:
  name: nginx
spec:
  template:
    spec:
      containers:
      - name: nginx
        image: nginx:1.14.2
";

pub const WHATEVER_CRD: &str = "
apiVersion: apiextensions.k8s.io/v1
kind: CustomResourceDefinition
metadata:
  name: whatever
spec:
  containers:
  - image: whatever
";

/// Parse a YAML stream, panicking on malformed input
pub fn documents(yaml: &str) -> Vec<Document> {
    parse_stream(yaml).unwrap()
}

/// Parse a single YAML document
pub fn document(yaml: &str) -> Document {
    let mut docs = documents(yaml);
    assert_eq!(docs.len(), 1, "expected exactly one document");
    docs.remove(0)
}

/// Render documents back to a YAML stream
pub fn render(docs: &[Document]) -> String {
    render_stream(docs).unwrap()
}

/// Parse every document of a stream into plain YAML values
pub fn values(yaml: &str) -> Vec<Value> {
    documents(yaml).iter().map(Document::to_value).collect()
}

/// Assert that `docs` are structurally equal to the stream `expected`
pub fn assert_yaml_eq(docs: &[Document], expected: &str) {
    let actual: Vec<Value> = docs.iter().map(Document::to_value).collect();
    assert_eq!(actual, values(expected));
}

/// Value of `field` on every element of the sequence at `path`
pub fn field_values(doc: &Document, path: &[&str], field: &str) -> Vec<Option<String>> {
    let list = path.iter().fold(doc.root(), |id, name| {
        doc.field(id, name).unwrap().unwrap()
    });
    doc.elements(list)
        .unwrap()
        .iter()
        .map(|&element| {
            doc.field(element, field)
                .unwrap()
                .map(|value| doc.scalar(value).unwrap().text().into_owned())
        })
        .collect()
}
