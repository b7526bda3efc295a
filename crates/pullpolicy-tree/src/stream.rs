//! Multi-document YAML streams
//!
//! Splits `---` separated manifests into [`Document`]s and renders them back.
//! Comments and input formatting are not preserved.

use serde::Deserialize;
use serde_yaml::Value;

use crate::document::Document;
use crate::error::TreeError;

/// Parse every non-empty document of a YAML stream
///
/// # Errors
/// - `TreeError::Yaml` for malformed YAML
/// - any error of [`Document::from_value`]
pub fn parse_stream(text: &str) -> Result<Vec<Document>, TreeError> {
    let mut documents = Vec::new();
    for de in serde_yaml::Deserializer::from_str(text) {
        let value = Value::deserialize(de)?;
        if value.is_null() {
            continue;
        }
        documents.push(Document::from_value(&value)?);
    }
    Ok(documents)
}

/// Parse a single YAML document
///
/// # Errors
/// - `TreeError::Yaml` for malformed YAML or multi-document input
/// - any error of [`Document::from_value`]
pub fn parse_document(text: &str) -> Result<Document, TreeError> {
    let value: Value = serde_yaml::from_str(text)?;
    Document::from_value(&value)
}

/// Render documents as one `---` separated stream
///
/// # Errors
/// Returns `TreeError::Yaml` if a value cannot be serialized
pub fn render_stream(documents: &[Document]) -> Result<String, TreeError> {
    let mut out = String::new();
    for (i, doc) in documents.iter().enumerate() {
        if i > 0 {
            out.push_str("---\n");
        }
        out.push_str(&serde_yaml::to_string(&doc.to_value())?);
    }
    Ok(out)
}
