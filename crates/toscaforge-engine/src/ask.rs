//! Resource-ask document generation.
//!
//! Builds the ask YAML document from a raw (unresolved) template: every
//! node template carrying a `node_filter` contributes one entry with
//! generation metadata and the filter's resolved capability constraints.

use chrono::Utc;
use serde_yaml::{Mapping, Value};

use toscaforge_common::constants;
use toscaforge_common::error::{Result, ToscaforgeError};
use toscaforge_model::document::Document;

use crate::constraint;

/// Ask-document schema version.
const ASK_VERSION: &str = "1.0";

/// Builds the ask document for every filtered node in `document`.
///
/// # Errors
///
/// Returns [`ToscaforgeError::Document`] when the document has no node
/// templates, or none of them carries a `node_filter`.
pub fn build(document: &Document) -> Result<Mapping> {
    let created_at = Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
    let mut ask = Mapping::new();

    for node in document.nodes()? {
        let Some(filter) = node.node_filter() else {
            continue;
        };

        let mut metadata = Mapping::new();
        let _ = metadata.insert(
            "created_by".into(),
            Value::String(constants::APP_NAME.to_owned()),
        );
        let _ = metadata.insert("created_at".into(), Value::String(created_at.clone()));
        let _ = metadata.insert(
            "description".into(),
            Value::String(format!("Generated from node {}", node.name())),
        );
        let _ = metadata.insert("version".into(), Value::String(ASK_VERSION.to_owned()));

        let mut entry = Mapping::new();
        let _ = entry.insert("metadata".into(), Value::Mapping(metadata));

        let capabilities = constraint::resolve_ask(filter);
        if !capabilities.is_empty() {
            let _ = entry.insert("capabilities".into(), Value::Mapping(capabilities));
        }

        let _ = ask.insert(Value::String(node.name().to_owned()), Value::Mapping(entry));
    }

    if ask.is_empty() {
        return Err(ToscaforgeError::Document {
            message: "no node templates with a node_filter found".into(),
        });
    }

    Ok(ask)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FILTERED: &str = "\
service_template:
  node_templates:
    worker:
      type: eu.example::Compute
      node_filter:
        $and:
          - $equal: [{$get_property: [SELF, TARGET, CAPABILITY, cpu, cores]}, 4]
    plain:
      type: eu.example::Compute
";

    #[test]
    fn filtered_nodes_get_entries_with_metadata() {
        let document = Document::from_str(FILTERED).expect("parses");
        let ask = build(&document).expect("builds");
        assert_eq!(ask.len(), 1);

        let worker = ask.get("worker").expect("worker entry");
        let metadata = worker.get("metadata").expect("metadata");
        assert_eq!(
            metadata.get("created_by").and_then(Value::as_str),
            Some(constants::APP_NAME)
        );
        assert_eq!(metadata.get("version").and_then(Value::as_str), Some(ASK_VERSION));
        let created_at = metadata
            .get("created_at")
            .and_then(Value::as_str)
            .expect("created_at");
        assert!(created_at.ends_with('Z'), "ISO-8601 UTC: {created_at}");

        let cores = worker
            .get("capabilities")
            .and_then(|c| c.get("cpu"))
            .and_then(|c| c.get("properties"))
            .and_then(|p| p.get("cores"));
        assert_eq!(cores.and_then(Value::as_i64), Some(4));
    }

    #[test]
    fn no_filtered_nodes_is_document_fatal() {
        let document =
            Document::from_str("service_template: {node_templates: {plain: {type: T}}}")
                .expect("parses");
        let error = build(&document).expect_err("should fail");
        assert!(matches!(error, ToscaforgeError::Document { .. }));
    }
}
