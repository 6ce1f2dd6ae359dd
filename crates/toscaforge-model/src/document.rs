//! Document loading and top-level views.

use std::path::Path;

use serde_yaml::{Mapping, Value};

use toscaforge_common::error::{Result, ToscaforgeError};

use crate::template::NodeView;

/// Node-template keys carried into a cluster summary.
const SUMMARY_KEYS: &[&str] = &[
    "type",
    "directives",
    "properties",
    "requirements",
    "capabilities",
];

/// A parsed TOSCA document (raw or processor-resolved).
#[derive(Debug, Clone)]
pub struct Document {
    root: Value,
}

impl Document {
    /// Parses a document from YAML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid YAML.
    pub fn from_str(text: &str) -> Result<Self> {
        let root: Value = serde_yaml::from_str(text)?;
        Ok(Self { root })
    }

    /// Reads and parses a document from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text =
            std::fs::read_to_string(path).map_err(|source| ToscaforgeError::io(path, source))?;
        Self::from_str(&text)
    }

    /// The underlying YAML tree.
    #[must_use]
    pub const fn root(&self) -> &Value {
        &self.root
    }

    /// The `service_template.node_templates` mapping.
    ///
    /// # Errors
    ///
    /// Returns [`ToscaforgeError::Document`] when the section is missing or
    /// empty; a document without node templates cannot be projected.
    pub fn node_templates(&self) -> Result<&Mapping> {
        let templates = self
            .root
            .get("service_template")
            .and_then(|st| st.get("node_templates"))
            .and_then(Value::as_mapping)
            .ok_or_else(|| ToscaforgeError::Document {
                message: "no 'service_template.node_templates' section found".into(),
            })?;
        if templates.is_empty() {
            return Err(ToscaforgeError::Document {
                message: "'node_templates' section is empty".into(),
            });
        }
        Ok(templates)
    }

    /// Views over every node template, in document order.
    ///
    /// Entries with non-string keys are skipped.
    ///
    /// # Errors
    ///
    /// Propagates the [`Self::node_templates`] error.
    pub fn nodes(&self) -> Result<Vec<NodeView<'_>>> {
        Ok(self
            .node_templates()?
            .iter()
            .filter_map(|(name, data)| name.as_str().map(|n| NodeView::new(n, data)))
            .collect())
    }

    /// The `service_template.policies` sequence, empty when absent.
    #[must_use]
    pub fn policies(&self) -> &[Value] {
        self.root
            .get("service_template")
            .and_then(|st| st.get("policies"))
            .and_then(Value::as_sequence)
            .map_or(&[], Vec::as_slice)
    }

    /// Whether this document is a concrete assignment rather than an
    /// abstract template (top-level `metadata.template_type: concrete`).
    ///
    /// Capacity extraction is only meaningful on abstract templates.
    #[must_use]
    pub fn is_concrete(&self) -> bool {
        self.root
            .get("metadata")
            .and_then(|m| m.get("template_type"))
            .and_then(Value::as_str)
            == Some("concrete")
    }

    /// Reduces every node template to its placement-relevant keys.
    ///
    /// # Errors
    ///
    /// Propagates the [`Self::node_templates`] error.
    pub fn cluster_summary(&self) -> Result<Mapping> {
        let mut summary = Mapping::new();
        for node in self.nodes()? {
            let mut info = Mapping::new();
            if let Some(data) = node.data().as_mapping() {
                for (key, value) in data {
                    if key.as_str().is_some_and(|k| SUMMARY_KEYS.contains(&k)) {
                        let _ = info.insert(key.clone(), value.clone());
                    }
                }
            }
            let _ = summary.insert(
                Value::String(node.name().to_owned()),
                Value::Mapping(info),
            );
        }
        Ok(summary)
    }
}
