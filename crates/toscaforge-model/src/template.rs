//! Accessors over node templates in a parsed document.
//!
//! A node template is kept as the generic YAML tree it was parsed from;
//! [`NodeView`] provides typed accessors over it rather than ad-hoc key
//! lookups scattered through the engine.

use serde_yaml::{Mapping, Value};

const EMPTY_SEQ: &[Value] = &[];

/// A read-only view over one node template.
#[derive(Debug, Clone, Copy)]
pub struct NodeView<'a> {
    name: &'a str,
    data: &'a Value,
}

impl<'a> NodeView<'a> {
    /// Wraps a node template value under its name.
    #[must_use]
    pub const fn new(name: &'a str, data: &'a Value) -> Self {
        Self { name, data }
    }

    /// The node's unique name within the document.
    #[must_use]
    pub const fn name(&self) -> &'a str {
        self.name
    }

    /// The underlying YAML value.
    #[must_use]
    pub const fn data(&self) -> &'a Value {
        self.data
    }

    /// The declared type name, or an empty string when absent.
    #[must_use]
    pub fn type_name(&self) -> &'a str {
        self.data.get("type").and_then(Value::as_str).unwrap_or("")
    }

    /// The resolved type-ancestry map (`types`), when present.
    #[must_use]
    pub fn types(&self) -> Option<&'a Mapping> {
        self.data.get("types").and_then(Value::as_mapping)
    }

    /// The node's own properties.
    #[must_use]
    pub fn properties(&self) -> Option<&'a Mapping> {
        self.data.get("properties").and_then(Value::as_mapping)
    }

    /// One property value by name.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&'a Value> {
        self.properties().and_then(|p| p.get(name))
    }

    /// The node's capabilities map.
    #[must_use]
    pub fn capabilities(&self) -> Option<&'a Mapping> {
        self.data.get("capabilities").and_then(Value::as_mapping)
    }

    /// Properties of one capability by name.
    #[must_use]
    pub fn capability_properties(&self, capability: &str) -> Option<&'a Mapping> {
        self.capabilities()?
            .get(capability)?
            .get("properties")
            .and_then(Value::as_mapping)
    }

    /// The node's requirement entries, empty when absent.
    #[must_use]
    pub fn requirements(&self) -> &'a [Value] {
        self.data
            .get("requirements")
            .and_then(Value::as_sequence)
            .map_or(EMPTY_SEQ, Vec::as_slice)
    }

    /// The node's filter expression, when present.
    #[must_use]
    pub fn node_filter(&self) -> Option<&'a Value> {
        self.data.get("node_filter")
    }

    /// The node's directives, empty when absent.
    #[must_use]
    pub fn directives(&self) -> &'a [Value] {
        self.data
            .get("directives")
            .and_then(Value::as_sequence)
            .map_or(EMPTY_SEQ, Vec::as_slice)
    }

    /// Whether the node carries the given directive (e.g. `substitute`).
    #[must_use]
    pub fn has_directive(&self, directive: &str) -> bool {
        self.directives()
            .iter()
            .any(|d| d.as_str() == Some(directive))
    }
}
