//! Capacity extraction from a resolved node-template map.
//!
//! A template either declares one overall-capacity node (absolute figures
//! for the whole swarm) or per-node instance counts. Either way a flavour
//! side table (every other node's non-capacity capability properties) is
//! collected alongside.

use serde_yaml::{Mapping, Value};

use toscaforge_common::config::ClassifierConfig;
use toscaforge_model::template::NodeView;
use toscaforge_model::value::{unwrap_properties, unwrap_value};

use crate::classify;

/// Result of a capacity extraction.
///
/// Exactly one of `absolute` and `per_node` is populated.
#[derive(Debug, Clone)]
pub struct CapacityReport {
    /// Per-node capability property sets, keyed by node then capability.
    pub flavour: Mapping,
    /// The overall-capacity node's `capacity` properties, when one exists.
    pub absolute: Option<Mapping>,
    /// Fallback instance count per node (`capacity.properties.instances`,
    /// default 1).
    pub per_node: Option<Mapping>,
}

impl CapacityReport {
    /// Renders the report as a YAML tree (`flavour` plus either
    /// `capacity_raw` or `capacity_flavour`).
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut out = Mapping::new();
        let _ = out.insert("flavour".into(), Value::Mapping(self.flavour.clone()));
        if let Some(absolute) = &self.absolute {
            let _ = out.insert("capacity_raw".into(), Value::Mapping(absolute.clone()));
        } else if let Some(per_node) = &self.per_node {
            let _ = out.insert("capacity_flavour".into(), Value::Mapping(per_node.clone()));
        }
        Value::Mapping(out)
    }
}

/// Extracts capacity information from a node-template map.
///
/// Calling this on a concrete assignment is a caller error; the caller
/// checks the document kind before invoking.
#[must_use]
pub fn extract(nodes: &[NodeView<'_>], config: &ClassifierConfig) -> CapacityReport {
    let mut absolute = None;

    for node in nodes {
        if is_capacity_provider(node, config) {
            let properties = node
                .capability_properties("capacity")
                .map(unwrap_properties)
                .unwrap_or_default();
            absolute = Some(properties);
            break;
        }
    }

    let mut flavour = Mapping::new();
    for node in nodes {
        if is_capacity_provider(node, config) {
            continue;
        }
        let mut definition = Mapping::new();
        if let Some(capabilities) = node.capabilities() {
            for (cap_name, capability) in capabilities {
                if cap_name.as_str() == Some("capacity") {
                    continue;
                }
                let Some(properties) = capability.get("properties").and_then(Value::as_mapping)
                else {
                    continue;
                };
                if properties.is_empty() {
                    continue;
                }
                let _ = definition.insert(
                    cap_name.clone(),
                    Value::Mapping(unwrap_properties(properties)),
                );
            }
        }
        let _ = flavour.insert(Value::String(node.name().to_owned()), Value::Mapping(definition));
    }

    let per_node = if absolute.is_some() {
        None
    } else {
        let mut counts = Mapping::new();
        for node in nodes {
            let instances = node
                .capability_properties("capacity")
                .and_then(|p| p.get("instances"))
                .map_or_else(|| Value::from(1), unwrap_value);
            let _ = counts.insert(Value::String(node.name().to_owned()), instances);
        }
        Some(counts)
    };

    CapacityReport {
        flavour,
        absolute,
        per_node,
    }
}

fn is_capacity_provider(node: &NodeView<'_>, config: &ClassifierConfig) -> bool {
    classify::classify(node.types(), config).capacity_provider
}
