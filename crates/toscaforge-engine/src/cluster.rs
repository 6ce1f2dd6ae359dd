//! Projection of node templates into flattened, provider-specific
//! resource-ask maps.
//!
//! Each resource or application node is reduced to a flat property map:
//! its own properties plus everything collected from (possibly nested)
//! capabilities, topped up with type-level defaults, then renamed through
//! the provider's alias table. Properties with no alias entry are dropped;
//! unknown providers therefore yield empty output rather than leaking
//! unvetted field names into the ask schema.
//!
//! Application nodes participate only to seed the cross-node ingress
//! aggregation pass; they are removed from the final map.

use serde_yaml::{Mapping, Value};

use toscaforge_common::config::ClassifierConfig;
use toscaforge_common::constants;
use toscaforge_model::template::NodeView;
use toscaforge_model::value::{as_i64, unwrap_properties, unwrap_value};

use crate::classify;

/// One alias table: original property name → ask-schema field name.
/// A property survives when its name is a key here, or already equals one
/// of the target names.
struct AliasTable(&'static [(&'static str, &'static str)]);

impl AliasTable {
    fn target_for(&self, name: &str) -> Option<&'static str> {
        self.0
            .iter()
            .find(|(from, _)| *from == name)
            .map(|(_, to)| *to)
            .or_else(|| self.0.iter().map(|(_, to)| *to).find(|to| *to == name))
    }
}

const AWS_ALIASES: AliasTable = AliasTable(&[
    ("flavour", "instance_type"),
    ("ami", "image_id"),
    ("image", "image_id"),
    ("vpc", "network_id"),
    ("network", "network_id"),
    ("region", "region"),
    ("key_name", "key_name"),
    ("security_groups", "security_group_ids"),
    ("ingress", "custom_ingress_ports"),
    ("ssh_user", "ssh_user"),
]);

const OPENSTACK_ALIASES: AliasTable = AliasTable(&[
    ("instance_type", "flavour"),
    ("flavour", "flavour"),
    ("image", "image_id"),
    ("network", "network_id"),
    ("floating_ip", "floating_ip"),
    ("key_name", "key_name"),
    ("security_groups", "security_groups"),
    ("ingress", "custom_ingress_ports"),
]);

const EDGE_ALIASES: AliasTable = AliasTable(&[
    ("host_ip", "host_ip"),
    ("architecture", "architecture"),
    ("num_cpus", "num_cpus"),
    ("mem_size", "mem_size"),
    ("ingress", "custom_ingress_ports"),
]);

/// Applied to application nodes regardless of provider.
const APPLICATION_ALIASES: AliasTable = AliasTable(&[
    ("image", "image"),
    ("ports", "ports"),
    ("replicas", "replicas"),
    ("env", "env"),
]);

const EMPTY_ALIASES: AliasTable = AliasTable(&[]);

/// Projects every resource node into its flat resource-ask map.
///
/// Nodes that are neither resources nor applications are skipped; a
/// warning is emitted when a node's ancestry still contains an abstract
/// resource placeholder type.
#[must_use]
pub fn project(nodes: &[NodeView<'_>], config: &ClassifierConfig) -> Mapping {
    let mut output = Mapping::new();
    let mut application_nodes: Vec<String> = Vec::new();

    for node in nodes {
        let types = node.types();
        if classify::has_abstract_marker(types) {
            tracing::warn!(
                node = node.name(),
                "node still references an abstract resource placeholder type"
            );
        }

        let class = classify::classify(types, config);
        if !class.resource && !class.application {
            continue;
        }

        let mut collected = collect_properties(node);
        fill_defaults(node, &mut collected);

        let table = if class.application {
            application_nodes.push(node.name().to_owned());
            &APPLICATION_ALIASES
        } else {
            provider_table(&collected)
        };

        let _ = output.insert(
            Value::String(node.name().to_owned()),
            Value::Mapping(apply_aliases(&collected, table)),
        );
    }

    aggregate_ingress(&mut output, &application_nodes);

    for name in &application_nodes {
        let _ = output.remove(name.as_str());
    }

    output
}

/// Flattens a node's own properties and every capability's properties into
/// one namespace. Capability properties shadow same-named node properties.
fn collect_properties(node: &NodeView<'_>) -> Mapping {
    let mut collected = node.properties().map(unwrap_properties).unwrap_or_default();

    let mut stack: Vec<(&Mapping, usize)> =
        node.capabilities().map(|caps| vec![(caps, 1)]).unwrap_or_default();
    while let Some((capabilities, depth)) = stack.pop() {
        if depth > constants::MAX_CAPABILITY_DEPTH {
            tracing::warn!(
                node = node.name(),
                depth,
                "capability nesting exceeds the depth guard; deeper levels ignored"
            );
            continue;
        }
        for (_, capability) in capabilities {
            if let Some(properties) = capability.get("properties").and_then(Value::as_mapping) {
                for (key, value) in properties {
                    let _ = collected.insert(key.clone(), unwrap_value(value));
                }
            }
            if let Some(nested) = capability.get("capabilities").and_then(Value::as_mapping) {
                stack.push((nested, depth + 1));
            }
        }
    }

    collected
}

/// Injects type-level property defaults for anything not already collected.
fn fill_defaults(node: &NodeView<'_>, collected: &mut Mapping) {
    let Some(types) = node.types() else {
        return;
    };
    for (_, definition) in types {
        if let Some(schema) = definition.get("properties").and_then(Value::as_mapping) {
            inject_defaults(schema, collected);
        }

        let mut stack: Vec<(&Mapping, usize)> = definition
            .get("capabilities")
            .and_then(Value::as_mapping)
            .map(|caps| vec![(caps, 1)])
            .unwrap_or_default();
        while let Some((capabilities, depth)) = stack.pop() {
            if depth > constants::MAX_CAPABILITY_DEPTH {
                continue;
            }
            for (_, capability) in capabilities {
                if let Some(schema) = capability.get("properties").and_then(Value::as_mapping) {
                    inject_defaults(schema, collected);
                }
                if let Some(nested) = capability.get("capabilities").and_then(Value::as_mapping) {
                    stack.push((nested, depth + 1));
                }
            }
        }
    }
}

fn inject_defaults(schema: &Mapping, collected: &mut Mapping) {
    for (name, declaration) in schema {
        let Some(default) = declaration.get("default") else {
            continue;
        };
        if collected.get(name).is_none() {
            let _ = collected.insert(name.clone(), unwrap_value(default));
        }
    }
}

fn provider_table(collected: &Mapping) -> &'static AliasTable {
    let provider = collected
        .get("provider")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_lowercase();
    match provider.as_str() {
        "aws" | "amazon" => &AWS_ALIASES,
        "openstack" => &OPENSTACK_ALIASES,
        "edge" => &EDGE_ALIASES,
        _ => &EMPTY_ALIASES,
    }
}

fn apply_aliases(collected: &Mapping, table: &AliasTable) -> Mapping {
    let mut out = Mapping::new();
    for (key, value) in collected {
        let Some(name) = key.as_str() else {
            continue;
        };
        if let Some(target) = table.target_for(name) {
            let _ = out.insert(Value::String(target.to_owned()), value.clone());
        }
    }
    out
}

/// Appends one ingress rule per application port (then per node-port) to
/// every resource that exposes a `custom_ingress_ports` field.
fn aggregate_ingress(output: &mut Mapping, application_nodes: &[String]) {
    let mut ports = Vec::new();
    let mut node_ports = Vec::new();

    for name in application_nodes {
        let Some(entries) = output
            .get(name.as_str())
            .and_then(|n| n.get("ports"))
            .and_then(Value::as_sequence)
        else {
            continue;
        };
        for entry in entries {
            let port = entry
                .get("port")
                .and_then(as_i64)
                .or_else(|| entry.get("targetPort").and_then(as_i64));
            if let Some(port) = port {
                ports.push(port);
            }
            if let Some(node_port) = entry.get("nodePort").and_then(as_i64) {
                node_ports.push(node_port);
            }
        }
    }

    if ports.is_empty() && node_ports.is_empty() {
        return;
    }

    for (name, properties) in output.iter_mut() {
        if name
            .as_str()
            .is_some_and(|n| application_nodes.iter().any(|a| a == n))
        {
            continue;
        }
        let Some(properties) = properties.as_mapping_mut() else {
            continue;
        };
        let Some(existing) = properties.get("custom_ingress_ports") else {
            continue;
        };

        // A single rule is promoted to a list before merging. A scalar is
        // not a rule; it is left untouched rather than clobbered.
        let mut rules = match existing {
            Value::Sequence(rules) => rules.clone(),
            Value::Mapping(_) => vec![existing.clone()],
            _ => {
                tracing::warn!(
                    node = name.as_str().unwrap_or(""),
                    "custom_ingress_ports is not a rule list; skipping ingress aggregation"
                );
                continue;
            }
        };
        for port in ports.iter().chain(node_ports.iter()) {
            rules.push(ingress_rule(*port));
        }
        let _ = properties.insert("custom_ingress_ports".into(), Value::Sequence(rules));
    }
}

fn ingress_rule(port: i64) -> Value {
    let mut rule = Mapping::new();
    let _ = rule.insert("from".into(), Value::String(port.to_string()));
    let _ = rule.insert("to".into(), Value::String(port.to_string()));
    let _ = rule.insert("protocol".into(), Value::String("tcp".into()));
    let _ = rule.insert("source".into(), Value::String("0.0.0.0/0".into()));
    Value::Mapping(rule)
}
