//! Node-filter constraint resolution.
//!
//! A node filter is a conjunction (`$and`) of constraint functions, each
//! pairing a `$get_property` path with a literal comparison value. Two
//! projections exist: the resource-ask shape (capability → property →
//! constraint value) and the flat label map used for placement.
//!
//! Unsupported shapes are skipped, never rejected; node filters are the
//! part of the schema that drifts most between profile generations.

use std::collections::BTreeMap;

use serde_yaml::{Mapping, Value};

use toscaforge_model::value::scalar_to_string;

const AND: &str = "$and";
const EQUAL: &str = "$equal";
const GET_PROPERTY: &str = "$get_property";

/// Path segment index naming the capability type.
const CAPABILITY_SEGMENT: usize = 3;
/// Path segment index naming the property.
const PROPERTY_SEGMENT: usize = 4;

/// Fixed path prefix selecting placement labels.
const LABEL_ANCHOR: &[&str] = &["SELF", "TARGET", "CAPABILITY", "resource", "labels"];

/// Resolves a node filter into the resource-ask shape.
///
/// Output is `capability-type → {properties: {name: value}}`. Equality
/// constraints store the raw literal; any other constraint function is kept
/// wrapped as `{function: literal}` so downstream consumers can re-render
/// the operator. Duplicate (capability, property) pairs are last-write-wins.
#[must_use]
pub fn resolve_ask(filter: &Value) -> Mapping {
    let mut capabilities = Mapping::new();

    for (function, args) in conditions(filter) {
        let Some(args) = args.as_sequence() else {
            continue;
        };
        if args.len() < 2 {
            continue;
        }
        let Some(path) = property_path(&args[0]) else {
            continue;
        };
        if path.len() <= PROPERTY_SEGMENT {
            // A reference style this resolver does not support.
            continue;
        }

        let capability = path[CAPABILITY_SEGMENT];
        let property = path[PROPERTY_SEGMENT];
        let value = constraint_value(function, &args[1]);

        if capabilities.get(capability).is_none() {
            let mut entry = Mapping::new();
            let _ = entry.insert("properties".into(), Value::Mapping(Mapping::new()));
            let _ = capabilities.insert(Value::String(capability.to_owned()), Value::Mapping(entry));
        }
        if let Some(properties) = capabilities
            .get_mut(capability)
            .and_then(|c| c.get_mut("properties"))
            .and_then(Value::as_mapping_mut)
        {
            let _ = properties.insert(Value::String(property.to_owned()), value);
        }
    }

    capabilities
}

/// Resolves a node filter into a flat placement-label map.
///
/// Only equality constraints on `SELF.TARGET.CAPABILITY.resource.labels.*`
/// paths are interpreted; empty or non-scalar comparison values suppress
/// the label.
#[must_use]
pub fn resolve_labels(filter: &Value) -> BTreeMap<String, String> {
    let mut labels = BTreeMap::new();

    for (function, args) in conditions(filter) {
        if function != EQUAL {
            continue;
        }
        let Some(args) = args.as_sequence() else {
            continue;
        };
        if args.len() < 2 {
            continue;
        }
        let Some(path) = property_path(&args[0]) else {
            continue;
        };
        if path.len() != LABEL_ANCHOR.len() + 1 || path[..LABEL_ANCHOR.len()] != *LABEL_ANCHOR {
            continue;
        }
        let Some(value) = scalar_to_string(&args[1]) else {
            continue;
        };
        if value.is_empty() {
            continue;
        }
        let _ = labels.insert(path[LABEL_ANCHOR.len()].to_owned(), value);
    }

    labels
}

/// Iterates the `(function, arguments)` pairs of a filter's `$and` list.
///
/// Any other boolean structure yields nothing.
fn conditions<'a>(filter: &'a Value) -> impl Iterator<Item = (&'a str, &'a Value)> {
    filter
        .get(AND)
        .and_then(Value::as_sequence)
        .map_or(&[][..], Vec::as_slice)
        .iter()
        .filter_map(Value::as_mapping)
        .flat_map(|condition| {
            condition
                .iter()
                .filter_map(|(func, args)| func.as_str().map(|f| (f, args)))
        })
}

/// Extracts the segments of a `$get_property` operand.
fn property_path(operand: &Value) -> Option<Vec<&str>> {
    operand
        .get(GET_PROPERTY)?
        .as_sequence()?
        .iter()
        .map(Value::as_str)
        .collect()
}

fn constraint_value(function: &str, literal: &Value) -> Value {
    if function == EQUAL {
        literal.clone()
    } else {
        let mut wrapped = Mapping::new();
        let _ = wrapped.insert(Value::String(function.to_owned()), literal.clone());
        Value::Mapping(wrapped)
    }
}
