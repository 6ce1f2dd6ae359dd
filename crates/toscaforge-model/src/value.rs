//! Unwrapping of the tagged TOSCA value representation.
//!
//! A resolved document wraps every property value in a tagged form:
//! `{$primitive: v}` for scalars, `{$list: [..]}` for sequences, and
//! `{$map: [{$key: k, ..}, ..]}` for key/value collections. Unwrapping turns
//! these back into native scalars, sequences, and insertion-ordered
//! mappings. Unknown shapes pass through unchanged; the document has
//! already been validated externally, so nothing here is an error.

use serde_yaml::{Mapping, Value};

/// Tag key marking a wrapped scalar.
const PRIMITIVE_TAG: &str = "$primitive";
/// Tag key marking a wrapped sequence.
const LIST_TAG: &str = "$list";
/// Tag key marking a wrapped key/value collection.
const MAP_TAG: &str = "$map";
/// Key carrying a map entry's own key value.
const KEY_MARKER: &str = "$key";

/// Unwraps a tagged value into its native representation.
///
/// Idempotent: unwrapping an already-native value returns it unchanged.
#[must_use]
pub fn unwrap_value(value: &Value) -> Value {
    let Value::Mapping(map) = value else {
        return value.clone();
    };

    if let Some(inner) = map.get(PRIMITIVE_TAG) {
        return inner.clone();
    }

    if let Some(Value::Sequence(items)) = map.get(LIST_TAG) {
        return Value::Sequence(items.iter().map(unwrap_value).collect());
    }

    if let Some(Value::Sequence(entries)) = map.get(MAP_TAG) {
        let mut out = Mapping::new();
        for entry in entries {
            if let Some((key, val)) = unwrap_map_entry(entry) {
                // Last write wins on duplicate keys, matching ordinary
                // mapping-literal semantics.
                let _ = out.insert(key, val);
            }
        }
        return Value::Mapping(out);
    }

    value.clone()
}

/// Unwraps one `$map` entry into a `(key, value)` pair.
///
/// The key sub-value is unwrapped to serve as the mapping key; the
/// remaining fields become the value. A single non-key field is reduced to
/// that field's unwrapped value (this covers the common `{$key, $primitive}`
/// shape); multiple fields are kept as a mapping.
fn unwrap_map_entry(entry: &Value) -> Option<(Value, Value)> {
    let entry = entry.as_mapping()?;
    let key = unwrap_value(entry.get(KEY_MARKER)?);

    let rest: Vec<(&Value, &Value)> = entry
        .iter()
        .filter(|(k, _)| k.as_str() != Some(KEY_MARKER))
        .collect();

    let value = match rest.as_slice() {
        [] => Value::Null,
        [(k, v)] if !k.as_str().is_some_and(|s| s.starts_with('$')) => unwrap_value(v),
        _ => {
            let residue: Mapping = rest
                .iter()
                .map(|(k, v)| ((*k).clone(), (*v).clone()))
                .collect();
            unwrap_value(&Value::Mapping(residue))
        }
    };

    Some((key, value))
}

/// Unwraps every value of a property mapping, preserving key order.
#[must_use]
pub fn unwrap_properties(properties: &Mapping) -> Mapping {
    properties
        .iter()
        .map(|(k, v)| (k.clone(), unwrap_value(v)))
        .collect()
}

/// Extracts an integer from a native value, accepting numeric strings.
#[must_use]
pub fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Renders a scalar value as text. Non-scalars yield `None`.
#[must_use]
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(text: &str) -> Value {
        serde_yaml::from_str(text).expect("fixture parses")
    }

    #[test]
    fn primitive_wrapper_yields_scalar() {
        let wrapped = yaml("{$primitive: t2.micro}");
        assert_eq!(unwrap_value(&wrapped), Value::String("t2.micro".into()));
    }

    #[test]
    fn list_wrapper_preserves_order() {
        let wrapped = yaml("{$list: [{$primitive: a}, {$primitive: b}, {$primitive: c}]}");
        let unwrapped = unwrap_value(&wrapped);
        let seq = unwrapped.as_sequence().expect("sequence");
        assert_eq!(seq.len(), 3);
        assert_eq!(seq[0].as_str(), Some("a"));
        assert_eq!(seq[2].as_str(), Some("c"));
    }

    #[test]
    fn map_wrapper_yields_ordered_mapping() {
        let wrapped = yaml(
            "{$map: [{$key: {$primitive: cores}, $primitive: 4}, \
             {$key: {$primitive: arch}, $primitive: x86_64}]}",
        );
        let unwrapped = unwrap_value(&wrapped);
        let map = unwrapped.as_mapping().expect("mapping");
        assert_eq!(map.get("cores").and_then(Value::as_i64), Some(4));
        assert_eq!(map.get("arch").and_then(Value::as_str), Some("x86_64"));
        let keys: Vec<&str> = map.iter().filter_map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["cores", "arch"]);
    }

    #[test]
    fn bare_value_passes_through() {
        let bare = yaml("{cpu: 2, labels: [a, b]}");
        assert_eq!(unwrap_value(&bare), bare);
    }

    #[test]
    fn unwrapping_is_idempotent() {
        let fixtures = [
            yaml("{$primitive: 42}"),
            yaml("{$list: [{$primitive: x}]}"),
            yaml("{$map: [{$key: {$primitive: k}, $primitive: v}]}"),
            yaml("plain"),
            Value::Null,
        ];
        for v in fixtures {
            let once = unwrap_value(&v);
            assert_eq!(unwrap_value(&once), once);
        }
    }

    #[test]
    fn unknown_tag_passes_through() {
        let reference = yaml("{$get_property: [SELF, TARGET, CAPABILITY, cpu, cores]}");
        assert_eq!(unwrap_value(&reference), reference);
    }

    #[test]
    fn duplicate_map_keys_last_write_wins() {
        let wrapped = yaml(
            "{$map: [{$key: {$primitive: k}, $primitive: first}, \
             {$key: {$primitive: k}, $primitive: second}]}",
        );
        let unwrapped = unwrap_value(&wrapped);
        let map = unwrapped.as_mapping().expect("mapping");
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("k").and_then(Value::as_str), Some("second"));
    }

    #[test]
    fn as_i64_accepts_numeric_strings() {
        assert_eq!(as_i64(&yaml("8080")), Some(8080));
        assert_eq!(as_i64(&Value::String("30080".into())), Some(30080));
        assert_eq!(as_i64(&Value::String("not a port".into())), None);
    }
}
