//! Node classification by resolved type ancestry.
//!
//! Classification is suffix/substring matching on the type names in a
//! node's `types` map. A node may match several classes; the projectors
//! decide how to route each combination.

use serde_yaml::{Mapping, Value};

use toscaforge_common::config::{ApplicationMatch, ClassifierConfig};
use toscaforge_common::constants;

/// Classes a node template can belong to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Classification {
    /// The node describes an infrastructure resource.
    pub resource: bool,
    /// The node describes a deployable application.
    pub application: bool,
    /// The node declares the overall capacity of the swarm.
    pub capacity_provider: bool,
}

impl Classification {
    /// Whether the node belongs to none of the known classes.
    #[must_use]
    pub const fn is_none(&self) -> bool {
        !self.resource && !self.application && !self.capacity_provider
    }
}

/// Classifies a node from its resolved type-ancestry map.
///
/// An empty or missing `types` map classifies as none of the classes.
#[must_use]
pub fn classify(types: Option<&Mapping>, config: &ClassifierConfig) -> Classification {
    let mut class = Classification::default();
    let Some(types) = types else {
        return class;
    };

    for (type_name, definition) in types {
        let Some(name) = type_name.as_str() else {
            continue;
        };
        let parent = definition
            .get("parent")
            .and_then(Value::as_str)
            .unwrap_or("");

        if name.ends_with(&config.resource_suffix) || parent.ends_with(&config.resource_suffix) {
            class.resource = true;
        }
        if type_name_is_application(name, config.application_match) {
            class.application = true;
        }
        if name.contains(constants::OVERALL_CAPACITY_MARKER) {
            class.capacity_provider = true;
        }
    }

    class
}

/// Whether any type in the ancestry marks an unresolved abstract resource
/// placeholder.
#[must_use]
pub fn has_abstract_marker(types: Option<&Mapping>) -> bool {
    types.is_some_and(|types| {
        types.iter().any(|(name, _)| {
            name.as_str()
                .is_some_and(|n| n.contains(constants::ABSTRACT_RESOURCE_MARKER))
        })
    })
}

/// Whether a declared type name counts as an application type under the
/// given matching mode. The manifest path applies this to raw `type`
/// strings; [`classify`] applies it across a resolved ancestry.
#[must_use]
pub fn type_name_is_application(name: &str, mode: ApplicationMatch) -> bool {
    match mode {
        ApplicationMatch::Substring => name.contains(constants::APPLICATION_MARKER),
        ApplicationMatch::ExactSuffix => constants::APPLICATION_SUFFIXES
            .iter()
            .any(|suffix| name.ends_with(suffix)),
    }
}
