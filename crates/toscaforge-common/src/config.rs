//! Classification configuration shared by the engine components.

use serde::{Deserialize, Serialize};

use crate::constants;

/// How strictly a type name must match to count as an application type.
///
/// The two output pipelines historically used different strictnesses; both
/// are preserved as named presets rather than silently unified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicationMatch {
    /// Any type name containing `Application` matches (cluster-projection
    /// path).
    Substring,
    /// Only type names ending in `Application` or `Microservice` match
    /// (manifest path).
    ExactSuffix,
}

/// Configuration for node-type classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Suffix identifying resource types (default `::Resource`).
    pub resource_suffix: String,
    /// Application matching strictness for this pipeline.
    pub application_match: ApplicationMatch,
}

impl ClassifierConfig {
    /// Builds a configuration with the given strictness, taking the resource
    /// suffix from [`constants::RESOURCE_SUFFIX_ENV`] when set.
    #[must_use]
    pub fn from_env(application_match: ApplicationMatch) -> Self {
        let resource_suffix = std::env::var(constants::RESOURCE_SUFFIX_ENV)
            .unwrap_or_else(|_| constants::DEFAULT_RESOURCE_SUFFIX.to_owned());
        Self {
            resource_suffix,
            application_match,
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            resource_suffix: constants::DEFAULT_RESOURCE_SUFFIX.to_owned(),
            application_match: ApplicationMatch::Substring,
        }
    }
}
