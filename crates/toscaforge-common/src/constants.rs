//! System-wide constants and defaults.

/// Default suffix identifying resource node types in a type ancestry.
pub const DEFAULT_RESOURCE_SUFFIX: &str = "::Resource";

/// Environment variable overriding [`DEFAULT_RESOURCE_SUFFIX`].
pub const RESOURCE_SUFFIX_ENV: &str = "TOSCAFORGE_RESOURCE_SUFFIX";

/// Substring identifying application node types (lenient match).
pub const APPLICATION_MARKER: &str = "Application";

/// Type-name suffixes identifying application nodes (strict match).
pub const APPLICATION_SUFFIXES: &[&str] = &["Application", "Microservice"];

/// Substring identifying the overall-capacity node type.
pub const OVERALL_CAPACITY_MARKER: &str = "OverallCapacity";

/// Substring marking an unresolved abstract resource placeholder type.
pub const ABSTRACT_RESOURCE_MARKER: &str = "Abstract";

/// Default name of the external TOSCA processor binary.
pub const PROCESSOR_BINARY: &str = "puccini-tosca";

/// Extra flags passed to every processor invocation.
pub const PROCESSOR_FLAGS: &[&str] = &["-x", "data_types.string.permissive"];

/// Default image pull secret injected into generated manifests.
pub const DEFAULT_IMAGE_PULL_SECRET: &str = "regcred";

/// Maximum depth when walking nested capabilities.
pub const MAX_CAPABILITY_DEPTH: usize = 32;

/// Application name used in CLI output and ask-document metadata.
pub const APP_NAME: &str = "toscaforge";

/// Binary name for the CLI.
pub const BIN_NAME: &str = "tosc";
