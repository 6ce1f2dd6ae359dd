//! # toscaforge-model
//!
//! Read-only views over TOSCA documents.
//!
//! Handles:
//! - **Value**: Unwrapping the tagged value representation (`$primitive`,
//!   `$list`, `$map`) produced by the external TOSCA processor.
//! - **Template**: Accessors over node templates, capabilities, and
//!   requirements.
//! - **Document**: Loading a document and exposing its node-template map,
//!   policies, and summaries.

pub mod document;
pub mod template;
pub mod value;
