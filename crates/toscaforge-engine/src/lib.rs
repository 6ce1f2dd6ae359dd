//! # toscaforge-engine
//!
//! The TOSCA entity-to-target mapping engine.
//!
//! Handles:
//! - **Classify**: Node classification by type ancestry (resource,
//!   application, capacity provider).
//! - **Constraint**: Node-filter resolution into resource asks and
//!   placement labels.
//! - **Capacity**: Overall or per-node capacity extraction.
//! - **Cluster**: Projection of nodes into flattened, provider-specific
//!   resource-ask maps, including cross-node ingress aggregation.
//! - **Manifest**: Kubernetes Deployment/Service generation for
//!   application nodes.
//! - **Ask**: The ask-document builder for raw templates.
//! - **Validator**: The external TOSCA processor adapter.
//! - **Splice**: Format-preserving substitution of placeholder nodes.

pub mod ask;
pub mod capacity;
pub mod classify;
pub mod cluster;
pub mod constraint;
pub mod manifest;
pub mod splice;
pub mod validator;
