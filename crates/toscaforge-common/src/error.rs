//! Unified error types for the Toscaforge workspace.
//!
//! A single enum covers the whole error taxonomy: document-fatal conditions,
//! node-local failures (caught and logged per node by the projectors), and
//! the caller-misuse signal for operations run against the wrong kind of
//! document.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum ToscaforgeError {
    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The external TOSCA processor binary could not be found.
    ///
    /// Fatal for the whole run, not just the current document.
    #[error("TOSCA processor not found: {binary}")]
    ProcessorMissing {
        /// Binary name or path that was searched for.
        binary: String,
    },

    /// The external TOSCA processor rejected the document.
    #[error("validation failed for {path}: {diagnostic}")]
    Validation {
        /// Document that failed validation.
        path: PathBuf,
        /// Processor stderr (or stdout when stderr was empty).
        diagnostic: String,
    },

    /// The document is structurally unusable (e.g. no node templates).
    #[error("invalid document: {message}")]
    Document {
        /// Description of the structural problem.
        message: String,
    },

    /// A single node template could not be processed.
    ///
    /// Projectors catch this per node; sibling nodes are unaffected.
    #[error("node '{node}': {message}")]
    Node {
        /// Name of the failing node template.
        node: String,
        /// Reason the node was skipped.
        message: String,
    },

    /// The requested operation does not apply to this kind of document.
    ///
    /// Distinct from [`ToscaforgeError::Document`] so callers can branch on
    /// "wrong operation" versus "document is broken".
    #[error("wrong operation for this document: {message}")]
    WrongOperation {
        /// Why the operation is inapplicable.
        message: String,
    },

    /// YAML parsing or serialization failed.
    #[error("YAML error: {source}")]
    Yaml {
        /// Underlying YAML error.
        #[from]
        source: serde_yaml::Error,
    },

    /// JSON serialization failed.
    #[error("JSON error: {source}")]
    Json {
        /// Underlying JSON error.
        #[from]
        source: serde_json::Error,
    },
}

impl ToscaforgeError {
    /// Builds an I/O error carrying the offending path.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Builds a node-local error.
    #[must_use]
    pub fn node(node: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Node {
            node: node.into(),
            message: message.into(),
        }
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, ToscaforgeError>;
