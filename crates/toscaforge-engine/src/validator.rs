//! External TOSCA processor adapter.
//!
//! Validation and type resolution are delegated to an external processor
//! (puccini by default) invoked as a subprocess. The trait boundary keeps
//! the engine free of subprocess details so an in-process resolver could be
//! swapped in later.

use std::path::{Path, PathBuf};
use std::process::Command;

use toscaforge_common::constants;
use toscaforge_common::error::{Result, ToscaforgeError};

/// Validates a template and returns the fully type-resolved document.
pub trait TemplateValidator {
    /// Runs validation on the template at `path`.
    ///
    /// On success the returned text is the resolved document (all defaults
    /// filled, type ancestries expanded), ready for projection.
    ///
    /// # Errors
    ///
    /// Returns a validation error with the processor's diagnostics on
    /// rejection, or a fatal error when the processor cannot be invoked.
    fn validate_and_resolve(&self, path: &Path) -> Result<String>;
}

/// Adapter invoking the `puccini-tosca` binary.
#[derive(Debug, Clone)]
pub struct PucciniValidator {
    binary: PathBuf,
}

impl PucciniValidator {
    /// Uses an explicit processor binary path.
    #[must_use]
    pub const fn new(binary: PathBuf) -> Self {
        Self { binary }
    }

    /// Locates the processor on `$PATH`.
    ///
    /// # Errors
    ///
    /// Returns [`ToscaforgeError::ProcessorMissing`] when the binary is not
    /// installed, which is fatal for the whole run.
    pub fn locate() -> Result<Self> {
        let binary = which::which(constants::PROCESSOR_BINARY).map_err(|_| {
            ToscaforgeError::ProcessorMissing {
                binary: constants::PROCESSOR_BINARY.to_owned(),
            }
        })?;
        Ok(Self { binary })
    }
}

impl TemplateValidator for PucciniValidator {
    fn validate_and_resolve(&self, path: &Path) -> Result<String> {
        tracing::info!(path = %path.display(), processor = %self.binary.display(), "validating template");

        let output = Command::new(&self.binary)
            .arg("parse")
            .arg(path)
            .args(constants::PROCESSOR_FLAGS)
            .output()
            .map_err(|source| {
                if source.kind() == std::io::ErrorKind::NotFound {
                    ToscaforgeError::ProcessorMissing {
                        binary: self.binary.display().to_string(),
                    }
                } else {
                    ToscaforgeError::io(&self.binary, source)
                }
            })?;

        if output.status.success() {
            return Ok(String::from_utf8_lossy(&output.stdout).into_owned());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        let diagnostic = if stderr.trim().is_empty() {
            stdout.trim().to_owned()
        } else {
            stderr.trim().to_owned()
        };
        Err(ToscaforgeError::Validation {
            path: path.to_path_buf(),
            diagnostic,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_binary_is_a_fatal_processor_error() {
        let validator = PucciniValidator::new(PathBuf::from("/nonexistent/puccini-tosca"));
        let error = validator
            .validate_and_resolve(Path::new("template.yaml"))
            .expect_err("should fail");
        assert!(matches!(error, ToscaforgeError::ProcessorMissing { .. }));
    }

    #[test]
    fn failing_processor_surfaces_diagnostics() {
        // `false` exits nonzero with empty output on any input.
        let validator = PucciniValidator::new(PathBuf::from("/bin/false"));
        let error = validator
            .validate_and_resolve(Path::new("template.yaml"))
            .expect_err("should fail");
        assert!(matches!(error, ToscaforgeError::Validation { .. }));
    }
}
