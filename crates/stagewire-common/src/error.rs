//! Unified error taxonomy for the Stagewire workspace.
//!
//! Every failure of composition or invocation is fatal to the call that
//! produced it. There is no partial success and no recovery path, so the
//! variants carry enough context (offending names, expected and actual
//! types) to fix the wiring at the call site.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum StagewireError {
    /// A definition reads a dependency name absent from its declared contract.
    #[error("contract violation: undeclared dependency name(s): {}", .names.join(", "))]
    ContractViolation {
        /// Every undeclared name, sorted and deduplicated.
        names: Vec<String>,
    },

    /// A required dependency was not supplied.
    #[error("missing dependency: {}", .names.join(", "))]
    MissingDependency {
        /// Every missing name, sorted.
        names: Vec<String>,
    },

    /// A supplied value does not have the declared type.
    #[error("shape mismatch for \"{name}\": expected {expected}, got {actual}")]
    ShapeMismatch {
        /// Dependency name whose value has the wrong type.
        name: String,
        /// Type declared by the contract.
        expected: String,
        /// Type actually supplied.
        actual: String,
    },

    /// Two merged contracts or service maps declare the same name.
    #[error("ambiguous dependency: \"{name}\" is declared more than once")]
    AmbiguousDependency {
        /// Colliding name.
        name: String,
    },

    /// Two definitions in one factory definition map share a name.
    #[error("duplicate definition name: \"{name}\"")]
    DuplicateDefinition {
        /// Duplicated service name.
        name: String,
    },

    /// A user-supplied definition function failed.
    #[error("definition \"{name}\" failed: {message}")]
    Definition {
        /// Service whose definition failed.
        name: String,
        /// Failure reported by the definition.
        message: String,
    },

    /// A configuration value or service name is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// An I/O operation failed while loading configuration.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Serialization or deserialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}

impl StagewireError {
    /// Builds a [`StagewireError::Definition`] from any displayable failure.
    pub fn definition(name: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Definition {
            name: name.into(),
            message: message.to_string(),
        }
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, StagewireError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contract_violation_lists_every_name() {
        let err = StagewireError::ContractViolation {
            names: vec!["a".into(), "b".into()],
        };
        assert_eq!(
            err.to_string(),
            "contract violation: undeclared dependency name(s): a, b"
        );
    }

    #[test]
    fn missing_dependency_names_key() {
        let err = StagewireError::MissingDependency {
            names: vec!["b".into()],
        };
        assert_eq!(err.to_string(), "missing dependency: b");
    }

    #[test]
    fn shape_mismatch_reports_both_types() {
        let err = StagewireError::ShapeMismatch {
            name: "multiply".into(),
            expected: "i64".into(),
            actual: "alloc::string::String".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("\"multiply\""), "got: {msg}");
        assert!(msg.contains("expected i64"), "got: {msg}");
    }

    #[test]
    fn definition_helper_formats_message() {
        let err = StagewireError::definition("sum", "overflow");
        assert_eq!(err.to_string(), "definition \"sum\" failed: overflow");
    }
}
