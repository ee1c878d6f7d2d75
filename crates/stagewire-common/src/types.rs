//! Domain primitive types used across the Stagewire workspace.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::MAX_SERVICE_NAME_LEN;
use crate::error::{Result, StagewireError};

/// Name of a service or dependency inside a contract or definition map.
///
/// Names are non-empty, at most [`MAX_SERVICE_NAME_LEN`] bytes, and contain
/// no whitespace or control characters.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ServiceName(String);

impl ServiceName {
    /// Creates a validated service name.
    ///
    /// # Errors
    ///
    /// Returns [`StagewireError::Config`] if the name is empty, too long, or
    /// contains whitespace or control characters.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self(name))
    }

    /// Returns the inner string representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Checks the lexical rules for a service name without allocating.
///
/// # Errors
///
/// Returns [`StagewireError::Config`] describing the first rule violated.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(StagewireError::Config {
            message: "service name must not be empty".into(),
        });
    }
    if name.len() > MAX_SERVICE_NAME_LEN {
        return Err(StagewireError::Config {
            message: format!(
                "service name \"{name}\" exceeds {MAX_SERVICE_NAME_LEN} bytes"
            ),
        });
    }
    if name.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(StagewireError::Config {
            message: format!(
                "service name \"{}\" contains whitespace or control characters",
                name.escape_debug()
            ),
        });
    }
    Ok(())
}

impl TryFrom<String> for ServiceName {
    type Error = StagewireError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<&str> for ServiceName {
    type Error = StagewireError;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

impl From<ServiceName> for String {
    fn from(name: ServiceName) -> Self {
        name.0
    }
}

impl Borrow<str> for ServiceName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ServiceName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What `build` does when a definition map names the same service twice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Fail the build with a duplicate definition error.
    #[default]
    Reject,
    /// Keep the definition inserted last.
    LastWriteWins,
}

/// When supplied dependency values are checked against their contract types.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationPolicy {
    /// Check every value before any definition runs.
    #[default]
    Eager,
    /// Check presence only; a wrong type fails at the first typed read.
    Lazy,
}

impl fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reject => write!(f, "reject"),
            Self::LastWriteWins => write!(f, "last_write_wins"),
        }
    }
}

impl fmt::Display for ValidationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eager => write!(f, "eager"),
            Self::Lazy => write!(f, "lazy"),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used)]

    use super::*;

    #[test]
    fn accepts_plain_names() {
        let name = ServiceName::new("getAllUsers").expect("valid");
        assert_eq!(name.as_str(), "getAllUsers");
        assert_eq!(name.to_string(), "getAllUsers");
    }

    #[test]
    fn rejects_empty_name() {
        let msg = ServiceName::new("").unwrap_err().to_string();
        assert!(msg.contains("must not be empty"), "got: {msg}");
    }

    #[test]
    fn rejects_whitespace() {
        assert!(ServiceName::new("get user").is_err());
        assert!(ServiceName::new("tab\there").is_err());
    }

    #[test]
    fn rejects_overlong_name() {
        let long = "x".repeat(MAX_SERVICE_NAME_LEN + 1);
        assert!(ServiceName::new(long).is_err());
    }

    #[test]
    fn deserialization_validates() {
        let ok: ServiceName = serde_json::from_str("\"store\"").expect("valid");
        assert_eq!(ok.as_str(), "store");
        assert!(serde_json::from_str::<ServiceName>("\"\"").is_err());
    }

    #[test]
    fn policies_use_snake_case() {
        let json = serde_json::to_string(&DuplicatePolicy::LastWriteWins).expect("serialize");
        assert_eq!(json, "\"last_write_wins\"");
        let lazy: ValidationPolicy = serde_json::from_str("\"lazy\"").expect("deserialize");
        assert_eq!(lazy, ValidationPolicy::Lazy);
    }
}
