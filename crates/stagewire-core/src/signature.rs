//! Runtime identity of a resolved value's type.

use std::any::{Any, TypeId};
use std::fmt;

use serde::Serialize;

/// The type a contract expects, or a definition produces, under one name.
///
/// Two signatures are equal when they describe the same Rust type. The
/// type name is kept for diagnostics only.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Signature {
    #[serde(skip)]
    type_id: TypeId,
    #[serde(rename = "type")]
    type_name: &'static str,
}

impl Signature {
    /// Returns the signature of `T`.
    #[must_use]
    pub fn of<T: Any>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Returns the Rust type identifier.
    #[must_use]
    pub const fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns the human-readable type name.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns `true` if this signature describes `T`.
    #[must_use]
    pub fn is<T: Any>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }
}

impl PartialEq for Signature {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for Signature {}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name)
    }
}
