//! The dependency view handed to definition functions.

use std::any::Any;
use std::collections::BTreeSet;
use std::sync::Arc;

use stagewire_common::error::{Result, StagewireError};

use crate::contract::Contract;
use crate::key::Key;
use crate::resolved::{Resolved, Slot};

/// Read access to the resolved dependencies of one invocation.
///
/// Each definition receives a view over the complete dependency object,
/// restricted to the names it declared with
/// [`reads`](crate::Definition::reads). `build` has already checked those
/// against the stage's contract. Reading any other name is a contract
/// violation, never a silent `None`.
#[derive(Debug, Clone, Copy)]
pub struct Deps<'a> {
    contract: &'a Contract,
    resolved: &'a Resolved,
    reads: Option<&'a BTreeSet<String>>,
}

impl<'a> Deps<'a> {
    pub(crate) const fn new(contract: &'a Contract, resolved: &'a Resolved) -> Self {
        Self {
            contract,
            resolved,
            reads: None,
        }
    }

    /// Narrows the view to one definition's declared reads.
    pub(crate) const fn scoped<'b>(&self, reads: &'b BTreeSet<String>) -> Deps<'b>
    where
        'a: 'b,
    {
        Deps {
            contract: self.contract,
            resolved: self.resolved,
            reads: Some(reads),
        }
    }

    fn slot(&self, name: &str) -> Result<&'a Slot> {
        if !self.contains(name) {
            return Err(StagewireError::ContractViolation {
                names: vec![name.to_owned()],
            });
        }
        self.resolved
            .slot(name)
            .ok_or_else(|| StagewireError::MissingDependency {
                names: vec![name.to_owned()],
            })
    }

    /// Returns a shared handle to the dependency under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`StagewireError::ContractViolation`] if `name` is not part
    /// of the contract or was not declared as a read, or [`StagewireError::ShapeMismatch`] if the supplied
    /// value is not a `T`.
    pub fn get<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>> {
        self.slot(name)?.downcast(name)
    }

    /// Returns a reference to the dependency under `name`, valid for the
    /// duration of the definition call.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get).
    pub fn get_ref<T: Any>(&self, name: &str) -> Result<&'a T> {
        self.slot(name)?.downcast_ref(name)
    }

    /// Returns a shared handle to the dependency under a typed key.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get).
    pub fn get_key<T: Any + Send + Sync>(&self, key: &Key<T>) -> Result<Arc<T>> {
        self.get(key.name())
    }

    /// Returns `true` if `name` may be read through this view.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.contract.contains(name) && self.reads.is_none_or(|reads| reads.contains(name))
    }

    /// Returns the contract this view is restricted to.
    #[must_use]
    pub const fn contract(&self) -> &'a Contract {
        self.contract
    }
}
