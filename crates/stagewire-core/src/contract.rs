//! Dependency contracts.
//!
//! A [`Contract`] names every dependency a definition stage may assume and
//! the type of the resolved value it expects under that name. Contracts are
//! immutable once built; they are either declared by hand through
//! [`ContractBuilder`] or exported from a previous staged factory.

use std::any::Any;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use serde::Serialize;
use stagewire_common::config::CompositionConfig;
use stagewire_common::error::{Result, StagewireError};
use stagewire_common::types::ServiceName;

use crate::key::Key;
use crate::signature::Signature;

/// The declared shape of a stage's dependencies: name to expected signature.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Contract {
    entries: BTreeMap<ServiceName, Signature>,
}

impl Contract {
    /// Returns the empty contract used by dependency-less stages.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Starts declaring a contract.
    #[must_use]
    pub fn builder() -> ContractBuilder {
        ContractBuilder::default()
    }

    pub(crate) fn from_entries(entries: BTreeMap<ServiceName, Signature>) -> Self {
        Self { entries }
    }

    /// Returns the signature declared for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Signature> {
        self.entries.get(name)
    }

    /// Returns `true` if `name` is declared.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Returns the declared names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(ServiceName::as_str)
    }

    /// Iterates over `(name, signature)` pairs in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (&ServiceName, &Signature)> {
        self.entries.iter()
    }

    /// Number of declared names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Unions two contracts so a stage can depend on several prior stages.
    ///
    /// A name declared by both sides with the same signature is kept once.
    ///
    /// # Errors
    ///
    /// Returns [`StagewireError::AmbiguousDependency`] if a name is declared
    /// by both sides with different signatures.
    pub fn merge(&self, other: &Self) -> Result<Self> {
        self.merge_with(other, true)
    }

    /// Unions two contracts under `config.allow_identical_merge`.
    ///
    /// # Errors
    ///
    /// Returns [`StagewireError::AmbiguousDependency`] as for
    /// [`merge_with`](Self::merge_with).
    pub fn merge_under(&self, other: &Self, config: &CompositionConfig) -> Result<Self> {
        self.merge_with(other, config.allow_identical_merge)
    }

    /// Unions two contracts, optionally rejecting every shared name.
    ///
    /// # Errors
    ///
    /// Returns [`StagewireError::AmbiguousDependency`] for the first colliding
    /// name that is not allowed.
    pub fn merge_with(&self, other: &Self, allow_identical: bool) -> Result<Self> {
        let mut entries = self.entries.clone();
        for (name, signature) in &other.entries {
            match entries.entry(name.clone()) {
                Entry::Vacant(slot) => {
                    let _ = slot.insert(*signature);
                }
                Entry::Occupied(existing) => {
                    if !allow_identical || existing.get() != signature {
                        return Err(StagewireError::AmbiguousDependency {
                            name: name.to_string(),
                        });
                    }
                }
            }
        }
        tracing::debug!(
            left = self.len(),
            right = other.len(),
            merged = entries.len(),
            "merged contracts"
        );
        Ok(Self { entries })
    }

    /// Verifies that `provided` covers this contract.
    ///
    /// Used to check a composition chain before anything executes: every
    /// name declared here must be present in `provided` with the same
    /// signature. Extra names in `provided` are fine.
    ///
    /// # Errors
    ///
    /// Returns [`StagewireError::MissingDependency`] listing every absent
    /// name, or [`StagewireError::ShapeMismatch`] for the first name whose
    /// signature differs.
    pub fn check_satisfied_by(&self, provided: &Self) -> Result<()> {
        let missing: Vec<String> = self
            .names()
            .filter(|name| !provided.contains(name))
            .map(str::to_owned)
            .collect();
        if !missing.is_empty() {
            return Err(StagewireError::MissingDependency { names: missing });
        }
        for (name, expected) in &self.entries {
            if let Some(actual) = provided.get(name.as_str()) {
                if actual != expected {
                    return Err(StagewireError::ShapeMismatch {
                        name: name.to_string(),
                        expected: expected.type_name().to_owned(),
                        actual: actual.type_name().to_owned(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Accumulates contract declarations; validation happens in [`build`](Self::build).
#[derive(Debug, Default)]
pub struct ContractBuilder {
    declared: Vec<(String, Signature)>,
}

impl ContractBuilder {
    /// Declares that the stage expects a value of type `T` under `name`.
    #[must_use]
    pub fn require<T: Any>(mut self, name: impl Into<String>) -> Self {
        self.declared.push((name.into(), Signature::of::<T>()));
        self
    }

    /// Declares a dependency through a typed key.
    #[must_use]
    pub fn require_key<T: Any>(self, key: &Key<T>) -> Self {
        self.require::<T>(key.name())
    }

    /// Adds every declaration of an existing contract, such as one exported
    /// by a previous stage.
    #[must_use]
    pub fn extend(mut self, contract: &Contract) -> Self {
        self.declared.extend(
            contract
                .iter()
                .map(|(name, signature)| (name.to_string(), *signature)),
        );
        self
    }

    /// Validates the declarations and freezes them into a contract.
    ///
    /// # Errors
    ///
    /// Returns [`StagewireError::Config`] for an invalid name, or
    /// [`StagewireError::AmbiguousDependency`] if one name is declared twice
    /// with different signatures.
    pub fn build(self) -> Result<Contract> {
        let mut entries = BTreeMap::new();
        for (name, signature) in self.declared {
            let name = ServiceName::new(name)?;
            match entries.entry(name) {
                Entry::Vacant(slot) => {
                    let _ = slot.insert(signature);
                }
                Entry::Occupied(existing) => {
                    if *existing.get() != signature {
                        return Err(StagewireError::AmbiguousDependency {
                            name: existing.key().to_string(),
                        });
                    }
                }
            }
        }
        Ok(Contract::from_entries(entries))
    }
}
