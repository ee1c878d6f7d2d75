//! Resolved service maps.
//!
//! [`Resolved`] is both what a staged factory returns and what it is
//! invoked with: a map from service name to a shared, type-erased value.
//! Values are reference-counted so a map can be fed to the next stage, or
//! individual services picked out of it, without copying implementations.

use std::any::Any;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;
use std::sync::Arc;

use stagewire_common::error::{Result, StagewireError};
use stagewire_common::types::ServiceName;

use crate::contract::Contract;
use crate::key::Key;
use crate::signature::Signature;

/// A type-erased, shareable service value.
pub type SharedValue = Arc<dyn Any + Send + Sync>;

/// One resolved value together with the signature it was stored with.
#[derive(Clone, Debug)]
pub(crate) struct Slot {
    pub(crate) value: SharedValue,
    pub(crate) signature: Signature,
}

impl Slot {
    pub(crate) fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            value: Arc::new(value),
            signature: Signature::of::<T>(),
        }
    }

    pub(crate) fn shared<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Self {
            value,
            signature: Signature::of::<T>(),
        }
    }

    pub(crate) fn downcast<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>> {
        Arc::clone(&self.value)
            .downcast::<T>()
            .map_err(|_| self.mismatch::<T>(name))
    }

    pub(crate) fn downcast_ref<T: Any>(&self, name: &str) -> Result<&T> {
        self.value
            .downcast_ref::<T>()
            .ok_or_else(|| self.mismatch::<T>(name))
    }

    fn mismatch<T: Any>(&self, name: &str) -> StagewireError {
        StagewireError::ShapeMismatch {
            name: name.to_owned(),
            expected: std::any::type_name::<T>().to_owned(),
            actual: self.signature.type_name().to_owned(),
        }
    }
}

/// A map of service name to concrete implementation value.
#[derive(Clone, Default)]
pub struct Resolved {
    slots: BTreeMap<ServiceName, Slot>,
}

impl Resolved {
    /// Creates an empty map, the dependency object for a dependency-less stage.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: BTreeMap::new(),
        }
    }

    pub(crate) fn from_slots(slots: BTreeMap<ServiceName, Slot>) -> Self {
        Self { slots }
    }

    pub(crate) fn slot(&self, name: &str) -> Option<&Slot> {
        self.slots.get(name)
    }

    /// Adds a value under `name`, returning the extended map.
    ///
    /// # Errors
    ///
    /// Returns [`StagewireError::Config`] for an invalid name, or
    /// [`StagewireError::AmbiguousDependency`] if `name` is already present.
    pub fn provide<T: Any + Send + Sync>(mut self, name: &str, value: T) -> Result<Self> {
        self.insert_slot(name, Slot::new(value))?;
        Ok(self)
    }

    /// Adds a value under a typed key.
    ///
    /// # Errors
    ///
    /// Same as [`provide`](Self::provide).
    pub fn provide_key<T: Any + Send + Sync>(self, key: &Key<T>, value: T) -> Result<Self> {
        self.provide(key.name(), value)
    }

    /// Adds an already shared value without wrapping it again.
    ///
    /// # Errors
    ///
    /// Same as [`provide`](Self::provide).
    pub fn provide_shared<T: Any + Send + Sync>(mut self, name: &str, value: Arc<T>) -> Result<Self> {
        self.insert_slot(name, Slot::shared(value))?;
        Ok(self)
    }

    /// Inserts a value in place.
    ///
    /// # Errors
    ///
    /// Same as [`provide`](Self::provide).
    pub fn insert<T: Any + Send + Sync>(&mut self, name: &str, value: T) -> Result<()> {
        self.insert_slot(name, Slot::new(value))
    }

    fn insert_slot(&mut self, name: &str, slot: Slot) -> Result<()> {
        let name = ServiceName::new(name)?;
        match self.slots.entry(name) {
            Entry::Vacant(entry) => {
                let _ = entry.insert(slot);
                Ok(())
            }
            Entry::Occupied(entry) => Err(StagewireError::AmbiguousDependency {
                name: entry.key().to_string(),
            }),
        }
    }

    /// Returns a shared handle to the value under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`StagewireError::MissingDependency`] if `name` is absent, or
    /// [`StagewireError::ShapeMismatch`] if the value is not a `T`.
    pub fn get<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>> {
        self.require_slot(name)?.downcast(name)
    }

    /// Returns a reference to the value under `name`.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get).
    pub fn get_ref<T: Any>(&self, name: &str) -> Result<&T> {
        self.require_slot(name)?.downcast_ref(name)
    }

    /// Returns a shared handle to the value under a typed key.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get).
    pub fn get_key<T: Any + Send + Sync>(&self, key: &Key<T>) -> Result<Arc<T>> {
        self.get(key.name())
    }

    fn require_slot(&self, name: &str) -> Result<&Slot> {
        self.slots
            .get(name)
            .ok_or_else(|| StagewireError::MissingDependency {
                names: vec![name.to_owned()],
            })
    }

    /// Returns `true` if a value is stored under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    /// Returns the signature of the value stored under `name`.
    #[must_use]
    pub fn signature(&self, name: &str) -> Option<Signature> {
        self.slots.get(name).map(|slot| slot.signature)
    }

    /// Returns the stored names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(ServiceName::as_str)
    }

    /// Number of stored services.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Describes the stored values as a contract, so a hand-assembled
    /// dependency object can be checked against a stage up front.
    #[must_use]
    pub fn contract(&self) -> Contract {
        Contract::from_entries(
            self.slots
                .iter()
                .map(|(name, slot)| (name.clone(), slot.signature))
                .collect(),
        )
    }

    /// Unions two maps, sharing the underlying values.
    ///
    /// # Errors
    ///
    /// Returns [`StagewireError::AmbiguousDependency`] if both maps hold a
    /// value under the same name.
    pub fn merge(mut self, other: Self) -> Result<Self> {
        for (name, slot) in other.slots {
            match self.slots.entry(name) {
                Entry::Vacant(entry) => {
                    let _ = entry.insert(slot);
                }
                Entry::Occupied(entry) => {
                    return Err(StagewireError::AmbiguousDependency {
                        name: entry.key().to_string(),
                    });
                }
            }
        }
        Ok(self)
    }

    /// Copies the named services into a new map, sharing their values.
    ///
    /// # Errors
    ///
    /// Returns [`StagewireError::MissingDependency`] listing every requested
    /// name that is absent.
    pub fn pick<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Result<Self> {
        let mut slots = BTreeMap::new();
        let mut missing = Vec::new();
        for name in names {
            match self.slots.get_key_value(name) {
                Some((key, slot)) => {
                    let _ = slots.insert(key.clone(), slot.clone());
                }
                None => missing.push(name.to_owned()),
            }
        }
        if !missing.is_empty() {
            missing.sort();
            missing.dedup();
            return Err(StagewireError::MissingDependency { names: missing });
        }
        Ok(Self { slots })
    }
}

impl fmt::Debug for Resolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.slots
                    .iter()
                    .map(|(name, slot)| (name.as_str(), slot.signature.type_name())),
            )
            .finish()
    }
}
