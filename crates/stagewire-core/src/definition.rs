//! Factory definitions.
//!
//! A [`Definition`] is a function from resolved dependencies to one
//! implementation value, plus the metadata `build` needs to check it
//! without running it: the produced type and the dependency names it
//! reads. [`Definitions`] collects them under service names.

use std::any::Any;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use stagewire_common::error::Result;

use crate::deps::Deps;
use crate::key::Key;
use crate::resolved::Slot;
use crate::signature::Signature;

type BuildFn = dyn Fn(&Deps<'_>) -> Result<Slot> + Send + Sync;

/// A single factory function and its declared reads.
#[derive(Clone)]
pub struct Definition {
    produces: Signature,
    reads: BTreeSet<String>,
    build: Arc<BuildFn>,
}

impl Definition {
    /// Wraps a function producing a `T` from the resolved dependencies.
    ///
    /// The function is not called here. It runs once per invocation of the
    /// staged factory it ends up in.
    pub fn new<T, F>(factory: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&Deps<'_>) -> Result<T> + Send + Sync + 'static,
    {
        Self {
            produces: Signature::of::<T>(),
            reads: BTreeSet::new(),
            build: Arc::new(move |deps: &Deps<'_>| factory(deps).map(Slot::new)),
        }
    }

    /// Declares dependency names this definition reads.
    ///
    /// `build` fails with a contract violation if any of them is missing
    /// from the stage's contract. At invocation the definition can read
    /// only these names.
    #[must_use]
    pub fn reads<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reads.extend(names.into_iter().map(Into::into));
        self
    }

    /// Declares a read through a typed key.
    #[must_use]
    pub fn reads_key<T>(mut self, key: &Key<T>) -> Self {
        let _ = self.reads.insert(key.name().to_owned());
        self
    }

    /// Signature of the value this definition produces.
    #[must_use]
    pub const fn produces(&self) -> Signature {
        self.produces
    }

    /// Declared dependency names, sorted.
    pub fn declared_reads(&self) -> impl Iterator<Item = &str> {
        self.reads.iter().map(String::as_str)
    }

    /// Runs the factory with a view limited to the declared reads.
    pub(crate) fn call(&self, deps: &Deps<'_>) -> Result<Slot> {
        (self.build)(&deps.scoped(&self.reads))
    }
}

impl fmt::Debug for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Definition")
            .field("produces", &self.produces.type_name())
            .field("reads", &self.reads)
            .finish_non_exhaustive()
    }
}

/// A named definition before `build` has validated it.
#[derive(Debug, Clone)]
pub(crate) struct NamedDefinition {
    pub(crate) name: String,
    pub(crate) definition: Definition,
    /// Type promised by the typed key the definition was registered under.
    pub(crate) expected: Option<Signature>,
}

/// The factory definition map: service name to definition.
///
/// Names are validated, and duplicates handled, when the map is passed to
/// [`DefinitionStage::build`](crate::stage::DefinitionStage::build).
#[derive(Debug, Clone, Default)]
pub struct Definitions {
    entries: Vec<NamedDefinition>,
}

impl Definitions {
    /// Creates an empty definition map.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Adds a definition under `name`.
    #[must_use]
    pub fn define(mut self, name: impl Into<String>, definition: Definition) -> Self {
        self.entries.push(NamedDefinition {
            name: name.into(),
            definition,
            expected: None,
        });
        self
    }

    /// Adds a definition under a typed key. `build` rejects it if the
    /// definition does not produce the key's type.
    #[must_use]
    pub fn define_key<T: Any>(mut self, key: &Key<T>, definition: Definition) -> Self {
        self.entries.push(NamedDefinition {
            name: key.name().to_owned(),
            definition,
            expected: Some(key.signature()),
        });
        self
    }

    /// Number of definitions added, duplicates included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no definition was added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn into_entries(self) -> Vec<NamedDefinition> {
        self.entries
    }
}
