//! Staged factories: resolution and contract export.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use stagewire_common::config::CompositionConfig;
use stagewire_common::error::{Result, StagewireError};
use stagewire_common::types::{ServiceName, ValidationPolicy};

use crate::contract::Contract;
use crate::definition::Definition;
use crate::deps::Deps;
use crate::resolved::Resolved;

/// A definition map bound to its dependency contract.
///
/// Immutable after [`build`](crate::stage::DefinitionStage::build). Cloning
/// is cheap and clones share the same definitions. Every call to
/// [`invoke`](Self::invoke) reruns every definition and returns a fresh,
/// independent [`Resolved`] map.
#[derive(Debug, Clone)]
pub struct StagedFactory {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    contract: Contract,
    definitions: BTreeMap<ServiceName, Definition>,
    config: CompositionConfig,
}

/// Serializable description of one definition, without its function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DefinitionDescriptor {
    /// Service name.
    pub name: String,
    /// Type of the produced implementation.
    pub produces: &'static str,
    /// Dependency names the definition declared it reads.
    pub reads: Vec<String>,
}

impl StagedFactory {
    pub(crate) fn new(
        contract: Contract,
        definitions: BTreeMap<ServiceName, Definition>,
        config: CompositionConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                contract,
                definitions,
                config,
            }),
        }
    }

    /// Resolves every definition against `deps`.
    ///
    /// Names in `deps` beyond the contract are ignored. Each definition
    /// sees only the dependencies it declared, never other results.
    ///
    /// # Errors
    ///
    /// - [`StagewireError::MissingDependency`] naming every contract name
    ///   absent from `deps`.
    /// - [`StagewireError::ShapeMismatch`] for the first value of the wrong
    ///   type, before any definition runs under [`ValidationPolicy::Eager`],
    ///   or at the definition's first read under [`ValidationPolicy::Lazy`].
    /// - [`StagewireError::ContractViolation`] if a definition reads a name
    ///   it did not declare.
    /// - Any error returned by a definition function.
    ///
    /// No partial map is ever returned.
    pub fn invoke(&self, deps: &Resolved) -> Result<Resolved> {
        let inner = &*self.inner;
        check_present(&inner.contract, deps)?;
        if inner.config.validation == ValidationPolicy::Eager {
            check_shapes(&inner.contract, deps)?;
        }

        let view = Deps::new(&inner.contract, deps);
        let mut slots = BTreeMap::new();
        for (name, definition) in &inner.definitions {
            let slot = definition.call(&view).inspect_err(|e| {
                tracing::debug!(service = %name, error = %e, "definition failed");
            })?;
            let _ = slots.insert(name.clone(), slot);
        }

        tracing::debug!(
            services = slots.len(),
            supplied = deps.len(),
            "resolved staged factory"
        );
        Ok(Resolved::from_slots(slots))
    }

    /// Returns the shape of this factory's output, usable as the contract of
    /// a following stage.
    #[must_use]
    pub fn export_contract(&self) -> Contract {
        Contract::from_entries(
            self.inner
                .definitions
                .iter()
                .map(|(name, definition)| (name.clone(), definition.produces()))
                .collect(),
        )
    }

    /// The contract this factory was built against.
    #[must_use]
    pub fn contract(&self) -> &Contract {
        &self.inner.contract
    }

    /// The composition policies this factory invokes with.
    #[must_use]
    pub fn config(&self) -> &CompositionConfig {
        &self.inner.config
    }

    /// Describes every definition, sorted by name.
    #[must_use]
    pub fn descriptors(&self) -> Vec<DefinitionDescriptor> {
        self.inner
            .definitions
            .iter()
            .map(|(name, definition)| DefinitionDescriptor {
                name: name.to_string(),
                produces: definition.produces().type_name(),
                reads: definition.declared_reads().map(str::to_owned).collect(),
            })
            .collect()
    }

    /// Names this factory resolves, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.inner.definitions.keys().map(ServiceName::as_str)
    }

    /// Number of definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.definitions.len()
    }

    /// Returns `true` if the factory resolves nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.definitions.is_empty()
    }
}

fn check_present(contract: &Contract, deps: &Resolved) -> Result<()> {
    let missing: Vec<String> = contract
        .names()
        .filter(|name| !deps.contains(name))
        .map(str::to_owned)
        .collect();
    if missing.is_empty() {
        return Ok(());
    }
    tracing::debug!(missing = ?missing, "dependencies missing at invocation");
    Err(StagewireError::MissingDependency { names: missing })
}

fn check_shapes(contract: &Contract, deps: &Resolved) -> Result<()> {
    for (name, expected) in contract.iter() {
        if let Some(actual) = deps.signature(name.as_str()) {
            if actual != *expected {
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

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::definition::Definitions;
    use crate::key::Key;
    use crate::stage::declare_contract;

    type Multiply = Box<dyn Fn(i64) -> i64 + Send + Sync>;
    type Thunk = Box<dyn Fn() -> i64 + Send + Sync>;

    const MULTIPLY: Key<Multiply> = Key::new("multiply");
    const DOUBLE: Key<Multiply> = Key::new("double");

    fn doubling_factory() -> StagedFactory {
        declare_contract(Contract::builder().require_key(&MULTIPLY).build().expect("contract"))
            .build(Definitions::new().define_key(
                &DOUBLE,
                Definition::new(|deps| {
                    let multiply = deps.get_key(&MULTIPLY)?;
                    Ok(Box::new(move |x: i64| multiply(x) * 2) as Multiply)
                })
                .reads_key(&MULTIPLY),
            ))
            .expect("build")
    }

    fn times_ten() -> Resolved {
        Resolved::new()
            .provide_key(&MULTIPLY, Box::new(|x: i64| x * 10) as Multiply)
            .expect("provide")
    }

    #[test]
    fn double_of_five_is_one_hundred() {
        let resolved = doubling_factory().invoke(&times_ten()).expect("invoke");
        let double = resolved.get_key(&DOUBLE).expect("double");
        assert_eq!(double(5), 100);
    }

    #[test]
    fn output_names_equal_definition_names() {
        let factory = doubling_factory();
        let resolved = factory.invoke(&times_ten()).expect("invoke");
        assert_eq!(
            resolved.names().collect::<Vec<_>>(),
            factory.names().collect::<Vec<_>>()
        );
    }

    #[test]
    fn missing_dependency_names_b() {
        let contract = Contract::builder()
            .require::<Thunk>("a")
            .require::<Thunk>("b")
            .build()
            .expect("contract");
        let factory = declare_contract(contract)
            .build(Definitions::new().define(
                "sum",
                Definition::new(|deps| {
                    let a = deps.get::<Thunk>("a")?;
                    let b = deps.get::<Thunk>("b")?;
                    Ok(Box::new(move || a() + b()) as Thunk)
                })
                .reads(["a", "b"]),
            ))
            .expect("build");

        let only_a = Resolved::new()
            .provide("a", Box::new(|| 1_i64) as Thunk)
            .expect("provide");
        match factory.invoke(&only_a).unwrap_err() {
            StagewireError::MissingDependency { names } => assert_eq!(names, vec!["b"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn every_invocation_reruns_definitions() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let factory = declare_contract(Contract::empty())
            .build(Definitions::new().define(
                "value",
                Definition::new(move |_| {
                    let _ = counter.fetch_add(1, Ordering::SeqCst);
                    Ok(7_usize)
                }),
            ))
            .expect("build");

        let first = factory.invoke(&Resolved::new()).expect("first");
        let second = factory.invoke(&Resolved::new()).expect("second");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(
            *first.get::<usize>("value").expect("value"),
            *second.get::<usize>("value").expect("value")
        );
    }

    #[test]
    fn eager_validation_rejects_wrong_type_before_running() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let factory = declare_contract(Contract::builder().require::<u32>("n").build().expect("contract"))
            .build(Definitions::new().define(
                "echo",
                Definition::new(move |deps| {
                    let _ = counter.fetch_add(1, Ordering::SeqCst);
                    Ok(*deps.get::<u32>("n")?)
                })
                .reads(["n"]),
            ))
            .expect("build");
        let wrong = Resolved::new().provide("n", "seven").expect("provide");
        let err = factory.invoke(&wrong).unwrap_err();
        assert!(matches!(err, StagewireError::ShapeMismatch { ref name, .. } if name == "n"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn lazy_validation_fails_at_first_read() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let config = CompositionConfig {
            validation: ValidationPolicy::Lazy,
            ..CompositionConfig::default()
        };
        let factory = declare_contract(Contract::builder().require::<u32>("n").build().expect("contract"))
            .with_config(config)
            .build(Definitions::new().define(
                "echo",
                Definition::new(move |deps| {
                    let _ = counter.fetch_add(1, Ordering::SeqCst);
                    Ok(*deps.get::<u32>("n")?)
                })
                .reads(["n"]),
            ))
            .expect("build");
        let wrong = Resolved::new().provide("n", "seven").expect("provide");
        let err = factory.invoke(&wrong).unwrap_err();
        assert!(matches!(err, StagewireError::ShapeMismatch { .. }), "got: {err}");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn extra_dependencies_are_ignored() {
        let deps = times_ten().provide("unrelated", 1_u8).expect("provide");
        let resolved = doubling_factory().invoke(&deps).expect("invoke");
        assert_eq!(resolved.len(), 1);
    }

    #[test]
    fn undeclared_read_outside_contract_is_refused() {
        let factory = declare_contract(Contract::empty())
            .build(Definitions::new().define(
                "x",
                Definition::new(|deps| Ok(*deps.get::<u8>("ghost")?)),
            ))
            .expect("build");
        let deps = Resolved::new().provide("ghost", 1_u8).expect("provide");
        match factory.invoke(&deps).unwrap_err() {
            StagewireError::ContractViolation { names } => assert_eq!(names, vec!["ghost"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn undeclared_read_of_contract_name_is_refused() {
        let contract = Contract::builder().require::<u8>("n").build().expect("contract");
        let factory = declare_contract(contract)
            .build(Definitions::new().define(
                "echo",
                Definition::new(|deps| Ok(*deps.get::<u8>("n")?)),
            ))
            .expect("build");
        let deps = Resolved::new().provide("n", 1_u8).expect("provide");
        let err = factory.invoke(&deps).unwrap_err();
        assert!(matches!(err, StagewireError::ContractViolation { .. }), "got: {err}");
    }

    #[test]
    fn declared_read_outside_contract_fails_build() {
        let err = declare_contract(Contract::empty())
            .build(Definitions::new().define(
                "x",
                Definition::new(|deps| Ok(*deps.get::<u8>("ghost")?)).reads(["ghost"]),
            ))
            .unwrap_err();
        match err {
            StagewireError::ContractViolation { names } => assert_eq!(names, vec!["ghost"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn failing_definition_aborts_invocation() {
        let factory = declare_contract(Contract::empty())
            .build(
                Definitions::new()
                    .define("ok", Definition::new(|_| Ok(1_u8)))
                    .define(
                        "broken",
                        Definition::new(|_| -> Result<u8> {
                            Err(StagewireError::definition("broken", "store unavailable"))
                        }),
                    ),
            )
            .expect("build");
        let err = factory.invoke(&Resolved::new()).unwrap_err();
        assert_eq!(err.to_string(), "definition \"broken\" failed: store unavailable");
    }

    #[test]
    fn export_contract_describes_outputs() {
        let exported = doubling_factory().export_contract();
        assert_eq!(exported.names().collect::<Vec<_>>(), vec!["double"]);
        assert!(exported.get("double").expect("double").is::<Multiply>());
    }

    #[test]
    fn descriptors_list_reads() {
        let descriptors = doubling_factory().descriptors();
        assert_eq!(descriptors.len(), 1);
        assert_eq!(descriptors[0].name, "double");
        assert_eq!(descriptors[0].reads, vec!["multiply"]);
    }
}
