//! Contract capture and definition.
//!
//! [`declare_contract`] pins the dependency shape a definition map may
//! assume; [`DefinitionStage::build`] checks a definition map against it and
//! freezes the pair into a [`StagedFactory`]. Nothing user-supplied runs in
//! either step.

use std::collections::{BTreeMap, BTreeSet};
use std::collections::btree_map::Entry;

use stagewire_common::config::CompositionConfig;
use stagewire_common::error::{Result, StagewireError};
use stagewire_common::types::{DuplicatePolicy, ServiceName};

use crate::contract::Contract;
use crate::definition::{Definition, Definitions, NamedDefinition};
use crate::factory::StagedFactory;

/// Captures `contract` as the dependency shape for the next definition map.
#[must_use]
pub fn declare_contract(contract: Contract) -> DefinitionStage {
    tracing::debug!(dependencies = contract.len(), "declared contract");
    DefinitionStage {
        contract,
        config: CompositionConfig::default(),
    }
}

/// A captured contract waiting for its definition map.
#[derive(Debug, Clone)]
pub struct DefinitionStage {
    contract: Contract,
    config: CompositionConfig,
}

impl DefinitionStage {
    /// Replaces the composition policies used by `build` and by the
    /// resulting factory's invocations.
    #[must_use]
    pub fn with_config(mut self, config: CompositionConfig) -> Self {
        self.config = config;
        self
    }

    /// The captured contract.
    #[must_use]
    pub const fn contract(&self) -> &Contract {
        &self.contract
    }

    /// The composition policies in effect.
    #[must_use]
    pub const fn config(&self) -> &CompositionConfig {
        &self.config
    }

    /// Binds `definitions` to the captured contract.
    ///
    /// # Checks performed
    ///
    /// 1. Every service name is valid.
    /// 2. Duplicate names follow the configured [`DuplicatePolicy`].
    /// 3. Definitions registered under a typed key produce the key's type.
    /// 4. Every declared read names a dependency in the contract; all
    ///    offending names are reported together.
    ///
    /// # Errors
    ///
    /// Returns [`StagewireError::Config`], [`StagewireError::DuplicateDefinition`],
    /// [`StagewireError::ShapeMismatch`] or [`StagewireError::ContractViolation`]
    /// for the corresponding failed check.
    pub fn build(self, definitions: Definitions) -> Result<StagedFactory> {
        let submitted = definitions.len();
        let entries = collect_definitions(definitions.into_entries(), self.config.duplicate_policy)?;
        check_reads(&self.contract, &entries)?;

        tracing::debug!(
            definitions = entries.len(),
            submitted,
            dependencies = self.contract.len(),
            "built staged factory"
        );
        Ok(StagedFactory::new(self.contract, entries, self.config))
    }
}

fn collect_definitions(
    entries: Vec<NamedDefinition>,
    policy: DuplicatePolicy,
) -> Result<BTreeMap<ServiceName, Definition>> {
    let mut map = BTreeMap::new();
    for entry in entries {
        let name = ServiceName::new(entry.name)?;
        if let Some(expected) = entry.expected {
            let produced = entry.definition.produces();
            if produced != expected {
                return Err(StagewireError::ShapeMismatch {
                    name: name.to_string(),
                    expected: expected.type_name().to_owned(),
                    actual: produced.type_name().to_owned(),
                });
            }
        }
        match map.entry(name) {
            Entry::Vacant(slot) => {
                let _ = slot.insert(entry.definition);
            }
            Entry::Occupied(mut slot) => match policy {
                DuplicatePolicy::Reject => {
                    return Err(StagewireError::DuplicateDefinition {
                        name: slot.key().to_string(),
                    });
                }
                DuplicatePolicy::LastWriteWins => {
                    tracing::warn!(name = %slot.key(), "definition overridden by a later one");
                    let _ = slot.insert(entry.definition);
                }
            },
        }
    }
    Ok(map)
}

fn check_reads(contract: &Contract, entries: &BTreeMap<ServiceName, Definition>) -> Result<()> {
    let undeclared: BTreeSet<&str> = entries
        .values()
        .flat_map(Definition::declared_reads)
        .filter(|name| !contract.contains(name))
        .collect();
    if undeclared.is_empty() {
        return Ok(());
    }
    Err(StagewireError::ContractViolation {
        names: undeclared.into_iter().map(str::to_owned).collect(),
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::key::Key;

    const A: Key<i64> = Key::new("a");
    const B: Key<i64> = Key::new("b");

    fn contract_ab() -> Contract {
        Contract::builder()
            .require_key(&A)
            .require_key(&B)
            .build()
            .expect("contract")
    }

    #[test]
    fn build_does_not_run_definitions() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let factory = declare_contract(Contract::empty())
            .build(Definitions::new().define(
                "tick",
                Definition::new(move |_| {
                    let _ = counter.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }),
            ))
            .expect("build");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(factory.names().collect::<Vec<_>>(), vec!["tick"]);
    }

    #[test]
    fn undeclared_reads_are_all_reported() {
        let err = declare_contract(contract_ab())
            .build(
                Definitions::new()
                    .define("x", Definition::new(|_| Ok(0_i64)).reads(["a", "zeta"]))
                    .define("y", Definition::new(|_| Ok(0_i64)).reads(["alpha", "zeta"])),
            )
            .unwrap_err();
        match err {
            StagewireError::ContractViolation { names } => {
                assert_eq!(names, vec!["alpha", "zeta"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn duplicate_names_rejected_by_default() {
        let err = declare_contract(Contract::empty())
            .build(
                Definitions::new()
                    .define("dup", Definition::new(|_| Ok(1_u8)))
                    .define("dup", Definition::new(|_| Ok(2_u8))),
            )
            .unwrap_err();
        assert!(matches!(err, StagewireError::DuplicateDefinition { ref name } if name == "dup"));
    }

    #[test]
    fn duplicate_names_last_write_wins_when_configured() {
        let config = CompositionConfig {
            duplicate_policy: DuplicatePolicy::LastWriteWins,
            ..CompositionConfig::default()
        };
        let factory = declare_contract(Contract::empty())
            .with_config(config)
            .build(
                Definitions::new()
                    .define("dup", Definition::new(|_| Ok(1_u8)))
                    .define("dup", Definition::new(|_| Ok(2_u8))),
            )
            .expect("build");
        let resolved = factory.invoke(&crate::resolved::Resolved::new()).expect("invoke");
        assert_eq!(*resolved.get::<u8>("dup").expect("dup"), 2);
    }

    #[test]
    fn typed_key_rejects_wrong_product() {
        const SUM: Key<i64> = Key::new("sum");
        let err = declare_contract(Contract::empty())
            .build(Definitions::new().define_key(&SUM, Definition::new(|_| Ok(String::new()))))
            .unwrap_err();
        assert!(matches!(err, StagewireError::ShapeMismatch { ref name, .. } if name == "sum"));
    }

    #[test]
    fn invalid_definition_name_rejected() {
        let err = declare_contract(Contract::empty())
            .build(Definitions::new().define("two words", Definition::new(|_| Ok(()))))
            .unwrap_err();
        assert!(matches!(err, StagewireError::Config { .. }));
    }
}
