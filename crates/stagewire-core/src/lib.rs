//! # stagewire-core
//!
//! The staged factory composition engine.
//!
//! Wiring happens in three explicit steps, each a plain value
//! transformation:
//!
//! 1. [`declare_contract`] captures the dependency [`Contract`] a definition
//!    map may assume.
//! 2. [`DefinitionStage::build`] checks a [`Definitions`] map against that
//!    contract and returns a [`StagedFactory`]. No definition runs yet.
//! 3. [`StagedFactory::invoke`] runs every definition against a concrete
//!    [`Resolved`] dependency object and returns a fresh [`Resolved`]
//!    service map.
//!
//! [`StagedFactory::export_contract`] turns a factory's output shape into
//! the contract of the next stage, which is how composition chains are
//! built.
//!
//! # Example
//!
//! ```
//! use stagewire_core::{declare_contract, Contract, Definition, Definitions, Key, Resolved};
//!
//! type Multiply = Box<dyn Fn(i64) -> i64 + Send + Sync>;
//! const MULTIPLY: Key<Multiply> = Key::new("multiply");
//! const DOUBLE: Key<Multiply> = Key::new("double");
//!
//! # fn main() -> stagewire_common::error::Result<()> {
//! let factory = declare_contract(Contract::builder().require_key(&MULTIPLY).build()?)
//!     .build(Definitions::new().define_key(
//!         &DOUBLE,
//!         Definition::new(|deps| {
//!             let multiply = deps.get_key(&MULTIPLY)?;
//!             Ok(Box::new(move |x: i64| multiply(x) * 2) as Multiply)
//!         })
//!         .reads_key(&MULTIPLY),
//!     ))?;
//!
//! let deps = Resolved::new().provide_key(&MULTIPLY, Box::new(|x: i64| x * 10) as Multiply)?;
//! let services = factory.invoke(&deps)?;
//! assert_eq!(services.get_key(&DOUBLE)?(5), 100);
//! # Ok(())
//! # }
//! ```

pub mod contract;
pub mod definition;
pub mod deps;
pub mod factory;
pub mod key;
pub mod resolved;
pub mod signature;
pub mod stage;

pub use contract::{Contract, ContractBuilder};
pub use definition::{Definition, Definitions};
pub use deps::Deps;
pub use factory::{DefinitionDescriptor, StagedFactory};
pub use key::Key;
pub use resolved::{Resolved, SharedValue};
pub use signature::Signature;
pub use stage::{DefinitionStage, declare_contract};
