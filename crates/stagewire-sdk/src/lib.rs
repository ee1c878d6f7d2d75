//! # stagewire-sdk
//!
//! Public SDK for wiring services with Stagewire.
//!
//! Provides two entry points:
//! - The engine itself, re-exported from `stagewire-core`: declare a
//!   [`Contract`], [`build`](DefinitionStage::build) a [`StagedFactory`]
//!   from [`Definitions`], and [`invoke`](StagedFactory::invoke) it.
//! - [`Pipeline`](pipeline::Pipeline): checks a whole composition chain
//!   when it is assembled and runs it in one call.
//!
//! # Example
//!
//! ```rust
//! use stagewire_sdk::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let greeter = declare_contract(Contract::builder().require::<String>("name").build()?)
//!     .build(Definitions::new().define(
//!         "greeting",
//!         Definition::new(|deps| Ok(format!("hello, {}", deps.get::<String>("name")?)))
//!             .reads(["name"]),
//!     ))?;
//!
//! let pipeline = Pipeline::new(Contract::builder().require::<String>("name").build()?)
//!     .then(greeter)?;
//! let out = pipeline.run(&Resolved::new().provide("name", String::from("ada"))?)?;
//! assert_eq!(out.get::<String>("greeting")?.as_str(), "hello, ada");
//! # Ok(())
//! # }
//! ```

pub mod pipeline;

pub use stagewire_common::config::CompositionConfig;
pub use stagewire_common::error::{Result, StagewireError};
pub use stagewire_common::types::{DuplicatePolicy, ServiceName, ValidationPolicy};
pub use stagewire_core::{
    Contract, ContractBuilder, Definition, DefinitionDescriptor, DefinitionStage, Definitions,
    Deps, Key, Resolved, SharedValue, Signature, StagedFactory, declare_contract,
};

/// Everything needed to declare, build, and run compositions.
pub mod prelude {
    pub use crate::pipeline::Pipeline;
    pub use crate::{
        CompositionConfig, Contract, Definition, Definitions, Deps, Key, Resolved, Result,
        StagedFactory, StagewireError, declare_contract,
    };
}
