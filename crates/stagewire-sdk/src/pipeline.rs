//! Checked composition chains.
//!
//! A [`Pipeline`] strings staged factories together in the order the
//! caller chooses. Each stage's contract is checked against everything
//! available at that point (the pipeline input plus every earlier stage's
//! exported services) when the stage is added, so a miswired chain fails
//! before any definition runs.

use stagewire_common::error::Result;
use stagewire_core::{Contract, Resolved, StagedFactory};

/// An ordered chain of staged factories with accumulated services.
#[derive(Debug, Clone)]
pub struct Pipeline {
    input: Contract,
    available: Contract,
    stages: Vec<StagedFactory>,
}

impl Pipeline {
    /// Starts a pipeline whose callers supply values matching `input`.
    #[must_use]
    pub fn new(input: Contract) -> Self {
        Self {
            available: input.clone(),
            input,
            stages: Vec::new(),
        }
    }

    /// Appends a stage.
    ///
    /// # Errors
    ///
    /// Returns a missing dependency or shape mismatch error if the stage's
    /// contract is not covered by what earlier stages and the input provide,
    /// or an ambiguous dependency error if the stage exports a name that is
    /// already available.
    pub fn then(mut self, stage: StagedFactory) -> Result<Self> {
        stage.contract().check_satisfied_by(&self.available)?;
        self.available = self.available.merge_with(&stage.export_contract(), false)?;
        tracing::info!(
            stage = self.stages.len(),
            services = stage.len(),
            available = self.available.len(),
            "added pipeline stage"
        );
        self.stages.push(stage);
        Ok(self)
    }

    /// Runs every stage in order.
    ///
    /// Each stage is invoked with the input plus the services of all
    /// earlier stages. The returned map holds all of them. Names in `deps`
    /// beyond the input contract are dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if `deps` does not satisfy the input contract, or
    /// if any stage fails to resolve.
    pub fn run(&self, deps: &Resolved) -> Result<Resolved> {
        self.input.check_satisfied_by(&deps.contract())?;
        let mut accumulated = deps.pick(self.input.names())?;
        for (index, stage) in self.stages.iter().enumerate() {
            let resolved = stage.invoke(&accumulated)?;
            tracing::debug!(stage = index, services = resolved.len(), "pipeline stage resolved");
            accumulated = accumulated.merge(resolved)?;
        }
        Ok(accumulated)
    }

    /// The contract callers of [`run`](Self::run) must satisfy.
    #[must_use]
    pub const fn input_contract(&self) -> &Contract {
        &self.input
    }

    /// Everything available after the last stage: input plus all exports.
    #[must_use]
    pub const fn output_contract(&self) -> &Contract {
        &self.available
    }

    /// The stages in execution order.
    #[must_use]
    pub fn stages(&self) -> &[StagedFactory] {
        &self.stages
    }

    /// Number of stages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Returns `true` if no stage was added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}
