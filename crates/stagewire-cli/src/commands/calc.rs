//! `stagewire calc` — Resolve the calculator chain and evaluate it.
//!
//! The chain has two stages: base services (`multiply`, `add`) with no
//! dependencies, and a `calculate` service declared against the base
//! stage's exported contract.

use clap::Args;
use serde::Serialize;
use stagewire_sdk::{
    CompositionConfig, Contract, Definition, DefinitionDescriptor, Definitions, Key, Resolved,
    StagedFactory, declare_contract,
};

use super::Context;
use crate::output;

/// An integer operation.
pub type NumFn = Box<dyn Fn(i64) -> i64 + Send + Sync>;

const MULTIPLY: Key<NumFn> = Key::new("multiply");
const ADD: Key<NumFn> = Key::new("add");
const CALCULATE: Key<NumFn> = Key::new("calculate");

/// Arguments for the `calc` command.
#[derive(Args, Debug)]
pub struct CalcArgs {
    /// Input value.
    #[arg(allow_negative_numbers = true)]
    pub x: i64,

    /// Also print the definitions of every stage.
    #[arg(long)]
    pub describe: bool,
}

#[derive(Debug, Serialize)]
struct CalcReport {
    x: i64,
    multiply: i64,
    add: i64,
    calculate: i64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    definitions: Vec<DefinitionDescriptor>,
}

/// Executes the `calc` command.
///
/// # Errors
///
/// Returns an error if the chain cannot be built or resolved.
pub fn execute(args: CalcArgs, ctx: Context) -> anyhow::Result<()> {
    let base = base_services(ctx.composition)?;
    let calculator = calculator(base.export_contract(), ctx.composition)?;

    let base_resolved = base.invoke(&Resolved::new())?;
    let resolved = calculator.invoke(&base_resolved)?;

    let mut definitions = Vec::new();
    if args.describe {
        definitions.extend(base.descriptors());
        definitions.extend(calculator.descriptors());
    }
    let report = CalcReport {
        x: args.x,
        multiply: base_resolved.get_key(&MULTIPLY)?(args.x),
        add: base_resolved.get_key(&ADD)?(args.x),
        calculate: resolved.get_key(&CALCULATE)?(args.x),
        definitions,
    };

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("multiply({x}) = {}", report.multiply, x = report.x);
    println!("add({x})      = {}", report.add, x = report.x);
    println!("calculate({x}) = {}", report.calculate, x = report.x);
    if !report.definitions.is_empty() {
        println!();
        println!("{}", output::rule(40));
        print!("{}", output::format_descriptors(&report.definitions));
    }
    Ok(())
}

/// Stage one: `multiply` and `add`, no dependencies.
fn base_services(config: CompositionConfig) -> stagewire_sdk::Result<StagedFactory> {
    declare_contract(Contract::empty()).with_config(config).build(
        Definitions::new()
            .define_key(&MULTIPLY, Definition::new(|_| Ok(Box::new(|x: i64| x * 10) as NumFn)))
            .define_key(&ADD, Definition::new(|_| Ok(Box::new(|x: i64| x + 5) as NumFn))),
    )
}

/// Stage two: `calculate(x) = multiply(x) + add(x)`.
fn calculator(contract: Contract, config: CompositionConfig) -> stagewire_sdk::Result<StagedFactory> {
    declare_contract(contract).with_config(config).build(
        Definitions::new().define_key(
            &CALCULATE,
            Definition::new(|deps| {
                let multiply = deps.get_key(&MULTIPLY)?;
                let add = deps.get_key(&ADD)?;
                Ok(Box::new(move |x: i64| multiply(x) + add(x)) as NumFn)
            })
            .reads_key(&MULTIPLY)
            .reads_key(&ADD),
        ),
    )
}
