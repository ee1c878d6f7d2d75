//! `stagewire todo` — Compose the to-do manager and apply edits.
//!
//! Each run starts from an empty store. Edits are applied in a fixed
//! order: synchronous adds, async adds, toggles, deletes, then the
//! filter. The visible items are printed at the end.

use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use serde::Serialize;

use super::Context;
use crate::output;
use crate::todo::services::{
    ADD_TODO, ADD_TODO_ASYNC, DELETE_TODO, GET_TODOS, GET_VISIBILITY_FILTER,
    SET_VISIBILITY_FILTER, TOGGLE_TODO,
};
use crate::todo::{Todo, TodoStore, VisibilityFilter, services};

/// Arguments for the `todo` command.
#[derive(Args, Debug)]
pub struct TodoArgs {
    /// Add an item (repeatable).
    #[arg(long = "add", value_name = "TEXT")]
    pub add: Vec<String>,

    /// Add an item after a simulated fetch round trip (repeatable).
    #[arg(long = "add-async", value_name = "TEXT")]
    pub add_async: Vec<String>,

    /// Toggle an item's completed flag by id (repeatable).
    #[arg(long = "toggle", value_name = "ID")]
    pub toggle: Vec<u64>,

    /// Delete an item by id (repeatable).
    #[arg(long = "delete", value_name = "ID")]
    pub delete: Vec<u64>,

    /// Which items to show.
    #[arg(long, value_enum, default_value_t = VisibilityFilter::All)]
    pub filter: VisibilityFilter,

    /// Simulated fetch latency in milliseconds.
    #[arg(long, default_value_t = 0)]
    pub latency_ms: u64,
}

#[derive(Debug, Serialize)]
struct TodoReport {
    filter: VisibilityFilter,
    visible: Vec<Todo>,
    total: usize,
}

/// Executes the `todo` command.
///
/// # Errors
///
/// Returns an error if composition fails or the async runtime cannot start.
pub fn execute(args: TodoArgs, ctx: Context) -> anyhow::Result<()> {
    let TodoArgs {
        add: to_add,
        add_async: to_add_async,
        toggle: to_toggle,
        delete: to_delete,
        filter,
        latency_ms,
    } = args;
    let resolved = services::resolve(
        Arc::new(TodoStore::new()),
        Duration::from_millis(latency_ms),
        ctx.composition,
    )?;

    let add = resolved.get_key(&ADD_TODO)?;
    for text in to_add {
        add(text);
    }

    if !to_add_async.is_empty() {
        let add_async = resolved.get_key(&ADD_TODO_ASYNC)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()?;
        runtime.block_on(async {
            for text in to_add_async {
                add_async(text).await;
            }
        });
    }

    let toggle = resolved.get_key(&TOGGLE_TODO)?;
    for id in to_toggle {
        toggle(id);
    }
    let delete = resolved.get_key(&DELETE_TODO)?;
    for id in to_delete {
        delete(id);
    }
    resolved.get_key(&SET_VISIBILITY_FILTER)?(filter);

    let filter = resolved.get_key(&GET_VISIBILITY_FILTER)?();
    let todos = resolved.get_key(&GET_TODOS)?();
    let report = TodoReport {
        filter,
        total: todos.len(),
        visible: todos.into_iter().filter(|t| filter.shows(t)).collect(),
    };
    tracing::debug!(total = report.total, visible = report.visible.len(), "todo run finished");

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if report.visible.is_empty() {
        println!("No to-dos to show.");
    }
    for todo in &report.visible {
        println!("{}", output::format_todo(todo));
    }
    println!();
    println!(
        "  {} of {} item(s) shown (filter: {}).",
        report.visible.len(),
        report.total,
        report.filter
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use clap::Parser;

    use crate::commands::{Cli, Command};

    use super::*;

    #[test]
    fn parses_repeated_edits() {
        let cli = Cli::try_parse_from([
            "stagewire", "todo", "--add", "a", "--add", "b", "--toggle", "0", "--filter",
            "completed",
        ])
        .expect("parse");
        let Command::Todo(args) = cli.command else {
            panic!("parsed a different command");
        };
        assert_eq!(args.add, vec!["a", "b"]);
        assert_eq!(args.toggle, vec![0]);
        assert_eq!(args.filter, VisibilityFilter::Completed);
    }

    #[test]
    fn execute_runs_async_adds() {
        let args = TodoArgs {
            add: vec!["a".into()],
            add_async: vec!["b".into()],
            toggle: vec![0],
            delete: Vec::new(),
            filter: VisibilityFilter::Active,
            latency_ms: 1,
        };
        let ctx = Context {
            composition: stagewire_sdk::CompositionConfig::default(),
            json: true,
        };
        execute(args, ctx).expect("execute");
    }
}
