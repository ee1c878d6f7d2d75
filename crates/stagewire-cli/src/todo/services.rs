//! Staged composition of the to-do manager.
//!
//! Three stages, each declared against what the previous ones export:
//!
//! 1. `store`: hands out the caller's [`TodoStore`].
//! 2. `fetch`: a simulated network round trip that waits for `latency`.
//! 3. the manager: list, add, toggle, delete, async add, and filter
//!    operations over `store` and `fetch`.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use stagewire_sdk::pipeline::Pipeline;
use stagewire_sdk::{
    CompositionConfig, Contract, Definition, Definitions, Key, Resolved, Result, StagedFactory,
    declare_contract,
};

use super::{Action, Todo, TodoStore, VisibilityFilter};

/// A boxed `Send` future with no output.
pub type BoxFuture = Pin<Box<dyn Future<Output = ()> + Send>>;
/// Simulated network round trip.
pub type Fetch = Box<dyn Fn() -> BoxFuture + Send + Sync>;
/// Lists every item.
pub type GetTodos = Box<dyn Fn() -> Vec<Todo> + Send + Sync>;
/// Adds an item.
pub type AddTodo = Box<dyn Fn(String) + Send + Sync>;
/// Adds an item after a fetch round trip.
pub type AddTodoAsync = Box<dyn Fn(String) -> BoxFuture + Send + Sync>;
/// Acts on an item by id.
pub type TodoById = Box<dyn Fn(u64) + Send + Sync>;
/// Reads the list filter.
pub type GetVisibilityFilter = Box<dyn Fn() -> VisibilityFilter + Send + Sync>;
/// Replaces the list filter.
pub type SetVisibilityFilter = Box<dyn Fn(VisibilityFilter) + Send + Sync>;

/// Pipeline input: delay of one simulated fetch.
pub const LATENCY: Key<Duration> = Key::new("latency");
/// The caller's store, shared by every manager operation.
pub const STORE: Key<Arc<TodoStore>> = Key::new("store");
/// Simulated network round trip.
pub const FETCH: Key<Fetch> = Key::new("fetch");
/// Lists every item.
pub const GET_TODOS: Key<GetTodos> = Key::new("getTodos");
/// Adds an item.
pub const ADD_TODO: Key<AddTodo> = Key::new("addTodo");
/// Adds an item once a fetch completes.
pub const ADD_TODO_ASYNC: Key<AddTodoAsync> = Key::new("addTodoAsync");
/// Flips an item's completed flag.
pub const TOGGLE_TODO: Key<TodoById> = Key::new("toggleTodo");
/// Removes an item.
pub const DELETE_TODO: Key<TodoById> = Key::new("deleteTodo");
/// Reads the list filter.
pub const GET_VISIBILITY_FILTER: Key<GetVisibilityFilter> = Key::new("getVisibilityFilter");
/// Replaces the list filter.
pub const SET_VISIBILITY_FILTER: Key<SetVisibilityFilter> = Key::new("setVisibilityFilter");

/// Builds the stage that exports `store`.
///
/// # Errors
///
/// Returns an error if the definitions cannot be built.
pub fn store_service(store: Arc<TodoStore>, config: CompositionConfig) -> Result<StagedFactory> {
    declare_contract(Contract::empty())
        .with_config(config)
        .build(
            Definitions::new()
                .define_key(&STORE, Definition::new(move |_| Ok(Arc::clone(&store)))),
        )
}

/// Builds the stage that exports `fetch`.
///
/// # Errors
///
/// Returns an error if the definitions do not fit `contract`.
pub fn fetch_service(contract: Contract, config: CompositionConfig) -> Result<StagedFactory> {
    declare_contract(contract).with_config(config).build(
        Definitions::new().define_key(
            &FETCH,
            Definition::new(|deps| {
                let latency = *deps.get_key(&LATENCY)?;
                Ok(Box::new(move || {
                    Box::pin(tokio::time::sleep(latency)) as BoxFuture
                }) as Fetch)
            })
            .reads_key(&LATENCY),
        ),
    )
}

/// Builds the manager stage over `store` and `fetch`.
///
/// # Errors
///
/// Returns an error if the definitions do not fit `contract`.
pub fn manager(contract: Contract, config: CompositionConfig) -> Result<StagedFactory> {
    let definitions = Definitions::new()
        .define_key(
            &GET_TODOS,
            Definition::new(|deps| {
                let store = deps.get_key(&STORE)?;
                Ok(Box::new(move || store.state().todos) as GetTodos)
            })
            .reads_key(&STORE),
        )
        .define_key(
            &ADD_TODO,
            Definition::new(|deps| {
                let store = deps.get_key(&STORE)?;
                Ok(Box::new(move |text: String| store.dispatch(Action::AddTodo { text })) as AddTodo)
            })
            .reads_key(&STORE),
        )
        .define_key(
            &ADD_TODO_ASYNC,
            Definition::new(|deps| {
                let store = deps.get_key(&STORE)?;
                let fetch = deps.get_key(&FETCH)?;
                Ok(Box::new(move |text: String| {
                    let store = Arc::clone(&store);
                    let round_trip = fetch();
                    Box::pin(async move {
                        round_trip.await;
                        store.dispatch(Action::AddTodo { text });
                    }) as BoxFuture
                }) as AddTodoAsync)
            })
            .reads_key(&STORE)
            .reads_key(&FETCH),
        )
        .define_key(
            &TOGGLE_TODO,
            Definition::new(|deps| {
                let store = deps.get_key(&STORE)?;
                Ok(Box::new(move |id: u64| store.dispatch(Action::ToggleTodo { id })) as TodoById)
            })
            .reads_key(&STORE),
        )
        .define_key(
            &DELETE_TODO,
            Definition::new(|deps| {
                let store = deps.get_key(&STORE)?;
                Ok(Box::new(move |id: u64| store.dispatch(Action::DeleteTodo { id })) as TodoById)
            })
            .reads_key(&STORE),
        )
        .define_key(
            &GET_VISIBILITY_FILTER,
            Definition::new(|deps| {
                let store = deps.get_key(&STORE)?;
                Ok(Box::new(move || store.state().visibility_filter) as GetVisibilityFilter)
            })
            .reads_key(&STORE),
        )
        .define_key(
            &SET_VISIBILITY_FILTER,
            Definition::new(|deps| {
                let store = deps.get_key(&STORE)?;
                Ok(Box::new(move |filter: VisibilityFilter| {
                    store.dispatch(Action::SetVisibilityFilter { filter });
                }) as SetVisibilityFilter)
            })
            .reads_key(&STORE),
        );
    declare_contract(contract).with_config(config).build(definitions)
}

/// Chains store, fetch, and manager into one checked pipeline.
///
/// # Errors
///
/// Returns an error if any stage cannot be built or wired.
pub fn pipeline(store: Arc<TodoStore>, config: CompositionConfig) -> Result<Pipeline> {
    let input = Contract::builder().require_key(&LATENCY).build()?;
    let store_stage = store_service(store, config)?;

    let fetch_contract = Contract::builder()
        .require_key(&LATENCY)
        .require_key(&STORE)
        .build()?;
    let fetch_stage = fetch_service(fetch_contract, config)?;

    let manager_contract = store_stage
        .export_contract()
        .merge_under(&fetch_stage.export_contract(), &config)?;
    let manager_stage = manager(manager_contract, config)?;

    Pipeline::new(input)
        .then(store_stage)?
        .then(fetch_stage)?
        .then(manager_stage)
}

/// Resolves every to-do service for `store`.
///
/// # Errors
///
/// Returns an error if composition or resolution fails.
pub fn resolve(
    store: Arc<TodoStore>,
    latency: Duration,
    config: CompositionConfig,
) -> Result<Resolved> {
    let input = Resolved::new().provide_key(&LATENCY, latency)?;
    pipeline(store, config)?.run(&input)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use stagewire_sdk::StagewireError;

    use super::*;

    fn services(store: &Arc<TodoStore>) -> Resolved {
        resolve(Arc::clone(store), Duration::ZERO, CompositionConfig::default()).expect("resolve")
    }

    #[test]
    fn pipeline_exports_every_manager_operation() {
        let pipeline =
            pipeline(Arc::new(TodoStore::new()), CompositionConfig::default()).expect("pipeline");
        let names: Vec<&str> = pipeline.output_contract().names().collect();
        assert_eq!(
            names,
            vec![
                "addTodo",
                "addTodoAsync",
                "deleteTodo",
                "fetch",
                "getTodos",
                "getVisibilityFilter",
                "latency",
                "setVisibilityFilter",
                "store",
                "toggleTodo",
            ]
        );
    }

    #[test]
    fn manager_edits_the_callers_store() {
        let store = Arc::new(TodoStore::new());
        let resolved = services(&store);

        resolved.get_key(&ADD_TODO).expect("addTodo")("write tests".into());
        resolved.get_key(&ADD_TODO).expect("addTodo")("ship".into());
        resolved.get_key(&TOGGLE_TODO).expect("toggleTodo")(0);
        resolved.get_key(&DELETE_TODO).expect("deleteTodo")(1);

        let todos = resolved.get_key(&GET_TODOS).expect("getTodos")();
        assert_eq!(todos.len(), 1);
        assert!(todos[0].completed);
        assert_eq!(store.state().todos, todos);
    }

    #[test]
    fn filter_round_trips_through_services() {
        let store = Arc::new(TodoStore::new());
        let resolved = services(&store);
        resolved.get_key(&SET_VISIBILITY_FILTER).expect("set")(VisibilityFilter::Completed);
        assert_eq!(
            resolved.get_key(&GET_VISIBILITY_FILTER).expect("get")(),
            VisibilityFilter::Completed
        );
    }

    #[test]
    fn separate_stores_stay_separate() {
        let first = Arc::new(TodoStore::new());
        let second = Arc::new(TodoStore::new());
        services(&first).get_key(&ADD_TODO).expect("addTodo")("a".into());
        assert!(second.state().todos.is_empty());
        assert_eq!(first.state().todos.len(), 1);
    }

    #[test]
    fn manager_requires_fetch() {
        let contract = Contract::builder().require_key(&STORE).build().expect("contract");
        let err = manager(contract, CompositionConfig::default()).unwrap_err();
        match err {
            StagewireError::ContractViolation { names } => assert_eq!(names, vec!["fetch"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn add_todo_async_lands_after_fetch() {
        let store = Arc::new(TodoStore::new());
        let resolved = resolve(
            Arc::clone(&store),
            Duration::from_millis(5),
            CompositionConfig::default(),
        )
        .expect("resolve");

        let pending = resolved.get_key(&ADD_TODO_ASYNC).expect("addTodoAsync")("later".into());
        assert!(store.state().todos.is_empty());
        pending.await;
        assert_eq!(store.state().todos[0].text, "later");
    }
}
