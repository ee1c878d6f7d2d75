//! In-memory to-do store used by the `todo` demo.
//!
//! State changes go through [`reduce`] via [`TodoStore::dispatch`]. Ids
//! are assigned by the state itself, so two stores never share a counter.

pub mod services;

use std::fmt;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// A single to-do item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Todo {
    /// Store-assigned id, unique within one store.
    pub id: u64,
    /// Item text.
    pub text: String,
    /// Whether the item is done.
    pub completed: bool,
}

/// Which items the list shows.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum VisibilityFilter {
    /// Every item.
    #[default]
    All,
    /// Items not yet completed.
    Active,
    /// Completed items.
    Completed,
}

impl VisibilityFilter {
    /// Returns `true` if `todo` passes this filter.
    #[must_use]
    pub const fn shows(self, todo: &Todo) -> bool {
        match self {
            Self::All => true,
            Self::Active => !todo.completed,
            Self::Completed => todo.completed,
        }
    }
}

impl fmt::Display for VisibilityFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Active => write!(f, "active"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

/// Snapshot of the whole store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TodoState {
    /// Items in insertion order.
    pub todos: Vec<Todo>,
    /// Current list filter.
    pub visibility_filter: VisibilityFilter,
    #[serde(skip)]
    next_id: u64,
}

impl TodoState {
    /// Items that pass the current filter.
    pub fn visible(&self) -> impl Iterator<Item = &Todo> {
        self.todos
            .iter()
            .filter(|todo| self.visibility_filter.shows(todo))
    }
}

/// A state change request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Append a new active item with the next id.
    AddTodo {
        /// Item text.
        text: String,
    },
    /// Flip the completed flag of an item. Unknown ids are ignored.
    ToggleTodo {
        /// Target id.
        id: u64,
    },
    /// Remove an item. Unknown ids are ignored.
    DeleteTodo {
        /// Target id.
        id: u64,
    },
    /// Replace the list filter.
    SetVisibilityFilter {
        /// New filter.
        filter: VisibilityFilter,
    },
}

/// Applies `action` to `state`.
pub fn reduce(state: &mut TodoState, action: Action) {
    match action {
        Action::AddTodo { text } => {
            let id = state.next_id;
            state.next_id += 1;
            state.todos.push(Todo {
                id,
                text,
                completed: false,
            });
        }
        Action::ToggleTodo { id } => {
            if let Some(todo) = state.todos.iter_mut().find(|t| t.id == id) {
                todo.completed = !todo.completed;
            }
        }
        Action::DeleteTodo { id } => state.todos.retain(|t| t.id != id),
        Action::SetVisibilityFilter { filter } => state.visibility_filter = filter,
    }
}

/// Thread-safe owner of a [`TodoState`].
#[derive(Debug, Default)]
pub struct TodoStore {
    state: Mutex<TodoState>,
}

impl TodoStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the current state.
    #[must_use]
    pub fn state(&self) -> TodoState {
        self.state.lock().clone()
    }

    /// Applies `action` under the store lock.
    pub fn dispatch(&self, action: Action) {
        tracing::trace!(?action, "dispatch");
        reduce(&mut self.state.lock(), action);
    }
}
