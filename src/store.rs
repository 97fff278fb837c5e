use std::time::{SystemTime, UNIX_EPOCH};

use time::Date;
use tracing::{debug, warn};

use crate::domain::prefs::{Preferences, Theme};
use crate::domain::todo::{Priority, Todo, TodoId, TodoPatch};
use crate::repo::KeyValueStore;
use crate::repo::persist::{self, SaveOutcome};
use crate::usecase::summary::{Summary, summarize};
use crate::usecase::view::{ViewQuery, build_view};

/// Owns the canonical task collection and writes it through to storage after
/// every change. Missing ids are never an error; those calls change nothing.
pub struct TaskStore<S: KeyValueStore> {
    storage: S,
    todos: Vec<Todo>,
    prefs: Preferences,
    last_id: TodoId,
    last_save: Option<SaveOutcome>,
}

impl<S: KeyValueStore> TaskStore<S> {
    /// Hydrate from storage. Never fails; unreadable content yields defaults.
    pub fn open(storage: S) -> Self {
        let (todos, prefs) = persist::load(&storage);
        let last_id = todos.iter().map(|t| t.id).max().unwrap_or(0);
        Self {
            storage,
            todos,
            prefs,
            last_id,
            last_save: None,
        }
    }

    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    pub fn get(&self, id: TodoId) -> Option<&Todo> {
        self.todos.iter().find(|t| t.id == id)
    }

    pub fn preferences(&self) -> Preferences {
        self.prefs
    }

    pub fn has_completed(&self) -> bool {
        self.todos.iter().any(|t| t.completed)
    }

    pub fn view(&self, query: &ViewQuery) -> Vec<&Todo> {
        build_view(&self.todos, query)
    }

    pub fn summary(&self) -> Summary {
        summarize(&self.todos)
    }

    /// Outcome of the most recent write, `None` before the first mutation.
    pub fn last_save(&self) -> Option<&SaveOutcome> {
        self.last_save.as_ref()
    }

    pub fn create(&mut self, text: &str, priority: Priority, due_date: Option<Date>) -> Option<Todo> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let Some(id) = self.next_id() else {
            warn!(last_id = self.last_id, "todo ids exhausted; not creating");
            return None;
        };
        let todo = Todo::with_meta(id, text, priority, due_date);
        debug!(id = todo.id, "created todo");
        self.todos.push(todo.clone());
        self.persist();
        Some(todo)
    }

    /// A blank text patch is ignored; other fields in the same patch still apply.
    pub fn update(&mut self, id: TodoId, patch: TodoPatch) -> Option<Todo> {
        let todo = self.todos.iter_mut().find(|t| t.id == id)?;
        if let Some(text) = patch.text.as_deref().map(str::trim)
            && !text.is_empty()
        {
            todo.text = text.to_owned();
        }
        if let Some(priority) = patch.priority {
            todo.priority = priority;
        }
        if let Some(due_date) = patch.due_date {
            todo.due_date = due_date;
        }
        let updated = todo.clone();
        debug!(id, "updated todo");
        self.persist();
        Some(updated)
    }

    pub fn toggle_completion(&mut self, id: TodoId) -> Option<Todo> {
        let todo = self.todos.iter_mut().find(|t| t.id == id)?;
        todo.completed = !todo.completed;
        let toggled = todo.clone();
        debug!(id, completed = toggled.completed, "toggled todo");
        self.persist();
        Some(toggled)
    }

    pub fn remove(&mut self, id: TodoId) -> Option<Todo> {
        let pos = self.todos.iter().position(|t| t.id == id)?;
        let removed = self.todos.remove(pos);
        debug!(id, "removed todo");
        self.persist();
        Some(removed)
    }

    pub fn clear_completed(&mut self) -> usize {
        let before = self.todos.len();
        self.todos.retain(|t| !t.completed);
        let removed = before - self.todos.len();
        if removed > 0 {
            debug!(removed, "cleared completed todos");
            self.persist();
        }
        removed
    }

    pub fn set_theme(&mut self, theme: Theme) {
        if self.prefs.theme == theme {
            return;
        }
        self.prefs.theme = theme;
        self.persist();
    }

    pub fn toggle_theme(&mut self) -> Theme {
        let theme = self.prefs.theme.toggled();
        self.set_theme(theme);
        theme
    }

    fn persist(&mut self) {
        let outcome = persist::save(&mut self.storage, &self.todos, &self.prefs);
        self.last_save = Some(outcome);
    }

    /// Millisecond timestamp, bumped past the last id handed out so ids stay
    /// strictly increasing even within one millisecond or after a clock step back.
    /// `None` once the largest id is already taken.
    fn next_id(&mut self) -> Option<TodoId> {
        let id = now_millis().max(self.last_id.checked_add(1)?);
        self.last_id = id;
        Some(id)
    }
}

fn now_millis() -> TodoId {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as TodoId
}
