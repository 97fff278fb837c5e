//! Load/save of the task collection and preferences through a [`KeyValueStore`].
//!
//! Reads never fail: absent keys give defaults and malformed content is logged
//! and treated as absent. Writes never fail either; a rejected write is logged
//! and reported through [`SaveOutcome`] while the caller's in-memory state stays
//! authoritative for the session.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, warn};

use super::{KeyValueStore, THEME_KEY, TODOS_KEY};
use crate::domain::prefs::{Preferences, Theme};
use crate::domain::todo::{Priority, Todo, TodoId, format_due_date, parse_due_date};
use crate::error::StorageError;

/// On-disk shape of one task, as written under [`TODOS_KEY`].
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredTodo {
    id: TodoId,
    text: String,
    #[serde(default)]
    completed: bool,
    priority: String,
    #[serde(default)]
    due_date: Option<String>,
}

#[derive(Error, Debug)]
enum RecordError {
    #[error("text is blank")]
    BlankText,
}

impl From<&Todo> for StoredTodo {
    fn from(todo: &Todo) -> Self {
        Self {
            id: todo.id,
            text: todo.text.clone(),
            completed: todo.completed,
            priority: todo.priority.as_str().to_owned(),
            due_date: todo.due_date.map(format_due_date),
        }
    }
}

impl StoredTodo {
    fn into_todo(self) -> Result<Todo, RecordError> {
        let text = self.text.trim();
        if text.is_empty() {
            return Err(RecordError::BlankText);
        }
        let priority = Priority::parse(&self.priority);
        if let Priority::Unrecognized(raw) = &priority {
            debug!(id = self.id, priority = %raw, "keeping unrecognized priority");
        }
        let due_date = match self.due_date.as_deref().map(parse_due_date) {
            None => None,
            Some(Ok(date)) => date,
            Some(Err(error)) => {
                warn!(id = self.id, %error, "dropping unparseable due date");
                None
            }
        };
        Ok(Todo {
            id: self.id,
            text: text.to_owned(),
            completed: self.completed,
            priority,
            due_date,
        })
    }
}

#[derive(Debug)]
pub enum SaveOutcome {
    Saved,
    /// At least one key could not be written; the rest were.
    Degraded { failed_keys: Vec<&'static str> },
}

impl SaveOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, SaveOutcome::Saved)
    }

    pub fn failed_keys(&self) -> &[&'static str] {
        match self {
            SaveOutcome::Saved => &[],
            SaveOutcome::Degraded { failed_keys } => failed_keys,
        }
    }
}

pub fn load<S: KeyValueStore + ?Sized>(storage: &S) -> (Vec<Todo>, Preferences) {
    let todos = read_key(storage, TODOS_KEY)
        .map(|raw| decode_todos(&raw))
        .unwrap_or_default();
    let theme = read_key(storage, THEME_KEY)
        .and_then(|raw| {
            let theme = Theme::parse(&raw);
            if theme.is_none() {
                warn!(value = %raw, "ignoring unrecognized stored theme");
            }
            theme
        })
        .unwrap_or_default();
    debug!(count = todos.len(), theme = theme.as_str(), "loaded state");
    (todos, Preferences { theme })
}

pub fn save<S: KeyValueStore + ?Sized>(
    storage: &mut S,
    todos: &[Todo],
    prefs: &Preferences,
) -> SaveOutcome {
    let mut failed_keys = Vec::new();

    let write_todos = encode_todos(todos)
        .map_err(StorageError::from)
        .and_then(|json| storage.set(TODOS_KEY, &json));
    if let Err(error) = write_todos {
        error!(%error, key = TODOS_KEY, "failed to save todos");
        failed_keys.push(TODOS_KEY);
    }

    if let Err(error) = storage.set(THEME_KEY, prefs.theme.as_str()) {
        error!(%error, key = THEME_KEY, "failed to save theme");
        failed_keys.push(THEME_KEY);
    }

    if failed_keys.is_empty() {
        SaveOutcome::Saved
    } else {
        SaveOutcome::Degraded { failed_keys }
    }
}

fn read_key<S: KeyValueStore + ?Sized>(storage: &S, key: &str) -> Option<String> {
    match storage.get(key) {
        Ok(value) => value,
        Err(error) => {
            warn!(%error, key, "failed to read key; using default");
            None
        }
    }
}

fn encode_todos(todos: &[Todo]) -> serde_json::Result<String> {
    let stored: Vec<StoredTodo> = todos.iter().map(StoredTodo::from).collect();
    serde_json::to_string(&stored)
}

/// Validate stored JSON into tasks record by record. Records that fail are
/// skipped with a warning; a later record reusing an id is dropped.
fn decode_todos(raw: &str) -> Vec<Todo> {
    let values = match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Array(values)) => values,
        Ok(serde_json::Value::Null) => return Vec::new(),
        Ok(other) => {
            warn!(kind = json_kind(&other), "stored todos is not an array; starting empty");
            return Vec::new();
        }
        Err(error) => {
            warn!(%error, "stored todos is not valid JSON; starting empty");
            return Vec::new();
        }
    };

    let mut seen = HashSet::new();
    let mut todos = Vec::with_capacity(values.len());
    for (index, value) in values.into_iter().enumerate() {
        let stored = match serde_json::from_value::<StoredTodo>(value) {
            Ok(stored) => stored,
            Err(error) => {
                warn!(index, %error, "skipping malformed todo record");
                continue;
            }
        };
        let id = stored.id;
        match stored.into_todo() {
            Ok(todo) if seen.insert(todo.id) => todos.push(todo),
            Ok(_) => warn!(index, id, "skipping todo with duplicate id"),
            Err(error) => warn!(index, id, %error, "skipping invalid todo record"),
        }
    }
    todos
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
