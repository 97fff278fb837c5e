use crate::domain::todo::{Todo, TodoId, TodoPatch};
use crate::repo::KeyValueStore;
use crate::store::TaskStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    pub id: TodoId,
    pub buffer: String,
}

/// Single-slot edit-in-place state; `None` means nothing is being edited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditSlot(Option<EditSession>);

impl EditSlot {
    /// Start editing `id` with its current text. Replaces any edit in progress;
    /// does nothing for an unknown id.
    pub fn begin<S: KeyValueStore>(&mut self, store: &TaskStore<S>, id: TodoId) -> bool {
        let Some(todo) = store.get(id) else {
            return false;
        };
        self.0 = Some(EditSession {
            id,
            buffer: todo.text.clone(),
        });
        true
    }

    pub fn session(&self) -> Option<&EditSession> {
        self.0.as_ref()
    }

    pub fn is_editing(&self, id: TodoId) -> bool {
        self.0.as_ref().is_some_and(|s| s.id == id)
    }

    pub fn change(&mut self, text: impl Into<String>) {
        if let Some(session) = self.0.as_mut() {
            session.buffer = text.into();
        }
    }

    pub fn push(&mut self, c: char) {
        if let Some(session) = self.0.as_mut() {
            session.buffer.push(c);
        }
    }

    pub fn pop(&mut self) {
        if let Some(session) = self.0.as_mut() {
            session.buffer.pop();
        }
    }

    /// Save the buffer and leave edit mode. A blank buffer is discarded rather
    /// than saved; edit mode ends either way.
    pub fn commit<S: KeyValueStore>(&mut self, store: &mut TaskStore<S>) -> Option<Todo> {
        let session = self.0.take()?;
        if session.buffer.trim().is_empty() {
            return None;
        }
        store.update(session.id, TodoPatch::text(session.buffer))
    }

    pub fn cancel(&mut self) {
        self.0 = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::todo::Priority;
    use crate::repo::memory::InMemoryKvStore;

    fn store_with_one() -> (TaskStore<InMemoryKvStore>, TodoId) {
        let mut store = TaskStore::open(InMemoryKvStore::default());
        let id = store.create("draft", Priority::Medium, None).unwrap().id;
        (store, id)
    }

    #[test]
    fn begin_captures_text() {
        let (store, id) = store_with_one();
        let mut slot = EditSlot::default();
        assert!(slot.begin(&store, id));
        assert!(slot.is_editing(id));
        assert_eq!(slot.session().unwrap().buffer, "draft");
    }

    #[test]
    fn begin_unknown_id_stays_idle() {
        let (store, _) = store_with_one();
        let mut slot = EditSlot::default();
        assert!(!slot.begin(&store, 404));
        assert!(slot.session().is_none());
    }

    #[test]
    fn change_does_not_touch_store_until_commit() {
        let (mut store, id) = store_with_one();
        let mut slot = EditSlot::default();
        slot.begin(&store, id);
        slot.change("  renamed ");
        assert_eq!(store.get(id).unwrap().text, "draft");

        let saved = slot.commit(&mut store).unwrap();
        assert_eq!(saved.text, "renamed");
        assert!(slot.session().is_none());
    }

    #[test]
    fn blank_commit_is_discarded_and_exits_edit_mode() {
        let (mut store, id) = store_with_one();
        let mut slot = EditSlot::default();
        slot.begin(&store, id);
        slot.change("   ");

        assert!(slot.commit(&mut store).is_none());
        assert!(slot.session().is_none());
        assert_eq!(store.get(id).unwrap().text, "draft");
    }

    #[test]
    fn push_pop_edit_buffer() {
        let (mut store, id) = store_with_one();
        let mut slot = EditSlot::default();
        slot.begin(&store, id);
        slot.pop();
        slot.push('s');
        slot.commit(&mut store);
        assert_eq!(store.get(id).unwrap().text, "drafs");
    }

    #[test]
    fn cancel_discards_buffer() {
        let (mut store, id) = store_with_one();
        let mut slot = EditSlot::default();
        slot.begin(&store, id);
        slot.change("never saved");
        slot.cancel();
        assert!(slot.commit(&mut store).is_none());
        assert_eq!(store.get(id).unwrap().text, "draft");
    }
}
