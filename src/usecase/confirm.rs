use crate::domain::todo::{Todo, TodoId};
use crate::repo::KeyValueStore;
use crate::store::TaskStore;

/// Two-step guard in front of [`TaskStore::remove`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeleteConfirm {
    #[default]
    Idle,
    Pending(TodoId),
}

impl DeleteConfirm {
    /// A request while one is already pending replaces it.
    pub fn request(&mut self, id: TodoId) {
        *self = DeleteConfirm::Pending(id);
    }

    pub fn pending(&self) -> Option<TodoId> {
        match self {
            DeleteConfirm::Idle => None,
            DeleteConfirm::Pending(id) => Some(*id),
        }
    }

    pub fn confirm<S: KeyValueStore>(&mut self, store: &mut TaskStore<S>) -> Option<Todo> {
        let id = self.pending()?;
        *self = DeleteConfirm::Idle;
        store.remove(id)
    }

    pub fn cancel(&mut self) {
        *self = DeleteConfirm::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::todo::Priority;
    use crate::repo::memory::InMemoryKvStore;

    fn store_with(texts: &[&str]) -> (TaskStore<InMemoryKvStore>, Vec<TodoId>) {
        let mut store = TaskStore::open(InMemoryKvStore::default());
        let ids = texts
            .iter()
            .filter_map(|text| store.create(text, Priority::Medium, None))
            .map(|t| t.id)
            .collect();
        (store, ids)
    }

    #[test]
    fn confirm_removes_pending_and_returns_to_idle() {
        let (mut store, ids) = store_with(&["a"]);
        let mut confirm = DeleteConfirm::default();

        confirm.request(ids[0]);
        assert_eq!(confirm.pending(), Some(ids[0]));
        assert_eq!(confirm.confirm(&mut store).map(|t| t.id), Some(ids[0]));
        assert_eq!(confirm, DeleteConfirm::Idle);
        assert!(store.todos().is_empty());
    }

    #[test]
    fn cancel_leaves_store_untouched() {
        let (mut store, ids) = store_with(&["a"]);
        let mut confirm = DeleteConfirm::default();

        confirm.request(ids[0]);
        confirm.cancel();
        assert_eq!(confirm, DeleteConfirm::Idle);
        assert!(confirm.confirm(&mut store).is_none());
        assert_eq!(store.todos().len(), 1);
    }

    #[test]
    fn latest_request_wins() {
        let (mut store, ids) = store_with(&["a", "b"]);
        let mut confirm = DeleteConfirm::default();

        confirm.request(ids[0]);
        confirm.request(ids[1]);
        confirm.confirm(&mut store);

        let left: Vec<TodoId> = store.todos().iter().map(|t| t.id).collect();
        assert_eq!(left, vec![ids[0]]);
    }
}
