use std::collections::HashMap;

use super::KeyValueStore;
use crate::error::{Result, StorageError};

/// Process-local storage. With a quota set, writes that would push the total
/// stored bytes past it fail the way a full browser storage area does.
#[derive(Debug, Default)]
pub struct InMemoryKvStore {
    items: HashMap<String, String>,
    quota: Option<usize>,
}

impl InMemoryKvStore {
    #[cfg(test)]
    pub fn with_seed<K, V>(seed: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let mut store = Self::default();
        store
            .items
            .extend(seed.into_iter().map(|(k, v)| (k.into(), v.into())));
        store
    }

    #[cfg(test)]
    pub fn with_quota(quota: usize) -> Self {
        Self {
            items: HashMap::new(),
            quota: Some(quota),
        }
    }

    fn used_bytes_without(&self, key: &str) -> usize {
        self.items
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl KeyValueStore for InMemoryKvStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        if let Some(limit) = self.quota {
            let needed = self.used_bytes_without(key) + key.len() + value.len();
            if needed > limit {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_owned(),
                    needed,
                    limit,
                });
            }
        }
        self.items.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_missing_key_is_none() {
        let store = InMemoryKvStore::default();
        assert_eq!(store.get("todos").unwrap(), None);
    }

    #[test]
    fn set_overwrites_previous_value() {
        let mut store = InMemoryKvStore::with_seed([("theme", "light")]);
        store.set("theme", "dark").unwrap();
        assert_eq!(store.get("theme").unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn quota_rejects_oversized_write_and_keeps_old_value() {
        let mut store = InMemoryKvStore::with_quota(16);
        store.set("k", "short").unwrap();

        let err = store.set("k", "this value is far too long").unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { limit: 16, .. }));
        assert_eq!(store.get("k").unwrap().as_deref(), Some("short"));
    }

    #[test]
    fn quota_counts_replaced_value_once() {
        let mut store = InMemoryKvStore::with_quota(10);
        store.set("k", "123456789").unwrap();
        store.set("k", "987654321").unwrap();
    }
}
