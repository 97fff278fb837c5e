use crate::error::Result;

pub mod memory;
pub mod persist;
pub mod sqlite;

pub const TODOS_KEY: &str = "todos";
pub const THEME_KEY: &str = "theme";

/// Durable string key-value storage the persistence adapter writes through.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
}
