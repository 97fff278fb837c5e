pub mod prefs;
pub mod todo;
