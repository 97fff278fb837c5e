pub mod confirm;
pub mod edit;
pub mod summary;
pub mod view;
