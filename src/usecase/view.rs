use std::cmp::Ordering;

use crate::domain::todo::Todo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Filter {
    #[default]
    All,
    Active,
    Completed,
}

impl Filter {
    pub fn matches(self, todo: &Todo) -> bool {
        match self {
            Filter::All => true,
            Filter::Active => !todo.completed,
            Filter::Completed => todo.completed,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Filter::All => "All",
            Filter::Active => "Active",
            Filter::Completed => "Completed",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Filter::All => Filter::Active,
            Filter::Active => Filter::Completed,
            Filter::Completed => Filter::All,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    DueDate,
    Priority,
}

impl SortKey {
    pub fn label(self) -> &'static str {
        match self {
            SortKey::DueDate => "Due Date",
            SortKey::Priority => "Priority",
        }
    }

    pub fn next(self) -> Self {
        match self {
            SortKey::DueDate => SortKey::Priority,
            SortKey::Priority => SortKey::DueDate,
        }
    }

    fn compare(self, a: &Todo, b: &Todo) -> Ordering {
        match self {
            // `None` must sort after every date, so compare "has no date" first.
            SortKey::DueDate => (a.due_date.is_none(), a.due_date)
                .cmp(&(b.due_date.is_none(), b.due_date)),
            SortKey::Priority => b.priority.weight().cmp(&a.priority.weight()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewQuery {
    pub filter: Filter,
    pub search: String,
    pub sort: SortKey,
}

/// Filter, then search, then stably sort. The collection itself is untouched.
pub fn build_view<'a>(todos: &'a [Todo], query: &ViewQuery) -> Vec<&'a Todo> {
    let needle = query.search.to_lowercase();
    let mut view: Vec<&Todo> = todos
        .iter()
        .filter(|todo| query.filter.matches(todo))
        .filter(|todo| needle.is_empty() || todo.text.to_lowercase().contains(&needle))
        .collect();
    view.sort_by(|a, b| query.sort.compare(a, b));
    view
}
