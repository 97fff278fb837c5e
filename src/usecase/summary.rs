use crate::domain::todo::{Priority, Todo};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Summary {
    pub total: usize,
    pub completed: usize,
    pub active: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub completed_pct: f64,
    pub active_pct: f64,
    pub high_pct: f64,
    pub medium_pct: f64,
    pub low_pct: f64,
}

impl Summary {
    pub fn priority_count(&self, priority: &Priority) -> (usize, f64) {
        match priority {
            Priority::High => (self.high, self.high_pct),
            Priority::Medium => (self.medium, self.medium_pct),
            Priority::Low => (self.low, self.low_pct),
            Priority::Unrecognized(_) => (0, 0.0),
        }
    }
}

pub fn summarize(todos: &[Todo]) -> Summary {
    let total = todos.len();
    let completed = todos.iter().filter(|t| t.completed).count();
    let count = |p: Priority| todos.iter().filter(|t| t.priority == p).count();
    let (high, medium, low) = (
        count(Priority::High),
        count(Priority::Medium),
        count(Priority::Low),
    );
    let active = total - completed;

    Summary {
        total,
        completed,
        active,
        high,
        medium,
        low,
        completed_pct: percent(completed, total),
        active_pct: percent(active, total),
        high_pct: percent(high, total),
        medium_pct: percent(medium, total),
        low_pct: percent(low, total),
    }
}

/// `0.0` for an empty collection.
fn percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    count as f64 / total as f64 * 100.0
}
