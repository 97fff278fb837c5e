use std::fmt;

use time::Date;
use time::macros::format_description;

pub type TodoId = u64;

const DUE_DATE_FORMAT: &[time::format_description::BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

/// Task priority. `Unrecognized` carries a stored label this build does not
/// know so it is written back unchanged instead of being replaced.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
    Unrecognized(String),
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    /// Sort weight; larger sorts first. Unrecognized labels sort last.
    pub fn weight(&self) -> u8 {
        match self {
            Priority::High => 3,
            Priority::Medium => 2,
            Priority::Low => 1,
            Priority::Unrecognized(_) => 0,
        }
    }

    /// Stored form: the canonical name, or the raw label for unknown values.
    pub fn as_str(&self) -> &str {
        match self {
            Priority::Unrecognized(raw) => raw,
            known => known.label(),
        }
    }

    /// Display form.
    pub fn label(&self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
            Priority::Unrecognized(_) => "Uncategorized",
        }
    }

    pub fn parse(raw: &str) -> Self {
        match raw {
            "High" => Priority::High,
            "Medium" => Priority::Medium,
            "Low" => Priority::Low,
            other => Priority::Unrecognized(other.to_owned()),
        }
    }

    /// High -> Medium -> Low -> High. An unrecognized label moves to High.
    pub fn next(&self) -> Self {
        match self {
            Priority::High => Priority::Medium,
            Priority::Medium => Priority::Low,
            Priority::Low | Priority::Unrecognized(_) => Priority::High,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            Priority::High => Priority::Low,
            Priority::Medium => Priority::High,
            Priority::Low => Priority::Medium,
            Priority::Unrecognized(_) => Priority::Low,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Todo {
    pub id: TodoId,
    pub text: String,
    pub completed: bool,
    pub priority: Priority,
    pub due_date: Option<Date>,
}

impl Todo {
    #[cfg(test)]
    pub fn new(id: TodoId, text: impl Into<String>) -> Self {
        Self::with_meta(id, text, Priority::default(), None)
    }

    pub fn with_meta(
        id: TodoId,
        text: impl Into<String>,
        priority: Priority,
        due_date: Option<Date>,
    ) -> Self {
        Self {
            id,
            text: text.into(),
            completed: false,
            priority,
            due_date,
        }
    }

    pub fn is_overdue(&self, today: Date) -> bool {
        !self.completed && self.due_date.is_some_and(|due| due < today)
    }
}

/// Partial change applied by [`crate::store::TaskStore::update`].
///
/// `due_date` is doubly optional: `None` leaves the date alone,
/// `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoPatch {
    pub text: Option<String>,
    pub priority: Option<Priority>,
    pub due_date: Option<Option<Date>>,
}

impl TodoPatch {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn priority(priority: Priority) -> Self {
        Self {
            priority: Some(priority),
            ..Self::default()
        }
    }

    pub fn due_date(due_date: Option<Date>) -> Self {
        Self {
            due_date: Some(due_date),
            ..Self::default()
        }
    }
}

/// Parse a `YYYY-MM-DD` due date. Blank input means "no deadline".
pub fn parse_due_date(raw: &str) -> Result<Option<Date>, time::error::Parse> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    Date::parse(raw, DUE_DATE_FORMAT).map(Some)
}

pub fn format_due_date(date: Date) -> String {
    date.format(DUE_DATE_FORMAT)
        .unwrap_or_else(|_| date.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn priority_weights_order_high_first() {
        assert!(Priority::High.weight() > Priority::Medium.weight());
        assert!(Priority::Medium.weight() > Priority::Low.weight());
    }

    #[test]
    fn priority_cycles_through_all_values() {
        let mut p = Priority::High;
        for _ in 0..3 {
            p = p.next();
        }
        assert_eq!(p, Priority::High);
        assert_eq!(Priority::Low.prev(), Priority::Medium);
    }

    #[test]
    fn unrecognized_priority_keeps_raw_label() {
        let p = Priority::parse("Urgent");
        assert_eq!(p, Priority::Unrecognized("Urgent".to_owned()));
        assert_eq!(p.as_str(), "Urgent");
        assert_eq!(p.label(), "Uncategorized");
        assert_eq!(p.to_string(), "Uncategorized");
        assert_eq!(p.weight(), 0);
        assert_eq!(p.next(), Priority::High);
        assert_eq!(Priority::parse("Low"), Priority::Low);
    }

    #[test]
    fn due_date_parses_iso_and_blank() {
        assert_eq!(parse_due_date("2024-03-09").unwrap(), Some(date!(2024 - 03 - 09)));
        assert_eq!(parse_due_date("   ").unwrap(), None);
        assert!(parse_due_date("03/09/2024").is_err());
        assert!(parse_due_date("2024-02-30").is_err());
    }

    #[test]
    fn due_date_formats_zero_padded() {
        assert_eq!(format_due_date(date!(2024 - 03 - 09)), "2024-03-09");
    }

    #[test]
    fn overdue_ignores_completed_and_undated() {
        let today = date!(2024 - 05 - 10);
        let mut todo = Todo::with_meta(1, "ship", Priority::High, Some(date!(2024 - 05 - 09)));
        assert!(todo.is_overdue(today));
        todo.completed = true;
        assert!(!todo.is_overdue(today));
        assert!(!Todo::new(2, "someday").is_overdue(today));
    }
}
