use time::{Date, OffsetDateTime};

use crate::domain::prefs::Theme;
use crate::domain::todo::{Priority, Todo, TodoId, TodoPatch, format_due_date, parse_due_date};
use crate::repo::KeyValueStore;
use crate::store::TaskStore;
use crate::usecase::confirm::DeleteConfirm;
use crate::usecase::edit::EditSlot;
use crate::usecase::view::ViewQuery;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Adding,
    Editing,
    Searching,
    SettingDue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    List,
    Dashboard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormField {
    #[default]
    Text,
    DueDate,
}

/// The "add a task" form. Priority carries over between adds; text and due
/// date reset after each one.
#[derive(Debug, Clone, Default)]
pub struct NewTodoForm {
    pub text: String,
    pub priority: Priority,
    pub due: String,
    pub field: FormField,
}

impl NewTodoForm {
    fn focused_mut(&mut self) -> &mut String {
        match self.field {
            FormField::Text => &mut self.text,
            FormField::DueDate => &mut self.due,
        }
    }
}

/// Everything the UI needs between events. Only the store's contents and the
/// theme outlive the process.
pub struct App<S: KeyValueStore> {
    store: TaskStore<S>,
    pub query: ViewQuery,
    pub page: Page,
    pub mode: InputMode,
    pub form: NewTodoForm,
    pub edit: EditSlot,
    pub delete: DeleteConfirm,
    pub due_input: String,
    pub selected: usize,
    pub status: Option<String>,
}

impl<S: KeyValueStore> App<S> {
    pub fn new(store: TaskStore<S>) -> Self {
        Self {
            store,
            query: ViewQuery::default(),
            page: Page::default(),
            mode: InputMode::Normal,
            form: NewTodoForm::default(),
            edit: EditSlot::default(),
            delete: DeleteConfirm::default(),
            due_input: String::new(),
            selected: 0,
            status: None,
        }
    }

    pub fn store(&self) -> &TaskStore<S> {
        &self.store
    }

    pub fn theme(&self) -> Theme {
        self.store.preferences().theme
    }

    pub fn visible(&self) -> Vec<&Todo> {
        self.store.view(&self.query)
    }

    pub fn today() -> Date {
        OffsetDateTime::now_utc().date()
    }

    fn selected_id(&self) -> Option<TodoId> {
        self.visible().get(self.selected).map(|t| t.id)
    }

    fn clamp_selection(&mut self) {
        let len = self.visible().len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    pub fn select_next(&mut self) {
        let len = self.visible().len();
        if len > 0 {
            self.selected = (self.selected + 1).min(len - 1);
        }
    }

    pub fn select_previous(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        }
    }

    pub fn toggle_page(&mut self) {
        self.page = match self.page {
            Page::List => Page::Dashboard,
            Page::Dashboard => Page::List,
        };
    }

    pub fn toggle_theme(&mut self) {
        let theme = self.store.toggle_theme();
        self.after_write(&format!("Theme: {}", theme.as_str()));
    }

    pub fn cycle_filter(&mut self) {
        self.query.filter = self.query.filter.next();
        self.clamp_selection();
        self.set_status(&format!("Filter: {}", self.query.filter.label()));
    }

    pub fn cycle_sort(&mut self) {
        self.query.sort = self.query.sort.next();
        self.set_status(&format!("Sort: {}", self.query.sort.label()));
    }

    pub fn begin_search(&mut self) {
        self.mode = InputMode::Searching;
        self.set_status("Type to search; Enter keeps, Esc clears");
    }

    pub fn search_push(&mut self, c: char) {
        self.query.search.push(c);
        self.selected = 0;
    }

    pub fn search_pop(&mut self) {
        self.query.search.pop();
        self.selected = 0;
    }

    pub fn end_search(&mut self, keep: bool) {
        if !keep {
            self.query.search.clear();
        }
        self.mode = InputMode::Normal;
        self.clamp_selection();
    }

    pub fn begin_add(&mut self) {
        self.mode = InputMode::Adding;
        self.form.text.clear();
        self.form.due.clear();
        self.form.field = FormField::Text;
        self.set_status("Type new task; Tab due date, Up/Down priority, Enter add");
    }

    pub fn form_push(&mut self, c: char) {
        self.form.focused_mut().push(c);
    }

    pub fn form_pop(&mut self) {
        self.form.focused_mut().pop();
    }

    pub fn form_next_field(&mut self) {
        self.form.field = match self.form.field {
            FormField::Text => FormField::DueDate,
            FormField::DueDate => FormField::Text,
        };
    }

    pub fn form_cycle_priority(&mut self, forward: bool) {
        self.form.priority = if forward {
            self.form.priority.next()
        } else {
            self.form.priority.prev()
        };
    }

    pub fn add_todo(&mut self) {
        if self.form.text.trim().is_empty() {
            self.set_status("Cannot add an empty task");
            return;
        }
        let due = match parse_due_date(&self.form.due) {
            Ok(due) => due,
            Err(_) => {
                self.set_status("Due date must be YYYY-MM-DD");
                return;
            }
        };
        let Some(todo) = self.store.create(&self.form.text, self.form.priority.clone(), due) else {
            return;
        };
        self.form.text.clear();
        self.form.due.clear();
        self.mode = InputMode::Normal;
        if let Some(pos) = self.visible().iter().position(|t| t.id == todo.id) {
            self.selected = pos;
        }
        self.after_write("Added");
    }

    pub fn cancel_input(&mut self) {
        self.mode = InputMode::Normal;
        self.set_status("Canceled");
    }

    pub fn toggle_selected(&mut self) {
        if let Some(id) = self.selected_id() {
            self.store.toggle_completion(id);
            self.clamp_selection();
            self.after_write("Toggled completion");
        }
    }

    pub fn cycle_priority_selected(&mut self) {
        let Some(id) = self.selected_id() else {
            return;
        };
        let Some(priority) = self.store.get(id).map(|t| t.priority.next()) else {
            return;
        };
        let msg = format!("Priority: {priority}");
        self.store.update(id, TodoPatch::priority(priority));
        self.follow(id);
        self.after_write(&msg);
    }

    pub fn begin_edit_selected(&mut self) {
        if let Some(id) = self.selected_id()
            && self.edit.begin(&self.store, id)
        {
            self.mode = InputMode::Editing;
            self.set_status("Editing; Enter saves, Del clears, Esc cancels");
        }
    }

    pub fn commit_edit(&mut self) {
        self.mode = InputMode::Normal;
        match self.edit.commit(&mut self.store) {
            Some(todo) => {
                self.follow(todo.id);
                self.after_write("Saved");
            }
            None => self.set_status("Edit discarded"),
        }
    }

    pub fn cancel_edit(&mut self) {
        self.edit.cancel();
        self.cancel_input();
    }

    pub fn begin_due_selected(&mut self) {
        let Some(due) = self
            .selected_id()
            .and_then(|id| self.store.get(id))
            .map(|t| t.due_date)
        else {
            return;
        };
        self.due_input = due.map(format_due_date).unwrap_or_default();
        self.mode = InputMode::SettingDue;
        self.set_status("Due date YYYY-MM-DD (empty clears); Enter saves");
    }

    pub fn commit_due(&mut self) {
        let Some(id) = self.selected_id() else {
            self.mode = InputMode::Normal;
            return;
        };
        match parse_due_date(&self.due_input) {
            Ok(due) => {
                self.store.update(id, TodoPatch::due_date(due));
                self.mode = InputMode::Normal;
                self.due_input.clear();
                self.follow(id);
                self.after_write("Due date updated");
            }
            Err(_) => self.set_status("Due date must be YYYY-MM-DD"),
        }
    }

    pub fn request_delete_selected(&mut self) {
        if let Some(id) = self.selected_id() {
            self.delete.request(id);
            self.set_status("Delete this task? y/n");
        }
    }

    pub fn confirm_delete(&mut self) {
        if self.delete.confirm(&mut self.store).is_some() {
            self.clamp_selection();
            self.after_write("Deleted");
        }
    }

    pub fn cancel_delete(&mut self) {
        self.delete.cancel();
        self.set_status("Delete canceled");
    }

    pub fn clear_completed(&mut self) {
        let removed = self.store.clear_completed();
        self.clamp_selection();
        if removed > 0 {
            self.after_write(&format!("Cleared {removed} completed"));
        } else {
            self.set_status("No completed items");
        }
    }

    pub fn set_status(&mut self, msg: &str) {
        self.status = Some(msg.to_string());
    }

    /// Keep the selection on `id` after a change that may have re-sorted it.
    fn follow(&mut self, id: TodoId) {
        match self.visible().iter().position(|t| t.id == id) {
            Some(pos) => self.selected = pos,
            None => self.clamp_selection(),
        }
    }

    fn after_write(&mut self, msg: &str) {
        let failed = self
            .store
            .last_save()
            .filter(|outcome| !outcome.is_saved())
            .map(|outcome| outcome.failed_keys().join(", "));
        match failed {
            Some(keys) => self.set_status(&format!("{msg} (not saved to disk: {keys})")),
            None => self.set_status(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::memory::InMemoryKvStore;
    use crate::usecase::view::{Filter, SortKey};

    fn app() -> App<InMemoryKvStore> {
        App::new(TaskStore::open(InMemoryKvStore::default()))
    }

    fn add(app: &mut App<InMemoryKvStore>, text: &str, priority: Priority, due: &str) {
        app.begin_add();
        app.form.priority = priority;
        for c in text.chars() {
            app.form_push(c);
        }
        app.form_next_field();
        for c in due.chars() {
            app.form_push(c);
        }
        app.add_todo();
    }

    fn texts(app: &App<InMemoryKvStore>) -> Vec<String> {
        app.visible().iter().map(|t| t.text.clone()).collect()
    }

    #[test]
    fn add_through_form_selects_new_task() {
        let mut app = app();
        add(&mut app, "later", Priority::Low, "");
        add(&mut app, "sooner", Priority::Low, "2024-01-01");

        assert_eq!(app.mode, InputMode::Normal);
        assert_eq!(texts(&app), vec!["sooner", "later"]);
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn bad_due_date_keeps_form_open() {
        let mut app = app();
        add(&mut app, "x", Priority::Low, "next week");
        assert_eq!(app.mode, InputMode::Adding);
        assert!(app.store().todos().is_empty());
        assert_eq!(app.form.text, "x");
    }

    #[test]
    fn empty_add_is_rejected() {
        let mut app = app();
        add(&mut app, "   ", Priority::Low, "");
        assert!(app.store().todos().is_empty());
        assert_eq!(app.status.as_deref(), Some("Cannot add an empty task"));
    }

    #[test]
    fn delete_requires_confirmation() {
        let mut app = app();
        add(&mut app, "a", Priority::Low, "");

        app.request_delete_selected();
        app.cancel_delete();
        assert_eq!(app.store().todos().len(), 1);

        app.request_delete_selected();
        app.confirm_delete();
        assert!(app.store().todos().is_empty());
        assert_eq!(app.delete, DeleteConfirm::Idle);
    }

    #[test]
    fn edit_selected_renames_task() {
        let mut app = app();
        add(&mut app, "typo", Priority::Low, "");
        app.begin_edit_selected();
        assert_eq!(app.mode, InputMode::Editing);
        app.edit.change("fixed");
        app.commit_edit();
        assert_eq!(texts(&app), vec!["fixed"]);
    }

    #[test]
    fn filter_and_search_drive_visible_list() {
        let mut app = app();
        add(&mut app, "alpha", Priority::Low, "");
        add(&mut app, "beta", Priority::Low, "");
        app.selected = 0;
        app.toggle_selected();

        app.query.filter = Filter::Completed;
        assert_eq!(texts(&app), vec!["alpha"]);

        app.query.filter = Filter::All;
        app.begin_search();
        app.search_push('E');
        assert_eq!(texts(&app), vec!["beta"]);
        app.end_search(false);
        assert_eq!(app.visible().len(), 2);
    }

    #[test]
    fn cycling_priority_follows_task_when_sorted() {
        let mut app = app();
        add(&mut app, "one", Priority::Medium, "");
        add(&mut app, "two", Priority::Low, "");
        app.query.sort = SortKey::Priority;
        app.selected = 1;

        // Low -> High moves it first; High -> Medium ties and falls back to input order.
        app.cycle_priority_selected();
        assert_eq!(texts(&app), vec!["two", "one"]);
        assert_eq!(app.selected, 0);
        app.cycle_priority_selected();
        assert_eq!(texts(&app), vec!["one", "two"]);
        assert_eq!(app.selected, 1);
    }

    #[test]
    fn due_date_can_be_set_and_cleared() {
        let mut app = app();
        add(&mut app, "a", Priority::Low, "");
        app.begin_due_selected();
        app.due_input = "2030-02-01".into();
        app.commit_due();
        assert!(app.store().todos()[0].due_date.is_some());

        app.begin_due_selected();
        assert_eq!(app.due_input, "2030-02-01");
        app.due_input.clear();
        app.commit_due();
        assert!(app.store().todos()[0].due_date.is_none());
    }

    #[test]
    fn degraded_write_is_surfaced_in_status() {
        let mut app = App::new(TaskStore::open(InMemoryKvStore::with_quota(24)));
        add(&mut app, "this will not fit in storage", Priority::Low, "");
        assert_eq!(app.store().todos().len(), 1);
        assert!(app.status.as_deref().unwrap().contains("not saved to disk"));
    }

    #[test]
    fn theme_and_page_toggle() {
        let mut app = app();
        app.toggle_theme();
        assert_eq!(app.theme(), Theme::Dark);
        app.toggle_page();
        assert_eq!(app.page, Page::Dashboard);
    }
}
