mod dashboard;
mod palette;

use std::io::{Stdout, stdout};
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};
use time::Date;

use crate::app::{App, FormField, InputMode, Page};
use crate::domain::todo::{Todo, format_due_date};
use crate::repo::KeyValueStore;
use crate::usecase::edit::EditSlot;
use palette::Palette;

pub fn run<S: KeyValueStore>(mut app: App<S>, tick_rate: Duration) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut last_tick = Instant::now();
    let res = loop {
        terminal.draw(|f| draw(f, &app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
            && handle_key(&mut app, key.code)
        {
            break Ok(());
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }
    };

    cleanup_terminal(&mut terminal)?;
    res
}

/// Returns `true` when the app should quit.
fn handle_key<S: KeyValueStore>(app: &mut App<S>, code: KeyCode) -> bool {
    if app.delete.pending().is_some() {
        match code {
            KeyCode::Char('y') | KeyCode::Enter => app.confirm_delete(),
            KeyCode::Char('n') | KeyCode::Esc => app.cancel_delete(),
            _ => {}
        }
        return false;
    }

    match app.mode {
        InputMode::Normal => return handle_normal(app, code),
        InputMode::Adding => match code {
            KeyCode::Esc => app.cancel_input(),
            KeyCode::Enter => app.add_todo(),
            KeyCode::Tab => app.form_next_field(),
            KeyCode::Up => app.form_cycle_priority(false),
            KeyCode::Down => app.form_cycle_priority(true),
            KeyCode::Backspace => app.form_pop(),
            KeyCode::Char(c) => app.form_push(c),
            _ => {}
        },
        InputMode::Editing => match code {
            KeyCode::Esc => app.cancel_edit(),
            KeyCode::Enter => app.commit_edit(),
            KeyCode::Backspace => app.edit.pop(),
            KeyCode::Delete => app.edit.change(String::new()),
            KeyCode::Char(c) => app.edit.push(c),
            _ => {}
        },
        InputMode::Searching => match code {
            KeyCode::Esc => app.end_search(false),
            KeyCode::Enter => app.end_search(true),
            KeyCode::Backspace => app.search_pop(),
            KeyCode::Char(c) => app.search_push(c),
            _ => {}
        },
        InputMode::SettingDue => match code {
            KeyCode::Esc => app.cancel_input(),
            KeyCode::Enter => app.commit_due(),
            KeyCode::Backspace => {
                app.due_input.pop();
            }
            KeyCode::Char(c) => app.due_input.push(c),
            _ => {}
        },
    }

    false
}

fn handle_normal<S: KeyValueStore>(app: &mut App<S>, code: KeyCode) -> bool {
    match code {
        KeyCode::Char('q') => return true,
        KeyCode::Tab => app.toggle_page(),
        KeyCode::Char('t') => app.toggle_theme(),
        _ if app.page == Page::Dashboard => {}
        KeyCode::Char('j') | KeyCode::Down => app.select_next(),
        KeyCode::Char('k') | KeyCode::Up => app.select_previous(),
        KeyCode::Char('a') | KeyCode::Char('n') => app.begin_add(),
        KeyCode::Enter | KeyCode::Char(' ') => app.toggle_selected(),
        KeyCode::Char('e') => app.begin_edit_selected(),
        KeyCode::Char('d') | KeyCode::Delete => app.request_delete_selected(),
        KeyCode::Char('c') => app.clear_completed(),
        KeyCode::Char('f') => app.cycle_filter(),
        KeyCode::Char('s') => app.cycle_sort(),
        KeyCode::Char('/') => app.begin_search(),
        KeyCode::Char('p') => app.cycle_priority_selected(),
        KeyCode::Char('u') => app.begin_due_selected(),
        _ => {}
    }
    false
}

fn draw<S: KeyValueStore>(f: &mut ratatui::Frame, app: &App<S>) {
    let size = f.area();
    let palette = Palette::for_theme(app.theme());
    f.render_widget(Block::default().style(palette.base), size);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(size);

    f.render_widget(render_header(app, &palette), chunks[0]);

    match app.page {
        Page::List => draw_list_page(f, app, &palette, chunks[1]),
        Page::Dashboard => dashboard::draw(f, &app.store().summary(), &palette, chunks[1]),
    }

    f.render_widget(render_footer(app, &palette), chunks[2]);

    if let Some(id) = app.delete.pending() {
        let text = app
            .store()
            .get(id)
            .map(|t| t.text.as_str())
            .unwrap_or("this task");
        draw_confirm(f, text, &palette, size);
    }
}

fn render_header<S: KeyValueStore>(app: &App<S>, palette: &Palette) -> Paragraph<'static> {
    let counts = app.store().summary();
    let summary = format!("Open: {} / All: {}", counts.active, counts.total);
    let mut spans = vec![
        Span::styled("yaru - tasks", Style::default().fg(palette.accent)),
        Span::raw("  |  "),
        Span::styled(summary, Style::default().fg(palette.warn)),
        Span::raw("  |  "),
        Span::raw(match app.page {
            Page::List => "[List] Dashboard",
            Page::Dashboard => "List [Dashboard]",
        }),
    ];
    if app.page == Page::List {
        spans.push(Span::raw("  |  "));
        spans.push(Span::styled(
            format!(
                "Filter: {}  Sort: {}",
                app.query.filter.label(),
                app.query.sort.label()
            ),
            Style::default().fg(palette.muted),
        ));
        if !app.query.search.is_empty() {
            spans.push(Span::styled(
                format!("  Search: {}", app.query.search),
                Style::default().fg(palette.muted),
            ));
        }
    }
    Paragraph::new(Line::from(spans))
        .block(Block::default().title("Overview").borders(Borders::ALL))
        .wrap(Wrap { trim: true })
}

fn draw_list_page<S: KeyValueStore>(
    f: &mut ratatui::Frame,
    app: &App<S>,
    palette: &Palette,
    area: Rect,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(area);

    f.render_widget(render_form(app, palette), chunks[0]);

    let visible = app.visible();
    if visible.is_empty() {
        let empty = Paragraph::new("No tasks found.")
            .style(Style::default().fg(palette.muted))
            .block(Block::default().title("Tasks").borders(Borders::ALL));
        f.render_widget(empty, chunks[1]);
        return;
    }

    let mut list_state = ListState::default();
    list_state.select(Some(app.selected));

    let list = render_list(
        &visible,
        app.selected,
        &app.edit,
        App::<S>::today(),
        palette,
        app.store().has_completed(),
    );
    f.render_stateful_widget(list, chunks[1], &mut list_state);
}

fn render_form<'a, S: KeyValueStore>(app: &'a App<S>, palette: &Palette) -> Paragraph<'a> {
    let adding = app.mode == InputMode::Adding;
    let field_style = |field: FormField| {
        if adding && app.form.field == field {
            Style::default().fg(palette.warn).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(palette.muted)
        }
    };
    let cursor = |field: FormField| if adding && app.form.field == field { "█" } else { "" };

    let line = Line::from(vec![
        Span::raw("Task: "),
        Span::styled(app.form.text.as_str(), field_style(FormField::Text)),
        Span::raw(cursor(FormField::Text)),
        Span::raw("   Due: "),
        Span::styled(app.form.due.as_str(), field_style(FormField::DueDate)),
        Span::raw(cursor(FormField::DueDate)),
        Span::raw("   Priority: "),
        Span::styled(
            app.form.priority.label(),
            Style::default().fg(palette.priority(&app.form.priority)),
        ),
    ]);
    let title = if adding {
        "New task (Enter add ; Tab switch field ; Up/Down priority ; Esc cancel)"
    } else {
        "New task (a)"
    };
    Paragraph::new(line).block(Block::default().title(title).borders(Borders::ALL))
}

fn render_list<'a>(
    todos: &[&'a Todo],
    selected: usize,
    edit: &'a EditSlot,
    today: Date,
    palette: &Palette,
    has_completed: bool,
) -> List<'a> {
    let items: Vec<ListItem> = todos
        .iter()
        .enumerate()
        .map(|(idx, todo)| {
            let symbol = if todo.completed { "✔" } else { "•" };
            let text = match edit.session() {
                Some(session) if edit.is_editing(todo.id) => format!("{}█", session.buffer),
                _ => todo.text.clone(),
            };
            let mut line = vec![
                Span::raw(format!(" {symbol} {text}  ")),
                Span::styled(
                    format!("[{}]", todo.priority),
                    Style::default().fg(palette.priority(&todo.priority)),
                ),
            ];
            if let Some(due) = todo.due_date {
                let style = if todo.is_overdue(today) {
                    Style::default().fg(palette.danger).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(palette.muted)
                };
                line.push(Span::styled(format!("  Due: {}", format_due_date(due)), style));
            }

            let style = if idx == selected {
                palette.selected
            } else if todo.completed {
                Style::default()
                    .fg(palette.muted)
                    .add_modifier(Modifier::CROSSED_OUT)
            } else {
                Style::default()
            };

            ListItem::new(Line::from(line)).style(style)
        })
        .collect();

    let title = if has_completed {
        "Tasks (Space toggle ; e edit ; p priority ; u due ; d delete ; c clear completed)"
    } else {
        "Tasks (Space toggle ; e edit ; p priority ; u due ; d delete)"
    };
    List::new(items)
        .block(Block::default().title(title).borders(Borders::ALL))
        .highlight_symbol("➤ ")
}

fn render_footer<'a, S: KeyValueStore>(app: &'a App<S>, palette: &Palette) -> Paragraph<'a> {
    let prompt = |label: &'static str, value: &'a str, title: &'static str| {
        let line = Line::from(vec![
            Span::raw(label),
            Span::styled(value, Style::default().fg(palette.warn)),
            Span::raw("█"),
        ]);
        Paragraph::new(line).block(Block::default().title(title).borders(Borders::ALL))
    };

    match app.mode {
        InputMode::Searching => prompt(
            "Search: ",
            app.query.search.as_str(),
            "Search (Enter keep / Esc clear)",
        ),
        InputMode::SettingDue => prompt(
            "Due date: ",
            app.due_input.as_str(),
            "Due date YYYY-MM-DD, empty clears (Enter save / Esc cancel)",
        ),
        _ => {
            let msg = app.status.as_deref().unwrap_or(
                "q quit ; Tab dashboard ; t theme ; f filter ; s sort ; / search ; a add",
            );
            Paragraph::new(msg).block(Block::default().title("Status").borders(Borders::ALL))
        }
    }
}

fn draw_confirm(f: &mut ratatui::Frame, text: &str, palette: &Palette, area: Rect) {
    let popup = centered(area, 50, 5);
    let body = Paragraph::new(vec![
        Line::from(format!("Delete \"{text}\"?")),
        Line::from(Span::styled(
            "y confirm ; n cancel",
            Style::default().fg(palette.muted),
        )),
    ])
    .style(palette.base)
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .title("Confirm delete")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette.danger)),
    );
    f.render_widget(Clear, popup);
    f.render_widget(body, popup);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn cleanup_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::memory::InMemoryKvStore;
    use crate::store::TaskStore;

    fn app() -> App<InMemoryKvStore> {
        App::new(TaskStore::open(InMemoryKvStore::default()))
    }

    fn type_str(app: &mut App<InMemoryKvStore>, s: &str) {
        for c in s.chars() {
            handle_key(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn add_toggle_and_delete_via_keys() {
        let mut app = app();
        handle_key(&mut app, KeyCode::Char('a'));
        type_str(&mut app, "write report");
        handle_key(&mut app, KeyCode::Enter);
        assert_eq!(app.store().todos().len(), 1);

        handle_key(&mut app, KeyCode::Char(' '));
        assert!(app.store().todos()[0].completed);

        handle_key(&mut app, KeyCode::Char('d'));
        // Keys other than y/n are swallowed while a delete is pending.
        assert!(!handle_key(&mut app, KeyCode::Char('q')));
        handle_key(&mut app, KeyCode::Char('y'));
        assert!(app.store().todos().is_empty());
    }

    #[test]
    fn list_keys_are_inert_on_dashboard() {
        let mut app = app();
        handle_key(&mut app, KeyCode::Tab);
        handle_key(&mut app, KeyCode::Char('a'));
        assert_eq!(app.mode, InputMode::Normal);
        assert!(handle_key(&mut app, KeyCode::Char('q')));
    }

    #[test]
    fn search_mode_captures_letters() {
        let mut app = app();
        handle_key(&mut app, KeyCode::Char('/'));
        type_str(&mut app, "qa");
        assert_eq!(app.query.search, "qa");
        handle_key(&mut app, KeyCode::Esc);
        assert!(app.query.search.is_empty());
        assert_eq!(app.mode, InputMode::Normal);
    }

    #[test]
    fn delete_key_clears_edit_buffer() {
        let mut app = app();
        handle_key(&mut app, KeyCode::Char('a'));
        type_str(&mut app, "old name");
        handle_key(&mut app, KeyCode::Enter);
        let id = app.store().todos()[0].id;

        handle_key(&mut app, KeyCode::Char('e'));
        assert!(app.edit.is_editing(id));
        handle_key(&mut app, KeyCode::Delete);
        type_str(&mut app, "new name");
        handle_key(&mut app, KeyCode::Enter);

        assert!(!app.edit.is_editing(id));
        assert_eq!(app.store().get(id).unwrap().text, "new name");
    }

    #[test]
    fn centered_rect_fits_small_area() {
        let area = Rect::new(0, 0, 20, 3);
        let popup = centered(area, 50, 5);
        assert_eq!((popup.width, popup.height), (20, 3));
    }
}
