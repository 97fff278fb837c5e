use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
};

use super::palette::Palette;
use crate::domain::todo::Priority;
use crate::usecase::summary::Summary;

pub fn draw(f: &mut Frame, summary: &Summary, palette: &Palette, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(area);

    f.render_widget(counts(summary, palette), chunks[0]);
    f.render_widget(
        gauge("Completed", summary.completed, summary.completed_pct, palette.ok),
        chunks[1],
    );
    f.render_widget(
        gauge("Active", summary.active, summary.active_pct, palette.warn),
        chunks[2],
    );
    for (chunk, priority) in chunks[3..6].iter().zip(Priority::ALL) {
        let (count, pct) = summary.priority_count(&priority);
        let title = format!("{priority} priority");
        f.render_widget(gauge(&title, count, pct, palette.priority(&priority)), *chunk);
    }
}

fn counts(summary: &Summary, palette: &Palette) -> Paragraph<'static> {
    let stat = |label: &'static str, value: usize, color: Color| {
        [
            Span::raw(format!("{label}: ")),
            Span::styled(
                value.to_string(),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
            Span::raw("   "),
        ]
    };
    let spans: Vec<Span> = [
        stat("Total", summary.total, palette.accent),
        stat("Completed", summary.completed, palette.ok),
        stat("Active", summary.active, palette.warn),
    ]
    .into_iter()
    .flatten()
    .collect();
    Paragraph::new(Line::from(spans))
        .block(Block::default().title("Dashboard").borders(Borders::ALL))
}

fn gauge(title: &str, count: usize, pct: f64, color: Color) -> Gauge<'static> {
    Gauge::default()
        .block(
            Block::default()
                .title(format!("{title} ({count})"))
                .borders(Borders::ALL),
        )
        .gauge_style(Style::default().fg(color))
        .ratio((pct / 100.0).clamp(0.0, 1.0))
        .label(format!("{pct:.0}%"))
}
