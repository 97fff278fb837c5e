use ratatui::style::{Color, Modifier, Style};

use crate::domain::prefs::Theme;
use crate::domain::todo::Priority;

pub struct Palette {
    pub base: Style,
    pub selected: Style,
    pub accent: Color,
    pub muted: Color,
    pub warn: Color,
    pub danger: Color,
    pub ok: Color,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self {
                base: Style::default().fg(Color::Black).bg(Color::White),
                selected: Style::default()
                    .fg(Color::Blue)
                    .add_modifier(Modifier::BOLD | Modifier::REVERSED),
                accent: Color::Blue,
                muted: Color::Gray,
                warn: Color::Rgb(180, 120, 0),
                danger: Color::Red,
                ok: Color::Green,
            },
            Theme::Dark => Self {
                base: Style::default().fg(Color::White).bg(Color::Black),
                selected: Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD | Modifier::REVERSED),
                accent: Color::Cyan,
                muted: Color::DarkGray,
                warn: Color::Yellow,
                danger: Color::LightRed,
                ok: Color::LightGreen,
            },
        }
    }

    pub fn priority(&self, priority: &Priority) -> Color {
        match priority {
            Priority::High => self.danger,
            Priority::Medium => self.warn,
            Priority::Low => self.ok,
            Priority::Unrecognized(_) => self.muted,
        }
    }
}
