use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn toggle(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn palette(&self) -> Palette {
        match self {
            Theme::Light => Palette {
                bg: Color::White,
                fg: Color::Black,
                border: Color::Black,
                muted: Color::Gray,
                accent: Color::Blue,
                positive: Color::Green,
                negative: Color::Red,
                highlight_bg: Color::Rgb(220, 220, 230),
            },
            Theme::Dark => Palette {
                bg: Color::Rgb(20, 20, 25),
                fg: Color::White,
                border: Color::DarkGray,
                muted: Color::Gray,
                accent: Color::Yellow,
                positive: Color::Green,
                negative: Color::Red,
                highlight_bg: Color::Rgb(45, 45, 60),
            },
        }
    }
}

/// Resolved colors handed to every render function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub bg: Color,
    pub fg: Color,
    pub border: Color,
    pub muted: Color,
    pub accent: Color,
    pub positive: Color,
    pub negative: Color,
    pub highlight_bg: Color,
}

impl Palette {
    pub fn base(&self) -> Style {
        Style::default().bg(self.bg).fg(self.fg)
    }

    pub fn border_style(&self) -> Style {
        Style::default().fg(self.border)
    }

    pub fn bold(&self) -> Style {
        Style::default().fg(self.fg).add_modifier(Modifier::BOLD)
    }

    pub fn change(&self, is_positive: bool) -> Style {
        Style::default().fg(if is_positive { self.positive } else { self.negative })
    }
}
