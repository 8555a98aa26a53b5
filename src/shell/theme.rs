use ratatui::style::{Color, Modifier, Style};

/// Gold accent used for the chart line, selected buttons and the title.
pub const ACCENT: Color = Color::Rgb(0xEE, 0xBC, 0x1D);
/// Text drawn on top of [`ACCENT`].
pub const ON_ACCENT: Color = Color::Black;
pub const FOREGROUND: Color = Color::White;
pub const BACKGROUND: Color = Color::Rgb(0x14, 0x16, 0x1A);
pub const MUTED: Color = Color::DarkGray;

pub fn title_style() -> Style {
    Style::default()
        .fg(ACCENT)
        .bg(BACKGROUND)
        .add_modifier(Modifier::BOLD)
}

pub fn error_style() -> Style {
    Style::default().fg(Color::Red)
}
