//! Reusable TUI widgets.

use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Bottom status bar. Errors are shown in red.
pub(crate) fn status_bar(msg: &str, is_error: bool) -> Paragraph<'_> {
    let bg = if is_error { Color::Red } else { Color::DarkGray };
    Paragraph::new(format!(" {msg}")).style(Style::default().bg(bg).fg(Color::White))
}

/// A `label: value` line, highlighted when focused.
pub(crate) fn field_line<'a>(label: &'a str, value: String, focused: bool, editing: bool) -> Line<'a> {
    let marker = if focused { "› " } else { "  " };
    let value_style = match (focused, editing) {
        (true, true) => Style::default().fg(Color::Yellow),
        (true, false) => Style::default().fg(Color::Cyan),
        _ => Style::default(),
    };
    Line::from(vec![
        Span::raw(marker),
        Span::styled(format!("{label:<18}"), Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(value, value_style),
    ])
}
