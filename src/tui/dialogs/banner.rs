use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use wfm_grid::app::AppState;

/// Dismissible error banner across the top of the grid.
pub fn render(f: &mut Frame, app: &AppState, area: Rect) {
    let Some(message) = app.banner.as_deref() else {
        return;
    };
    let banner_area = Rect {
        x: area.x + 2,
        y: area.y + 1,
        width: area.width.saturating_sub(4),
        height: 3.min(area.height),
    };

    f.render_widget(Clear, banner_area);

    let text = Line::from(vec![
        Span::styled(message.to_string(), Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
        Span::raw("  (Esc to dismiss)"),
    ]);
    let banner = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).style(Style::default().bg(app.theme.error)));
    f.render_widget(banner, banner_area);
}
