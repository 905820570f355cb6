use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use wfm_grid::app::AppState;

pub fn render(f: &mut Frame, app: &AppState, area: Rect) {
    let violations = app.store.violations();
    let selected = app.selected_key();
    let selected_employee = selected.as_ref().map(|k| &k.employee_id);

    let mut lines: Vec<Line> = Vec::new();

    if let Some(shift) = selected.as_ref().and_then(|k| app.store.shift_at(k)) {
        let hours = shift
            .duration_minutes()
            .map(|m| format!("{:.1}h", m as f32 / 60.0))
            .unwrap_or_else(|| "undefined".to_string());
        lines.push(Line::from(vec![Span::styled(
            format!("{} {} {:?} ({})", shift.date.format("%a %d %b"), shift.bounds.label(), shift.kind, hours),
            Style::default().fg(app.theme.title).add_modifier(Modifier::BOLD),
        )]));
        lines.push(Line::from(""));
    }

    if violations.is_empty() {
        lines.push(Line::from(Span::styled(
            "No rule violations",
            Style::default().fg(app.theme.success),
        )));
    } else {
        let (mine, others): (Vec<_>, Vec<_>) = violations
            .iter()
            .partition(|v| Some(&v.employee_id) == selected_employee);
        for violation in mine.iter().chain(others.iter()) {
            let style = if Some(&violation.employee_id) == selected_employee {
                Style::default().fg(app.theme.violation).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(app.theme.violation)
            };
            lines.push(Line::from(Span::styled(format!("• {}", violation), style)));
        }
    }

    let panel = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Violations ({}) ", violations.len())),
        );
    f.render_widget(panel, area);
}
