use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use wfm_grid::{
    app::AppState,
    ui::grid_view::{calculate_layout, CellContent, CellLayout, NAME_COLUMN_WIDTH},
};

pub fn render(f: &mut Frame, app: &AppState, area: Rect) {
    let layout = calculate_layout(app);
    let cell_width = app.cell_width as usize;
    let name_width = NAME_COLUMN_WIDTH as usize;

    let window_note = if layout.virtualized {
        format!(" [virtual {}/{}]", layout.rows.len(), layout.total_rows)
    } else {
        String::new()
    };
    let title = format!(" {} - {} employees{} ", layout.title, layout.total_rows, window_note);

    let mut date_spans = vec![Span::raw(" ".repeat(name_width))];
    let mut weekday_spans = vec![Span::styled(
        format!("{:<width$}", "Employee", width = name_width),
        Style::default().fg(app.theme.header).add_modifier(Modifier::BOLD),
    )];
    for header in &layout.days {
        let mut style = Style::default().fg(app.theme.header);
        if header.is_weekend {
            style = style.fg(app.theme.weekend);
        }
        if header.is_today {
            style = style.fg(app.theme.today).add_modifier(Modifier::BOLD);
        }
        date_spans.push(Span::styled(
            format!("{:^width$}", header.date.format("%d").to_string(), width = cell_width),
            style,
        ));
        weekday_spans.push(Span::styled(
            format!("{:^width$}", header.weekday, width = cell_width),
            style,
        ));
    }

    let mut lines = vec![Line::from(date_spans), Line::from(weekday_spans)];

    for row in layout
        .rows
        .iter()
        .filter(|r| r.row >= layout.scroll_row)
        .take(app.viewport.rows)
    {
        let name_style = if row.has_violation {
            Style::default().fg(app.theme.violation)
        } else {
            Style::default()
        };
        let name_room = name_width.saturating_sub(7);
        let mut spans = vec![Span::styled(
            format!(
                "{:<room$}{:>5.0}h ",
                truncate(&row.name, name_room),
                row.scheduled_hours,
                room = name_room
            ),
            name_style,
        )];
        for cell in &row.cells {
            spans.push(Span::styled(
                format!("{:^width$.width$}", cell.content.text(), width = cell_width),
                cell_style(app, cell),
            ));
        }
        lines.push(Line::from(spans));
    }

    let grid = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(Span::styled(title, Style::default().fg(app.theme.title).add_modifier(Modifier::BOLD))),
    );
    f.render_widget(grid, area);
}

fn cell_style(app: &AppState, cell: &CellLayout) -> Style {
    let theme = &app.theme;
    let mut style = match &cell.content {
        CellContent::Empty if cell.is_weekend => Style::default().fg(theme.weekend),
        CellContent::Empty => Style::default().fg(theme.rest_cell),
        CellContent::Shift { malformed: true, .. } => Style::default().fg(theme.malformed_shift),
        CellContent::Shift { kind, .. } => Style::default().fg(theme.shift_color(*kind)),
        CellContent::Vacation { .. } => Style::default().fg(theme.vacation),
    };

    if cell.has_violation {
        style = style.fg(theme.violation).add_modifier(Modifier::BOLD);
    }
    if cell.is_drag_source {
        style = style.fg(theme.drag_source).add_modifier(Modifier::DIM);
    }
    if cell.is_drop_target {
        let bg = if cell.drop_blocked { theme.error } else { theme.drop_target };
        style = style.bg(bg).fg(Color::Black);
    }
    if cell.is_cursor {
        style = style.bg(theme.cursor_bg).fg(theme.cursor_fg).add_modifier(Modifier::BOLD);
    }
    style
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() > width {
        let mut truncated: String = text.chars().take(width.saturating_sub(1)).collect();
        truncated.push('…');
        truncated
    } else {
        text.to_string()
    }
}
