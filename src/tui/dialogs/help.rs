use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use wfm_grid::app::AppState;

pub fn render(f: &mut Frame, app: &AppState) {
    let area = f.size();
    let help_width = 60.min(area.width);
    let help_height = 23.min(area.height);
    let x = (area.width.saturating_sub(help_width)) / 2;
    let y = (area.height.saturating_sub(help_height)) / 2;

    let help_area = ratatui::layout::Rect {
        x,
        y,
        width: help_width,
        height: help_height,
    };

    f.render_widget(Clear, help_area);

    let section = Style::default().fg(app.theme.help_section);
    let help_text = vec![
        Line::from(vec![Span::styled("wfm-grid Help", Style::default().fg(app.theme.help_title).add_modifier(Modifier::BOLD))]),
        Line::from(""),
        Line::from(vec![Span::styled("Navigation:", section)]),
        Line::from("  h/j/k/l  - Move cursor (arrows work too)"),
        Line::from("  PgUp/PgDn- Page through the roster"),
        Line::from("  g/G      - First/last employee"),
        Line::from("  { / }    - Previous/next month"),
        Line::from("  wheel    - Scroll the roster"),
        Line::from(""),
        Line::from(vec![Span::styled("Shifts:", section)]),
        Line::from("  space    - Pick up shift / drop it at the cursor"),
        Line::from("  mouse    - Drag a shift onto an empty cell"),
        Line::from("  Esc      - Cancel drag, dismiss banner"),
        Line::from("  e        - Extend shift by one hour"),
        Line::from("  x        - Delete shift"),
        Line::from("  o        - Add emergency shift on a rest day"),
        Line::from(""),
        Line::from(vec![Span::styled("Commands:", section)]),
        Line::from("  :q               - Quit"),
        Line::from("  :refresh         - Reload, dropping unsaved edits"),
        Line::from("  :goto YYYY-MM    - Jump to month"),
        Line::from("  :extend N        - Extend shift by N hours"),
        Line::from("  :find REGEX, /RE - Find employee by name"),
        Line::from("  :theme NAME      - Change theme"),
        Line::from("  :virtual auto|on|off - Row windowing"),
        Line::from("  :help            - Show this help"),
        Line::from(""),
    ];

    let visible_lines = help_height.saturating_sub(3) as usize;
    let total_lines = help_text.len();
    let max_scroll = total_lines.saturating_sub(visible_lines);
    let scroll = app.help_scroll.min(max_scroll);

    let scrolled_text: Vec<Line> = help_text
        .into_iter()
        .skip(scroll)
        .take(visible_lines)
        .collect();

    let help_paragraph = Paragraph::new(scrolled_text)
        .block(Block::default()
            .borders(Borders::ALL)
            .title(format!(" Help (j/k to scroll, q to close) [{}/{}] ", scroll + 1, total_lines))
            .style(Style::default().bg(Color::Black)))
        .alignment(Alignment::Left);

    f.render_widget(help_paragraph, help_area);
}
