use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use wfm_grid::{
    app::{AppState, Mode, SyncStatus},
    ui::grid_view::GridGeometry,
};
use crate::tui::{dialogs, grid_views};

fn split(size: Rect) -> [Rect; 4] {
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(size);

    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(72),
            Constraint::Percentage(28),
        ])
        .split(main_chunks[1]);

    [main_chunks[0], content_chunks[0], content_chunks[1], main_chunks[2]]
}

/// Grid placement for a terminal of the given size, computed before the
/// frame is drawn so input can be hit-tested against it.
pub fn grid_geometry(size: Rect, app: &AppState) -> GridGeometry {
    GridGeometry::for_area(split(size)[1], app.cell_width)
}

pub fn ui(f: &mut Frame, app: &AppState) {
    let chunks = split(f.size());

    let title_text = format!("wfm-grid - {} - {:?} Mode", app.period().label(), app.mode);

    let title = Paragraph::new(title_text)
        .style(Style::default().fg(app.theme.title).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    grid_views::grid::render(f, app, chunks[1]);
    grid_views::violations::render(f, app, chunks[2]);

    let (status_text, status_color) = if matches!(app.mode, Mode::Command) {
        (app.command_buffer.to_string(), app.theme.command_mode)
    } else if let Some(notice) = &app.notice {
        (notice.clone(), app.theme.error)
    } else {
        (
            format!(
                "Shifts: {} | Violations: {} | {} | {} | 'q' quit, '?' help",
                app.total_shifts(),
                app.store.violations().len(),
                sync_label(&app.sync_status),
                if app.is_dragging() { "DRAG" } else { "ready" },
            ),
            app.theme.status_bar,
        )
    };

    let status = Paragraph::new(status_text)
        .style(Style::default().fg(status_color))
        .alignment(if matches!(app.mode, Mode::Command) { Alignment::Left } else { Alignment::Center })
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(status, chunks[3]);

    dialogs::banner::render(f, app, chunks[1]);

    if app.show_help {
        dialogs::help::render(f, app);
    }
}

fn sync_label(status: &SyncStatus) -> String {
    match status {
        SyncStatus::Synced => "Synced".to_string(),
        SyncStatus::Syncing => "Syncing...".to_string(),
        SyncStatus::Offline => "Offline".to_string(),
        SyncStatus::Cached(saved_at) => format!(
            "Cached {}",
            saved_at.with_timezone(&chrono::Local).format("%d %b %H:%M")
        ),
        SyncStatus::Error(e) => format!("Sync error: {}", e),
    }
}
