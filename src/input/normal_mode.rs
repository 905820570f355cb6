use crossterm::event::KeyCode;

use crate::app::{AppState, Mode};
use crate::input::command_mode::CommandEffect;
use crate::input::drag_mode;

pub fn handle_key(key: KeyCode, state: &mut AppState) -> CommandEffect {
    state.notice = None;
    match key {
        KeyCode::Char('h') | KeyCode::Left => state.move_cursor(0, -1),
        KeyCode::Char('j') | KeyCode::Down => state.move_cursor(1, 0),
        KeyCode::Char('k') | KeyCode::Up => state.move_cursor(-1, 0),
        KeyCode::Char('l') | KeyCode::Right => state.move_cursor(0, 1),
        KeyCode::PageDown => state.page(1),
        KeyCode::PageUp => state.page(-1),
        KeyCode::Char('g') | KeyCode::Home => state.goto_first_row(),
        KeyCode::Char('G') | KeyCode::End => state.goto_last_row(),
        KeyCode::Char('{') => return previous_month(state),
        KeyCode::Char('}') => return next_month(state),
        KeyCode::Char(' ') => drag_mode::begin(state),
        KeyCode::Char('x') | KeyCode::Delete => state.delete_selected(),
        KeyCode::Char('e') => state.extend_selected(1),
        KeyCode::Char('o') => state.add_emergency_at_cursor(),
        KeyCode::Char(':') => enter_command_mode(state, ':'),
        KeyCode::Char('/') => enter_command_mode(state, '/'),
        KeyCode::Char('?') => show_help(state),
        KeyCode::Esc => {
            state.dismiss_banner();
        }
        _ => {}
    }
    CommandEffect::None
}

fn previous_month(state: &mut AppState) -> CommandEffect {
    state.switch_period(state.period().previous_month());
    CommandEffect::Reload
}

fn next_month(state: &mut AppState) -> CommandEffect {
    state.switch_period(state.period().next_month());
    CommandEffect::Reload
}

fn enter_command_mode(state: &mut AppState, prefix: char) {
    state.mode = Mode::Command;
    state.command_buffer = prefix.to_string();
}

fn show_help(state: &mut AppState) {
    state.show_help = true;
    state.help_scroll = 0;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::ShiftKind;
    use crate::schedule::grid::fixtures::*;
    use crate::schedule::{GridStore, SchedulePeriod};

    fn app(cells: &[(usize, usize)]) -> AppState {
        let ctx = context(30, rule(5, 11));
        let grid = grid_with(&ctx, cells);
        let mut state = AppState::new(ctx.period).with_store(GridStore::new(ctx, grid));
        state.viewport.rows = 10;
        state.viewport.days = 7;
        state
    }

    #[test]
    fn hjkl_moves_cursor() {
        let mut state = app(&[]);

        handle_key(KeyCode::Char('j'), &mut state);
        handle_key(KeyCode::Char('l'), &mut state);
        handle_key(KeyCode::Char('l'), &mut state);
        handle_key(KeyCode::Char('h'), &mut state);

        assert_eq!((state.cursor.row, state.cursor.day), (1, 1));
    }

    #[test]
    fn page_down_moves_by_visible_rows() {
        let mut state = app(&[]);

        handle_key(KeyCode::PageDown, &mut state);

        assert_eq!(state.cursor.row, 10);
        assert_eq!(state.viewport.scroll_row, 1);
    }

    #[test]
    fn shift_g_jumps_to_last_employee() {
        let mut state = app(&[]);

        handle_key(KeyCode::Char('G'), &mut state);
        assert_eq!(state.cursor.row, 29);

        handle_key(KeyCode::Char('g'), &mut state);
        assert_eq!(state.cursor.row, 0);
    }

    #[test]
    fn braces_switch_month_and_request_reload() {
        let mut state = app(&[]);

        let effect = handle_key(KeyCode::Char('}'), &mut state);

        assert_eq!(effect, CommandEffect::Reload);
        assert_eq!(state.period(), SchedulePeriod::month(2025, 4).unwrap());

        handle_key(KeyCode::Char('{'), &mut state);
        assert_eq!(state.period(), SchedulePeriod::month(2025, 3).unwrap());
    }

    #[test]
    fn x_deletes_and_o_adds_emergency_shift() {
        let mut state = app(&[(1, 0)]);

        handle_key(KeyCode::Char('x'), &mut state);
        assert_eq!(state.total_shifts(), 0);

        handle_key(KeyCode::Char('o'), &mut state);
        assert_eq!(state.store.shift_at(&key(1, 0)).unwrap().kind, ShiftKind::Overtime);
    }

    #[test]
    fn e_extends_selected_shift_by_an_hour() {
        let mut state = app(&[(1, 0)]);

        handle_key(KeyCode::Char('e'), &mut state);

        assert_eq!(state.store.shift_at(&key(1, 0)).unwrap().duration_minutes(), Some(540));
    }

    #[test]
    fn colon_and_slash_open_command_line() {
        let mut state = app(&[]);

        handle_key(KeyCode::Char('/'), &mut state);

        assert_eq!(state.mode, Mode::Command);
        assert_eq!(state.command_buffer, "/");
    }

    #[test]
    fn escape_dismisses_banner() {
        let mut state = app(&[]);
        state.show_banner("Could not load roster");

        handle_key(KeyCode::Esc, &mut state);

        assert!(state.banner.is_none());
    }
}
