use crossterm::event::KeyCode;

use crate::app::{AppState, Mode};
use crate::schedule::{CellKey, DragDrop, DropOutcome};

/// Keyboard drag: pick up under the cursor, walk the cursor, drop.
pub fn begin(state: &mut AppState) {
    let Some(source) = state.selected_key() else {
        return;
    };
    let picked = pick_up(&mut state.drag_session(), &source);
    if picked {
        state.mode = Mode::Drag;
    } else {
        state.set_notice("Nothing to move here");
    }
}

pub fn handle_key(key: KeyCode, state: &mut AppState) {
    match key {
        KeyCode::Char('h') | KeyCode::Left => walk(state, 0, -1),
        KeyCode::Char('j') | KeyCode::Down => walk(state, 1, 0),
        KeyCode::Char('k') | KeyCode::Up => walk(state, -1, 0),
        KeyCode::Char('l') | KeyCode::Right => walk(state, 0, 1),
        KeyCode::Char(' ') | KeyCode::Enter => {
            let target = state.selected_key();
            let outcome = release(&mut state.drag_session(), target.as_ref());
            state.record_drop(outcome);
        }
        KeyCode::Esc => {
            state.drag_session().cancel();
            state.mode = Mode::Normal;
        }
        _ => {}
    }
}

fn walk(state: &mut AppState, rows: isize, days: isize) {
    state.move_cursor(rows, days);
    let target = state.selected_key();
    hover(&mut state.drag_session(), target.as_ref());
}

pub fn pick_up(gestures: &mut dyn DragDrop, source: &CellKey) -> bool {
    gestures.begin_drag(source)
}

pub fn hover(gestures: &mut dyn DragDrop, target: Option<&CellKey>) {
    if gestures.is_dragging() {
        gestures.over(target);
    }
}

pub fn release(gestures: &mut dyn DragDrop, target: Option<&CellKey>) -> DropOutcome {
    gestures.drop(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::grid::fixtures::*;
    use crate::schedule::GridStore;

    fn app(cells: &[(usize, usize)]) -> AppState {
        let ctx = context(3, rule(5, 11));
        let grid = grid_with(&ctx, cells);
        let mut state = AppState::new(ctx.period).with_store(GridStore::new(ctx, grid));
        state.viewport.rows = 10;
        state.viewport.days = 10;
        state
    }

    #[test]
    fn space_on_empty_cell_does_not_enter_drag() {
        let mut state = app(&[]);

        begin(&mut state);

        assert_eq!(state.mode, Mode::Normal);
        assert!(state.notice.is_some());
    }

    #[test]
    fn keyboard_drag_moves_shift_to_cursor() {
        let mut state = app(&[(1, 0)]);
        begin(&mut state);
        assert_eq!(state.mode, Mode::Drag);

        handle_key(KeyCode::Char('j'), &mut state);
        handle_key(KeyCode::Char('l'), &mut state);
        assert_eq!(state.drag.state().unwrap().hover, Some(key(2, 1)));
        handle_key(KeyCode::Char(' '), &mut state);

        assert_eq!(state.mode, Mode::Normal);
        assert!(state.store.shift_at(&key(1, 0)).is_none());
        assert!(state.store.shift_at(&key(2, 1)).is_some());
        assert_eq!(state.total_shifts(), 1);
    }

    #[test]
    fn escape_cancels_keyboard_drag() {
        let mut state = app(&[(1, 0)]);
        begin(&mut state);
        handle_key(KeyCode::Char('j'), &mut state);

        handle_key(KeyCode::Esc, &mut state);

        assert_eq!(state.mode, Mode::Normal);
        assert!(!state.is_dragging());
        assert!(state.store.shift_at(&key(1, 0)).is_some());
    }

    #[test]
    fn drop_on_occupied_cell_reports_rejection() {
        let mut state = app(&[(1, 0), (2, 0)]);
        begin(&mut state);
        handle_key(KeyCode::Char('j'), &mut state);

        handle_key(KeyCode::Enter, &mut state);

        assert!(state.store.shift_at(&key(1, 0)).is_some());
        assert!(state.notice.as_deref().is_some_and(|n| n.contains("rejected")));
    }
}
