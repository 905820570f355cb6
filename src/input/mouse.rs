use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};

use crate::app::{AppState, Mode};
use crate::input::drag_mode::{hover, pick_up, release};

const WHEEL_STEP: isize = 3;

/// Translates pointer events into drag gestures. Positions are resolved
/// through the grid geometry of the last frame.
pub fn handle_mouse(event: MouseEvent, state: &mut AppState) {
    let target = state.cell_at(event.column, event.row);

    match event.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            let Some(source) = target else {
                return;
            };
            if state.mode == Mode::Command {
                return;
            }
            state.notice = None;
            if let Some(row) = state.store.roster().row_of(&source.employee_id) {
                state.select_cell(row, source.day);
            }
            if pick_up(&mut state.drag_session(), &source) {
                state.mode = Mode::Drag;
            }
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            if !state.is_dragging() {
                return;
            }
            hover(&mut state.drag_session(), target.as_ref());
        }
        MouseEventKind::Up(MouseButton::Left) => {
            if !state.is_dragging() {
                return;
            }
            let outcome = release(&mut state.drag_session(), target.as_ref());
            state.record_drop(outcome);
        }
        MouseEventKind::ScrollDown => state.scroll_rows(WHEEL_STEP),
        MouseEventKind::ScrollUp => state.scroll_rows(-WHEEL_STEP),
        _ => {}
    }
}
