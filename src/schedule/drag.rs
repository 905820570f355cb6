use crate::schedule::grid::{CellKey, GridError, Outcome};
use crate::schedule::store::{GridAction, GridStore};

/// Gesture-facing side of drag and drop. Mouse and keyboard input only
/// speak this trait, so either can be replaced without touching the
/// coordinator or the grid.
pub trait DragDrop {
    /// Picks up the shift in `source`. Returns false for empty cells.
    fn begin_drag(&mut self, source: &CellKey) -> bool;
    fn over(&mut self, target: Option<&CellKey>);
    /// Releases the carried shift over `target`; `None` means outside the grid.
    fn drop(&mut self, target: Option<&CellKey>) -> DropOutcome;
    fn cancel(&mut self);
    fn is_dragging(&self) -> bool;
}

#[derive(Debug, Clone, PartialEq)]
pub enum DropOutcome {
    Moved { from: CellKey, to: CellKey },
    SameCell,
    Rejected(GridError),
    Cancelled,
    Idle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DragState {
    pub source: CellKey,
    pub shift_id: String,
    pub hover: Option<CellKey>,
}

#[derive(Debug, Clone, Default)]
pub struct DragCoordinator {
    state: Option<DragState>,
}

impl DragCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> Option<&DragState> {
        self.state.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.state.is_some()
    }

    pub fn begin_drag(&mut self, store: &GridStore, source: &CellKey) -> bool {
        let Some(shift) = store.shift_at(source) else {
            return false;
        };
        tracing::debug!("Picked up shift {} from {}", shift.id, source);
        self.state = Some(DragState {
            source: source.clone(),
            shift_id: shift.id.clone(),
            hover: Some(source.clone()),
        });
        true
    }

    pub fn over(&mut self, target: Option<&CellKey>) {
        if let Some(state) = self.state.as_mut() {
            state.hover = target.cloned();
        }
    }

    pub fn cancel(&mut self) {
        if self.state.take().is_some() {
            tracing::debug!("Drag cancelled");
        }
    }

    /// Completes the drag. Invalid moves leave the grid exactly as it was.
    pub fn drop(&mut self, store: &mut GridStore, target: Option<&CellKey>) -> DropOutcome {
        let Some(state) = self.state.take() else {
            return DropOutcome::Idle;
        };
        let Some(target) = target else {
            tracing::debug!("Shift {} dropped outside the grid", state.shift_id);
            return DropOutcome::Cancelled;
        };

        if store.shift_at(&state.source).map(|s| s.id.as_str()) != Some(state.shift_id.as_str()) {
            tracing::debug!("Shift {} left {} during the drag", state.shift_id, state.source);
            return DropOutcome::Cancelled;
        }

        let action = GridAction::Move { from: state.source.clone(), to: target.clone() };
        match store.dispatch(action) {
            Ok(Outcome::Applied) => DropOutcome::Moved { from: state.source, to: target.clone() },
            Ok(Outcome::NoOp) => DropOutcome::SameCell,
            Err(e) => {
                tracing::debug!("Rejected move of {}: {}", state.shift_id, e);
                DropOutcome::Rejected(e)
            }
        }
    }
}

/// Binds a coordinator to the store it mutates for the duration of one
/// input event.
pub struct DragSession<'a> {
    pub coordinator: &'a mut DragCoordinator,
    pub store: &'a mut GridStore,
}

impl<'a> DragSession<'a> {
    pub fn new(coordinator: &'a mut DragCoordinator, store: &'a mut GridStore) -> Self {
        Self { coordinator, store }
    }
}

impl DragDrop for DragSession<'_> {
    fn begin_drag(&mut self, source: &CellKey) -> bool {
        self.coordinator.begin_drag(self.store, source)
    }

    fn over(&mut self, target: Option<&CellKey>) {
        self.coordinator.over(target);
    }

    fn drop(&mut self, target: Option<&CellKey>) -> DropOutcome {
        self.coordinator.drop(self.store, target)
    }

    fn cancel(&mut self) {
        self.coordinator.cancel();
    }

    fn is_dragging(&self) -> bool {
        self.coordinator.is_dragging()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::grid::fixtures::*;

    fn store_with(cells: &[(usize, usize)]) -> GridStore {
        let ctx = context(2, rule(5, 11));
        let grid = grid_with(&ctx, cells);
        GridStore::new(ctx, grid)
    }

    #[test]
    fn begin_drag_on_empty_cell_is_refused() {
        let store = store_with(&[]);
        let mut coordinator = DragCoordinator::new();

        assert!(!coordinator.begin_drag(&store, &key(1, 3)));
        assert!(!coordinator.is_dragging());
    }

    #[test]
    fn begin_drag_does_not_mutate_grid() {
        let store = store_with(&[(1, 3)]);
        let before = store.grid().clone();
        let mut coordinator = DragCoordinator::new();

        assert!(coordinator.begin_drag(&store, &key(1, 3)));

        assert_eq!(store.grid(), &before);
        assert_eq!(coordinator.state().unwrap().shift_id, "s-1-3");
    }

    #[test]
    fn drop_on_empty_cell_moves_shift() {
        let mut store = store_with(&[(1, 3)]);
        let mut coordinator = DragCoordinator::new();
        coordinator.begin_drag(&store, &key(1, 3));

        let outcome = coordinator.drop(&mut store, Some(&key(2, 4)));

        assert_eq!(outcome, DropOutcome::Moved { from: key(1, 3), to: key(2, 4) });
        assert!(store.shift_at(&key(2, 4)).is_some());
        assert!(!coordinator.is_dragging());
    }

    #[test]
    fn drop_on_own_cell_is_noop() {
        let mut store = store_with(&[(1, 5)]);
        let before = store.grid().clone();
        let violations = store.violations().to_vec();
        let mut coordinator = DragCoordinator::new();
        coordinator.begin_drag(&store, &key(1, 5));

        let outcome = coordinator.drop(&mut store, Some(&key(1, 5)));

        assert_eq!(outcome, DropOutcome::SameCell);
        assert_eq!(store.grid(), &before);
        assert_eq!(store.violations(), violations.as_slice());
    }

    #[test]
    fn drop_on_occupied_cell_keeps_source() {
        let mut store = store_with(&[(1, 5), (2, 5)]);
        let before = store.grid().clone();
        let mut coordinator = DragCoordinator::new();
        coordinator.begin_drag(&store, &key(1, 5));

        let outcome = coordinator.drop(&mut store, Some(&key(2, 5)));

        assert_eq!(outcome, DropOutcome::Rejected(GridError::CellOccupied(key(2, 5))));
        assert_eq!(store.grid(), &before);
    }

    #[test]
    fn drop_outside_grid_cancels() {
        let mut store = store_with(&[(1, 5)]);
        let before = store.grid().clone();
        let mut coordinator = DragCoordinator::new();
        coordinator.begin_drag(&store, &key(1, 5));

        assert_eq!(coordinator.drop(&mut store, None), DropOutcome::Cancelled);
        assert_eq!(store.grid(), &before);
    }

    #[test]
    fn drop_without_drag_is_idle() {
        let mut store = store_with(&[(1, 5)]);
        let mut coordinator = DragCoordinator::new();

        assert_eq!(coordinator.drop(&mut store, Some(&key(2, 5))), DropOutcome::Idle);
    }

    #[test]
    fn drop_after_source_changed_is_cancelled() {
        let mut store = store_with(&[(1, 5)]);
        let mut coordinator = DragCoordinator::new();
        coordinator.begin_drag(&store, &key(1, 5));
        store.dispatch(GridAction::Delete { cell: key(1, 5) }).unwrap();

        assert_eq!(coordinator.drop(&mut store, Some(&key(2, 5))), DropOutcome::Cancelled);
        assert!(store.grid().is_empty());
    }

    #[test]
    fn over_tracks_hovered_cell() {
        let store = store_with(&[(1, 5)]);
        let mut coordinator = DragCoordinator::new();
        coordinator.begin_drag(&store, &key(1, 5));

        coordinator.over(Some(&key(2, 6)));

        assert_eq!(coordinator.state().unwrap().hover, Some(key(2, 6)));
    }

    #[test]
    fn session_forwards_through_trait() {
        let mut store = store_with(&[(1, 5)]);
        let mut coordinator = DragCoordinator::new();
        let mut session = DragSession::new(&mut coordinator, &mut store);
        let gestures: &mut dyn DragDrop = &mut session;

        assert!(gestures.begin_drag(&key(1, 5)));
        gestures.over(Some(&key(1, 6)));
        let outcome = gestures.drop(Some(&key(1, 6)));

        assert_eq!(outcome, DropOutcome::Moved { from: key(1, 5), to: key(1, 6) });
    }
}
