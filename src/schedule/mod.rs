pub mod drag;
pub mod grid;
pub mod store;
pub mod time;
pub mod validator;

pub use drag::{DragCoordinator, DragDrop, DragSession, DropOutcome};
pub use grid::{CellKey, CellState, GridError, Outcome, ScheduleContext, ScheduleGrid};
pub use store::{GridAction, GridStore, RosterSnapshot};
pub use time::SchedulePeriod;
pub use validator::{Violation, ViolationKind};
