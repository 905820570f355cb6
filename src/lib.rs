pub mod app;
pub mod input;
pub mod roster;
pub mod schedule;
pub mod storage;
pub mod sync;
pub mod ui;

pub use app::{AppState, Mode, SyncStatus};
pub use schedule::{GridStore, SchedulePeriod};

pub use input::{command_mode, normal_mode};
