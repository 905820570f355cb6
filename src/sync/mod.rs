pub mod roster_api;
pub mod sequence;
pub mod sync_engine;

pub use roster_api::{ApiError, DateRange, MoveShiftRequest, RestRosterClient, RosterApi};
pub use sequence::{LoadSequencer, LoadTicket};
pub use sync_engine::{SyncEngine, SyncError, SyncMessage};
