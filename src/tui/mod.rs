mod session;
mod presentation;
mod sample_roster;
mod grid_views;
mod dialogs;

pub use sample_roster::build_sample_roster;
pub use session::{open_cache, run_tui, SessionOptions};
