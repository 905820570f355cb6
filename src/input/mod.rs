pub mod command_mode;
pub mod drag_mode;
pub mod mouse;
pub mod normal_mode;
