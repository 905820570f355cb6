pub mod grid_view;
pub mod theme;
pub mod viewport;
