pub mod grid;
pub mod violations;
