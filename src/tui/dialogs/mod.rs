pub mod banner;
pub mod help;
