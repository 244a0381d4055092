pub mod ui;
pub mod visit;
