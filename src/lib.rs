pub mod galaxy;
pub mod prelude;
pub mod ui;
