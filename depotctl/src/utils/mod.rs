pub mod formatting;
pub mod terminal;
pub mod ui;
