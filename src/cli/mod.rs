pub mod portfolio;
pub mod quote;
pub mod setup;
pub mod symbols;
pub mod ui;
