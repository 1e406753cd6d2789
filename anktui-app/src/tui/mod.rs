pub mod app;
pub mod forms;
pub mod inputs;
pub mod state;
pub mod theme;
pub mod views;
