pub mod commands;
pub mod progress;
pub mod ui;

pub use progress::ConsoleProgress;
pub use ui::Output;
