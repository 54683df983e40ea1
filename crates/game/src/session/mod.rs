mod controller;
mod mode;
mod toast;

pub use controller::{Board, ControllerInput, SessionController, SessionView};
pub use mode::SessionMode;
pub use toast::{Severity, Toast, ranking_message};
