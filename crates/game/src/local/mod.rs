mod engine;
mod state;

pub use engine::{LocalEngine, StepOutcome};
pub use state::{ItemKind, LocalState, LocalStatus};
