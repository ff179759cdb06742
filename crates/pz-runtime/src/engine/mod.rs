mod lifecycle;
mod respond;
mod step;

pub use lifecycle::{PuzzleEngine, PuzzleEngineOptions};
pub use step::{option_available, STEP_GUARD_LIMIT};
