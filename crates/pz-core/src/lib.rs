pub mod error;
pub mod state;
pub mod types;

pub use error::PuzzleError;
pub use state::*;
pub use types::*;
