use std::time::{SystemTime, UNIX_EPOCH};

use pz_core::{PuzzleError, PuzzlePenalty};

/// Callbacks into whatever presents the puzzle.
pub trait PuzzleHost: Send + Sync {
    fn now_ms(&self) -> u64;

    /// A `set-completed-flag` node was traversed.
    fn notify_completed(&self) -> Result<(), PuzzleError>;

    /// A penalty node was appended; input should block until `time_end`.
    fn notify_penalty(&self, penalty: &PuzzlePenalty) -> Result<(), PuzzleError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SilentHost;

impl PuzzleHost for SilentHost {
    fn now_ms(&self) -> u64 {
        system_now_ms()
    }

    fn notify_completed(&self) -> Result<(), PuzzleError> {
        Ok(())
    }

    fn notify_penalty(&self, _penalty: &PuzzlePenalty) -> Result<(), PuzzleError> {
        Ok(())
    }
}

pub fn system_now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}
