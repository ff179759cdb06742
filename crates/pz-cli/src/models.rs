use serde::{Deserialize, Serialize};
use pz_core::{PuzzlePenalty, PuzzleState};

pub(crate) const PLAYER_STATE_SCHEMA: &str = "player-state.v1";
pub(crate) const LIBRARY_REF_PREFIX: &str = "puzzles-dir:";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PlayerState {
    pub(crate) schema_version: String,
    pub(crate) library_ref: String,
    pub(crate) assets_dir: Option<String>,
    pub(crate) passcode: String,
    pub(crate) puzzle_state: PuzzleState,
    pub(crate) penalty: Option<PuzzlePenalty>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BoundaryEvent {
    TextInput,
    Options,
    ClickImage,
    Penalty,
    End,
}

impl BoundaryEvent {
    pub(crate) fn awaits_input(self) -> bool {
        matches!(self, Self::TextInput | Self::Options | Self::ClickImage)
    }
}

/// What a host shows after an engine call: content appended since the last
/// call and the node now waiting at the end of the path.
#[derive(Debug, Clone)]
pub(crate) struct BoundaryResult {
    pub(crate) event: BoundaryEvent,
    pub(crate) html: Vec<String>,
    pub(crate) node_index: Option<usize>,
    pub(crate) prompt: Option<String>,
    pub(crate) image: Option<String>,
    pub(crate) response: Option<String>,
    pub(crate) options: Vec<(usize, String)>,
    pub(crate) penalty: Option<PuzzlePenalty>,
}
