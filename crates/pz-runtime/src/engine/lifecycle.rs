use std::sync::Arc;

use pz_core::{
    LocalData, Node, NodeData, NodeState, OptionItem, Puzzle, PuzzleError, PuzzlePenalty,
    PuzzleState,
};

use super::step::option_available;
use crate::{
    FlagPersistence, FlagStore, MemoryFlagPersistence, NoPixelSource, PixelSource, PuzzleHost,
    SilentHost, UidGenerator,
};

#[derive(Clone, Default)]
pub struct PuzzleEngineOptions {
    pub flag_persistence: Option<Arc<dyn FlagPersistence>>,
    pub host: Option<Arc<dyn PuzzleHost>>,
    pub pixels: Option<Arc<dyn PixelSource>>,
}

/// Runs one puzzle. The engine holds no session state: every operation takes
/// a `PuzzleState` and hands back a new one.
pub struct PuzzleEngine {
    pub(super) puzzle: Arc<Puzzle>,
    pub(super) flags: FlagStore,
    pub(super) host: Arc<dyn PuzzleHost>,
    pub(super) pixels: Arc<dyn PixelSource>,
}

impl PuzzleEngine {
    pub fn new(puzzle: impl Into<Arc<Puzzle>>, options: PuzzleEngineOptions) -> Self {
        let flag_persistence = options
            .flag_persistence
            .unwrap_or_else(|| Arc::new(MemoryFlagPersistence::default()));
        Self {
            puzzle: puzzle.into(),
            flags: FlagStore::new(flag_persistence),
            host: options.host.unwrap_or_else(|| Arc::new(SilentHost)),
            pixels: options.pixels.unwrap_or_else(|| Arc::new(NoPixelSource)),
        }
    }

    pub fn puzzle(&self) -> &Puzzle {
        &self.puzzle
    }

    pub fn flags(&self) -> &FlagStore {
        &self.flags
    }

    /// Fresh session: empty local flags, uids from zero, stepped from the start node.
    pub fn initialize(&self) -> Result<PuzzleState, PuzzleError> {
        let mut uids = UidGenerator::new(0);
        let node_states = self.step(&self.puzzle.start_node, LocalData::default(), &mut uids)?;
        Ok(PuzzleState {
            next_state_uid: uids.peek(),
            node_states,
        })
    }

    pub fn node_for(&self, node_state: &NodeState) -> Result<&Node, PuzzleError> {
        self.puzzle.node(&node_state.node_id)
    }

    /// Options of an option-input snapshot that are offered under its local data.
    pub fn available_options(
        &self,
        node_state: &NodeState,
    ) -> Result<Vec<(usize, &OptionItem)>, PuzzleError> {
        let Node::OptionInput { options, .. } = self.node_for(node_state)? else {
            return Ok(Vec::new());
        };

        let mut available = Vec::new();
        for (index, option) in options.iter().enumerate() {
            if option_available(&self.flags, option, &node_state.local_data)? {
                available.push((index, option));
            }
        }
        Ok(available)
    }

    pub fn penalty_for(
        &self,
        node_state: &NodeState,
    ) -> Result<Option<PuzzlePenalty>, PuzzleError> {
        let Node::PenaltyKickToStart { content, delay } = self.node_for(node_state)? else {
            return Ok(None);
        };
        let NodeData::Penalty { time_start } = node_state.node_data else {
            return Ok(None);
        };
        Ok(Some(PuzzlePenalty::KickToStart {
            content: content.clone(),
            time_end: time_start.saturating_add(*delay),
        }))
    }
}
