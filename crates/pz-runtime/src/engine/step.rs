use log::{debug, info};
use pz_core::{
    LocalData, Node, NodeData, NodeId, NodeState, OptionItem, PuzzleError, PuzzlePenalty,
};

use super::lifecycle::PuzzleEngine;
use crate::{FlagStore, UidGenerator};

/// Upper bound on nodes visited by one `step` run.
pub const STEP_GUARD_LIMIT: usize = 10_000;

impl PuzzleEngine {
    /// Walks from `start_node_id` through passive nodes until an interactive
    /// node is appended or the graph runs out. Returns the snapshots appended
    /// along the way; every snapshot takes the next uid from `uids`.
    pub fn step(
        &self,
        start_node_id: &str,
        local_data: LocalData,
        uids: &mut UidGenerator,
    ) -> Result<Vec<NodeState>, PuzzleError> {
        let mut node_states = Vec::new();
        let mut local = local_data;
        let mut current: Option<NodeId> = Some(start_node_id.to_string());
        let mut guard = 0usize;

        while let Some(node_id) = current.take() {
            guard += 1;
            if guard > STEP_GUARD_LIMIT {
                return Err(PuzzleError::at_node(
                    "ENGINE_GUARD_EXCEEDED",
                    format!(
                        "Traversal visited more than {} nodes without reaching input.",
                        STEP_GUARD_LIMIT
                    ),
                    node_id,
                ));
            }

            let node = self.puzzle.node(&node_id)?;
            debug!("step \"{}\" ({})", node_id, node.type_name());

            current = match node {
                Node::Html { goto, .. } => {
                    node_states.push(snapshot(uids, &node_id, &local, NodeData::Empty));
                    goto.clone()
                }
                Node::TextInput { .. } => {
                    let data = NodeData::TextInput {
                        value: String::new(),
                        response: None,
                    };
                    node_states.push(snapshot(uids, &node_id, &local, data));
                    None
                }
                Node::OptionInput {
                    options,
                    fallthrough_goto,
                } => {
                    if self.any_option_available(options, &local)? {
                        let data = NodeData::OptionInput { value: None };
                        node_states.push(snapshot(uids, &node_id, &local, data));
                        None
                    } else {
                        debug!("all options of \"{}\" are filtered out", node_id);
                        fallthrough_goto.clone()
                    }
                }
                Node::ClickImageInput { .. } => {
                    let data = NodeData::ClickImageInput {
                        click_x: -1,
                        click_y: -1,
                        response: None,
                    };
                    node_states.push(snapshot(uids, &node_id, &local, data));
                    None
                }
                Node::Goto { goto } => Some(goto.clone()),
                Node::SetFlag { flag, value, goto } => {
                    local = self.flags.set(flag, value.unwrap_or(true), &local)?;
                    Some(goto.clone())
                }
                Node::CheckFlag {
                    flag,
                    goto_if_true,
                    goto_if_false,
                } => {
                    if self.flags.is_set(flag, &local)? {
                        Some(goto_if_true.clone())
                    } else {
                        Some(goto_if_false.clone())
                    }
                }
                Node::PenaltyKickToStart { content, delay } => {
                    let time_start = self.host.now_ms();
                    let data = NodeData::Penalty { time_start };
                    node_states.push(snapshot(uids, &node_id, &local, data));
                    let penalty = PuzzlePenalty::KickToStart {
                        content: content.clone(),
                        time_end: time_start.saturating_add(*delay),
                    };
                    info!("penalty at \"{}\" until {}", node_id, penalty.time_end());
                    self.host.notify_penalty(&penalty)?;
                    None
                }
                Node::SetCompletedFlag { goto } => {
                    info!("puzzle completed at \"{}\"", node_id);
                    self.host.notify_completed()?;
                    goto.clone()
                }
            };
        }

        Ok(node_states)
    }

    fn any_option_available(
        &self,
        options: &[OptionItem],
        local: &LocalData,
    ) -> Result<bool, PuzzleError> {
        for option in options {
            if option_available(&self.flags, option, local)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// An option is hidden once its one-use flag is set, whatever its show flag
/// says, and hidden while its show flag is unset.
pub fn option_available(
    flags: &FlagStore,
    option: &OptionItem,
    local: &LocalData,
) -> Result<bool, PuzzleError> {
    if let Some(one_use_flag) = &option.one_use_flag {
        if flags.is_set(one_use_flag, local)? {
            return Ok(false);
        }
    }
    if let Some(show_flag) = &option.show_flag {
        if !flags.is_set(show_flag, local)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn snapshot(
    uids: &mut UidGenerator,
    node_id: &str,
    local: &LocalData,
    node_data: NodeData,
) -> NodeState {
    NodeState {
        uid: uids.next_uid(),
        node_id: node_id.to_string(),
        local_data: local.clone(),
        node_data,
    }
}
