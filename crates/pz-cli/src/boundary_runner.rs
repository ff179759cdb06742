use std::path::Path;

use pz_core::{Node, NodeData, PuzzleError, PuzzleState};
use pz_runtime::PuzzleEngine;

use crate::{json_string, save_player_state, BoundaryEvent, BoundaryResult, PlayerState};

fn node_response(node_data: &NodeData) -> Option<String> {
    match node_data {
        NodeData::TextInput { response, .. } | NodeData::ClickImageInput { response, .. } => {
            response.clone()
        }
        _ => None,
    }
}

/// Summarizes the path from `from_index` on. Html content is collected in
/// order; the last node on the path decides what the host waits for.
pub(crate) fn describe_boundary(
    engine: &PuzzleEngine,
    state: &PuzzleState,
    from_index: usize,
) -> Result<BoundaryResult, PuzzleError> {
    let mut html = Vec::new();
    for node_state in state.node_states.iter().skip(from_index) {
        if let Node::Html { content, .. } = engine.node_for(node_state)? {
            html.push(content.clone());
        }
    }

    let mut boundary = BoundaryResult {
        event: BoundaryEvent::End,
        html,
        node_index: None,
        prompt: None,
        image: None,
        response: None,
        options: Vec::new(),
        penalty: None,
    };
    let (Some(last_index), Some(last)) = (state.last_index(), state.last()) else {
        return Ok(boundary);
    };

    match engine.node_for(last)? {
        Node::TextInput { prompt, .. } => {
            boundary.event = BoundaryEvent::TextInput;
            boundary.node_index = Some(last_index);
            boundary.prompt = prompt.clone();
            boundary.response = node_response(&last.node_data);
        }
        Node::OptionInput { .. } => {
            boundary.event = BoundaryEvent::Options;
            boundary.node_index = Some(last_index);
            boundary.options = engine
                .available_options(last)?
                .into_iter()
                .map(|(index, option)| (index, option.label.clone()))
                .collect();
        }
        Node::ClickImageInput { prompt, image, .. } => {
            boundary.event = BoundaryEvent::ClickImage;
            boundary.node_index = Some(last_index);
            boundary.prompt = Some(prompt.clone());
            boundary.image = Some(image.clone());
            boundary.response = node_response(&last.node_data);
        }
        Node::PenaltyKickToStart { .. } => {
            boundary.event = BoundaryEvent::Penalty;
            boundary.penalty = engine.penalty_for(last)?;
        }
        _ => {}
    }
    Ok(boundary)
}

pub(crate) fn emit_boundary(boundary: BoundaryResult, state_out: Option<String>) {
    println!("RESULT:OK");
    match boundary.event {
        BoundaryEvent::TextInput => println!("EVENT:TEXT_INPUT"),
        BoundaryEvent::Options => println!("EVENT:OPTIONS"),
        BoundaryEvent::ClickImage => println!("EVENT:CLICK_IMAGE"),
        BoundaryEvent::Penalty => println!("EVENT:PENALTY"),
        BoundaryEvent::End => println!("EVENT:END"),
    }

    for content in &boundary.html {
        println!("HTML_JSON:{}", json_string(content));
    }
    if let Some(node_index) = boundary.node_index {
        println!("NODE_INDEX:{}", node_index);
    }
    if let Some(prompt) = &boundary.prompt {
        println!("PROMPT_JSON:{}", json_string(prompt));
    }
    if let Some(image) = &boundary.image {
        println!("IMAGE:{}", image);
    }
    if let Some(response) = &boundary.response {
        println!("RESPONSE_JSON:{}", json_string(response));
    }
    for (index, label) in &boundary.options {
        println!("OPTION:{}|{}", index, json_string(label));
    }
    if let Some(penalty) = &boundary.penalty {
        println!("PENALTY_JSON:{}", json_string(penalty.content()));
        println!("PENALTY_END:{}", penalty.time_end());
    }

    println!(
        "STATE_OUT:{}",
        state_out.unwrap_or_else(|| "NONE".to_string())
    );
}

/// Saves the player state when the session can continue (input or an active
/// penalty) and prints the boundary. A finished session writes nothing.
pub(crate) fn emit_boundary_with_saved_state(
    boundary: BoundaryResult,
    mut player: PlayerState,
    state_out: &str,
) -> Result<i32, PuzzleError> {
    if boundary.event == BoundaryEvent::End {
        emit_boundary(boundary, None);
        return Ok(0);
    }

    player.penalty = boundary.penalty.clone();
    save_player_state(Path::new(state_out), &player)?;
    emit_boundary(boundary, Some(state_out.to_string()));
    Ok(0)
}
