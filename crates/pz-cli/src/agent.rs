use std::path::Path;

use pz_core::{PuzzleError, UserResponse};
use pz_runtime::system_now_ms;

use crate::{
    build_engine, describe_boundary, emit_boundary_with_saved_state, library_dir_from_ref,
    library_ref_for_dir, load_player_state, puzzle_for_state, resolve_puzzle, AgentArgs,
    AgentCommand, ClickArgs, OptionArgs, PlayerState, StartArgs, TextArgs, PLAYER_STATE_SCHEMA,
};

pub(super) async fn run_agent(args: AgentArgs, flags_file: &str) -> Result<i32, PuzzleError> {
    match args.command {
        AgentCommand::Start(args) => run_start(args, flags_file),
        AgentCommand::Text(args) => run_text(args, flags_file).await,
        AgentCommand::Option(args) => run_option(args, flags_file).await,
        AgentCommand::Click(args) => run_click(args, flags_file).await,
    }
}

pub(super) fn run_start(args: StartArgs, flags_file: &str) -> Result<i32, PuzzleError> {
    let library_ref = library_ref_for_dir(&args.puzzles_dir)?;
    let library_dir = library_dir_from_ref(&library_ref)?;
    let Some(puzzle) = resolve_puzzle(&library_dir, &args.passcode)? else {
        println!("RESULT:OK");
        println!("EVENT:NOT_FOUND");
        println!("STATE_OUT:NONE");
        return Ok(0);
    };

    let engine = build_engine(puzzle, flags_file, args.assets_dir.as_deref());
    let puzzle_state = engine.initialize()?;
    let boundary = describe_boundary(&engine, &puzzle_state, 0)?;
    let player = PlayerState {
        schema_version: PLAYER_STATE_SCHEMA.to_string(),
        library_ref,
        assets_dir: args.assets_dir,
        passcode: args.passcode,
        puzzle_state,
        penalty: None,
    };
    emit_boundary_with_saved_state(boundary, player, &args.state_out)
}

pub(super) async fn run_text(args: TextArgs, flags_file: &str) -> Result<i32, PuzzleError> {
    let response = UserResponse::Text {
        node_index: args.node_index,
        value: args.value,
        is_enter: !args.draft,
    };
    run_state_transition(&args.state_in, &args.state_out, flags_file, response).await
}

pub(super) async fn run_option(args: OptionArgs, flags_file: &str) -> Result<i32, PuzzleError> {
    let response = UserResponse::Option {
        node_index: args.node_index,
        value: args.choice,
    };
    run_state_transition(&args.state_in, &args.state_out, flags_file, response).await
}

pub(super) async fn run_click(args: ClickArgs, flags_file: &str) -> Result<i32, PuzzleError> {
    let response = UserResponse::ClickImage {
        node_index: args.node_index,
        click_x: args.x,
        click_y: args.y,
    };
    run_state_transition(&args.state_in, &args.state_out, flags_file, response).await
}

/// A state carrying a penalty accepts no input: it is locked until the
/// penalty ends and dead afterwards, since the player was kicked to the
/// passcode prompt.
fn ensure_no_penalty(state: &PlayerState) -> Result<(), PuzzleError> {
    let Some(penalty) = &state.penalty else {
        return Ok(());
    };
    if system_now_ms() < penalty.time_end() {
        return Err(PuzzleError::new(
            "CLI_PENALTY_ACTIVE",
            format!("Input is blocked until {}.", penalty.time_end()),
        ));
    }
    Err(PuzzleError::new(
        "CLI_SESSION_KICKED",
        "The penalty sent this session back to the start; enter the passcode again.",
    ))
}

async fn run_state_transition(
    state_in: &str,
    state_out: &str,
    flags_file: &str,
    response: UserResponse,
) -> Result<i32, PuzzleError> {
    let player = load_player_state(Path::new(state_in))?;
    ensure_no_penalty(&player)?;

    let puzzle = puzzle_for_state(&player)?;
    let engine = build_engine(puzzle, flags_file, player.assets_dir.as_deref());
    let puzzle_state = engine.process(&player.puzzle_state, &response).await?;
    let boundary = describe_boundary(&engine, &puzzle_state, response.node_index() + 1)?;
    emit_boundary_with_saved_state(
        boundary,
        PlayerState {
            puzzle_state,
            ..player
        },
        state_out,
    )
}
