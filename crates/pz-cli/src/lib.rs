use std::ffi::OsString;

use clap::Parser;
use pz_core::PuzzleError;

mod agent;
mod boundary_runner;
mod cli_args;
mod encode;
mod error_map;
mod line_play;
mod models;
mod session_ops;
mod state_store;

pub(crate) use boundary_runner::{describe_boundary, emit_boundary_with_saved_state};
pub(crate) use cli_args::{
    AgentArgs, AgentCommand, ClickArgs, Cli, EncodeArgs, Mode, OptionArgs, PlayArgs, StartArgs,
    TextArgs, DEFAULT_FLAGS_FILE,
};
pub(crate) use error_map::{
    emit_error, json_string, map_cli_flags_invalid, map_cli_flags_io, map_cli_out_write,
    map_cli_path, map_cli_runtime, map_cli_source_invalid, map_cli_source_read,
    map_cli_state_invalid, map_cli_state_read, map_cli_state_write, map_play_io,
};
pub(crate) use models::{
    BoundaryEvent, BoundaryResult, PlayerState, LIBRARY_REF_PREFIX, PLAYER_STATE_SCHEMA,
};
pub(crate) use session_ops::{
    build_engine, library_dir_from_ref, library_ref_for_dir, puzzle_for_state, resolve_puzzle,
};
pub(crate) use state_store::{
    is_completed, load_player_state, mark_completed, save_player_state, JsonFileFlags,
};
#[cfg(test)]
pub(crate) use state_store::COMPLETED_MARKER_KEY;

pub fn run_cli_from_args<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => {
            let _ = error.print();
            return error.exit_code();
        }
    };
    match run(cli) {
        Ok(code) => code,
        Err(error) => emit_error(error),
    }
}

fn run(cli: Cli) -> Result<i32, PuzzleError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(map_cli_runtime)?;
    let flags_file = cli
        .flags_file
        .unwrap_or_else(|| DEFAULT_FLAGS_FILE.to_string());

    runtime.block_on(async move {
        match cli.command {
            Mode::Agent(args) => agent::run_agent(args, &flags_file).await,
            Mode::Play(args) => line_play::run_play(args, &flags_file).await,
            Mode::Encode(args) => encode::run_encode(args),
        }
    })
}
