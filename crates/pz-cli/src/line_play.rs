use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use pz_core::{PuzzleError, PuzzleState, UserResponse};
use pz_runtime::{system_now_ms, PuzzleEngine};

use crate::{
    build_engine, describe_boundary, is_completed, library_dir_from_ref, library_ref_for_dir,
    map_play_io, resolve_puzzle, BoundaryEvent, BoundaryResult, PlayArgs,
};

pub(crate) async fn run_play(args: PlayArgs, flags_file: &str) -> Result<i32, PuzzleError> {
    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let mut writer = io::stdout();
    run_play_with_io(&args, flags_file, &mut reader, &mut writer).await
}

/// What the player typed at an input boundary.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum PlayCommand {
    Quit,
    Restart,
    Answer(UserResponse),
    Invalid(String),
}

pub(crate) fn parse_play_command(raw: &str, boundary: &BoundaryResult) -> PlayCommand {
    match raw.trim() {
        ":quit" | ":q" => return PlayCommand::Quit,
        ":restart" => return PlayCommand::Restart,
        _ => {}
    }
    let Some(node_index) = boundary.node_index else {
        return PlayCommand::Invalid("Nothing is waiting for input.".to_string());
    };

    match boundary.event {
        BoundaryEvent::TextInput => PlayCommand::Answer(UserResponse::Text {
            node_index,
            value: raw.to_string(),
            is_enter: true,
        }),
        BoundaryEvent::Options => match raw.trim().parse::<usize>() {
            Ok(value) if boundary.options.iter().any(|(index, _)| *index == value) => {
                PlayCommand::Answer(UserResponse::Option { node_index, value })
            }
            _ => PlayCommand::Invalid("Pick one of the listed option numbers.".to_string()),
        },
        BoundaryEvent::ClickImage => {
            let coordinates = raw
                .split_whitespace()
                .map(str::parse::<i64>)
                .collect::<Result<Vec<_>, _>>();
            match coordinates.as_deref() {
                Ok([click_x, click_y]) => PlayCommand::Answer(UserResponse::ClickImage {
                    node_index,
                    click_x: *click_x,
                    click_y: *click_y,
                }),
                _ => PlayCommand::Invalid("Click with two numbers: x y".to_string()),
            }
        }
        BoundaryEvent::Penalty | BoundaryEvent::End => {
            PlayCommand::Invalid("Nothing is waiting for input.".to_string())
        }
    }
}

fn render_boundary(boundary: &BoundaryResult, writer: &mut dyn Write) -> io::Result<()> {
    for content in &boundary.html {
        writeln!(writer)?;
        writeln!(writer, "{}", content)?;
    }
    if let Some(image) = &boundary.image {
        writeln!(writer, "[image: {}]", image)?;
    }
    if let Some(prompt) = &boundary.prompt {
        writeln!(writer, "{}", prompt)?;
    }
    if let Some(response) = &boundary.response {
        writeln!(writer, "> {}", response)?;
    }
    for (index, label) in &boundary.options {
        writeln!(writer, "  [{}] {}", index, label)?;
    }
    if let Some(penalty) = &boundary.penalty {
        writeln!(writer)?;
        writeln!(writer, "{}", penalty.content())?;
    }
    if boundary.event == BoundaryEvent::End {
        writeln!(writer)?;
        writeln!(writer, "[END]")?;
    }
    Ok(())
}

fn read_line_from(
    label: &str,
    reader: &mut dyn BufRead,
    writer: &mut dyn Write,
) -> Result<Option<String>, PuzzleError> {
    write!(writer, "{}", label).map_err(map_play_io)?;
    writer.flush().map_err(map_play_io)?;

    let mut line = String::new();
    let read = reader.read_line(&mut line).map_err(map_play_io)?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

enum SessionEnd {
    Quit,
    BackToPasscode,
}

pub(crate) async fn run_play_with_io(
    args: &PlayArgs,
    flags_file: &str,
    reader: &mut dyn BufRead,
    writer: &mut dyn Write,
) -> Result<i32, PuzzleError> {
    let library_dir: PathBuf = library_dir_from_ref(&library_ref_for_dir(&args.puzzles_dir)?)?;
    writeln!(writer, "Passcode puzzles").map_err(map_play_io)?;
    writeln!(writer, "commands: :restart :quit").map_err(map_play_io)?;
    if is_completed(Path::new(flags_file))? {
        writeln!(writer, "[star detective]").map_err(map_play_io)?;
    }

    loop {
        let Some(passcode) = read_line_from("passcode> ", reader, writer)? else {
            return Ok(0);
        };
        let passcode = passcode.trim();
        if passcode == ":quit" || passcode == ":q" {
            return Ok(0);
        }
        if passcode.is_empty() {
            continue;
        }
        let Some(puzzle) = resolve_puzzle(&library_dir, passcode)? else {
            writeln!(writer, "Nothing opens with that passcode.").map_err(map_play_io)?;
            continue;
        };

        let engine = build_engine(puzzle, flags_file, args.assets_dir.as_deref());
        match run_session(&engine, reader, writer).await? {
            SessionEnd::Quit => return Ok(0),
            SessionEnd::BackToPasscode => continue,
        }
    }
}

async fn run_session(
    engine: &PuzzleEngine,
    reader: &mut dyn BufRead,
    writer: &mut dyn Write,
) -> Result<SessionEnd, PuzzleError> {
    let mut state: PuzzleState = engine.initialize()?;
    let mut from_index = 0;

    loop {
        let boundary = describe_boundary(engine, &state, from_index)?;
        render_boundary(&boundary, writer).map_err(map_play_io)?;

        if boundary.event == BoundaryEvent::Penalty {
            if let Some(penalty) = &boundary.penalty {
                let wait = penalty.time_end().saturating_sub(system_now_ms());
                tokio::time::sleep(Duration::from_millis(wait)).await;
            }
            writeln!(writer, "[back to the start]").map_err(map_play_io)?;
            return Ok(SessionEnd::BackToPasscode);
        }
        if !boundary.event.awaits_input() {
            return Ok(SessionEnd::BackToPasscode);
        }

        loop {
            let Some(raw) = read_line_from("> ", reader, writer)? else {
                return Ok(SessionEnd::Quit);
            };
            match parse_play_command(&raw, &boundary) {
                PlayCommand::Quit => return Ok(SessionEnd::Quit),
                PlayCommand::Restart => {
                    state = engine.initialize()?;
                    from_index = 0;
                    break;
                }
                PlayCommand::Invalid(message) => {
                    writeln!(writer, "{}", message).map_err(map_play_io)?;
                }
                PlayCommand::Answer(response) => {
                    state = engine.process(&state, &response).await?;
                    from_index = response.node_index() + 1;
                    break;
                }
            }
        }
    }
}
