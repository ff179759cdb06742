use std::fs;
use std::path::{Path, PathBuf};

use pz_core::PuzzleError;
use pz_runtime::{FlagPersistence, FlagRecord, GLOBAL_FLAG_NAMESPACE};
use serde_json::{Map, Value};

use crate::{
    map_cli_flags_invalid, map_cli_flags_io, map_cli_state_invalid, map_cli_state_read,
    map_cli_state_write, PlayerState, PLAYER_STATE_SCHEMA,
};

pub(crate) const COMPLETED_MARKER_KEY: &str = "passcode-puzzles.completed";

fn ensure_parent(path: &Path) -> std::io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)
}

pub(crate) fn save_player_state(path: &Path, state: &PlayerState) -> Result<(), PuzzleError> {
    ensure_parent(path).map_err(map_cli_state_write)?;
    let payload = serde_json::to_string(state).map_err(map_cli_state_invalid)?;
    fs::write(path, payload).map_err(map_cli_state_write)
}

pub(crate) fn load_player_state(path: &Path) -> Result<PlayerState, PuzzleError> {
    if !path.exists() {
        return Err(PuzzleError::new(
            "CLI_STATE_NOT_FOUND",
            format!("State file does not exist: {}", path.display()),
        ));
    }

    let raw = fs::read_to_string(path).map_err(map_cli_state_read)?;
    let state: PlayerState = serde_json::from_str(&raw).map_err(map_cli_state_invalid)?;

    if state.schema_version != PLAYER_STATE_SCHEMA {
        return Err(PuzzleError::new(
            "CLI_STATE_SCHEMA",
            format!("Unsupported player state schema: {}", state.schema_version),
        ));
    }

    Ok(state)
}

/// The flags file is one JSON object shared by every key this host persists.
/// A missing file reads as an empty object.
fn read_document(path: &Path) -> Result<Map<String, Value>, PuzzleError> {
    if !path.exists() {
        return Ok(Map::new());
    }
    let raw = fs::read_to_string(path).map_err(map_cli_flags_io)?;
    if raw.trim().is_empty() {
        return Ok(Map::new());
    }
    let document: Value = serde_json::from_str(&raw).map_err(map_cli_flags_invalid)?;
    match document {
        Value::Object(document) => Ok(document),
        _ => Err(PuzzleError::new(
            "CLI_FLAGS_INVALID",
            format!("Flags file is not a JSON object: {}", path.display()),
        )),
    }
}

fn write_document(path: &Path, document: Map<String, Value>) -> Result<(), PuzzleError> {
    ensure_parent(path).map_err(map_cli_flags_io)?;
    let payload =
        serde_json::to_string_pretty(&Value::Object(document)).map_err(map_cli_flags_invalid)?;
    fs::write(path, payload).map_err(map_cli_flags_io)
}

/// Global flags kept in the flags file under [`GLOBAL_FLAG_NAMESPACE`].
#[derive(Debug, Clone)]
pub(crate) struct JsonFileFlags {
    path: PathBuf,
}

impl JsonFileFlags {
    pub(crate) fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl FlagPersistence for JsonFileFlags {
    fn load_record(&self) -> Result<FlagRecord, PuzzleError> {
        let mut document = read_document(&self.path)?;
        match document.remove(GLOBAL_FLAG_NAMESPACE) {
            Some(record) => serde_json::from_value(record).map_err(map_cli_flags_invalid),
            None => Ok(FlagRecord::new()),
        }
    }

    fn persist_record(&self, record: &FlagRecord) -> Result<(), PuzzleError> {
        let mut document = read_document(&self.path)?;
        let record = serde_json::to_value(record).map_err(map_cli_flags_invalid)?;
        document.insert(GLOBAL_FLAG_NAMESPACE.to_string(), record);
        write_document(&self.path, document)
    }
}

pub(crate) fn mark_completed(path: &Path) -> Result<(), PuzzleError> {
    let mut document = read_document(path)?;
    document.insert(COMPLETED_MARKER_KEY.to_string(), Value::Bool(true));
    write_document(path, document)
}

pub(crate) fn is_completed(path: &Path) -> Result<bool, PuzzleError> {
    let document = read_document(path)?;
    Ok(matches!(
        document.get(COMPLETED_MARKER_KEY),
        Some(Value::Bool(true))
    ))
}
