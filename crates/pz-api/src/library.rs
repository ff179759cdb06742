use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::{debug, info};
use pz_core::{Puzzle, PuzzleError};
use walkdir::WalkDir;

use crate::secret::{decode_secret_string, encode_secret_string};

pub const PUZZLE_FILE_SUFFIX: &str = ".puzzle.json";

/// Every secret string shipped with the host, in load order.
#[derive(Debug, Clone, Default)]
pub struct PuzzleLibrary {
    secrets: Vec<String>,
}

impl PuzzleLibrary {
    pub fn from_secrets(secrets: Vec<String>) -> Self {
        Self { secrets }
    }

    /// Loads every `*.puzzle.json` file under `dir`. Each file holds a JSON
    /// array of secret strings; files named with a leading `_` are skipped.
    pub fn load_dir(dir: &Path) -> Result<Self, PuzzleError> {
        if !dir.is_dir() {
            return Err(PuzzleError::new(
                "API_LIBRARY_NOT_FOUND",
                format!("Puzzle directory does not exist: {}", dir.display()),
            ));
        }

        let mut secrets = Vec::new();
        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry.map_err(|error| {
                PuzzleError::new("API_LIBRARY_SCAN", format!("{}", error))
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let file_name = entry.file_name().to_string_lossy();
            if !file_name.ends_with(PUZZLE_FILE_SUFFIX) {
                continue;
            }
            if file_name.starts_with('_') {
                debug!("skipping disabled puzzle file {}", entry.path().display());
                continue;
            }

            let raw = fs::read_to_string(entry.path()).map_err(|error| {
                PuzzleError::new(
                    "API_LIBRARY_READ",
                    format!("{}: {}", entry.path().display(), error),
                )
            })?;
            let file_secrets: Vec<String> = serde_json::from_str(&raw).map_err(|error| {
                PuzzleError::new(
                    "API_LIBRARY_INVALID",
                    format!(
                        "{} is not an array of secret strings: {}",
                        entry.path().display(),
                        error
                    ),
                )
            })?;
            secrets.extend(file_secrets);
        }

        info!("loaded {} puzzles from {}", secrets.len(), dir.display());
        Ok(Self { secrets })
    }

    pub fn len(&self) -> usize {
        self.secrets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
    }

    /// First puzzle whose secret string opens with `passcode`. Passcodes are
    /// case-insensitive; a miss is `Ok(None)`.
    pub fn resolve_puzzle(&self, passcode: &str) -> Result<Option<Puzzle>, PuzzleError> {
        for secret in &self.secrets {
            if let Some(puzzle) = decode_secret_string(passcode, secret)? {
                return Ok(Some(puzzle));
            }
        }
        Ok(None)
    }
}

/// Turns an authoring bundle (`{ passcode: puzzle }`) into the secret strings
/// a library file ships.
pub fn encode_bundle(source: &BTreeMap<String, Puzzle>) -> Result<Vec<String>, PuzzleError> {
    source
        .iter()
        .map(|(passcode, puzzle)| encode_secret_string(passcode, puzzle))
        .collect()
}
