use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::info;
use pz_api::{AssetDirectory, PuzzleLibrary};
use pz_core::{Puzzle, PuzzleError, PuzzlePenalty};
use pz_runtime::{
    system_now_ms, ImageClickMaps, PixelSource, PuzzleEngine, PuzzleEngineOptions, PuzzleHost,
};

use crate::{map_cli_path, mark_completed, JsonFileFlags, PlayerState, LIBRARY_REF_PREFIX};

/// Host callbacks for the CLI: wall clock time and a completed marker in the
/// flags file.
pub(crate) struct CliHost {
    flags_file: PathBuf,
}

impl CliHost {
    pub(crate) fn new(flags_file: impl Into<PathBuf>) -> Self {
        Self {
            flags_file: flags_file.into(),
        }
    }
}

impl PuzzleHost for CliHost {
    fn now_ms(&self) -> u64 {
        system_now_ms()
    }

    fn notify_completed(&self) -> Result<(), PuzzleError> {
        info!("puzzle completed, marking {}", self.flags_file.display());
        mark_completed(&self.flags_file)
    }

    fn notify_penalty(&self, penalty: &PuzzlePenalty) -> Result<(), PuzzleError> {
        info!("penalty active until {}", penalty.time_end());
        Ok(())
    }
}

pub(crate) fn library_ref_for_dir(puzzles_dir: &str) -> Result<String, PuzzleError> {
    let path = Path::new(puzzles_dir);
    if !path.is_dir() {
        return Err(PuzzleError::new(
            "CLI_LIBRARY_NOT_FOUND",
            format!("Puzzle directory does not exist: {}", puzzles_dir),
        ));
    }
    let absolute = fs::canonicalize(path).map_err(map_cli_path)?;
    Ok(format!("{}{}", LIBRARY_REF_PREFIX, absolute.display()))
}

pub(crate) fn library_dir_from_ref(library_ref: &str) -> Result<PathBuf, PuzzleError> {
    library_ref
        .strip_prefix(LIBRARY_REF_PREFIX)
        .map(PathBuf::from)
        .ok_or_else(|| {
            PuzzleError::new(
                "CLI_LIBRARY_REF_INVALID",
                format!("Unsupported library ref: {}", library_ref),
            )
        })
}

pub(crate) fn resolve_puzzle(
    library_dir: &Path,
    passcode: &str,
) -> Result<Option<Puzzle>, PuzzleError> {
    PuzzleLibrary::load_dir(library_dir)?.resolve_puzzle(passcode)
}

/// Re-opens the puzzle a saved player state was started with.
pub(crate) fn puzzle_for_state(state: &PlayerState) -> Result<Puzzle, PuzzleError> {
    let library_dir = library_dir_from_ref(&state.library_ref)?;
    resolve_puzzle(&library_dir, &state.passcode)?.ok_or_else(|| {
        PuzzleError::new(
            "CLI_PUZZLE_MISSING",
            format!(
                "No puzzle in {} opens with the saved passcode any more.",
                library_dir.display()
            ),
        )
    })
}

pub(crate) fn build_engine(
    puzzle: Puzzle,
    flags_file: &str,
    assets_dir: Option<&str>,
) -> PuzzleEngine {
    let pixels = assets_dir.map(|dir| {
        Arc::new(ImageClickMaps::new(Arc::new(AssetDirectory::new(dir))))
            as Arc<dyn PixelSource>
    });
    PuzzleEngine::new(
        puzzle,
        PuzzleEngineOptions {
            flag_persistence: Some(Arc::new(JsonFileFlags::new(flags_file))),
            host: Some(Arc::new(CliHost::new(flags_file))),
            pixels,
        },
    )
}
