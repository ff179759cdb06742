use std::path::{Component, Path, PathBuf};

use pz_core::PuzzleError;
use pz_runtime::AssetResolver;

/// Assets keyed by their path relative to one directory.
#[derive(Debug, Clone)]
pub struct AssetDirectory {
    root: PathBuf,
}

impl AssetDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetResolver for AssetDirectory {
    fn resolve_asset(&self, key: &str) -> Result<PathBuf, PuzzleError> {
        let relative = Path::new(key.trim_start_matches("./"));
        let escapes = relative
            .components()
            .any(|component| !matches!(component, Component::Normal(_) | Component::CurDir));
        if key.is_empty() || escapes {
            return Err(PuzzleError::new(
                "API_ASSET_INVALID",
                format!("Asset key \"{}\" must be a relative path inside the asset directory.", key),
            ));
        }

        let path = self.root.join(relative);
        if !path.is_file() {
            return Err(PuzzleError::new(
                "API_ASSET_NOT_FOUND",
                format!("Asset \"{}\" does not exist at {}", key, path.display()),
            ));
        }
        Ok(path)
    }
}
