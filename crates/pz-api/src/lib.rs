//! Passcode resolution and asset lookup for puzzle hosts.
//!
//! Puzzles ship as "secret strings": a six character passcode hash followed
//! by the puzzle JSON XORed with the lowercased passcode, base64 encoded.
//! A library holds every secret string found under a directory and resolves
//! a passcode by trying each in turn.

mod assets;
mod library;
mod secret;

pub use assets::AssetDirectory;
pub use library::{encode_bundle, PuzzleLibrary, PUZZLE_FILE_SUFFIX};
pub use secret::{decode_secret_string, encode_secret_string, passcode_hash};
