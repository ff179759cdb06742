use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::info;
use pz_api::encode_bundle;
use pz_core::{Puzzle, PuzzleError};

use crate::{map_cli_out_write, map_cli_source_invalid, map_cli_source_read, EncodeArgs};

pub(crate) fn read_authoring_bundle(path: &Path) -> Result<BTreeMap<String, Puzzle>, PuzzleError> {
    let raw = fs::read_to_string(path).map_err(map_cli_source_read)?;
    serde_json::from_str(&raw).map_err(map_cli_source_invalid)
}

pub(crate) fn run_encode(args: EncodeArgs) -> Result<i32, PuzzleError> {
    let source = read_authoring_bundle(Path::new(&args.source))?;
    let secrets = encode_bundle(&source)?;
    info!("encoded {} puzzles from {}", secrets.len(), args.source);

    let out = Path::new(&args.out);
    if let Some(parent) = out.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(map_cli_out_write)?;
    }
    let payload = serde_json::to_string_pretty(&secrets).map_err(map_cli_source_invalid)?;
    fs::write(out, payload).map_err(map_cli_out_write)?;

    println!("RESULT:OK");
    println!("ENCODED:{}", secrets.len());
    println!("OUT:{}", args.out);
    Ok(0)
}
