use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use pz_core::{Puzzle, PuzzleError};

const HASH_PREFIX_LEN: usize = 6;
const HASH_SALT: i32 = 1_249_284;

fn string_hash(value: &str) -> i32 {
    let mut hash: i32 = 0;
    for byte in value.as_bytes() {
        hash = hash
            .wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(*byte));
    }
    hash ^ HASH_SALT
}

/// Six base64 characters derived from the passcode; stored in front of each
/// secret string so a wrong passcode is rejected without decoding.
pub fn passcode_hash(passcode: &str) -> String {
    let encoded = STANDARD.encode(string_hash(passcode).to_le_bytes());
    encoded[..HASH_PREFIX_LEN].to_string()
}

fn xor_with_key(bytes: &[u8], key: &[u8]) -> Vec<u8> {
    bytes
        .iter()
        .zip(key.iter().cycle())
        .map(|(byte, key_byte)| byte ^ key_byte)
        .collect()
}

pub fn encode_secret_string(passcode: &str, puzzle: &Puzzle) -> Result<String, PuzzleError> {
    let passcode = passcode.to_lowercase();
    if passcode.is_empty() {
        return Err(PuzzleError::new(
            "API_PASSCODE_EMPTY",
            "Puzzles cannot be encoded with an empty passcode.",
        ));
    }

    let payload = serde_json::to_vec(puzzle).map_err(|error| {
        PuzzleError::new(
            "API_SECRET_ENCODE",
            format!("Puzzle could not be serialized: {}", error),
        )
    })?;
    let encrypted = xor_with_key(&payload, passcode.as_bytes());
    Ok(format!(
        "{}{}",
        passcode_hash(&passcode),
        STANDARD.encode(encrypted)
    ))
}

/// `Ok(None)` when the passcode does not belong to this secret string.
pub fn decode_secret_string(passcode: &str, secret: &str) -> Result<Option<Puzzle>, PuzzleError> {
    let passcode = passcode.to_lowercase();
    if passcode.is_empty() {
        return Ok(None);
    }
    let (Some(prefix), Some(body)) = (secret.get(..HASH_PREFIX_LEN), secret.get(HASH_PREFIX_LEN..))
    else {
        return Ok(None);
    };
    if prefix != passcode_hash(&passcode) {
        return Ok(None);
    }

    let encrypted = STANDARD.decode(body).map_err(|error| {
        PuzzleError::new(
            "API_SECRET_INVALID",
            format!("Secret string body is not base64: {}", error),
        )
    })?;
    let payload = xor_with_key(&encrypted, passcode.as_bytes());
    let puzzle = serde_json::from_slice(&payload).map_err(|error| {
        PuzzleError::new(
            "API_SECRET_INVALID",
            format!("Secret string does not decode to a puzzle: {}", error),
        )
    })?;
    Ok(Some(puzzle))
}
