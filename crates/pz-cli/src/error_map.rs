use pz_core::PuzzleError;
use std::fmt::Display;

fn map_error(code: &'static str, error: impl Display) -> PuzzleError {
    PuzzleError::new(code, error.to_string())
}

pub(crate) fn emit_error(error: PuzzleError) -> i32 {
    log::error!("{}", error);
    println!("RESULT:ERROR");
    println!("ERROR_CODE:{}", error.code);
    println!("ERROR_MSG_JSON:{}", json_string(&error.message));
    1
}

pub(crate) fn json_string(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "\"\"".to_string())
}

pub(crate) fn map_cli_runtime(error: std::io::Error) -> PuzzleError {
    map_error("CLI_RUNTIME", error)
}

pub(crate) fn map_cli_path(error: std::io::Error) -> PuzzleError {
    map_error("CLI_PATH", error)
}

pub(crate) fn map_cli_state_write(error: std::io::Error) -> PuzzleError {
    map_error("CLI_STATE_WRITE", error)
}

pub(crate) fn map_cli_state_read(error: std::io::Error) -> PuzzleError {
    map_error("CLI_STATE_READ", error)
}

pub(crate) fn map_cli_state_invalid(error: serde_json::Error) -> PuzzleError {
    map_error("CLI_STATE_INVALID", error)
}

pub(crate) fn map_cli_flags_io(error: std::io::Error) -> PuzzleError {
    map_error("CLI_FLAGS_IO", error)
}

pub(crate) fn map_cli_flags_invalid(error: serde_json::Error) -> PuzzleError {
    map_error("CLI_FLAGS_INVALID", error)
}

pub(crate) fn map_cli_source_read(error: std::io::Error) -> PuzzleError {
    map_error("CLI_SOURCE_READ", error)
}

pub(crate) fn map_cli_source_invalid(error: serde_json::Error) -> PuzzleError {
    map_error("CLI_SOURCE_INVALID", error)
}

pub(crate) fn map_cli_out_write(error: std::io::Error) -> PuzzleError {
    map_error("CLI_OUT_WRITE", error)
}

pub(crate) fn map_play_io(error: std::io::Error) -> PuzzleError {
    map_error("PLAY_IO", error)
}

#[cfg(test)]
mod error_map_tests {
    use super::*;

    #[test]
    fn emit_error_returns_non_zero_exit_code() {
        let code = emit_error(PuzzleError::new("ERR", "failed"));
        assert_eq!(code, 1);
    }

    #[test]
    fn mapping_helpers_keep_error_codes() {
        assert_eq!(map_cli_runtime(std::io::Error::other("rt")).code, "CLI_RUNTIME");
        assert_eq!(map_cli_path(std::io::Error::other("path")).code, "CLI_PATH");
        assert_eq!(
            map_cli_state_write(std::io::Error::other("write")).code,
            "CLI_STATE_WRITE"
        );
        assert_eq!(
            map_cli_state_read(std::io::Error::other("read")).code,
            "CLI_STATE_READ"
        );
        assert_eq!(
            map_cli_flags_io(std::io::Error::other("flags")).code,
            "CLI_FLAGS_IO"
        );
        assert_eq!(map_play_io(std::io::Error::other("tty")).code, "PLAY_IO");

        let invalid = serde_json::from_str::<serde_json::Value>("{").expect_err("invalid json");
        assert_eq!(map_cli_state_invalid(invalid).code, "CLI_STATE_INVALID");
        let invalid = serde_json::from_str::<serde_json::Value>("[").expect_err("invalid json");
        assert_eq!(map_cli_source_invalid(invalid).code, "CLI_SOURCE_INVALID");
    }

    #[test]
    fn json_string_escapes_quotes() {
        assert_eq!(json_string("say \"hi\""), r#""say \"hi\"""#);
    }
}
