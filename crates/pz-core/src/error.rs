use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{code}: {message}")]
pub struct PuzzleError {
    pub code: String,
    pub message: String,
    pub node_id: Option<String>,
}

impl PuzzleError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            node_id: None,
        }
    }

    pub fn at_node(
        code: impl Into<String>,
        message: impl Into<String>,
        node_id: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            node_id: Some(node_id.into()),
        }
    }
}
